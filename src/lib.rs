//! Crawls a journal archive (index → issues → articles) and downloads the
//! bibliographic reference files linked from each article.

mod config;
mod downloader;
mod engine;
mod error;
mod spider;
mod stats;

pub mod parser;
pub mod sites;
pub mod util;

// (Re) Exports
pub use config::{AbsoluteLinkPolicy, Config};
pub use downloader::{Downloader, Fetch, Throttle};
pub use engine::{ArticleRecord, Engine, IssueRecord};
pub use error::{Error, Result};
pub use parser::{Link, LinkExtractor, LinkPattern};
pub use spider::Spider;
pub use stats::Stats;

use sites::nature::NatureSpider;

/// Engine crawling the nature.com journal `prefix` over the network.
pub fn engine(config: Config, prefix: &str) -> Result<Engine> {
    let spider = NatureSpider::new(prefix, &config.base_url)?;
    let downloader = Downloader::new(&config);
    Ok(Engine::new(config, Box::new(spider), Box::new(downloader)))
}
