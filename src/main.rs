use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail};
use clap::Parser;

use refspider::{AbsoluteLinkPolicy, Config};

#[derive(Parser)]
#[command(name = "refspider")]
#[command(about = "Download article reference files from a journal archive", long_about = None)]
struct Cli {
    /// Journal url prefixes to crawl, e.g. `nbt`
    #[arg(default_values_t = vec!["nbt".to_owned()])]
    prefixes: Vec<String>,

    /// Directory reference files are written to. Give it once for all
    /// prefixes or once per prefix.
    #[arg(short, long)]
    download_dir: Vec<PathBuf>,

    /// Maximum number of issues to read per prefix
    #[arg(short, long)]
    max_issues: Option<usize>,

    #[arg(long, default_value = "http://www.nature.com")]
    base_url: String,

    #[arg(long, default_value = "Mozilla/5.0")]
    user_agent: String,

    /// Minimum politeness delay before each fetch, in seconds
    #[arg(long, default_value_t = 1)]
    delay_min: u64,

    /// Maximum politeness delay before each fetch, in seconds
    #[arg(long, default_value_t = 5)]
    delay_max: u64,

    /// Retries for transient network failures
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// What to do with absolute issue links
    #[arg(long, value_enum, default_value_t = AbsoluteLinkPolicy::Skip)]
    absolute_links: AbsoluteLinkPolicy,

    /// Seed for the crawl order
    #[arg(long)]
    seed: Option<u64>,

    /// Do not consult robots.txt
    #[arg(long)]
    ignore_robots: bool,
}

impl Cli {
    /// One config per prefix, in prefix order.
    fn configs(&self) -> anyhow::Result<Vec<Config>> {
        let dirs = self.download_dir.len();
        if dirs > 1 && dirs != self.prefixes.len() {
            bail!("got {} download dirs for {} prefixes", dirs, self.prefixes.len());
        }
        Ok((0..self.prefixes.len()).map(|idx| self.config_for(idx)).collect())
    }

    fn config_for(&self, idx: usize) -> Config {
        let download_dir = match self.download_dir.len() {
            0 => PathBuf::from("."),
            1 => self.download_dir[0].clone(),
            _ => self.download_dir[idx].clone(),
        };
        Config {
            user_agent: self.user_agent.clone(),
            base_url: self.base_url.clone(),
            download_dir,
            delay_min_secs: self.delay_min,
            delay_max_secs: self.delay_max,
            max_issues: self.max_issues,
            absolute_links: self.absolute_links,
            max_retries: self.max_retries,
            retry_backoff_secs: Config::default().retry_backoff_secs,
            request_timeout_secs: self.timeout,
            robotstxt_obey: !self.ignore_robots,
            seed: self.seed,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configs = cli.configs()?;
    for (prefix, config) in cli.prefixes.iter().zip(&configs) {
        config
            .sanity_check()
            .with_context(|| format!("invalid settings for prefix `{}`", prefix))?;
    }
    log::info!("checking prefixes: {}", cli.prefixes.join(" "));

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })?;

    for (prefix, config) in cli.prefixes.iter().zip(configs) {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let mut engine = refspider::engine(config, prefix)?.with_stop_handle(stop.clone());
        engine
            .run()
            .await
            .with_context(|| format!("crawl of `{}` failed", prefix))?;
    }

    log::info!("Exit gracefully");
    Ok(())
}
