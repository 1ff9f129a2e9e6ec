use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod guard_robot;

use crate::config::{AbsoluteLinkPolicy, Config};
use crate::downloader::Fetch;
use crate::error::{Error, Result};
use crate::parser::Link;
use crate::spider::Spider;
use crate::stats::Stats;
use crate::util;

use guard_robot::GuardRobot;

/// An issue page and the article links found on it.
#[derive(Clone, Debug)]
pub struct IssueRecord {
    pub url: String,
    pub links: Vec<Link>,
}

/// An article page and the reference file links found on it.
#[derive(Clone, Debug)]
pub struct ArticleRecord {
    pub url: String,
    pub links: Vec<Link>,
}

/// Walks index → issues → articles → reference files for one spider.
///
/// Every phase runs to completion before the next one starts. Issue and
/// article records accumulate for the lifetime of the engine; build a new
/// engine to start over.
pub struct Engine {
    config: Config,
    spider: Box<dyn Spider + Send + Sync>,
    fetcher: Box<dyn Fetch + Send + Sync>,
    guard_robot: GuardRobot,
    rng: ChaCha8Rng,
    stop: Arc<AtomicBool>,

    index_links: Vec<Link>,
    issues: Vec<IssueRecord>,
    articles: Vec<ArticleRecord>,
    stats: Stats,
}

impl Engine {
    pub fn new(
        config: Config,
        spider: Box<dyn Spider + Send + Sync>,
        fetcher: Box<dyn Fetch + Send + Sync>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            guard_robot: GuardRobot::new(&config.user_agent),
            config,
            spider,
            fetcher,
            rng,
            stop: Arc::new(AtomicBool::new(false)),
            index_links: vec![],
            issues: vec![],
            articles: vec![],
            stats: Stats::new(),
        }
    }

    /// Shares an externally owned stop flag, e.g. one set from a signal
    /// handler.
    pub fn with_stop_handle(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that makes the engine stop before its next fetch.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn index_links(&self) -> &[Link] {
        &self.index_links
    }

    pub fn issues(&self) -> &[IssueRecord] {
        &self.issues
    }

    pub fn articles(&self) -> &[ArticleRecord] {
        &self.articles
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Runs all four phases starting from the spider's start url.
    pub async fn run(&mut self) -> Result<()> {
        self.config.sanity_check()?;
        let name = self.spider.name();
        let start_url = self.spider.start_url();

        self.read_index(&start_url).await?;
        log::info!("[{}] read index at {}", name, start_url);
        self.read_issues().await;
        self.read_articles().await;
        self.fetch_references().await?;

        if self.is_stopped() {
            log::info!("[{}] stopped early", name);
        }
        self.stats.report(&name);
        Ok(())
    }

    /// Fetches the index page and stores its issue links. Any failure here
    /// is fatal for the run.
    pub async fn read_index(&mut self, resource: &str) -> Result<()> {
        let markup = self.get_markup(resource).await?;
        self.index_links = self.spider.parse_index(&markup);
        if self.index_links.is_empty() {
            log::warn!("no issue links found at {}", resource);
        }
        Ok(())
    }

    /// Reads the shuffled index links, up to `max_issues` of them.
    pub async fn read_issues(&mut self) {
        let mut requested = 0;
        for link in self.shuffled_index_links() {
            if self.is_stopped() {
                return;
            }
            if let Some(max) = self.config.max_issues {
                if requested >= max {
                    log::debug!("issue cap of {} reached", max);
                    return;
                }
            }

            let url = if util::is_absolute(&link) {
                match self.config.absolute_links {
                    AbsoluteLinkPolicy::Skip => {
                        log::warn!("skipping absolute issue link {}", link);
                        self.stats.links_skipped += 1;
                        continue;
                    }
                    AbsoluteLinkPolicy::Abort => {
                        log::warn!("absolute issue link {}, no more issues read", link);
                        return;
                    }
                    AbsoluteLinkPolicy::Follow => link,
                }
            } else {
                match self.resolve(&link) {
                    Some(url) => url,
                    None => continue,
                }
            };

            log::info!("reading issue {}", url);
            requested += 1;
            if let Err(e) = self.read_issue(&url).await {
                self.record_failure(&e);
            }
        }
    }

    async fn read_issue(&mut self, url: &str) -> Result<()> {
        let markup = self.get_markup(url).await?;
        let links = self.spider.parse_issue(&markup);
        if links.is_empty() {
            log::warn!("no article links found at {}", url);
        }
        self.stats.issues_read += 1;
        self.issues.push(IssueRecord {
            url: url.to_owned(),
            links,
        });
        Ok(())
    }

    /// Reads every article linked from the issues read so far, keeping the
    /// ones that link to more than one reference file.
    pub async fn read_articles(&mut self) {
        for link in self.shuffled_article_links() {
            if self.is_stopped() {
                return;
            }
            let url = match self.resolve(&link) {
                Some(url) => url,
                None => continue,
            };
            if let Err(e) = self.read_article(&url).await {
                self.record_failure(&e);
            }
        }
    }

    async fn read_article(&mut self, url: &str) -> Result<()> {
        let markup = self.get_markup(url).await?;
        let links = self.spider.parse_article(&markup);
        self.stats.articles_read += 1;
        // A lone link is the article pointing back at itself.
        if links.len() > 1 {
            log::info!("fetched links {}", links.join(" and "));
            self.stats.articles_retained += 1;
            self.articles.push(ArticleRecord {
                url: url.to_owned(),
                links,
            });
        } else {
            log::debug!("no reference files at {}", url);
        }
        Ok(())
    }

    /// Downloads every reference file of the retained articles into the
    /// download directory. Failing to write a file aborts the run.
    pub async fn fetch_references(&mut self) -> Result<()> {
        let links: Vec<Link> = self
            .articles
            .iter()
            .flat_map(|a| a.links.iter().cloned())
            .collect();

        for link in links {
            if self.is_stopped() {
                break;
            }
            let url = match self.resolve(&link) {
                Some(url) => url,
                None => continue,
            };
            let path = match util::download_path(&self.config.download_dir, &url) {
                Some(path) => path,
                None => {
                    log::warn!("no file name in {}, skipping", url);
                    self.stats.links_skipped += 1;
                    continue;
                }
            };

            log::info!("downloading {}", url);
            let body = match self.get(&url).await {
                Ok(body) => body,
                Err(e) => {
                    self.record_failure(&e);
                    continue;
                }
            };
            write_file(&path, &body).await?;
            self.stats.references_downloaded += 1;
        }
        Ok(())
    }

    /// Index links in random order, so that the site is not walked
    /// sequentially.
    fn shuffled_index_links(&mut self) -> Vec<Link> {
        util::shuffle_links(&mut self.index_links, &mut self.rng);
        self.index_links.clone()
    }

    /// All article links across the issues read, in random order.
    fn shuffled_article_links(&mut self) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .issues
            .iter()
            .flat_map(|i| i.links.iter().cloned())
            .collect();
        util::shuffle_links(&mut links, &mut self.rng);
        links
    }

    fn resolve(&mut self, link: &str) -> Option<String> {
        match util::join_url(&self.config.base_url, link) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("{}", e);
                self.stats.links_skipped += 1;
                None
            }
        }
    }

    async fn get(&mut self, url: &str) -> Result<Vec<u8>> {
        if self.config.robotstxt_obey
            && !self.guard_robot.is_allowed(url, &*self.fetcher).await
        {
            return Err(Error::Disallowed(url.to_owned()));
        }
        let body = self.fetcher.fetch(url).await?;
        self.stats.pages_fetched += 1;
        Ok(body)
    }

    async fn get_markup(&mut self, url: &str) -> Result<String> {
        let body = self.get(url).await?;
        if body.is_empty() {
            return Err(Error::Markup(format!("empty page at {}", url)));
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn record_failure(&mut self, err: &Error) {
        log::error!("{}", err);
        self.stats.failures += 1;
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

async fn write_file(path: &Path, body: &[u8]) -> Result<()> {
    tokio::fs::write(path, body)
        .await
        .map_err(|e| Error::io(path, e))
}
