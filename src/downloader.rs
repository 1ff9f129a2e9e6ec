use std::future::Future;
use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::Config;
use crate::error::{Error, Result};
use crate::util;

/// Source of raw page and file bytes.
///
/// The engine only talks to this trait so that a crawl can be replayed
/// against canned pages.
#[async_trait]
pub trait Fetch {
    /// Returns the bytes behind `resource`, either an `http(s)` url or a
    /// local file path.
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>>;
}

/// Random politeness wait before each fetch.
#[derive(Clone, Debug)]
pub struct Throttle {
    min_secs: u64,
    max_secs: u64,
}

impl Throttle {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Picks a whole number of seconds in `[min_secs, max_secs]`.
    pub fn next_delay(&self) -> Duration {
        if self.max_secs == 0 || self.min_secs > self.max_secs {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            log::debug!("waiting {}s before next fetch", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }
}

/// `ureq` backed fetcher with a fixed user agent, politeness delay and
/// retries on transient failures.
#[derive(Clone)]
pub struct Downloader {
    agent: ureq::Agent,
    user_agent: String,
    throttle: Throttle,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Downloader {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
            throttle: Throttle::new(config.delay_min_secs, config.delay_max_secs),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_secs(config.retry_backoff_secs),
        }
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let url = url.to_owned();
        tokio::task::spawn_blocking(move || {
            let response = agent
                .get(&url)
                .set("User-Agent", &user_agent)
                .call()
                .map_err(|e| Error::from_ureq(&url, e))?;
            let mut body = vec![];
            response
                .into_reader()
                .read_to_end(&mut body)
                .map_err(|e| Error::io(&url, e))?;
            Ok(body)
        })
        .await?
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        retry(self.max_retries, self.retry_backoff, || async move {
            self.throttle.wait().await;
            if util::is_absolute(resource) {
                self.get(resource).await
            } else {
                tokio::fs::read(resource)
                    .await
                    .map_err(|e| Error::io(resource, e))
            }
        })
        .await
    }
}

/// Longest wait between two retries.
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Wait before retry number `attempt + 1`: `base * 2^attempt`, capped at
/// [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(MAX_BACKOFF)
        .min(MAX_BACKOFF)
}

/// Runs `op` until it succeeds, fails permanently, or `max_retries` retries
/// are used up. The wait doubles after each transient failure.
pub(crate) async fn retry<T, F, Fut>(
    max_retries: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < max_retries => {
                let wait = backoff_delay(backoff, attempt);
                attempt += 1;
                log::warn!(
                    "{} (retry {}/{} in {}s)",
                    e,
                    attempt,
                    max_retries,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
            }
            res => return res,
        }
    }
}
