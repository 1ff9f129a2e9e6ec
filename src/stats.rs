use chrono::{NaiveDateTime, Utc};

/// Counters for a single crawl run.
pub struct Stats {
    pub pages_fetched: u64,
    pub issues_read: u64,
    pub articles_read: u64,
    pub articles_retained: u64,
    pub references_downloaded: u64,
    pub links_skipped: u64,
    pub failures: u64,
    start_time: NaiveDateTime,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            pages_fetched: 0,
            issues_read: 0,
            articles_read: 0,
            articles_retained: 0,
            references_downloaded: 0,
            links_skipped: 0,
            failures: 0,
            start_time: Utc::now().naive_utc(),
        }
    }

    pub fn fetched_per_minute(&self) -> u64 {
        let elapsed = (self.elapsed_time() / 60) as u64;
        if elapsed > 0 {
            self.pages_fetched / elapsed
        } else {
            0
        }
    }

    /// Elapsed time for this run in seconds
    pub fn elapsed_time(&self) -> i64 {
        let elapsed = Utc::now().naive_utc() - self.start_time;
        elapsed.num_seconds()
    }

    pub fn report(&self, name: &str) {
        log::info!(
            "[{}] {} issues, {} articles ({} with references), {} files downloaded",
            name,
            self.issues_read,
            self.articles_read,
            self.articles_retained,
            self.references_downloaded,
        );
        log::info!(
            "[{}] {} pages fetched in {}s ({} pages/minute), {} links skipped, {} failures",
            name,
            self.pages_fetched,
            self.elapsed_time(),
            self.fetched_per_minute(),
            self.links_skipped,
            self.failures,
        );
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
