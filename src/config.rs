use std::path::PathBuf;

use crate::error::{Error, Result};

/// What to do with an index link that is already an absolute URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AbsoluteLinkPolicy {
    /// Log the link and move on to the next one.
    Skip,
    /// Fetch the link as-is instead of prefixing it with the base url.
    Follow,
    /// Stop reading issues altogether.
    Abort,
}

pub struct Config {
    /// User agent sent with every network request
    pub user_agent: String,
    /// Site root that relative links are resolved against.
    pub base_url: String,
    /// Directory reference files are written to. It must already exist.
    pub download_dir: PathBuf,
    /// Lower bound (in secs) of the random wait before each fetch.
    pub delay_min_secs: u64,
    /// Upper bound (in secs, inclusive) of the random wait before each fetch.
    pub delay_max_secs: u64,
    /// Maximum number of issue pages to read. `None` reads them all.
    pub max_issues: Option<usize>,
    /// Handling of index links that are already absolute urls.
    pub absolute_links: AbsoluteLinkPolicy,
    /// Number of times a transient failure is retried before giving up.
    pub max_retries: u32,
    /// Base of the exponential backoff between retries, in secs.
    pub retry_backoff_secs: u64,
    /// Timeout applied to each network request, in secs.
    pub request_timeout_secs: u64,
    /// If enabled, robots.txt policies are respected.
    pub robotstxt_obey: bool,
    /// Seed for link shuffling. Random when unset.
    pub seed: Option<u64>,
}

impl Config {
    /// Validates the configuration before any request is made.
    pub fn sanity_check(&self) -> Result<()> {
        if self.delay_min_secs > self.delay_max_secs {
            return Err(Error::Config(format!(
                "delay_min_secs ({}) cannot exceed delay_max_secs ({})",
                self.delay_min_secs, self.delay_max_secs
            )));
        }
        if self.max_issues == Some(0) {
            return Err(Error::Config("max_issues cannot be zero".to_owned()));
        }
        if !self.base_url.starts_with("http") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) url, got `{}`",
                self.base_url
            )));
        }
        reqwest::Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        self.check_download_dir()
    }

    fn check_download_dir(&self) -> Result<()> {
        let dir = &self.download_dir;
        let metadata = std::fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::Config(format!(
                "download dir {} is not a directory",
                dir.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(Error::Config(format!(
                "download dir {} is not writable",
                dir.display()
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_owned(),
            base_url: "http://www.nature.com".to_owned(),
            download_dir: PathBuf::from("."),
            delay_min_secs: 1,
            delay_max_secs: 5,
            max_issues: None,
            absolute_links: AbsoluteLinkPolicy::Skip,
            max_retries: 3,
            retry_backoff_secs: 2,
            request_timeout_secs: 30,
            robotstxt_obey: true,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            download_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        config_in(dir.path()).sanity_check().unwrap();
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.delay_min_secs = 6;
        assert!(matches!(config.sanity_check(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_issue_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.max_issues = Some(0);
        assert!(matches!(config.sanity_check(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_missing_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir.path().join("missing"));
        assert!(matches!(config.sanity_check(), Err(Error::Io { .. })));
    }

    #[test]
    fn rejects_file_as_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("refs.ris");
        std::fs::write(&file, b"TY  - JOUR").unwrap();
        let config = config_in(&file);
        assert!(matches!(config.sanity_check(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.base_url = "ftp://www.nature.com".to_owned();
        assert!(config.sanity_check().is_err());
    }

    #[test]
    fn parses_absolute_link_policy() {
        use clap::ValueEnum;

        let parse = |s: &str| AbsoluteLinkPolicy::from_str(s, true);
        assert_eq!(parse("skip"), Ok(AbsoluteLinkPolicy::Skip));
        assert_eq!(parse("Follow"), Ok(AbsoluteLinkPolicy::Follow));
        assert_eq!(parse("abort"), Ok(AbsoluteLinkPolicy::Abort));
        assert!(parse("truncate").is_err());
    }
}
