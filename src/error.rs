use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while crawling a site.
///
/// Network and HTTP errors are split so the downloader can tell a flaky
/// connection from a page that does not exist.
#[derive(Error, Debug)]
pub enum Error {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0} is disallowed by robots.txt")]
    Disallowed(String),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => Error::Http {
                url: url.to_owned(),
                status,
            },
            ureq::Error::Transport(transport) => Error::Network {
                url: url.to_owned(),
                source: Box::new(transport),
            },
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network { .. } => true,
            Error::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> Error {
        Error::Http {
            url: "http://www.nature.com/nbt/archive/index.html".to_owned(),
            status,
        }
    }

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(http(500).is_transient());
        assert!(http(503).is_transient());
        assert!(http(429).is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!http(404).is_transient());
        assert!(!http(403).is_transient());
        assert!(!Error::Markup("empty page".to_owned()).is_transient());
        assert!(!Error::Config("bad".to_owned()).is_transient());
    }

    #[test]
    fn io_error_names_the_path() {
        let err = Error::io(
            "out/1234.ris",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("out/1234.ris"));
        assert!(!err.is_transient());
    }
}
