use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Url;

use crate::error::{Error, Result};

/// Returns true if the link carries its own scheme, e.g. `http://...`.
pub fn is_absolute(link: &str) -> bool {
    link.starts_with("http")
}

/// Join base url with another (possibly relative) url
pub fn join_url(base_url: &str, url: &str) -> Result<String> {
    let invalid = |target: &str, reason: String| Error::InvalidUrl {
        url: target.to_owned(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(base_url, e.to_string()))?;
    let joined = base.join(url).map_err(|e| invalid(url, e.to_string()))?;
    Ok(joined.to_string())
}

pub fn get_host(url: &str) -> Option<String> {
    let url_ = Url::parse(url).ok()?;
    url_.host_str().map(|x| x.to_owned())
}

pub fn get_robot_url(url: &str) -> Option<String> {
    let mut url_ = Url::parse(url).ok()?;
    if url_.scheme() != "http" && url_.scheme() != "https" {
        return None;
    }
    url_.set_path("/robots.txt");
    url_.set_query(None);
    url_.set_fragment(None);
    Some(url_.to_string())
}

/// Last path segment of a url, used as the local file name. Query and
/// fragment are not part of it.
pub fn basename(url: &str) -> Option<String> {
    let name = match Url::parse(url) {
        Ok(parsed) => parsed.path_segments()?.last()?.to_owned(),
        Err(_) => url.rsplit('/').next()?.to_owned(),
    };
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Local path a downloaded url is written to.
pub fn download_path(download_dir: &Path, url: &str) -> Option<PathBuf> {
    basename(url).map(|name| download_dir.join(name))
}

/// Shuffles links in place so that the site is not walked sequentially.
pub fn shuffle_links<R: Rng + ?Sized>(links: &mut [String], rng: &mut R) {
    links.shuffle(rng);
}
