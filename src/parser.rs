use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{Error, Result};

/// A hyperlink as it appears in the markup, relative or absolute.
pub type Link = String;

/// Uncompiled description of which links a page level yields.
#[derive(Clone, Debug)]
pub struct LinkPattern {
    /// CSS selector picking candidate elements.
    pub selector: String,
    /// Regex the element's `href` must match.
    pub href: String,
}

impl LinkPattern {
    pub fn new(selector: &str, href: &str) -> Self {
        Self {
            selector: selector.to_owned(),
            href: href.to_owned(),
        }
    }
}

/// Pulls matching hrefs out of a page.
///
/// Extraction is a pure transform over already fetched markup: hrefs are
/// returned in document order, duplicates included.
pub struct LinkExtractor {
    selector: Selector,
    href: Regex,
}

impl LinkExtractor {
    pub fn new(pattern: &LinkPattern) -> Result<Self> {
        let selector = Selector::parse(&pattern.selector).map_err(|e| {
            Error::Config(format!("invalid selector `{}`: {:?}", pattern.selector, e))
        })?;
        let href = Regex::new(&pattern.href).map_err(|e| {
            Error::Config(format!("invalid href pattern `{}`: {}", pattern.href, e))
        })?;
        Ok(Self { selector, href })
    }

    pub fn extract(&self, markup: &str) -> Vec<Link> {
        let document = Html::parse_document(markup);
        let links: Vec<Link> = document
            .select(&self.selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && self.href.is_match(href))
            .map(|href| href.to_owned())
            .collect();
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_matching_hrefs_in_order() {
        let extractor = LinkExtractor::new(&LinkPattern::new("a[href]", r"\.ris$")).unwrap();
        let links = extractor.extract(
            r#"<html><body>
                <a href="/nbt/journal/v27/n1/ris/nbt.1517.ris">citation</a>
                <a href="/nbt/journal/v27/n1/full/nbt.1517.html">full text</a>
                <a href="/nbt/journal/v27/n1/ris/nbt.1517refs.ris">references</a>
                <a name="top">no href</a>
            </body></html>"#,
        );
        assert_eq!(
            links,
            vec![
                "/nbt/journal/v27/n1/ris/nbt.1517.ris",
                "/nbt/journal/v27/n1/ris/nbt.1517refs.ris",
            ]
        );
    }

    #[test]
    fn selector_restricts_candidates() {
        let extractor =
            LinkExtractor::new(&LinkPattern::new("ul.issues a", r"index\.html$")).unwrap();
        let links = extractor.extract(
            r#"<ul class="issues"><li><a href="/nbt/journal/v1/n1/index.html">1</a></li></ul>
               <div><a href="/nbt/journal/v1/n2/index.html">sidebar</a></div>"#,
        );
        assert_eq!(links, vec!["/nbt/journal/v1/n1/index.html"]);
    }

    #[test]
    fn empty_markup_yields_nothing() {
        let extractor = LinkExtractor::new(&LinkPattern::new("a", ".*")).unwrap();
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert!(matches!(
            LinkExtractor::new(&LinkPattern::new("a[", ".*")),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LinkExtractor::new(&LinkPattern::new("a", "(")),
            Err(Error::Config(_))
        ));
    }
}
