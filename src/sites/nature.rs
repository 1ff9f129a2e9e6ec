use crate::error::Result;
use crate::parser::{Link, LinkExtractor, LinkPattern};
use crate::spider::Spider;

/// Link patterns for each level of a journal archive.
#[derive(Clone, Debug)]
pub struct Patterns {
    pub index: LinkPattern,
    pub issue: LinkPattern,
    pub article: LinkPattern,
}

impl Default for Patterns {
    /// Archive layout of nature.com journals:
    ///
    /// ```text
    /// /nbt/archive/index.html
    /// /nbt/journal/v27/n1/index.html          <- issue
    /// /nbt/journal/v27/n1/full/nbt.1517.html  <- article
    /// /nbt/journal/v27/n1/ris/nbt.1517.ris    <- reference file
    /// ```
    fn default() -> Self {
        Self {
            index: LinkPattern::new("a[href]", r"^/[^/]+/journal/v\d+/n\d+/index\.html$"),
            issue: LinkPattern::new("a[href]", r"/journal/v\d+/n[^/]+/(full|abs)/[^/]+\.html$"),
            article: LinkPattern::new("a[href]", r"\.ris$"),
        }
    }
}

/// Spider for a single nature.com journal, identified by its url prefix
/// (e.g. `nbt` for Nature Biotechnology).
pub struct NatureSpider {
    prefix: String,
    base_url: String,
    index: LinkExtractor,
    issue: LinkExtractor,
    article: LinkExtractor,
}

impl NatureSpider {
    pub fn new(prefix: &str, base_url: &str) -> Result<Self> {
        Self::with_patterns(prefix, base_url, &Patterns::default())
    }

    pub fn with_patterns(prefix: &str, base_url: &str, patterns: &Patterns) -> Result<Self> {
        Ok(Self {
            prefix: prefix.trim_matches('/').to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            index: LinkExtractor::new(&patterns.index)?,
            issue: LinkExtractor::new(&patterns.issue)?,
            article: LinkExtractor::new(&patterns.article)?,
        })
    }
}

impl Spider for NatureSpider {
    fn name(&self) -> String {
        format!("nature-{}", self.prefix)
    }

    fn start_url(&self) -> String {
        format!("{}/{}/archive/index.html", self.base_url, self.prefix)
    }

    fn parse_index(&self, markup: &str) -> Vec<Link> {
        self.index.extract(markup)
    }

    fn parse_issue(&self, markup: &str) -> Vec<Link> {
        self.issue.extract(markup)
    }

    fn parse_article(&self, markup: &str) -> Vec<Link> {
        self.article.extract(markup)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn spider() -> NatureSpider {
        NatureSpider::new("nbt", "http://www.nature.com/").unwrap()
    }

    #[test]
    fn start_url_follows_archive_layout() {
        assert_eq!(spider().start_url(), "http://www.nature.com/nbt/archive/index.html");
        assert_eq!(spider().name(), "nature-nbt");
    }

    #[test]
    fn index_yields_every_issue_link() {
        let markup = r#"
            <html><body>
              <a href="/nbt/index.html">home</a>
              <a href="/nbt/journal/v27/n1/index.html">January</a>
              <a href="/nbt/journal/v27/n2/index.html">February</a>
              <a href="/nbt/journal/v26/n12/index.html">December</a>
              <a href="/nbt/journal/v27/n1/full/nbt0109-1.html">an article</a>
              <a href="http://www.nature.com/nbt/journal/v27/n3/index.html">absolute</a>
            </body></html>"#;
        let links: HashSet<Link> = spider().parse_index(markup).into_iter().collect();
        let expected: HashSet<Link> = [
            "/nbt/journal/v27/n1/index.html",
            "/nbt/journal/v27/n2/index.html",
            "/nbt/journal/v26/n12/index.html",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn issue_yields_article_links() {
        let markup = r#"
            <div class="toc">
              <a href="/nbt/journal/v27/n1/full/nbt0109-1.html">Full text</a>
              <a href="/nbt/journal/v27/n1/abs/nbt.1517.html">Abstract</a>
              <a href="/nbt/journal/v27/n1/pdf/nbt.1517.pdf">PDF</a>
              <a href="/nbt/journal/v27/n1/index.html">this issue</a>
            </div>"#;
        assert_eq!(
            spider().parse_issue(markup),
            vec![
                "/nbt/journal/v27/n1/full/nbt0109-1.html",
                "/nbt/journal/v27/n1/abs/nbt.1517.html",
            ]
        );
    }

    #[test]
    fn article_yields_reference_files() {
        let markup = r#"
            <a href="/nbt/journal/v27/n1/ris/nbt.1517.ris">Export citation</a>
            <a href="/nbt/journal/v27/n1/ris/nbt.1517refs.ris">Export references</a>
            <a href="/nbt/journal/v27/n1/pdf/nbt.1517.pdf">PDF</a>"#;
        assert_eq!(spider().parse_article(markup).len(), 2);
    }

    #[test]
    fn custom_patterns_override_defaults() {
        let patterns = Patterns {
            article: LinkPattern::new("a.export", r"\.bib$"),
            ..Patterns::default()
        };
        let spider =
            NatureSpider::with_patterns("nbt", "http://www.nature.com", &patterns).unwrap();
        let links = spider.parse_article(
            r#"<a class="export" href="/refs/1.bib">bib</a><a href="/refs/1.ris">ris</a>"#,
        );
        assert_eq!(links, vec!["/refs/1.bib"]);
    }
}
