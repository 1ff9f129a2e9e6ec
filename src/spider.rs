use crate::parser::Link;

/// Site profile driving a crawl.
///
/// A spider knows where a site's archive starts and how to pick links out
/// of each level of the hierarchy. It never fetches anything itself; the
/// engine hands it markup that has already been downloaded.
pub trait Spider {
    /// Get spider name. Only used for logging.
    fn name(&self) -> String;

    /// Url (or local path) of the archive index page.
    fn start_url(&self) -> String;

    /// Links to issue pages found on the index page.
    fn parse_index(&self, markup: &str) -> Vec<Link>;

    /// Links to article pages found on an issue page.
    fn parse_issue(&self, markup: &str) -> Vec<Link>;

    /// Links to reference files found on an article page.
    fn parse_article(&self, markup: &str) -> Vec<Link>;
}
