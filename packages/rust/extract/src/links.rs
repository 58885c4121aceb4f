//! Location link collection from notes HTML.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use hexbridge_shared::SourceConfig;

/// Collect the ordered-unique set of location links in an HTML fragment.
///
/// A link qualifies when its href starts with the configured base prefix
/// and contains the location path segment. Hrefs are expected to already be
/// absolute; the notes extractor absolutizes them when assembling the text.
pub fn collect_location_links(html: &str, config: &SourceConfig) -> Vec<Url> {
    let fragment = Html::parse_fragment(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in fragment.select(&anchor_sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !href.starts_with(&config.base_prefix) || !href.contains(&config.location_segment) {
            continue;
        }
        let Ok(url) = Url::parse(href) else {
            tracing::debug!(href, "skipping unparsable location href");
            continue;
        };
        if seen.insert(url.to_string()) {
            links.push(url);
        }
    }

    links
}
