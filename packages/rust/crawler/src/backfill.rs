//! Reference backfill: tagging location anchors with journal references.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use hexbridge_shared::TargetRef;

/// Location URL → journal page reference, accumulated during a crawl.
pub type ReferenceMap = BTreeMap<String, TargetRef>;

/// Append a `@UUID[...]` reference tag after every anchor whose href is in
/// `refs`.
///
/// Matching is per-occurrence: two anchors with the same href each get
/// their own tag, carrying their own label text. Anchors whose href is not
/// in the map are left untouched, as is everything else in `notes`.
pub fn tag_references(notes: &str, refs: &ReferenceMap) -> String {
    let mut out = notes.to_string();
    for (url, target) in refs {
        let pattern = format!(
            r#"(?i)(<a\s+[^>]*href=["']{}["'][^>]*>\s*<strong>)(.*?)(</strong>\s*</a>)"#,
            regex::escape(url)
        );
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(url, error = %e, "skipping untaggable location link");
                continue;
            }
        };
        out = re
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                let label = caps[2].trim().to_string();
                debug!(url, label, "tagging location anchor");
                format!("{}{}{} @UUID[{}]{{{}}}", &caps[1], &caps[2], &caps[3], target, label)
            })
            .into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(entries: &[(&str, &str, &str)]) -> ReferenceMap {
        entries
            .iter()
            .map(|(url, j, p)| (url.to_string(), TargetRef::new(*j, *p)))
            .collect()
    }

    #[test]
    fn appends_tag_after_matching_anchor() {
        let notes = r#"<p>See <a href="https://5e.hexroll.app/sandbox/abc/location/1"><strong>The Tavern</strong></a>.</p>"#;
        let refs = refs(&[("https://5e.hexroll.app/sandbox/abc/location/1", "j1", "p1")]);

        let tagged = tag_references(notes, &refs);
        assert!(tagged.contains(
            r#"</strong></a> @UUID[JournalEntry.j1.JournalEntryPage.p1]{The Tavern}"#
        ));
        // Original anchor preserved verbatim.
        assert!(tagged.contains(r#"<a href="https://5e.hexroll.app/sandbox/abc/location/1"><strong>The Tavern</strong></a>"#));
    }

    #[test]
    fn duplicate_hrefs_each_get_their_own_label() {
        let notes = concat!(
            r#"<a href="https://x.example/location/1"><strong>Tavern</strong></a>"#,
            r#"<a href="https://x.example/location/1"><strong>Tavern Again</strong></a>"#,
        );
        let refs = refs(&[("https://x.example/location/1", "j1", "p1")]);

        let tagged = tag_references(notes, &refs);
        assert!(tagged.contains("@UUID[JournalEntry.j1.JournalEntryPage.p1]{Tavern}"));
        assert!(tagged.contains("@UUID[JournalEntry.j1.JournalEntryPage.p1]{Tavern Again}"));
    }

    #[test]
    fn href_match_is_case_insensitive_on_markup() {
        let notes = r#"<A HREF="https://x.example/location/1"><STRONG>Keep</STRONG></A>"#;
        let refs = refs(&[("https://x.example/location/1", "j1", "p1")]);

        let tagged = tag_references(notes, &refs);
        assert!(tagged.contains("@UUID[JournalEntry.j1.JournalEntryPage.p1]{Keep}"));
    }

    #[test]
    fn untracked_anchors_are_untouched() {
        let notes = r#"<a href="https://x.example/location/2"><strong>Elsewhere</strong></a>"#;
        let refs = refs(&[("https://x.example/location/1", "j1", "p1")]);

        assert_eq!(tag_references(notes, &refs), notes);
    }

    #[test]
    fn anchors_without_strong_label_are_untouched() {
        let notes = r#"<a href="https://x.example/location/1">bare link</a>"#;
        let refs = refs(&[("https://x.example/location/1", "j1", "p1")]);

        assert_eq!(tag_references(notes, &refs), notes);
    }

    #[test]
    fn label_whitespace_is_trimmed_in_tag() {
        let notes =
            r#"<a href="https://x.example/location/1"><strong>  The Mill </strong></a>"#;
        let refs = refs(&[("https://x.example/location/1", "j1", "p1")]);

        let tagged = tag_references(notes, &refs);
        assert!(tagged.contains("{The Mill}"));
        assert!(!tagged.contains("{  The Mill }"));
    }
}
