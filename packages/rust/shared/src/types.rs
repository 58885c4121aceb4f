//! Core domain types shared across the hexbridge crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TabId / ObjectId
// ---------------------------------------------------------------------------

/// Handle of a source-app browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the target-app object that receives the notes annotation.
///
/// Always passed explicitly by the caller; write operations never infer it
/// from whatever happens to be selected in the target app's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TargetRef
// ---------------------------------------------------------------------------

/// Stable reference to a journal page created in the target app.
///
/// Encodes both the root journal and the page so the reference survives
/// renames. Wire form: `JournalEntry.<journal>.JournalEntryPage.<page>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    /// Identifier of the root journal container.
    pub journal_id: String,
    /// Identifier of the page within the journal.
    pub page_id: String,
}

impl TargetRef {
    pub fn new(journal_id: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            journal_id: journal_id.into(),
            page_id: page_id.into(),
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JournalEntry.{}.JournalEntryPage.{}",
            self.journal_id, self.page_id
        )
    }
}

impl std::str::FromStr for TargetRef {
    type Err = crate::error::HexbridgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["JournalEntry", journal, "JournalEntryPage", page]
                if !journal.is_empty() && !page.is_empty() =>
            {
                Ok(Self::new(*journal, *page))
            }
            _ => Err(crate::error::HexbridgeError::parse(format!(
                "not a journal page reference: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtractedPage
// ---------------------------------------------------------------------------

/// Title used when the source page carries no title element.
pub const DEFAULT_PAGE_TITLE: &str = "Untitled Hex Entry";

/// Result of extracting one source-app location page.
///
/// Immutable once produced; `visible_html` holds everything up to and
/// including the first meaningful paragraph or heading, `secret_html`
/// everything after it (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub visible_html: String,
    pub secret_html: String,
}

impl ExtractedPage {
    /// Whether the extraction yielded anything usable for a journal page.
    pub fn is_usable(&self) -> bool {
        !self.title.is_empty() && !self.visible_html.trim().is_empty()
    }

    /// Assemble the final journal body: the visible part, followed by the
    /// secret part wrapped in a distinctly tagged container (only when the
    /// secret part is non-empty).
    pub fn journal_html(&self) -> String {
        if self.secret_html.trim().is_empty() {
            self.visible_html.clone()
        } else {
            format!(
                r#"{}<section class="secret" id="secret-{}">{}</section>"#,
                self.visible_html,
                random_section_id(),
                self.secret_html
            )
        }
    }
}

/// Short random identifier for a secret section container.
fn random_section_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..10].to_string()
}

// ---------------------------------------------------------------------------
// NotesExtract
// ---------------------------------------------------------------------------

/// The raw notes variant of a page: the active content block unsplit, with
/// relative location links already absolutized. This is what gets written
/// to the notes annotation and scanned for location links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesExtract {
    pub title: String,
    pub body_html: String,
}

impl NotesExtract {
    pub fn is_usable(&self) -> bool {
        !self.title.is_empty() && !self.body_html.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// CrawlRequest / CrawlReport
// ---------------------------------------------------------------------------

/// Inbound trigger for a crawl-and-backfill run.
///
/// Field names match the message shape used on the wire by the popup side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    /// Tab showing the source app.
    pub source_tab_id: TabId,
    /// URL of the origin page, restored after the crawl.
    pub original_url: url::Url,
    /// Title of the origin page.
    pub title: String,
    /// Raw notes body of the origin page (links already absolute).
    pub raw_body_html: String,
    /// Deduplicated location links found on the origin page.
    pub location_links: Vec<url::Url>,
    /// Target-app object receiving the notes annotation.
    pub notes_object: ObjectId,
}

/// Final result of a crawl-and-backfill run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    /// Linked locations successfully written to the target app.
    pub processed: usize,
    /// Linked locations that failed (navigation, extraction, or write).
    pub failed: usize,
    /// Human-readable summary for the caller.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ref_wire_form_roundtrip() {
        let r = TargetRef::new("j1", "p9");
        let s = r.to_string();
        assert_eq!(s, "JournalEntry.j1.JournalEntryPage.p9");
        let parsed: TargetRef = s.parse().expect("parse TargetRef");
        assert_eq!(parsed, r);
    }

    #[test]
    fn target_ref_rejects_garbage() {
        assert!("JournalEntry.j1".parse::<TargetRef>().is_err());
        assert!("Actor.a.Item.b".parse::<TargetRef>().is_err());
    }

    #[test]
    fn journal_html_wraps_secret_only_when_present() {
        let page = ExtractedPage {
            title: "The Tavern".into(),
            visible_html: "<p>A smoky common room.</p>".into(),
            secret_html: String::new(),
        };
        assert_eq!(page.journal_html(), "<p>A smoky common room.</p>");

        let page = ExtractedPage {
            secret_html: "<p>A trapdoor under the bar.</p>".into(),
            ..page
        };
        let html = page.journal_html();
        assert!(html.starts_with("<p>A smoky common room.</p>"));
        assert!(html.contains(r#"<section class="secret" id="secret-"#));
        assert!(html.ends_with("</section>"));
    }

    #[test]
    fn crawl_request_uses_wire_field_names() {
        let req = CrawlRequest {
            source_tab_id: TabId(7),
            original_url: "https://5e.hexroll.app/sandbox/abc/hex/1".parse().unwrap(),
            title: "Hex 0101".into(),
            raw_body_html: "<p>hello</p>".into(),
            location_links: vec![],
            notes_object: ObjectId::new("tile-1"),
        };
        let json = serde_json::to_string(&req).expect("serialize");
        assert!(json.contains("sourceTabId"));
        assert!(json.contains("rawBodyHtml"));
        assert!(json.contains("locationLinks"));
    }
}
