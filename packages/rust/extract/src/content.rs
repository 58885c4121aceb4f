//! Page content extraction and cleanup.
//!
//! The source app renders a location page into one of two alternative
//! content blocks inside a single container; whichever block is non-empty
//! after cleanup is the "active" one. Journal extraction splits the active
//! block at the first meaningful paragraph or heading; everything after the
//! split is GM-only ("secret") content. The notes variant keeps the block
//! unsplit and absolutizes relative location links instead.
//!
//! `scraper`'s DOM is read-only, so cleanup (dropping injected attributes,
//! visibility classes, and empty paragraphs) happens while re-serializing
//! the tree rather than by mutating it.

use std::borrow::Cow;

use scraper::{ElementRef, Html, Node, Selector};

use hexbridge_shared::{DEFAULT_PAGE_TITLE, ExtractedPage, NotesExtract, SourceConfig};

/// Element holding the page title.
const TITLE_SELECTOR: &str = "#editable-title";
/// Container wrapping both alternative content blocks.
const CONTAINER_SELECTOR: &str = "#entity-container";
/// The two alternative content blocks, in preference order.
const CONTENT_BLOCK_IDS: [&str; 2] = ["entity1", "entity2"];
/// Inline editor scaffolding, never part of the content.
const EDITOR_PLACEHOLDER_ID: &str = "entity-editor-placeholder";
/// Attribute injected by third-party browser extensions.
const INJECTED_ATTR: &str = "bis_skin_checked";
/// Classes that only control on-screen visibility.
const VISIBILITY_CLASSES: [&str; 2] = ["hidden", "view_visible"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Extract a location page into journal-ready (title, visible, secret) parts.
///
/// Missing title element yields the default placeholder title; a missing or
/// empty content container yields empty bodies (the caller decides whether
/// that counts as a failure).
pub fn extract_page(html: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);
    let title = page_title(&doc);
    let opts = CleanupOptions {
        absolutize_origin: None,
    };

    let Some(active) = active_content_block(&doc, &opts) else {
        tracing::debug!("no active content block found");
        return ExtractedPage {
            title,
            visible_html: String::new(),
            secret_html: String::new(),
        };
    };

    let (visible_html, secret_html) = split_visible_secret(active, &opts);
    ExtractedPage {
        title,
        visible_html,
        secret_html,
    }
}

/// Extract the notes variant: the active block's cleaned inner HTML,
/// unsplit, with relative location links rewritten absolute.
pub fn extract_notes(html: &str, config: &SourceConfig) -> NotesExtract {
    let doc = Html::parse_document(html);
    let title = page_title(&doc);
    let opts = CleanupOptions {
        absolutize_origin: Some(&config.origin),
    };

    let body_html = match active_content_block(&doc, &opts) {
        Some(active) => clean_inner_html(active, &opts),
        None => String::new(),
    };

    NotesExtract { title, body_html }
}

/// Text of the title element, or the default placeholder when absent.
fn page_title(doc: &Html) -> String {
    let sel = Selector::parse(TITLE_SELECTOR).unwrap();
    match doc.select(&sel).next() {
        Some(el) => el.text().collect::<String>().trim().to_string(),
        None => DEFAULT_PAGE_TITLE.to_string(),
    }
}

/// The first content block that is non-empty after cleanup.
///
/// Visibility classes and styles are discarded before this check, so a
/// block hidden only by styling still qualifies.
fn active_content_block<'a>(doc: &'a Html, opts: &CleanupOptions<'_>) -> Option<ElementRef<'a>> {
    let container_sel = Selector::parse(CONTAINER_SELECTOR).unwrap();
    let container = doc.select(&container_sel).next()?;

    for id in CONTENT_BLOCK_IDS {
        let sel = Selector::parse(&format!("#{id}")).unwrap();
        if let Some(block) = container.select(&sel).next() {
            if !clean_inner_html(block, opts).trim().is_empty() {
                return Some(block);
            }
        }
    }
    None
}

/// Split the active block's direct children at the first meaningful
/// paragraph or heading.
fn split_visible_secret(block: ElementRef<'_>, opts: &CleanupOptions<'_>) -> (String, String) {
    let mut visible = String::new();
    let mut secret = String::new();
    let mut split_found = false;

    for child in block.child_elements() {
        let rendered = clean_outer_html(child, opts);
        if rendered.is_empty() {
            // Dropped by cleanup (placeholder, empty paragraph).
            continue;
        }

        if split_found {
            secret.push_str(&rendered);
        } else if is_split_point(child) {
            visible.push_str(&rendered);
            split_found = true;
        } else {
            // Stray elements before the split point stay visible.
            visible.push_str(&rendered);
        }
    }

    if visible.is_empty() && secret.is_empty() {
        // No element children survived cleanup. Bare direct text (a block
        // holding only text, or text next to dropped elements) gets
        // wrapped in one paragraph.
        let text: String = block
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(&**text),
                _ => None,
            })
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            return (format!("<p>{}</p>", escape_text(text)), String::new());
        }
    }

    (visible, secret)
}

/// A paragraph or heading with non-empty trimmed text.
fn is_split_point(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    let qualifies = matches!(name, "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6");
    qualifies && !el.text().collect::<String>().trim().is_empty()
}

// ---------------------------------------------------------------------------
// Cleanup-aware serialization
// ---------------------------------------------------------------------------

/// Options threaded through serialization.
struct CleanupOptions<'a> {
    /// Origin to absolutize relative `sandbox/` hrefs against, if any.
    absolutize_origin: Option<&'a str>,
}

/// Serialize an element's children (text and elements), applying cleanup.
fn clean_inner_html(el: ElementRef<'_>, opts: &CleanupOptions<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&clean_outer_html(child_el, opts));
                }
            }
            _ => {}
        }
    }
    out
}

/// Serialize one element, applying cleanup. Dropped elements yield "".
fn clean_outer_html(el: ElementRef<'_>, opts: &CleanupOptions<'_>) -> String {
    if should_drop(el) {
        return String::new();
    }

    let name = el.value().name();
    let is_content_block = el
        .value()
        .id()
        .is_some_and(|id| CONTENT_BLOCK_IDS.contains(&id));

    let mut out = String::new();
    out.push('<');
    out.push_str(name);

    for (attr, value) in el.value().attrs() {
        if attr == INJECTED_ATTR {
            continue;
        }
        if is_content_block && attr == "style" {
            continue;
        }
        if is_content_block && attr == "class" {
            let kept: Vec<&str> = value
                .split_whitespace()
                .filter(|c| !VISIBILITY_CLASSES.contains(c))
                .collect();
            if kept.is_empty() {
                continue;
            }
            out.push_str(&format!(r#" class="{}""#, escape_attr(&kept.join(" "))));
            continue;
        }

        let mut value = Cow::Borrowed(value);
        if name == "a" && attr == "href" {
            if let Some(origin) = opts.absolutize_origin {
                if let Some(abs) = absolutize_href(&value, origin) {
                    value = Cow::Owned(abs);
                }
            }
        }
        out.push_str(&format!(r#" {attr}="{}""#, escape_attr(&value)));
    }

    out.push('>');
    if VOID_ELEMENTS.contains(&name) {
        return out;
    }

    out.push_str(&clean_inner_html(el, opts));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out
}

/// Elements removed entirely by cleanup: the editor placeholder and
/// genuinely empty paragraphs (no children, no text beyond `&nbsp;`).
fn should_drop(el: ElementRef<'_>) -> bool {
    if el.value().id() == Some(EDITOR_PLACEHOLDER_ID) {
        return true;
    }
    if el.value().name() == "p" && el.child_elements().next().is_none() {
        let text = el.text().collect::<String>();
        let trimmed = text.trim();
        return trimmed.is_empty() || trimmed == "\u{a0}";
    }
    false
}

/// Make a relative `sandbox/` href absolute against the source origin.
fn absolutize_href(href: &str, origin: &str) -> Option<String> {
    if let Some(rest) = href.strip_prefix("/sandbox/") {
        return Some(format!("{origin}/sandbox/{rest}"));
    }
    if href.starts_with("sandbox/") {
        return Some(format!("{origin}/{href}"));
    }
    None
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
