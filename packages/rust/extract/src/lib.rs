//! Content extraction from source-app location pages.
//!
//! This crate provides:
//! - [`extract_page`] — split a page into visible and secret journal content
//! - [`extract_notes`] — the raw notes variant with absolutized links
//! - [`collect_location_links`] — ordered-unique location links in a fragment
//! - [`extract_merchant`] — merchant name, bio, and inventory table

mod content;
mod links;
mod merchant;

pub use content::{extract_notes, extract_page};
pub use links::collect_location_links;
pub use merchant::{Merchant, MerchantItem, extract_merchant};
