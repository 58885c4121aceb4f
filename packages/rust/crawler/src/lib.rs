//! Crawl orchestration for hexbridge.
//!
//! Walks the location links of an origin page, creates a journal page in
//! the target app for each, and backfills the origin's notes annotation
//! with stable `@UUID` references. Tab navigation sits behind the
//! [`TabDriver`] trait; [`HttpTabDriver`] drives the workflow over plain
//! HTTP when no browser is involved.

pub mod backfill;
pub mod driver;
pub mod navigator;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testutil;

pub use backfill::{ReferenceMap, tag_references};
pub use driver::{HttpTabDriver, LoadStatus, TabDriver, TabEvent};
pub use navigator::Navigator;
pub use orchestrator::{CrawlEvent, Orchestrator};
