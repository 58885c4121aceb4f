//! The crawl-and-backfill workflow.
//!
//! Given a [`CrawlRequest`], the orchestrator writes the origin page's
//! notes, walks every linked location sequentially, creates a journal
//! page for each, then rewrites the notes with `@UUID` reference tags
//! and returns the source tab to where it started.

use tracing::{info, warn};

use hexbridge_extract::extract_page;
use hexbridge_shared::{AppConfig, CrawlReport, CrawlRequest, HexbridgeError, Result, TargetRef};
use hexbridge_vtt::{JournalWriter, VttRuntime};

use crate::backfill::{ReferenceMap, tag_references};
use crate::driver::TabDriver;
use crate::navigator::Navigator;

/// Per-item progress notification during a crawl.
#[derive(Debug)]
pub enum CrawlEvent<'a> {
    Processed {
        index: usize,
        total: usize,
        url: &'a url::Url,
    },
    Failed {
        index: usize,
        total: usize,
        url: &'a url::Url,
        reason: String,
    },
}

/// Runs the crawl-and-backfill workflow.
pub struct Orchestrator<'a, D: TabDriver, R: VttRuntime> {
    driver: &'a D,
    writer: &'a JournalWriter<R>,
    config: &'a AppConfig,
}

/// Counters and references accumulated while walking the link list.
#[derive(Default)]
struct CrawlSession {
    processed: usize,
    failed: usize,
    references: ReferenceMap,
}

impl<'a, D: TabDriver, R: VttRuntime> Orchestrator<'a, D, R> {
    pub fn new(driver: &'a D, writer: &'a JournalWriter<R>, config: &'a AppConfig) -> Self {
        Self {
            driver,
            writer,
            config,
        }
    }

    /// Execute one crawl.
    ///
    /// The notes are written twice: once up front so the annotation exists
    /// even if the crawl dies midway, and once at the end with reference
    /// tags for every successfully created page. A failed location never
    /// aborts the run; it is counted and the loop moves on.
    pub async fn run(
        &self,
        request: &CrawlRequest,
        mut progress: impl FnMut(CrawlEvent<'_>),
    ) -> Result<CrawlReport> {
        info!(
            url = %request.original_url,
            links = request.location_links.len(),
            object = %request.notes_object,
            "starting crawl"
        );

        // Initial notes write, best effort. The backfilled rewrite at the
        // end is the one that matters.
        if let Err(e) = self
            .writer
            .write_notes(&request.notes_object, &request.title, &request.raw_body_html)
            .await
        {
            warn!(error = %e, "initial notes write failed, continuing");
        }

        if request.location_links.is_empty() {
            return Ok(CrawlReport {
                processed: 0,
                failed: 0,
                message: "Notes written. No linked locations found to process.".into(),
            });
        }

        let mut session = CrawlSession::default();
        let total = request.location_links.len();

        for (index, link) in request.location_links.iter().enumerate() {
            match self.process_link(request, link).await {
                Ok(target) => {
                    session.processed += 1;
                    session.references.insert(link.to_string(), target);
                    info!(index = index + 1, total, url = %link, "location processed");
                    progress(CrawlEvent::Processed {
                        index: index + 1,
                        total,
                        url: link,
                    });
                }
                Err(e) => {
                    session.failed += 1;
                    warn!(index = index + 1, total, url = %link, error = %e, "location failed");
                    progress(CrawlEvent::Failed {
                        index: index + 1,
                        total,
                        url: link,
                        reason: e.to_string(),
                    });
                }
            }
            if index + 1 < total {
                tokio::time::sleep(self.config.delays.between_links()).await;
            }
        }

        let tagged = tag_references(&request.raw_body_html, &session.references);
        if let Err(e) = self
            .writer
            .write_notes(&request.notes_object, &request.title, &tagged)
            .await
        {
            warn!(error = %e, "final notes write failed");
        }

        tokio::time::sleep(self.config.delays.before_return()).await;
        let navigator = Navigator::new(self.driver, self.config.delays.navigation_timeout());
        if let Err(e) = navigator
            .goto(request.source_tab_id, &request.original_url)
            .await
        {
            warn!(url = %request.original_url, error = %e, "could not return to origin page");
        }

        Ok(CrawlReport {
            processed: session.processed,
            failed: session.failed,
            message: format!(
                "Notes updated. Processed {} linked locations ({} failed). Returned to original page.",
                session.processed, session.failed
            ),
        })
    }

    /// Navigate to one linked location, extract it, and create its journal
    /// page. Returns the reference that will tag the anchor in the notes.
    async fn process_link(&self, request: &CrawlRequest, link: &url::Url) -> Result<TargetRef> {
        let navigator = Navigator::new(self.driver, self.config.delays.navigation_timeout());
        navigator.goto(request.source_tab_id, link).await?;

        // Let the page's client-side rendering settle before extraction.
        tokio::time::sleep(self.config.delays.settle()).await;

        let html = self.driver.content_html(request.source_tab_id).await?;
        let page = extract_page(&html);
        if !page.is_usable() {
            return Err(HexbridgeError::parse(format!(
                "no usable content at {link}"
            )));
        }

        self.writer
            .create_entry(&page.title, &page.journal_html())
            .await
    }
}
