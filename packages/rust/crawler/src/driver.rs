//! Tab driving: the contract between the orchestrator and the source tab.
//!
//! A [`TabDriver`] fires navigations, reports lifecycle events on a
//! broadcast stream, and hands out the serialized DOM of a loaded page.
//! [`HttpTabDriver`] implements the contract over plain HTTP so the whole
//! workflow runs without a browser: "navigating" fetches the URL and
//! caches the body as the tab's DOM.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use url::Url;

use hexbridge_fetch::Fetcher;
use hexbridge_shared::{HexbridgeError, Result, TabId};

/// Navigation lifecycle states a tab reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Complete,
}

/// One tab lifecycle event.
#[derive(Debug, Clone)]
pub struct TabEvent {
    pub tab: TabId,
    pub status: LoadStatus,
    pub url: Url,
}

/// Drives source-app tabs.
///
/// Completion is reported on the event stream, never as the return value
/// of [`TabDriver::begin_navigation`]; waiting (with its timeout) is the
/// navigator's job.
#[allow(async_fn_in_trait)]
pub trait TabDriver: Send + Sync {
    /// Fire a navigation of `tab` to `url`.
    async fn begin_navigation(&self, tab: TabId, url: &Url) -> Result<()>;

    /// Subscribe to tab lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<TabEvent>;

    /// Serialized DOM of the tab's currently loaded page.
    async fn content_html(&self, tab: TabId) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HttpTabDriver
// ---------------------------------------------------------------------------

/// Per-tab navigation state: the current navigation generation and the
/// DOM of the last page that loaded for it.
#[derive(Debug, Default)]
struct TabState {
    generation: u64,
    dom: Option<String>,
}

/// Browser-free driver: each navigation fetches the URL over HTTP and the
/// response body becomes the tab's DOM.
///
/// A browser tab cancels the previous load when re-navigated; an HTTP
/// fetch cannot be cancelled the same way, so each navigation bumps the
/// tab's generation and a fetch that finishes after it has been
/// superseded is discarded instead of overwriting the newer page.
pub struct HttpTabDriver {
    fetcher: Arc<Fetcher>,
    tabs: Arc<Mutex<HashMap<TabId, TabState>>>,
    events: broadcast::Sender<TabEvent>,
}

impl HttpTabDriver {
    pub fn new(fetcher: Fetcher) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            fetcher: Arc::new(fetcher),
            tabs: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }
}

impl TabDriver for HttpTabDriver {
    async fn begin_navigation(&self, tab: TabId, url: &Url) -> Result<()> {
        let generation = {
            let mut tabs = self.tabs.lock().await;
            let state = tabs.entry(tab).or_default();
            state.generation += 1;
            state.generation
        };

        let _ = self.events.send(TabEvent {
            tab,
            status: LoadStatus::Loading,
            url: url.clone(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        let tabs = Arc::clone(&self.tabs);
        let events = self.events.clone();
        let url = url.clone();

        tokio::spawn(async move {
            match fetcher.fetch_page(&url).await {
                Ok(html) => {
                    let mut tabs = tabs.lock().await;
                    let Some(state) = tabs.get_mut(&tab) else {
                        return;
                    };
                    if state.generation != generation {
                        // A newer navigation superseded this fetch.
                        tracing::debug!(%url, "discarding superseded fetch");
                        return;
                    }
                    state.dom = Some(html);
                    let _ = events.send(TabEvent {
                        tab,
                        status: LoadStatus::Complete,
                        url,
                    });
                }
                Err(e) => {
                    // No Complete event: the navigator's timeout handles it.
                    tracing::warn!(%url, error = %e, "navigation fetch failed");
                }
            }
        });

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }

    async fn content_html(&self, tab: TabId) -> Result<String> {
        self.tabs
            .lock()
            .await
            .get(&tab)
            .and_then(|state| state.dom.clone())
            .ok_or_else(|| HexbridgeError::parse(format!("tab {tab} has no loaded page")))
    }
}
