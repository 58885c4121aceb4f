//! Shared test doubles for the crawler crate.

use std::collections::{HashMap, HashSet};

use tokio::sync::{Mutex, broadcast};
use url::Url;

use hexbridge_shared::{HexbridgeError, Result, TabId};

use crate::driver::{LoadStatus, TabDriver, TabEvent};

/// Driver that completes navigations from a canned url → html table.
/// URLs in `dead` never report completion.
pub(crate) struct ScriptedDriver {
    pages: HashMap<String, String>,
    dead: HashSet<String>,
    events: broadcast::Sender<TabEvent>,
    current: Mutex<HashMap<TabId, String>>,
}

impl ScriptedDriver {
    pub(crate) fn new(pages: HashMap<String, String>, dead: HashSet<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            pages,
            dead,
            events,
            current: Mutex::new(HashMap::new()),
        }
    }
}

impl TabDriver for ScriptedDriver {
    async fn begin_navigation(&self, tab: TabId, url: &Url) -> Result<()> {
        if self.dead.contains(url.as_str()) {
            return Ok(());
        }
        let html = self.pages.get(url.as_str()).cloned().unwrap_or_default();
        self.current.lock().await.insert(tab, html);
        let _ = self.events.send(TabEvent {
            tab,
            status: LoadStatus::Complete,
            url: url.clone(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }

    async fn content_html(&self, tab: TabId) -> Result<String> {
        self.current
            .lock()
            .await
            .get(&tab)
            .cloned()
            .ok_or_else(|| HexbridgeError::parse(format!("tab {tab} has no loaded page")))
    }
}
