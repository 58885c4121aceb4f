//! Page navigation with a hard load timeout.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use url::Url;

use hexbridge_shared::{HexbridgeError, Result, TabId};

use crate::driver::{LoadStatus, TabDriver};

/// Navigates a source tab and waits for the load-complete report.
///
/// The orchestrator issues at most one navigation per tab at a time, so
/// the navigator never has to disambiguate overlapping requests.
pub struct Navigator<'a, D: TabDriver> {
    driver: &'a D,
    timeout: Duration,
}

impl<'a, D: TabDriver> Navigator<'a, D> {
    pub fn new(driver: &'a D, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    /// Navigate `tab` to `url` and wait until the tab reports the exact
    /// target URL fully loaded.
    ///
    /// Rejects with [`HexbridgeError::NavigationTimeout`] when the bound
    /// elapses. The event subscription is dropped on both paths, so a
    /// timed-out navigation leaves nothing listening behind.
    pub async fn goto(&self, tab: TabId, url: &Url) -> Result<()> {
        // Subscribe before navigating so the completion event cannot be
        // missed on a fast load.
        let mut events = self.driver.subscribe();

        debug!(%tab, %url, "navigating tab");
        self.driver.begin_navigation(tab, url).await?;

        let wait = async {
            loop {
                match events.recv().await {
                    Ok(ev)
                        if ev.tab == tab
                            && ev.status == LoadStatus::Complete
                            && ev.url == *url =>
                    {
                        return Ok(());
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "lagged behind tab event stream");
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        return Err(HexbridgeError::Network("tab event stream closed".into()));
                    }
                }
            }
        };

        match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(HexbridgeError::NavigationTimeout {
                url: url.to_string(),
            }),
        }
    }
}
