//! Out-of-band page fetching for the source app.
//!
//! The [`Fetcher`] retrieves location pages over plain HTTP, without
//! driving any browser tab. [`Fetcher::scrape_locations`] runs the
//! strictly sequential batch scrape: fetch each link, extract it, isolate
//! per-item failures, and report aggregate counts.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use hexbridge_extract::extract_page;
use hexbridge_shared::{AppConfig, ExtractedPage, HexbridgeError, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("hexbridge/", env!("CARGO_PKG_VERSION"));

/// One successfully scraped location page.
#[derive(Debug, Clone)]
pub struct ScrapedLocation {
    /// The page reference this content came from.
    pub url: Url,
    /// Extraction result, guaranteed usable.
    pub page: ExtractedPage,
}

/// Summary of a batch scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub locations: Vec<ScrapedLocation>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Per-item progress notification during a batch scrape.
#[derive(Debug)]
pub enum ScrapeEvent<'a> {
    Scraped {
        index: usize,
        total: usize,
        url: &'a Url,
        title: &'a str,
    },
    Failed {
        index: usize,
        total: usize,
        url: &'a Url,
        reason: String,
    },
}

/// HTTP fetcher for source-app pages.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the standard client settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HexbridgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch a single page's HTML. Non-2xx responses are errors.
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HexbridgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HexbridgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| HexbridgeError::Network(format!("{url}: body read failed: {e}")))
    }

    /// Scrape a list of location pages, strictly sequentially.
    ///
    /// Per-item failures (fetch error or unusable extraction) are counted
    /// and reported through `progress`; the remaining links are always
    /// attempted. A fixed politeness delay separates consecutive fetches.
    pub async fn scrape_locations(
        &self,
        links: &[Url],
        config: &AppConfig,
        mut progress: impl FnMut(ScrapeEvent<'_>),
    ) -> ScrapeOutcome {
        let total = links.len();
        let mut outcome = ScrapeOutcome::default();

        for (i, link) in links.iter().enumerate() {
            let index = i + 1;
            info!(%link, index, total, "scraping linked location");

            match self.fetch_page(link).await {
                Ok(html) => {
                    let page = extract_page(&html);
                    if page.is_usable() {
                        progress(ScrapeEvent::Scraped {
                            index,
                            total,
                            url: link,
                            title: &page.title,
                        });
                        outcome.succeeded += 1;
                        outcome.locations.push(ScrapedLocation {
                            url: link.clone(),
                            page,
                        });
                    } else {
                        warn!(%link, "no usable content in fetched page");
                        outcome.failed += 1;
                        progress(ScrapeEvent::Failed {
                            index,
                            total,
                            url: link,
                            reason: "no usable content".into(),
                        });
                    }
                }
                Err(e) => {
                    warn!(%link, error = %e, "fetch failed");
                    outcome.failed += 1;
                    progress(ScrapeEvent::Failed {
                        index,
                        total,
                        url: link,
                        reason: e.to_string(),
                    });
                }
            }

            if i + 1 < total {
                tokio::time::sleep(config.delays.fetch_politeness()).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location_page(title: &str, body: &str) -> String {
        format!(
            r#"<html><body>
              <span id="editable-title">{title}</span>
              <div id="entity-container"><div id="entity1">{body}</div></div>
            </body></html>"#
        )
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.delays.fetch_politeness_ms = 0;
        config
    }

    #[tokio::test]
    async fn fetch_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let url = Url::parse(&format!("{}/loc", server.uri())).unwrap();
        let body = fetcher.fetch_page(&url).await.unwrap();
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn fetch_page_errors_on_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        let err = fetcher.fetch_page(&url).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn scrape_counts_successes_and_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(location_page("Tavern", "<p>Smoky.</p>")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(location_page("Mill", "<p>Dusty.</p>")),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let links: Vec<Url> = ["/a", "/b", "/c"]
            .iter()
            .map(|p| Url::parse(&format!("{}{p}", server.uri())).unwrap())
            .collect();

        let mut events = Vec::new();
        let outcome = fetcher
            .scrape_locations(&links, &test_config(), |e| {
                events.push(matches!(e, ScrapeEvent::Scraped { .. }))
            })
            .await;

        // The failure in the middle never stops the remaining links.
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.locations.len(), 2);
        assert_eq!(outcome.locations[0].page.title, "Tavern");
        assert_eq!(outcome.locations[1].page.title, "Mill");
        assert_eq!(events, vec![true, false, true]);
    }

    #[tokio::test]
    async fn scrape_counts_unusable_content_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let links = vec![Url::parse(&format!("{}/empty", server.uri())).unwrap()];
        let outcome = fetcher
            .scrape_locations(&links, &test_config(), |_| {})
            .await;

        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failed, 1);
    }
}
