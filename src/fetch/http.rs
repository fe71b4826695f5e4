// src/fetch/http.rs
// =============================================================================
// The HTTP side of the harvester: one reqwest client, one politeness delay.
//
// Every request made during a run goes through `HttpFetcher::fetch`, which
// - sleeps for the configured delay first (including before the very first
//   request), to bound how hard we hit the origin
// - never follows redirects itself: a 3xx comes back as
//   `HarvestError::Redirect` with the Location resolved against the request
//   URL, so the caller can put the target through its own origin and
//   visited checks
// - treats any other non-2xx status as an error
// - returns the declared Content-Type alongside the body bytes
//
// Failures come back as `HarvestError` values; the callers decide what to
// skip. Nothing in here aborts a run.
// =============================================================================

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};

/// A successful response
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// The URL that answered; relative links resolve against this
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> anyhow::Result<Self> {
        // Reused for every request (connection pooling); cheap to clone.
        // Redirects are surfaced, not followed: a hop could leave the origin
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            delay: config.delay,
        })
    }

    /// Waits out the politeness delay, then GETs the URL
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HarvestError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| url.join(v.trim()).ok());

            if let Some(mut location) = location {
                location.set_fragment(None);
                return Err(HarvestError::Redirect {
                    url: url.to_string(),
                    location,
                });
            }
        }

        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| HarvestError::from_reqwest(url.as_str(), e))?
            .to_vec();

        debug!(
            url = %url,
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or("-"),
            bytes = body.len(),
            "fetched"
        );

        Ok(FetchedResource {
            url: url.clone(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_with_delay(server: &MockServer, delay_ms: &str) -> HttpFetcher {
        let cli = Cli::parse_from(["site-harvester", server.uri().as_str(), "--delay-ms", delay_ms]);
        let config = HarvestConfig::from_cli(&cli).unwrap();
        HttpFetcher::new(&config).unwrap()
    }

    fn fetcher_for(server: &MockServer) -> HttpFetcher {
        fetcher_with_delay(server, "0")
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let url = Url::parse(&format!("{}/report", server.uri())).unwrap();
        let fetched = fetcher.fetch(&url).await.unwrap();

        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(fetched.body, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, HarvestError::HttpStatus { status: 410, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Grab a free port, then release it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let uri = format!("http://127.0.0.1:{}", port);
        let cli = Cli::parse_from(["site-harvester", uri.as_str(), "--delay-ms", "0"]);
        let fetcher = HttpFetcher::new(&HarvestConfig::from_cli(&cli).unwrap()).unwrap();

        let url = Url::parse(&format!("{}/", uri)).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, HarvestError::Network { .. } | HarvestError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_redirect_is_reported_not_followed() {
        let server = MockServer::start().await;
        let elsewhere = format!("http://localhost:{}/secret.bin", server.address().port());
        Mock::given(method("GET"))
            .and(path("/go"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", elsewhere.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/secret.bin"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let url = Url::parse(&format!("{}/go", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        match err {
            HarvestError::Redirect { location, .. } => assert_eq!(location.as_str(), elsewhere),
            other => panic!("expected a redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_relative_redirect_resolves_against_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "new.pdf#page=2"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let url = Url::parse(&format!("{}/docs/old", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        match err {
            HarvestError::Redirect { location, .. } => {
                assert_eq!(location.as_str(), format!("{}/docs/new.pdf", server.uri()))
            }
            other => panic!("expected a redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let url = Url::parse(&format!("{}/moved", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, HarvestError::HttpStatus { status: 302, .. }));
    }

    #[tokio::test]
    async fn test_delay_applies_before_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"ok".to_vec(), "text/plain"))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = fetcher_with_delay(&server, "400");
        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let started = std::time::Instant::now();

        // Nothing reaches the server while the first delay is still running
        let first = tokio::spawn({
            let fetcher = fetcher.clone();
            let url = url.clone();
            async move { fetcher.fetch(&url).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server.received_requests().await.unwrap().is_empty());

        first.await.unwrap().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(400));

        fetcher.fetch(&url).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(800));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
