//! Single-GET transport shared by the crawler and the search client.
//!
//! [`PageFetcher`] is the seam between acquisition logic and the network:
//! [`HttpFetcher`] talks to the real sites through one pooled `reqwest`
//! client, and tests substitute scripted fakes. There are no retries at this
//! layer; each caller decides what a failed request means.

use crate::error::FetchError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Performs one GET and returns the body of a 2xx response.
pub trait PageFetcher {
    /// Fetch `url` with extra request `headers`, failing after `timeout`.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a connection-pooled `reqwest::Client` that
/// presents a desktop-browser identity.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9,en;q=0.8"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| FetchError::Client {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Build `base?k=v&…` with percent-encoded values.
pub fn with_query(base: &str, params: &[(&str, &str)]) -> Result<String, FetchError> {
    url::Url::parse_with_params(base, params)
        .map(|u| u.to_string())
        .map_err(|e| FetchError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`PageFetcher`] for unit tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers each URL from a script. Unscripted URLs fail with HTTP 404.
    /// Every request URL is recorded in call order.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        routes: Mutex<HashMap<String, Vec<Result<String, u16>>>>,
        prefix_failures: Vec<(String, u16)>,
        calls: Mutex<Vec<String>>,
        latency: Duration,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for `url` on every request.
        pub fn page(self, url: &str, body: &str) -> Self {
            self.routes
                .lock()
                .unwrap()
                .insert(url.to_string(), vec![Ok(body.to_string())]);
            self
        }

        /// Serve the given responses for `url` in order; the last one repeats.
        pub fn sequence(self, url: &str, responses: Vec<Result<&str, u16>>) -> Self {
            let responses = responses
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            self.routes.lock().unwrap().insert(url.to_string(), responses);
            self
        }

        /// Fail every URL starting with `prefix` with `status`.
        pub fn fail_prefix(mut self, prefix: &str, status: u16) -> Self {
            self.prefix_failures.push((prefix.to_string(), status));
            self
        }

        /// Hold every response for `latency` before answering.
        pub fn latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Most requests that were ever outstanding at once.
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_starting_with(&self, prefix: &str) -> usize {
            self.calls()
                .iter()
                .filter(|url| url.starts_with(prefix))
                .count()
        }

        fn respond(&self, url: &str) -> Result<String, FetchError> {
            if let Some((_, status)) = self
                .prefix_failures
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                });
            }

            let mut routes = self.routes.lock().unwrap();
            let response = match routes.get_mut(url) {
                Some(responses) if responses.len() > 1 => responses.remove(0),
                Some(responses) => responses[0].clone(),
                None => Err(404),
            };
            response.map_err(|status| FetchError::Status {
                url: url.to_string(),
                status,
            })
        }
    }

    impl PageFetcher for ScriptedFetcher {
        async fn get(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
            _timeout: Duration,
        ) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let response = self.respond(url);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedFetcher;
    use super::*;

    #[test]
    fn test_with_query_encodes_values() {
        let url = with_query("https://search.example.com/s", &[("query", "급등주 뉴스"), ("start", "11")])
            .unwrap();
        assert!(url.starts_with("https://search.example.com/s?query="));
        assert!(url.contains("start=11"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_with_query_rejects_relative_base() {
        assert!(matches!(
            with_query("not a url", &[]),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[tokio::test]
    async fn test_scripted_fetcher_sequence_and_calls() {
        let fetcher = ScriptedFetcher::new().sequence("https://x/", vec![Err(500), Ok("body")]);
        let timeout = Duration::from_secs(1);
        assert!(fetcher.get("https://x/", &[], timeout).await.is_err());
        assert_eq!(fetcher.get("https://x/", &[], timeout).await.unwrap(), "body");
        assert_eq!(fetcher.get("https://x/", &[], timeout).await.unwrap(), "body");
        assert!(matches!(
            fetcher.get("https://y/", &[], timeout).await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.calls_starting_with("https://x/"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_fetcher_latency_and_peak() {
        let fetcher = ScriptedFetcher::new()
            .page("https://x/", "body")
            .latency(Duration::from_millis(50));
        let timeout = Duration::from_secs(1);
        let t0 = tokio::time::Instant::now();

        let (a, b) = tokio::join!(
            fetcher.get("https://x/", &[], timeout),
            fetcher.get("https://x/", &[], timeout)
        );

        assert!(a.is_ok() && b.is_ok());
        // Both requests overlap, so the pair costs one latency, not two.
        assert!(t0.elapsed() >= Duration::from_millis(50) && t0.elapsed() < Duration::from_millis(100));
        assert_eq!(fetcher.peak_in_flight(), 2);
    }
}
