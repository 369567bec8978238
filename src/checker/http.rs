// src/checker/http.rs
// =============================================================================
// This module checks a URL by making exactly one HTTP GET request.
//
// Key functionality:
// - Sends the configured User-Agent on every request
// - Reports whatever status code comes back (200, 404, 503, ...)
// - Splits failures into "could not build the request" and "no response"
// - No retries
//
// Client defaults are set explicitly instead of inherited from reqwest:
// - a per-request timeout (from the config, 10 seconds by default)
// - up to 10 redirects are followed, so a redirect that lands on a 200
//   reports 200
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{redirect, Client, ClientBuilder};
use url::Url;

use super::{CheckError, Checker, TransportKind};

/// How many redirects a single check may follow.
pub const MAX_REDIRECTS: usize = 10;

// A checker backed by a shared reqwest client.
//
// The client is reused for all requests (connection pooling), and cloning
// the checker is cheap.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: Client,
    user_agent: HeaderValue,
}

impl HttpChecker {
    // Builds the HTTP client.
    //
    // Fails if the user agent is not a valid header value (for example if it
    // contains a newline) or if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        Self::from_builder(Client::builder(), user_agent, timeout)
    }

    fn from_builder(builder: ClientBuilder, user_agent: &str, timeout: Duration) -> Result<Self> {
        let user_agent = HeaderValue::from_str(user_agent)
            .with_context(|| format!("invalid user agent {:?}", user_agent))?;

        let client = builder
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, user_agent })
    }

    async fn get_status(&self, url: &str) -> Result<u16, CheckError> {
        let parsed = parse_target(url)?;

        let request = self
            .client
            .get(parsed)
            .header(USER_AGENT, self.user_agent.clone())
            .build()
            .map_err(|e| CheckError::RequestConstruction {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| CheckError::Transport {
                url: url.to_string(),
                kind: categorize_error(&e),
                source: Box::new(e),
            })?;

        // The body is never read; only the status matters
        Ok(response.status().as_u16())
    }
}

impl Checker for HttpChecker {
    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16, CheckError>> {
        self.get_status(url).boxed()
    }
}

// Parses and validates the URL before any request is built.
// Only absolute http/https URLs can be checked.
fn parse_target(url: &str) -> Result<Url, CheckError> {
    let parsed = Url::parse(url).map_err(|e| CheckError::RequestConstruction {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CheckError::RequestConstruction {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn categorize_error(error: &reqwest::Error) -> TransportKind {
    if error.is_timeout() {
        TransportKind::Timeout
    } else if error.is_redirect() {
        TransportKind::TooManyRedirects
    } else if error.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const TEST_AGENT: &str = "beagle-test/1.0";

    // A tiny HTTP server: answers each accepted connection with the next
    // canned response and reports the raw request it received.
    async fn spawn_stub(
        make_responses: impl FnOnce(&str) -> Vec<String>,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let responses = make_responses(&base);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let _ = tx.send(String::from_utf8_lossy(&buf).to_string());
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (base, rx)
    }

    fn response(status: &str, extra_headers: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
            status, extra_headers
        )
    }

    // The stub lives on localhost, so keep any proxy settings out of the way
    fn checker_with_timeout(timeout: Duration) -> HttpChecker {
        HttpChecker::from_builder(Client::builder().no_proxy(), TEST_AGENT, timeout).unwrap()
    }

    fn checker() -> HttpChecker {
        checker_with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_reports_200_and_sends_user_agent() {
        let (base, mut requests) = spawn_stub(|_| vec![response("200 OK", "")]).await;

        let status = checker().check(&format!("{}/bob", base)).await.unwrap();
        assert_eq!(status, 200);

        let request = requests.recv().await.unwrap().to_lowercase();
        assert!(request.starts_with("get /bob "));
        assert!(request.contains(&format!("user-agent: {}", TEST_AGENT)));
    }

    #[tokio::test]
    async fn test_reports_non_200_without_error() {
        let (base, _requests) = spawn_stub(|_| vec![response("404 Not Found", "")]).await;

        let status = checker().check(&format!("{}/bob", base)).await.unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_follows_redirect_to_final_status() {
        let (base, mut requests) = spawn_stub(|base| {
            let location = format!("Location: {}/final\r\n", base);
            vec![response("302 Found", &location), response("200 OK", "")]
        })
        .await;

        let status = checker().check(&format!("{}/start", base)).await.unwrap();
        assert_eq!(status, 200);

        let _first = requests.recv().await.unwrap();
        let second = requests.recv().await.unwrap().to_lowercase();
        assert!(second.starts_with("get /final "));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = checker()
            .check(&format!("http://{}/bob", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let checker = checker_with_timeout(Duration::from_millis(200));
        let err = checker.check(&format!("{}/bob", base)).await.unwrap_err();
        assert!(matches!(
            err,
            CheckError::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_url_is_request_construction_error() {
        let err = checker().check("not a url").await.unwrap_err();
        assert!(matches!(err, CheckError::RequestConstruction { .. }));

        let err = checker().check("ftp://example.com/bob").await.unwrap_err();
        match err {
            CheckError::RequestConstruction { reason, .. } => {
                assert!(reason.contains("ftp"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        assert!(HttpChecker::new("bad\nagent", Duration::from_secs(1)).is_err());
    }
}
