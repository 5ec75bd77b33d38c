// ABOUTME: HTTP fetch layer: spoofed browser headers, jittered courtesy delay, bounded retry.
// ABOUTME: Decodes response bytes via Content-Type charset or chardetng detection.

//! Resilient page fetching.
//!
//! Every fetch:
//! - sleeps once for a uniformly random courtesy delay (default 0.5–1.5 s);
//! - sends a fixed spoofed-browser header set, with `Referer` always equal to
//!   the configured site base regardless of the call chain;
//! - makes up to 3 attempts, treating timeouts, connection errors and non-2xx
//!   statuses as retryable, sleeping 1 s then 2 s between attempts;
//! - decodes the body using the Content-Type charset when present, else
//!   chardetng detection (the target sites routinely serve GBK).
//!
//! Redirects are followed by the underlying client. Errors are returned to
//! the [`Client`](crate::client::Client), which degrades them to an empty
//! page body; they never reach the public operations.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use reqwest::Method;
use tracing::{debug, warn};

use crate::error::ParseError;

/// Browser user agent presented by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; PJH110 Build/SP1A.210812.016) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.6533.103 Mobile Safari/537.36";

/// Total attempts per fetch, first try included.
const MAX_ATTEMPTS: u32 = 3;

/// Fixed spoofed-browser headers sent with every request. Accept-Encoding is
/// supplied by reqwest's gzip/brotli/deflate features; a hand-set value would
/// disable its response decompression.
const SPOOF_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Per-client fetch configuration, owned by the engine client.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Site base URL; sent as `Referer` on every request when non-empty.
    pub referer: String,
    pub user_agent: String,
    /// Extra headers layered on top of the spoofed set.
    pub headers: HashMap<String, String>,
    /// Courtesy-delay range applied once per fetch call.
    pub delay: (Duration, Duration),
}

/// Fetch a page and decode it to text.
pub(crate) async fn fetch_text(
    http: &reqwest::Client,
    url: &str,
    method: Method,
    form: Option<&[(String, String)]>,
    cfg: &FetchConfig,
) -> Result<String, ParseError> {
    if url.is_empty() {
        return Err(ParseError::invalid_url(url, "Fetch", None));
    }

    courtesy_delay(cfg.delay).await;

    let mut last_err = ParseError::fetch(url, "Fetch", None);
    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            // 1 s after the first failure, 2 s after the second.
            tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
        }
        match attempt_once(http, url, method.clone(), form, cfg).await {
            Ok(text) => {
                debug!(url, attempt, "fetched page");
                return Ok(text);
            }
            Err(err) => {
                warn!(url, attempt, error = %err, "fetch attempt failed");
                last_err = err;
            }
        }
    }
    Err(last_err)
}

async fn attempt_once(
    http: &reqwest::Client,
    url: &str,
    method: Method,
    form: Option<&[(String, String)]>,
    cfg: &FetchConfig,
) -> Result<String, ParseError> {
    let mut request = http.request(method, url);
    for (name, value) in SPOOF_HEADERS {
        request = request.header(*name, *value);
    }
    request = request.header("User-Agent", &cfg.user_agent);
    if !cfg.referer.is_empty() {
        request = request.header("Referer", &cfg.referer);
    }
    for (name, value) in &cfg.headers {
        request = request.header(name, value);
    }
    if let Some(fields) = form {
        request = request.form(fields);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ParseError::timeout(url, "Fetch", Some(anyhow::anyhow!(e)))
        } else {
            ParseError::fetch(url, "Fetch", Some(anyhow::anyhow!(e)))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ParseError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        ParseError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    Ok(decode_body(&body, content_type.as_deref()))
}

/// Sleep a uniformly random duration drawn from the configured range.
async fn courtesy_delay((min, max): (Duration, Duration)) {
    if max.is_zero() {
        return;
    }
    let span = max.saturating_sub(min);
    let wait = if span.is_zero() {
        min
    } else {
        min + span.mul_f64(rand::thread_rng().gen::<f64>())
    };
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }
}

/// Decode body bytes using the Content-Type charset, else chardetng detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset parameter from a Content-Type header value.
fn extract_charset(content_type: &str) -> Option<String> {
    for part in content_type.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            return Some(charset.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(referer: &str) -> FetchConfig {
        FetchConfig {
            referer: referer.to_string(),
            user_agent: "test-agent".to_string(),
            headers: HashMap::new(),
            delay: (Duration::ZERO, Duration::ZERO),
        }
    }

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn fetch_ok_returns_decoded_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html>ok</html>");
        });

        let text = fetch_text(
            &test_client(),
            &server.url("/page"),
            reqwest::Method::GET,
            None,
            &test_config(""),
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(text, "<html>ok</html>");
    }

    #[tokio::test]
    async fn every_request_carries_site_base_referer_and_spoof_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/deep/page")
                .header("Referer", "http://base.test")
                .header("User-Agent", "test-agent")
                .header("Upgrade-Insecure-Requests", "1");
            then.status(200).body("ok");
        });

        let text = fetch_text(
            &test_client(),
            &server.url("/deep/page"),
            reqwest::Method::GET,
            None,
            &test_config("http://base.test"),
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn gbk_body_is_decoded_via_charset_header() {
        // "你好" in GBK.
        let gbk: &[u8] = &[0xC4, 0xE3, 0xBA, 0xC3];
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gbk");
            then.status(200)
                .header("content-type", "text/html; charset=gbk")
                .body(gbk);
        });

        let text = fetch_text(
            &test_client(),
            &server.url("/gbk"),
            reqwest::Method::GET,
            None,
            &test_config(""),
        )
        .await
        .unwrap();

        assert_eq!(text, "你好");
    }

    #[tokio::test]
    async fn non_2xx_exhausts_exactly_three_attempts() {
        let server = MockServer::start();
        let always_down = server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(500);
        });

        let err = fetch_text(
            &test_client(),
            &server.url("/down"),
            reqwest::Method::GET,
            None,
            &test_config(""),
        )
        .await
        .unwrap_err();

        always_down.assert_hits(3);
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn post_sends_url_encoded_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("searchkey=abc");
            then.status(200).body("results");
        });

        let form = vec![("searchkey".to_string(), "abc".to_string())];
        let text = fetch_text(
            &test_client(),
            &server.url("/search"),
            reqwest::Method::POST,
            Some(&form),
            &test_config(""),
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(text, "results");
    }

    #[tokio::test]
    async fn empty_url_is_rejected_without_any_request() {
        let err = fetch_text(&test_client(), "", reqwest::Method::GET, None, &test_config(""))
            .await
            .unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn charset_extraction_handles_quotes_and_absence() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"gbk\""),
            Some("gbk".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn decode_body_defaults_to_detection() {
        assert_eq!(decode_body(b"hello", None), "hello");
    }
}
