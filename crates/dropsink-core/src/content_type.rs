//! HTTP `Content-Type` probing for URL payloads.
//!
//! Consulted only when the URL's extension gives no answer, and never
//! during a dry run.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

/// Resolves a URL's content type over the network.
pub trait ContentTypeProbe: Send + Sync {
    /// Lowercased `Content-Type` value (parameters included), or `None`
    /// when the response carries no such header.
    fn content_type(&self, url: &str) -> Result<Option<String>>;
}

/// Probe backed by libcurl. Issues a HEAD request and follows redirects.
/// Runs on the current thread; call from `spawn_blocking` in async code.
pub struct HttpContentTypeProbe;

impl ContentTypeProbe for HttpContentTypeProbe {
    fn content_type(&self, url: &str) -> Result<Option<String>> {
        let mut headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.nobody(true)?; // HEAD request
        easy.follow_location(true)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        easy.timeout(Duration::from_secs(30))?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.perform().context("HEAD request failed")?;
        }

        let code = easy.response_code().context("no response code")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("HEAD {} returned HTTP {}", url, code);
        }

        Ok(content_type_from_headers(&headers))
    }
}

/// Picks the last `Content-Type` header so the post-redirect response wins.
fn content_type_from_headers(lines: &[String]) -> Option<String> {
    let mut found = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                let value = value.trim();
                if !value.is_empty() {
                    found = Some(value.to_ascii_lowercase());
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_content_type_header() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 12345".to_string(),
            "Content-Type: Video/MP4".to_string(),
        ];
        assert_eq!(
            content_type_from_headers(&lines).as_deref(),
            Some("video/mp4")
        );
    }

    #[test]
    fn last_header_wins_across_redirects() {
        let lines = [
            "HTTP/1.1 302 Found".to_string(),
            "Content-Type: text/html".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: image/png".to_string(),
        ];
        assert_eq!(
            content_type_from_headers(&lines).as_deref(),
            Some("image/png")
        );
    }

    #[test]
    fn missing_header_yields_none() {
        let lines = ["HTTP/1.1 200 OK".to_string(), "Server: x".to_string()];
        assert_eq!(content_type_from_headers(&lines), None);
    }

    #[test]
    fn parameters_are_kept() {
        let lines = ["Content-Type: text/plain; charset=UTF-8".to_string()];
        assert_eq!(
            content_type_from_headers(&lines).as_deref(),
            Some("text/plain; charset=utf-8")
        );
    }
}
