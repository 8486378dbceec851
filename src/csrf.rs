//! CSRF protection for requests to the FitLog server
//!
//! The token is read once from the `<meta name="csrf-token">` tag of a
//! server page. Every request goes through a `GuardedClient`, which attaches
//! the token as `X-CSRFToken` on POST/PUT/DELETE/PATCH and leaves other
//! methods untouched. Without a token the guard is inert.

use log::{debug, info, warn};
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder};
use std::sync::LazyLock;

pub const CSRF_HEADER: &str = "X-CSRFToken";

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)<meta\b[^>]*\bname\s*=\s*["']csrf-token["'][^>]*>"#)
    .expect("meta tag pattern is valid")
});

static CONTENT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("content pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsrfGuard {
  token: Option<String>,
}

impl CsrfGuard {
  /// Read the token from page markup. Logs a warning and returns an inactive
  /// guard when the page does not carry one.
  pub fn from_page(html: &str) -> Self {
    match extract_token(html) {
      Some(token) => {
        info!("CSRF protection initialized");
        Self { token: Some(token) }
      }
      None => {
        warn!("CSRF token not found in page meta tags; requests go out unprotected");
        Self::disabled()
      }
    }
  }

  pub fn with_token(token: impl Into<String>) -> Self {
    Self {
      token: Some(token.into()),
    }
  }

  pub fn disabled() -> Self {
    Self { token: None }
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn is_active(&self) -> bool {
    self.token.is_some()
  }

  /// Methods that change server state
  pub fn protects(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "DELETE" | "PATCH")
  }
}

fn extract_token(html: &str) -> Option<String> {
  let tag = META_TAG.find(html)?.as_str();
  let caps = CONTENT_ATTR.captures(tag)?;
  caps
    .get(1)
    .or_else(|| caps.get(2))
    .map(|m| m.as_str().trim().to_string())
    .filter(|token| !token.is_empty())
}

/// ---------------------------------------------------------------------------
/// Request Wrapper
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GuardedClient {
  http: Client,
  guard: CsrfGuard,
}

impl GuardedClient {
  pub fn new(http: Client, guard: CsrfGuard) -> Self {
    Self { http, guard }
  }

  pub fn guard(&self) -> &CsrfGuard {
    &self.guard
  }

  pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
    let attach = CsrfGuard::protects(&method);
    let builder = self.http.request(method.clone(), url);

    match self.guard.token() {
      Some(token) if attach => {
        debug!("CSRF token attached for {} {}", method, url);
        builder.header(CSRF_HEADER, token)
      }
      _ => builder,
    }
  }

  pub fn get(&self, url: &str) -> RequestBuilder {
    self.request(Method::GET, url)
  }

  pub fn post(&self, url: &str) -> RequestBuilder {
    self.request(Method::POST, url)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;

  const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
  <meta charset="utf-8">
  <meta name="csrf-token" content="abc123">
  <title>FitLog</title>
</head><body></body></html>"#;

  #[test]
  fn test_token_read_from_meta_tag() {
    let guard = CsrfGuard::from_page(PAGE);
    assert_eq!(guard.token(), Some("abc123"));
    assert!(guard.is_active());
  }

  #[test]
  fn test_token_attribute_order_and_quotes() {
    let html = "<meta content='tok-9' name='csrf-token'/>";
    assert_eq!(CsrfGuard::from_page(html).token(), Some("tok-9"));
  }

  #[test]
  fn test_missing_or_empty_token_disables_guard() {
    assert!(!CsrfGuard::from_page("<html><head></head></html>").is_active());
    assert!(!CsrfGuard::from_page(r#"<meta name="csrf-token" content="">"#).is_active());
  }

  #[test]
  fn test_protected_methods() {
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
      assert!(CsrfGuard::protects(&method), "{} should be protected", method);
    }
    for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
      assert!(!CsrfGuard::protects(&method), "{} should not be protected", method);
    }
  }

  #[tokio::test]
  async fn test_mutating_requests_carry_token() {
    let mut server = mockito::Server::new_async().await;
    let client = GuardedClient::new(Client::new(), CsrfGuard::with_token("abc123"));

    let mut mocks = Vec::new();
    for method in ["POST", "PUT", "DELETE", "PATCH"] {
      let mock = server
        .mock(method, "/api/resource")
        .match_header(CSRF_HEADER, "abc123")
        .with_status(200)
        .create_async()
        .await;
      mocks.push(mock);
    }

    let url = format!("{}/api/resource", server.url());
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
      let response = client.request(method, &url).send().await.unwrap();
      assert_eq!(response.status(), 200);
    }

    for mock in mocks {
      mock.assert_async().await;
    }
  }

  #[tokio::test]
  async fn test_get_request_has_no_token() {
    let mut server = mockito::Server::new_async().await;
    let client = GuardedClient::new(Client::new(), CsrfGuard::with_token("abc123"));

    let mock = server
      .mock("GET", "/api/resource")
      .match_header(CSRF_HEADER, Matcher::Missing)
      .with_status(200)
      .create_async()
      .await;

    let response = client
      .get(&format!("{}/api/resource", server.url()))
      .send()
      .await
      .unwrap();
    assert_eq!(response.status(), 200);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_disabled_guard_sends_no_header() {
    let mut server = mockito::Server::new_async().await;
    let client = GuardedClient::new(Client::new(), CsrfGuard::disabled());

    let mock = server
      .mock("POST", "/api/resource")
      .match_header(CSRF_HEADER, Matcher::Missing)
      .with_status(200)
      .create_async()
      .await;

    client
      .post(&format!("{}/api/resource", server.url()))
      .send()
      .await
      .unwrap();
    mock.assert_async().await;
  }
}
