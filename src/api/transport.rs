use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use super::error::ApiError;

/// A fully built HTTP request, ready to send.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: Method,
  pub url: Url,
  pub headers: HeaderMap,
  pub body: Option<Vec<u8>>,
}

impl ApiRequest {
  /// Header value as a string, if present and valid UTF-8.
  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(name).and_then(|v| v.to_str().ok())
  }
}

/// Status and raw body of a response.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

/// Sends one request and resolves exactly once. No retries.
pub trait Transport: Send + Sync {
  fn send(&self, request: ApiRequest) -> BoxFuture<'static, Result<RawResponse, ApiError>>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("agrilink/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  fn send(&self, request: ApiRequest) -> BoxFuture<'static, Result<RawResponse, ApiError>> {
    let client = self.client.clone();

    async move {
      let mut builder = client
        .request(request.method, request.url)
        .headers(request.headers);
      if let Some(body) = request.body {
        builder = builder.body(body);
      }

      let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

      let status = response.status().as_u16();
      let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

      Ok(RawResponse {
        status,
        body: body.to_vec(),
      })
    }
    .boxed()
  }
}
