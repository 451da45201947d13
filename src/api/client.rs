use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::endpoints::Endpoint;
use super::error::ApiError;
use super::transport::{ApiRequest, RawResponse, Transport};
use super::types::{error_message, unwrap_envelope};
use crate::router::{Route, Router};
use crate::session::AuthContext;

const SESSION_EXPIRED: &str = "Session expired, please sign in again";

/// Platform API client.
///
/// Every call resolves once. A 401 or 403 from any endpoint clears the
/// session and sends the router to the login view before the error is
/// returned.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
  base_url: String,
  auth: AuthContext,
  router: Router,
}

impl ApiClient {
  pub fn new(
    base_url: &str,
    transport: Arc<dyn Transport>,
    auth: AuthContext,
    router: Router,
  ) -> Result<Self> {
    let parsed =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API url {}: {}", base_url, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(eyre!("API url must be http or https: {}", base_url));
    }

    Ok(Self {
      transport,
      base_url: base_url.trim_end_matches('/').to_string(),
      auth,
      router,
    })
  }

  pub fn auth(&self) -> &AuthContext {
    &self.auth
  }

  pub fn router(&self) -> &Router {
    &self.router
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// GET and decode the payload.
  pub async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
    let value = self.call(endpoint, None).await?;
    decode(value)
  }

  /// GET a collection. Not-found and `null` payloads are an empty list.
  pub async fn get_list<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<Vec<T>, ApiError> {
    match self.call(endpoint, None).await {
      Ok(value) => decode::<Option<Vec<T>>>(value).map(Option::unwrap_or_default),
      Err(ApiError::NotFound) => Ok(Vec::new()),
      Err(e) => Err(e),
    }
  }

  /// Send a JSON body and decode the payload.
  pub async fn send<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let value = self.call(endpoint, Some(body)).await?;
    decode(value)
  }

  /// Send an optional JSON body and ignore the payload.
  pub async fn execute(&self, endpoint: Endpoint, body: Option<Value>) -> Result<(), ApiError> {
    self.call(endpoint, body).await.map(|_| ())
  }

  /// Issue one request and return the unwrapped payload.
  pub async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, ApiError> {
    let request = self.build_request(&endpoint, body)?;
    tracing::debug!(
      method = %request.method,
      url = %request.url,
      authenticated = request.headers.contains_key(AUTHORIZATION),
      "api request"
    );

    let response = self.transport.send(request).await.inspect_err(|e| {
      tracing::warn!(endpoint = %endpoint.description(), error = %e, "api transport failure");
    })?;

    self.handle_response(&endpoint, response)
  }

  fn build_request(&self, endpoint: &Endpoint, body: Option<Value>) -> Result<ApiRequest, ApiError> {
    let url = Url::parse(&format!("{}{}", self.base_url, endpoint.path()))
      .map_err(|e| ApiError::Network(format!("invalid request url: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if !endpoint.is_public() {
      if let Some(token) = self.auth.token() {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
          .map_err(|_| ApiError::Network("invalid token characters".to_string()))?;
        headers.insert(AUTHORIZATION, value);
      }
    }

    let body = match body {
      Some(value) => {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Some(serde_json::to_vec(&value).map_err(|e| ApiError::Decode(e.to_string()))?)
      }
      None => None,
    };

    Ok(ApiRequest {
      method: endpoint.method(),
      url,
      headers,
      body,
    })
  }

  fn handle_response(&self, endpoint: &Endpoint, response: RawResponse) -> Result<Value, ApiError> {
    let status = response.status;

    match status {
      200..=299 => unwrap_envelope(&response.body).inspect_err(|e| {
        tracing::warn!(endpoint = %endpoint.description(), error = %e, "malformed response");
      }),
      401 | 403 => {
        tracing::warn!(
          status,
          endpoint = %endpoint.description(),
          "unauthorized response, clearing session"
        );
        self.auth.clear();
        self.router.navigate(Route::Login);
        Err(ApiError::Unauthorized {
          status,
          message: error_message(&response.body).unwrap_or_else(|| SESSION_EXPIRED.to_string()),
        })
      }
      404 => Err(ApiError::NotFound),
      code => {
        let message = error_message(&response.body).unwrap_or_else(|| "request failed".to_string());
        tracing::warn!(status = code, endpoint = %endpoint.description(), %message, "api error");
        Err(ApiError::Status { code, message })
      }
    }
  }
}

/// Decode a payload into its schema type.
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| {
    tracing::warn!(error = %e, "response does not match schema");
    ApiError::Decode(e.to_string())
  })
}

#[cfg(test)]
pub(crate) fn test_client(
  transport: Arc<super::mock::MockTransport>,
  auth: AuthContext,
  router: Router,
) -> ApiClient {
  ApiClient::new("http://agri.test", transport, auth, router).unwrap()
}
