//! REST transport for the platform API.
//!
//! - `Endpoint` names every logical operation and maps it to method + path
//! - `ApiClient` attaches the bearer token, unwraps response envelopes, and
//!   applies the global unauthorized side effect
//! - `Transport` is the seam between the client and the HTTP stack

mod client;
mod endpoints;
mod error;
mod transport;
mod types;

pub use client::ApiClient;
pub use endpoints::{ConsultationAction, Endpoint, VisitAction};
pub use error::ApiError;
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
pub use types::{ApiAuthData, ApiLoginRequest};

#[cfg(test)]
pub(crate) use transport::mock;
#[cfg(test)]
pub(crate) use client::test_client;
