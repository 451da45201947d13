//! Service façades: one per entity kind, each owning its cached resources.
//!
//! Services are constructed from an explicit `ServiceContext`; nothing looks
//! up the session or the API client globally.

mod admin;
mod auth;
mod consultant;
mod consultation;
mod farm_visit;
mod farmer;
mod feedback;
mod report;
mod resource;

pub use admin::AdminService;
pub use auth::AuthService;
pub use consultant::ConsultantService;
pub use consultation::ConsultationService;
pub use farm_visit::FarmVisitService;
pub use farmer::FarmerService;
pub use feedback::FeedbackService;
pub use report::ReportService;
pub use resource::{CachedResource, FetchPolicy, InFlight};

use serde::de::DeserializeOwned;

use crate::api::{ApiClient, ApiError, Endpoint};
use crate::domain::Role;
use crate::notify::Notifier;
use crate::router::Router;
use crate::session::AuthContext;

/// Handles every service is built from.
#[derive(Clone)]
pub struct ServiceContext {
  pub client: ApiClient,
  pub auth: AuthContext,
  pub notifier: Notifier,
  pub policy: FetchPolicy,
}

impl ServiceContext {
  /// Collection resource whose endpoint depends on the signed-in role and user.
  fn scoped_list<T>(
    &self,
    label: &'static str,
    make: fn(Role, i64) -> Endpoint,
    in_flight: &std::sync::Arc<InFlight<Vec<T>>>,
  ) -> CachedResource<Vec<T>>
  where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
  {
    let auth = self.auth.clone();
    self.list(
      label,
      move || {
        let session = auth.current().ok_or(ApiError::NotSignedIn)?;
        Ok(make(session.role, session.user_id))
      },
      in_flight,
    )
  }

  /// Collection resource; not-found and `null` payloads become an empty list.
  fn list<T, E>(
    &self,
    label: &'static str,
    endpoint: E,
    in_flight: &std::sync::Arc<InFlight<Vec<T>>>,
  ) -> CachedResource<Vec<T>>
  where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    E: Fn() -> Result<Endpoint, ApiError> + Send + Sync + 'static,
  {
    let client = self.client.clone();
    CachedResource::new(label, self.notifier.clone(), endpoint, move |endpoint| {
      let client = client.clone();
      async move { client.get_list::<T>(endpoint).await }
    })
    .with_policy(self.policy)
    .sharing_in_flight(std::sync::Arc::clone(in_flight))
    .reset_on_sign_out(&self.auth)
  }

  /// Single-entity resource keyed by the signed-in user id.
  fn own_entity<T>(&self, label: &'static str, make: fn(i64) -> Endpoint) -> CachedResource<T>
  where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
  {
    let auth = self.auth.clone();
    let client = self.client.clone();
    CachedResource::new(
      label,
      self.notifier.clone(),
      move || auth.user_id().map(make).ok_or(ApiError::NotSignedIn),
      move |endpoint| {
        let client = client.clone();
        async move { client.get::<T>(endpoint).await }
      },
    )
    .with_policy(self.policy)
    .reset_on_sign_out(&self.auth)
  }

  fn user_id(&self) -> Result<i64, ApiError> {
    self.auth.user_id().ok_or(ApiError::NotSignedIn)
  }
}

/// Every façade, wired to one context.
#[derive(Clone)]
pub struct Services {
  pub auth: AuthService,
  pub farmer: FarmerService,
  pub consultant: ConsultantService,
  pub consultations: ConsultationService,
  pub reports: ReportService,
  pub visits: FarmVisitService,
  pub feedback: FeedbackService,
  pub admin: AdminService,
  ctx: ServiceContext,
}

impl Services {
  pub fn new(ctx: ServiceContext, router: Router) -> Self {
    Self {
      auth: AuthService::new(&ctx, router),
      farmer: FarmerService::new(&ctx),
      consultant: ConsultantService::new(&ctx),
      consultations: ConsultationService::new(&ctx),
      reports: ReportService::new(&ctx),
      visits: FarmVisitService::new(&ctx),
      feedback: FeedbackService::new(&ctx),
      admin: AdminService::new(&ctx),
      ctx,
    }
  }

  pub fn context(&self) -> &ServiceContext {
    &self.ctx
  }

  /// Accept a consultation, then refresh farm visits.
  ///
  /// The two lists are fetched independently; there is no atomicity between
  /// them.
  pub async fn accept_consultation(&self, id: i64) -> bool {
    if !self.consultations.accept(id).await {
      return false;
    }
    self.visits.refresh();
    true
  }

  /// End the session. Every resource resets itself on sign-out.
  pub fn logout(&self) {
    self.auth.logout();
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use std::sync::Arc;

  use super::*;
  use crate::api::mock::MockTransport;
  use crate::router::Route;
  use crate::session::test_session;

  pub(crate) struct Harness {
    pub transport: Arc<MockTransport>,
    pub ctx: ServiceContext,
    pub router: Router,
  }

  pub(crate) fn harness(role: Option<Role>) -> Harness {
    let transport = MockTransport::new();
    let auth = match role {
      Some(role) => AuthContext::with_session(test_session(role)),
      None => AuthContext::new(),
    };
    let router = Router::new(Route::Consultations);
    let client = crate::api::test_client(Arc::clone(&transport), auth.clone(), router.clone());
    Harness {
      transport,
      ctx: ServiceContext {
        client,
        auth,
        notifier: Notifier::new(),
        policy: FetchPolicy::Duplicate,
      },
      router,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::harness;
  use super::*;
  use crate::router::Route;
  use serde_json::json;
  use std::time::Duration;

  #[tokio::test]
  async fn test_accept_consultation_refreshes_visits() {
    let h = harness(Some(Role::Consultant));
    h.transport
      .reply(200, json!({ "status": "OK", "data": null }))
      .reply(200, json!({ "status": "OK", "data": [] }))
      .reply(200, json!({ "status": "OK", "data": [] }));
    let services = Services::new(h.ctx.clone(), h.router.clone());

    assert!(services.accept_consultation(3).await);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let paths: Vec<String> = h
      .transport
      .requests()
      .iter()
      .map(|r| r.url.path().to_string())
      .collect();
    assert_eq!(
      paths,
      vec![
        "/api/v1/consultations/3/accept",
        "/api/v1/consultations/consultant/42",
        "/api/v1/farm-visits/consultant/42",
      ]
    );
    assert_eq!(services.visits.store().read(), Some(Vec::new()));
  }

  #[tokio::test]
  async fn test_failed_accept_skips_visit_refresh() {
    let h = harness(Some(Role::Consultant));
    h.transport.reply(409, json!({ "message": "already accepted" }));
    let services = Services::new(h.ctx.clone(), h.router.clone());

    assert!(!services.accept_consultation(3).await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.transport.request_count(), 1);
  }

  #[tokio::test]
  async fn test_unauthorized_from_any_service_signs_out_everywhere() {
    let h = harness(Some(Role::Farmer));
    h.transport
      .reply(200, json!([{ "id": 1, "consultationId": 2, "farmerId": 42, "consultantId": 7, "rating": 5 }]))
      .reply(401, json!({ "message": "expired" }));
    let services = Services::new(h.ctx.clone(), h.router.clone());

    assert!(services.feedback.fetch_now().await);
    assert!(services.feedback.store().is_loaded());

    // A different façade hits the 401
    assert!(!services.reports.fetch_now().await);

    assert!(!h.ctx.auth.is_authenticated());
    assert_eq!(h.router.current(), Route::Login);
    assert!(!services.feedback.store().is_loaded());
  }

  #[tokio::test]
  async fn test_response_from_previous_session_is_discarded() {
    let h = harness(Some(Role::Farmer));
    h.transport
      .reply_after(
        Duration::from_millis(60),
        200,
        json!([{ "id": 1, "consultationId": 2, "farmerId": 42, "consultantId": 7, "rating": 5 }]),
      )
      .reply(200, json!([]));
    let services = Services::new(h.ctx.clone(), h.router.clone());

    services.feedback.feedback();
    tokio::time::sleep(Duration::from_millis(10)).await;
    services.logout();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!services.feedback.store().is_loaded());

    h.ctx.auth.set(crate::session::Session {
      user_id: 99,
      ..crate::session::test_session(Role::Farmer)
    });
    let store = services.feedback.feedback();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(h.transport.request_count(), 2);
    assert_eq!(store.read(), Some(Vec::new()));
  }

  #[tokio::test]
  async fn test_logout_resets_stores_and_redirects() {
    let h = harness(Some(Role::Farmer));
    h.transport.reply(200, json!({ "id": 42, "fullName": "Amina" }));
    let services = Services::new(h.ctx.clone(), h.router.clone());
    services.farmer.fetch_profile().await;
    assert!(services.farmer.profile_store().is_loaded());

    services.logout();

    assert!(!services.farmer.profile_store().is_loaded());
    assert_eq!(h.router.current(), Route::Login);
  }
}
