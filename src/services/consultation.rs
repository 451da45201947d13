use serde_json::json;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ConsultationAction, Endpoint};
use crate::domain::{Consultation, ConsultationRequest};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// Consultations visible to the signed-in user and their state transitions.
#[derive(Clone)]
pub struct ConsultationService {
  client: ApiClient,
  list: CachedResource<Vec<Consultation>>,
}

impl ConsultationService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      list: ctx.scoped_list(
        "consultations",
        |role, user_id| Endpoint::Consultations { role, user_id },
        &InFlight::new(),
      ),
    }
  }

  pub fn consultations(&self) -> Store<Vec<Consultation>> {
    self.list.get_or_fetch()
  }

  pub fn store(&self) -> &Store<Vec<Consultation>> {
    self.list.store()
  }

  pub fn status(&self) -> Store<LoadState> {
    self.list.status()
  }

  pub fn refresh(&self) -> JoinHandle<()> {
    self.list.refresh()
  }

  pub async fn fetch_now(&self) -> bool {
    self.list.fetch_now().await
  }

  /// Ask a consultant for a consultation.
  pub async fn request(&self, request: &ConsultationRequest) -> Option<Consultation> {
    self
      .list
      .mutate_and_refresh(
        "request consultation",
        "Consultation requested",
        self
          .client
          .send::<_, Consultation>(Endpoint::CreateConsultation, request),
      )
      .await
  }

  pub async fn accept(&self, id: i64) -> bool {
    self.transition(id, ConsultationAction::Accept, None).await
  }

  pub async fn reject(&self, id: i64, reason: &str) -> bool {
    let body = json!({ "reason": reason.trim() });
    self
      .transition(id, ConsultationAction::Reject, Some(body))
      .await
  }

  pub async fn complete(&self, id: i64) -> bool {
    self.transition(id, ConsultationAction::Complete, None).await
  }

  pub async fn cancel(&self, id: i64) -> bool {
    self.transition(id, ConsultationAction::Cancel, None).await
  }

  async fn transition(
    &self,
    id: i64,
    action: ConsultationAction,
    body: Option<serde_json::Value>,
  ) -> bool {
    let endpoint = Endpoint::UpdateConsultation { id, action };
    let verb = format!("update {}", endpoint.description());

    self
      .list
      .mutate_and_refresh(
        &verb,
        format!("Consultation {}", action.done_label()),
        self.client.execute(endpoint, body),
      )
      .await
      .is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::super::testing::harness;
  use super::*;
  use crate::domain::{ConsultationStatus, Role};
  use crate::notify::Level;
  use serde_json::json;

  fn consultation(id: i64, status: &str) -> serde_json::Value {
    json!({
      "id": id,
      "farmerId": 42,
      "consultantId": 7,
      "topic": "Cassava mosaic",
      "status": status
    })
  }

  #[tokio::test]
  async fn test_list_is_scoped_to_farmer() {
    let h = harness(Some(Role::Farmer));
    h.transport
      .reply(200, json!({ "status": "OK", "data": [consultation(1, "PENDING")] }));
    let service = ConsultationService::new(&h.ctx);

    assert!(service.fetch_now().await);

    let list = service.store().read().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status, ConsultationStatus::Pending);
    assert_eq!(
      h.transport.requests()[0].url.path(),
      "/api/v1/consultations/farmer/42"
    );
  }

  #[tokio::test]
  async fn test_request_posts_and_refetches() {
    let h = harness(Some(Role::Farmer));
    h.transport
      .reply(201, json!({ "status": "CREATED", "data": consultation(5, "PENDING") }))
      .reply(200, json!([consultation(5, "PENDING")]));
    let service = ConsultationService::new(&h.ctx);

    let request = ConsultationRequest {
      consultant_id: 7,
      topic: "Cassava mosaic".to_string(),
      description: None,
    };
    let created = service.request(&request).await.unwrap();

    assert_eq!(created.id, 5);
    assert_eq!(service.store().read().unwrap().len(), 1);
    let requests = h.transport.requests();
    assert_eq!(requests[0].method, reqwest::Method::POST);
    let body: serde_json::Value = serde_json::from_slice(requests[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(body["consultantId"], 7);
    assert_eq!(h.ctx.notifier.latest().unwrap().message, "Consultation requested");
  }

  #[tokio::test]
  async fn test_reject_sends_reason() {
    let h = harness(Some(Role::Consultant));
    h.transport
      .reply(200, json!({ "status": "OK", "data": null }))
      .reply(200, json!([consultation(3, "REJECTED")]));
    let service = ConsultationService::new(&h.ctx);

    assert!(service.reject(3, "  fully booked ").await);

    let request = &h.transport.requests()[0];
    assert_eq!(request.url.path(), "/api/v1/consultations/3/reject");
    let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
    assert_eq!(body, json!({ "reason": "fully booked" }));
    assert_eq!(
      service.store().read().unwrap()[0].status,
      ConsultationStatus::Rejected
    );
    assert_eq!(h.ctx.notifier.latest().unwrap().message, "Consultation rejected");
  }

  #[tokio::test]
  async fn test_failed_transition_keeps_list() {
    let h = harness(Some(Role::Farmer));
    h.transport
      .reply(200, json!([consultation(3, "PENDING")]))
      .reply(409, json!({ "message": "Consultation already accepted" }));
    let service = ConsultationService::new(&h.ctx);
    service.fetch_now().await;
    let version = service.store().version();

    assert!(!service.cancel(3).await);

    assert_eq!(service.store().version(), version);
    assert_eq!(h.transport.request_count(), 2);
    let latest = h.ctx.notifier.latest().unwrap();
    assert_eq!(latest.level, Level::Error);
    assert!(latest.message.ends_with("Consultation already accepted"));
  }
}
