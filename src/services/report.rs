use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint};
use crate::domain::{ConsultationReport, ReportDraft};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// Consultation reports written by consultants.
#[derive(Clone)]
pub struct ReportService {
  client: ApiClient,
  list: CachedResource<Vec<ConsultationReport>>,
}

impl ReportService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      list: ctx.scoped_list(
        "reports",
        |role, user_id| Endpoint::Reports { role, user_id },
        &InFlight::new(),
      ),
    }
  }

  pub fn reports(&self) -> Store<Vec<ConsultationReport>> {
    self.list.get_or_fetch()
  }

  pub fn store(&self) -> &Store<Vec<ConsultationReport>> {
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

  pub async fn submit(&self, draft: &ReportDraft) -> Option<ConsultationReport> {
    self
      .list
      .mutate_and_refresh(
        "submit report",
        "Report submitted",
        self
          .client
          .send::<_, ConsultationReport>(Endpoint::CreateReport, draft),
      )
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::super::testing::harness;
  use super::*;
  use crate::domain::Role;
  use serde_json::json;

  #[tokio::test]
  async fn test_missing_list_is_empty() {
    let h = harness(Some(Role::Consultant));
    h.transport.reply(404, json!({ "message": "No reports" }));
    let service = ReportService::new(&h.ctx);

    assert!(service.fetch_now().await);
    assert_eq!(service.store().read(), Some(Vec::new()));
    assert!(service.status().read().unwrap().is_loaded());
  }

  #[tokio::test]
  async fn test_submit_refetches_reports() {
    let h = harness(Some(Role::Consultant));
    let report = json!({
      "id": 1,
      "consultationId": 3,
      "consultantId": 42,
      "farmerId": 9,
      "findings": "Fall armyworm in rows 3-5",
      "recommendations": "Spray emamectin"
    });
    h.transport
      .reply(201, json!({ "status": "CREATED", "message": "saved", "data": report }))
      .reply(200, json!([report]));
    let service = ReportService::new(&h.ctx);

    let draft = ReportDraft {
      consultation_id: 3,
      findings: "Fall armyworm in rows 3-5".to_string(),
      recommendations: "Spray emamectin".to_string(),
    };
    assert!(service.submit(&draft).await.is_some());

    let paths: Vec<String> = h
      .transport
      .requests()
      .iter()
      .map(|r| r.url.path().to_string())
      .collect();
    assert_eq!(
      paths,
      vec![
        "/api/v1/consultation-reports",
        "/api/v1/consultation-reports/consultant/42"
      ]
    );
    assert_eq!(service.store().read().unwrap().len(), 1);
  }
}
