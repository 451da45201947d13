use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint, VisitAction};
use crate::domain::{FarmVisit, FarmVisitRequest};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// On-site farm visits.
#[derive(Clone)]
pub struct FarmVisitService {
  client: ApiClient,
  list: CachedResource<Vec<FarmVisit>>,
}

impl FarmVisitService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      list: ctx.scoped_list(
        "farm visits",
        |role, user_id| Endpoint::FarmVisits { role, user_id },
        &InFlight::new(),
      ),
    }
  }

  pub fn visits(&self) -> Store<Vec<FarmVisit>> {
    self.list.get_or_fetch()
  }

  pub fn store(&self) -> &Store<Vec<FarmVisit>> {
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

  pub async fn schedule(&self, request: &FarmVisitRequest) -> Option<FarmVisit> {
    self
      .list
      .mutate_and_refresh(
        "schedule visit",
        format!("Visit scheduled for {}", request.scheduled_date),
        self
          .client
          .send::<_, FarmVisit>(Endpoint::CreateFarmVisit, request),
      )
      .await
  }

  pub async fn complete(&self, id: i64) -> bool {
    self.transition(id, VisitAction::Complete, "Visit completed").await
  }

  pub async fn cancel(&self, id: i64) -> bool {
    self.transition(id, VisitAction::Cancel, "Visit cancelled").await
  }

  async fn transition(&self, id: i64, action: VisitAction, success: &str) -> bool {
    let endpoint = Endpoint::UpdateFarmVisit { id, action };
    let verb = format!("update {}", endpoint.description());

    self
      .list
      .mutate_and_refresh(&verb, success, self.client.execute(endpoint, None))
      .await
      .is_some()
  }
}
