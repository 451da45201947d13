use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint};
use crate::domain::{Feedback, FeedbackDraft};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// Farmer ratings of completed consultations.
#[derive(Clone)]
pub struct FeedbackService {
  client: ApiClient,
  list: CachedResource<Vec<Feedback>>,
}

impl FeedbackService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      list: ctx.scoped_list(
        "feedback",
        |role, user_id| Endpoint::Feedback { role, user_id },
        &InFlight::new(),
      ),
    }
  }

  pub fn feedback(&self) -> Store<Vec<Feedback>> {
    self.list.get_or_fetch()
  }

  pub fn store(&self) -> &Store<Vec<Feedback>> {
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

  pub async fn submit(&self, draft: &FeedbackDraft) -> Option<Feedback> {
    self
      .list
      .mutate_and_refresh(
        "submit feedback",
        "Thank you for your feedback",
        self
          .client
          .send::<_, Feedback>(Endpoint::CreateFeedback, draft),
      )
      .await
  }
}
