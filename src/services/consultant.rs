use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint};
use crate::domain::{ConsultantProfile, ProfileUpdate};
use crate::store::{LoadState, Store};

use super::{CachedResource, ServiceContext};

/// The signed-in consultant's profile.
#[derive(Clone)]
pub struct ConsultantService {
  client: ApiClient,
  ctx: ServiceContext,
  profile: CachedResource<ConsultantProfile>,
}

impl ConsultantService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      ctx: ctx.clone(),
      profile: ctx.own_entity("consultant profile", |id| Endpoint::ConsultantProfile { id }),
    }
  }

  pub fn profile(&self) -> Store<ConsultantProfile> {
    self.profile.get_or_fetch()
  }

  pub fn profile_store(&self) -> &Store<ConsultantProfile> {
    self.profile.store()
  }

  pub fn profile_status(&self) -> Store<LoadState> {
    self.profile.status()
  }

  pub fn refresh_profile(&self) -> JoinHandle<()> {
    self.profile.refresh()
  }

  pub async fn update_profile(&self, update: &ProfileUpdate) -> Option<ConsultantProfile> {
    let id = match self.ctx.user_id() {
      Ok(id) => id,
      Err(e) => {
        self.ctx.notifier.error(format!("Could not update profile: {}", e));
        return None;
      }
    };

    self
      .profile
      .mutate_and_replace(
        "update profile",
        "Profile updated",
        self
          .client
          .send::<_, ConsultantProfile>(Endpoint::UpdateConsultantProfile { id }, update),
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
  async fn test_update_failure_keeps_profile() {
    let h = harness(Some(Role::Consultant));
    h.transport
      .reply(200, json!({ "id": 42, "fullName": "Dr. Okafor", "approved": true }))
      .reply(400, json!({ "message": "phone invalid" }));
    let service = ConsultantService::new(&h.ctx);
    service.profile.fetch_now().await;
    let before = service.profile_store().read();

    let update = ProfileUpdate {
      phone: Some("x".to_string()),
      ..Default::default()
    };
    assert!(service.update_profile(&update).await.is_none());

    assert_eq!(service.profile_store().read(), before);
    assert_eq!(
      h.ctx.notifier.latest().unwrap().message,
      "Could not update profile: Server error 400: phone invalid"
    );
  }
}
