use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint};
use crate::domain::{ConsultantProfile, FarmerProfile, ProfileUpdate};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// The signed-in farmer's profile and the consultant directory.
#[derive(Clone)]
pub struct FarmerService {
  client: ApiClient,
  ctx: ServiceContext,
  profile: CachedResource<FarmerProfile>,
  consultants: CachedResource<Vec<ConsultantProfile>>,
}

impl FarmerService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      ctx: ctx.clone(),
      profile: ctx.own_entity("farmer profile", |id| Endpoint::FarmerProfile { id }),
      consultants: ctx.list("consultants", || Ok(Endpoint::Consultants), &InFlight::new()),
    }
  }

  pub fn profile(&self) -> Store<FarmerProfile> {
    self.profile.get_or_fetch()
  }

  pub fn profile_store(&self) -> &Store<FarmerProfile> {
    self.profile.store()
  }

  pub fn profile_status(&self) -> Store<LoadState> {
    self.profile.status()
  }

  pub async fn fetch_profile(&self) -> bool {
    self.profile.fetch_now().await
  }

  pub fn refresh_profile(&self) -> JoinHandle<()> {
    self.profile.refresh()
  }

  /// Consultants a farmer can request a consultation from.
  pub fn consultants(&self) -> Store<Vec<ConsultantProfile>> {
    self.consultants.get_or_fetch()
  }

  pub fn consultants_status(&self) -> Store<LoadState> {
    self.consultants.status()
  }

  pub fn refresh_consultants(&self) -> JoinHandle<()> {
    self.consultants.refresh()
  }

  /// Update the profile and cache the server's copy.
  pub async fn update_profile(&self, update: &ProfileUpdate) -> Option<FarmerProfile> {
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
          .send::<_, FarmerProfile>(Endpoint::UpdateFarmerProfile { id }, update),
      )
      .await
  }
}
