use serde_json::json;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, Endpoint};
use crate::domain::{ConsultantProfile, UserAccount};
use crate::store::{LoadState, Store};

use super::{CachedResource, InFlight, ServiceContext};

/// Account moderation for administrators.
#[derive(Clone)]
pub struct AdminService {
  client: ApiClient,
  users: CachedResource<Vec<UserAccount>>,
  pending: CachedResource<Vec<ConsultantProfile>>,
}

impl AdminService {
  pub fn new(ctx: &ServiceContext) -> Self {
    Self {
      client: ctx.client.clone(),
      users: ctx.list("users", || Ok(Endpoint::AdminUsers), &InFlight::new()),
      pending: ctx.list(
        "pending consultants",
        || Ok(Endpoint::PendingConsultants),
        &InFlight::new(),
      ),
    }
  }

  pub fn users(&self) -> Store<Vec<UserAccount>> {
    self.users.get_or_fetch()
  }

  pub fn users_status(&self) -> Store<LoadState> {
    self.users.status()
  }

  pub fn refresh_users(&self) -> JoinHandle<()> {
    self.users.refresh()
  }

  pub fn pending_consultants(&self) -> Store<Vec<ConsultantProfile>> {
    self.pending.get_or_fetch()
  }

  pub fn pending_status(&self) -> Store<LoadState> {
    self.pending.status()
  }

  pub fn refresh_pending(&self) -> JoinHandle<()> {
    self.pending.refresh()
  }

  pub async fn approve(&self, id: i64) -> bool {
    self.review(id, true).await
  }

  pub async fn reject(&self, id: i64) -> bool {
    self.review(id, false).await
  }

  async fn review(&self, id: i64, approve: bool) -> bool {
    let (verb, done) = if approve {
      ("approve consultant", "Consultant approved")
    } else {
      ("reject consultant", "Consultant rejected")
    };

    let reviewed = self
      .pending
      .mutate_and_refresh(
        verb,
        done,
        self
          .client
          .execute(Endpoint::ReviewConsultant { id, approve }, None),
      )
      .await
      .is_some();

    // Approval changes the user list as well
    if reviewed && self.users.store().is_loaded() {
      self.users.refresh();
    }
    reviewed
  }

  /// Activate or deactivate an account.
  pub async fn set_active(&self, id: i64, active: bool) -> bool {
    let done = if active {
      "Account activated"
    } else {
      "Account deactivated"
    };

    self
      .users
      .mutate_and_refresh(
        "update account",
        done,
        self
          .client
          .execute(Endpoint::SetUserStatus { id }, Some(json!({ "active": active }))),
      )
      .await
      .is_some()
  }
}
