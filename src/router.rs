//! Logical navigation state.

use crate::domain::Role;
use crate::store::{Store, Subscription};

/// Which root view the app should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Login,
  Register,
  Consultations,
  Reports,
  FarmVisits,
  Feedback,
  Consultants,
  Profile,
  Admin,
}

impl Route {
  /// Landing route after sign-in.
  pub fn home_for(role: Role) -> Self {
    match role {
      Role::Farmer | Role::Consultant => Route::Consultations,
      Role::Admin => Route::Admin,
    }
  }

  pub fn requires_auth(self) -> bool {
    !matches!(self, Route::Login | Route::Register)
  }

  pub fn label(self) -> &'static str {
    match self {
      Route::Login => "Login",
      Route::Register => "Register",
      Route::Consultations => "Consultations",
      Route::Reports => "Reports",
      Route::FarmVisits => "Farm visits",
      Route::Feedback => "Feedback",
      Route::Consultants => "Consultants",
      Route::Profile => "Profile",
      Route::Admin => "Admin",
    }
  }
}

/// Current route, observable. Shared by the transport interceptor and the app.
#[derive(Clone, Debug)]
pub struct Router {
  store: Store<Route>,
}

impl Router {
  pub fn new(initial: Route) -> Self {
    Self {
      store: Store::with_value("route", initial),
    }
  }

  pub fn navigate(&self, route: Route) {
    tracing::debug!(route = route.label(), "navigate");
    self.store.write(route);
  }

  pub fn current(&self) -> Route {
    self.store.read().unwrap_or(Route::Login)
  }

  pub fn subscribe<F>(&self, observer: F) -> Subscription
  where
    F: Fn(Option<&Route>) + Send + Sync + 'static,
  {
    self.store.subscribe(observer)
  }
}

impl Default for Router {
  fn default() -> Self {
    Self::new(Route::Login)
  }
}
