use crate::api::{ApiAuthData, ApiClient, ApiLoginRequest, Endpoint};
use crate::domain::RegisterRequest;
use crate::notify::Notifier;
use crate::router::{Route, Router};
use crate::session::{AuthContext, Session};

use super::ServiceContext;

/// Sign-in, registration and sign-out.
#[derive(Clone)]
pub struct AuthService {
  client: ApiClient,
  auth: AuthContext,
  router: Router,
  notifier: Notifier,
}

impl AuthService {
  pub fn new(ctx: &ServiceContext, router: Router) -> Self {
    Self {
      client: ctx.client.clone(),
      auth: ctx.auth.clone(),
      router,
      notifier: ctx.notifier.clone(),
    }
  }

  /// Sign in and navigate to the role's landing route.
  ///
  /// Returns the new session, or `None` after notifying the failure.
  pub async fn login(&self, email: &str, password: &str) -> Option<Session> {
    let email = email.trim();
    let request = ApiLoginRequest { email, password };

    match self
      .client
      .send::<_, ApiAuthData>(Endpoint::Login, &request)
      .await
    {
      Ok(data) => {
        let session = Session {
          token: data.token,
          user_id: data.user_id,
          role: data.role,
          email: if data.email.is_empty() {
            email.to_string()
          } else {
            data.email
          },
        };
        self.auth.set(session.clone());
        self.router.navigate(Route::home_for(session.role));
        self.notifier.success(format!("Signed in as {}", session.email));
        Some(session)
      }
      Err(e) => {
        self.notifier.error(format!("Sign-in failed: {}", e));
        None
      }
    }
  }

  /// Create an account. The user signs in afterwards.
  pub async fn register(&self, request: &RegisterRequest) -> bool {
    match self.client.send::<_, serde_json::Value>(Endpoint::Register, request).await {
      Ok(_) => {
        self.router.navigate(Route::Login);
        self
          .notifier
          .success("Registration successful, please sign in");
        true
      }
      Err(e) => {
        self.notifier.error(format!("Registration failed: {}", e));
        false
      }
    }
  }

  pub fn logout(&self) {
    self.auth.clear();
    self.router.navigate(Route::Login);
  }

  pub fn session(&self) -> Option<Session> {
    self.auth.current()
  }
}
