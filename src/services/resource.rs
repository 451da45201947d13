//! Cached resource: one entity store bridged to the API client.
//!
//! `CachedResource<T>` provides:
//! - get-or-fetch: fetch in the background only when the store is unloaded
//! - refresh: fetch unconditionally and overwrite on success
//! - mutations that reconcile the store from the server after success
//!
//! Fetch errors never reach the caller. They become a notification, a log
//! line and `LoadState::Failed`, and the store keeps its previous value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;

use crate::api::{ApiError, Endpoint};
use crate::notify::Notifier;
use crate::session::AuthContext;
use crate::store::{LoadState, Store, Subscription};

type EndpointFn = Arc<dyn Fn() -> Result<Endpoint, ApiError> + Send + Sync>;
type FetcherFn<T> = Arc<dyn Fn(Endpoint) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;
type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

/// How concurrent fetches of the same endpoint behave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchPolicy {
  /// Every call issues its own request; the last response to arrive wins
  #[default]
  Duplicate,
  /// Calls made while a request for the same endpoint is in flight share it
  SingleFlight,
}

/// Requests in flight, keyed by endpoint cache hash.
///
/// Shared between resources of the same value type so that, for example, two
/// views asking for the same consultation list ride on one request.
pub struct InFlight<T> {
  pending: Mutex<HashMap<String, SharedFetch<T>>>,
}

impl<T: Clone + Send + Sync + 'static> InFlight<T> {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      pending: Mutex::new(HashMap::new()),
    })
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedFetch<T>>> {
    self.pending.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Join the request for `key`, starting it if none is in flight.
  async fn run<F>(&self, key: String, start: F) -> Result<T, ApiError>
  where
    F: FnOnce() -> BoxFuture<'static, Result<T, ApiError>>,
  {
    let (fetch, leader) = {
      let mut pending = self.lock();
      match pending.get(&key) {
        Some(fetch) => (fetch.clone(), false),
        None => {
          let fetch = start().shared();
          pending.insert(key.clone(), fetch.clone());
          (fetch, true)
        }
      }
    };

    if leader {
      tracing::trace!(key = %key, "single-flight leader");
    }
    let result = fetch.clone().await;
    // Whoever sees the result first removes the entry, so a dropped leader
    // cannot leave a completed fetch behind
    self.remove_if_same(&key, &fetch);
    result
  }

  fn remove_if_same(&self, key: &str, fetch: &SharedFetch<T>) {
    let mut pending = self.lock();
    if pending.get(key).is_some_and(|current| current.ptr_eq(fetch)) {
      pending.remove(key);
    }
  }

  /// Forget every request in flight. Callers already awaiting keep their result.
  pub fn clear(&self) {
    self.lock().clear();
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// One server-owned entity, cached in a `Store<T>`.
pub struct CachedResource<T> {
  label: &'static str,
  store: Store<T>,
  status: Store<LoadState>,
  endpoint: EndpointFn,
  fetcher: FetcherFn<T>,
  notifier: Notifier,
  policy: FetchPolicy,
  in_flight: Arc<InFlight<T>>,
  generation: Arc<AtomicU64>,
  session_watch: Option<Arc<Subscription>>,
}

impl<T: Clone + Send + Sync + 'static> CachedResource<T> {
  /// Create a resource.
  ///
  /// `endpoint` is evaluated at every fetch, so role- and user-scoped paths
  /// follow the current session. `fetcher` performs the request.
  pub fn new<E, F, Fut>(label: &'static str, notifier: Notifier, endpoint: E, fetcher: F) -> Self
  where
    E: Fn() -> Result<Endpoint, ApiError> + Send + Sync + 'static,
    F: Fn(Endpoint) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self {
      label,
      store: Store::new(label),
      status: Store::with_value(label, LoadState::Idle),
      endpoint: Arc::new(endpoint),
      fetcher: Arc::new(move |endpoint| fetcher(endpoint).boxed()),
      notifier,
      policy: FetchPolicy::Duplicate,
      in_flight: InFlight::new(),
      generation: Arc::new(AtomicU64::new(0)),
      session_watch: None,
    }
  }

  pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Share the in-flight map with other resources of the same type.
  ///
  /// Call before `reset_on_sign_out` so sign-out clears the shared map.
  pub fn sharing_in_flight(mut self, in_flight: Arc<InFlight<T>>) -> Self {
    self.in_flight = in_flight;
    self
  }

  /// Reset the cache whenever the session ends.
  ///
  /// Responses to requests started before the sign-out are dropped.
  pub fn reset_on_sign_out(mut self, auth: &AuthContext) -> Self {
    let store = self.store.clone();
    let status = self.status.clone();
    let generation = Arc::clone(&self.generation);
    let in_flight = Arc::clone(&self.in_flight);
    let signed_in = AtomicBool::new(false);

    let subscription = auth.subscribe(move |session| {
      let now = session.is_some();
      if signed_in.swap(now, Ordering::SeqCst) && !now {
        generation.fetch_add(1, Ordering::SeqCst);
        in_flight.clear();
        store.reset();
        status.write(LoadState::Idle);
      }
    });

    self.session_watch = Some(Arc::new(subscription));
    self
  }

  pub fn label(&self) -> &'static str {
    self.label
  }

  /// The entity store, without triggering a fetch.
  pub fn store(&self) -> &Store<T> {
    &self.store
  }

  /// Load state of the entity store.
  pub fn status(&self) -> Store<LoadState> {
    self.status.clone()
  }

  /// Return the store, starting a background fetch if it holds no value.
  ///
  /// Overlapping calls on an unloaded store each start their own fetch
  /// unless the policy is `SingleFlight`.
  pub fn get_or_fetch(&self) -> Store<T> {
    if !self.store.is_loaded() {
      tracing::debug!(resource = self.label, "cache miss, fetching");
      // Fire and forget: completion lands in the store
      drop(self.refresh());
    }
    self.store.clone()
  }

  /// Fetch in the background and overwrite the store on success.
  pub fn refresh(&self) -> JoinHandle<()> {
    let this = self.clone();
    tokio::spawn(async move {
      this.fetch_now().await;
    })
  }

  fn generation(&self) -> u64 {
    self.generation.load(Ordering::SeqCst)
  }

  /// False once the cache was reset after `started`.
  fn still_current(&self, started: u64, what: &str) -> bool {
    let current = self.generation() == started;
    if !current {
      tracing::debug!(resource = self.label, "dropping {} from an earlier session", what);
    }
    current
  }

  /// Fetch and wait. Returns whether the store was updated.
  pub async fn fetch_now(&self) -> bool {
    let started = self.generation();
    let endpoint = match (self.endpoint)() {
      Ok(endpoint) => endpoint,
      Err(e) => {
        self.fail(&e);
        return false;
      }
    };

    self.status.write(LoadState::Loading);

    let result = match self.policy {
      FetchPolicy::Duplicate => (self.fetcher)(endpoint).await,
      FetchPolicy::SingleFlight => {
        let fetcher = Arc::clone(&self.fetcher);
        let key = endpoint.cache_hash();
        self.in_flight.run(key, move || fetcher(endpoint)).await
      }
    };

    if !self.still_current(started, "response") {
      return false;
    }

    match result {
      Ok(value) => {
        self.store.write(value);
        self.status.write(LoadState::Loaded);
        tracing::debug!(resource = self.label, "fetched");
        true
      }
      Err(e) => {
        self.fail(&e);
        false
      }
    }
  }

  fn fail(&self, error: &ApiError) {
    self.status.write(LoadState::Failed(error.to_string()));
    self
      .notifier
      .error(format!("Could not load {}: {}", self.label, error));
  }

  /// Run a mutation; on success refetch the store, then notify.
  ///
  /// On failure the store is left untouched; nothing was written ahead of
  /// the server's answer. A failed refetch keeps its own error in the log
  /// and load state but the notification reports the mutation.
  pub async fn mutate_and_refresh<R, Fut>(
    &self,
    action: &str,
    success: impl Into<String>,
    call: Fut,
  ) -> Option<R>
  where
    Fut: Future<Output = Result<R, ApiError>>,
  {
    let started = self.generation();
    match call.await {
      Ok(result) => {
        if self.still_current(started, "mutation result") {
          self.fetch_now().await;
          self.notifier.success(success);
        }
        Some(result)
      }
      Err(e) => {
        self.notifier.error(format!("Could not {}: {}", action, e));
        None
      }
    }
  }

  /// Run a mutation that returns the updated entity and write it directly.
  pub async fn mutate_and_replace<Fut>(
    &self,
    action: &str,
    success: impl Into<String>,
    call: Fut,
  ) -> Option<T>
  where
    Fut: Future<Output = Result<T, ApiError>>,
  {
    let started = self.generation();
    match call.await {
      Ok(value) => {
        if self.still_current(started, "mutation result") {
          self.store.write(value.clone());
          self.status.write(LoadState::Loaded);
          self.notifier.success(success);
        }
        Some(value)
      }
      Err(e) => {
        self.notifier.error(format!("Could not {}: {}", action, e));
        None
      }
    }
  }

  /// Back to unloaded. Fetches already in flight will not land.
  pub fn reset(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
    self.store.reset();
    self.status.write(LoadState::Idle);
  }
}

impl<T> Clone for CachedResource<T> {
  fn clone(&self) -> Self {
    Self {
      label: self.label,
      store: self.store.clone(),
      status: self.status.clone(),
      endpoint: Arc::clone(&self.endpoint),
      fetcher: Arc::clone(&self.fetcher),
      notifier: self.notifier.clone(),
      policy: self.policy,
      in_flight: Arc::clone(&self.in_flight),
      generation: Arc::clone(&self.generation),
      session_watch: self.session_watch.clone(),
    }
  }
}
