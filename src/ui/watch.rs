//! Bridges from stores and background tasks into the render loop.
//!
//! Store observers run on whichever thread wrote the store, so they never
//! touch view state directly. They forward into a channel and the view drains
//! it from `tick()`, the same poll-on-tick shape every view uses.
//!
//! ```ignore
//! let mut list = Watch::store(&services.consultations.consultations());
//!
//! // In tick
//! if list.poll() {
//!     // New value arrived
//! }
//!
//! // In render
//! match list.value() {
//!     None => render_loading(),
//!     Some(items) => render_items(items),
//! }
//! ```

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

use crate::store::{Store, Subscription};

type Observer<T> = Box<dyn Fn(Option<&T>) + Send + Sync>;

/// Latest value of a store, as seen from the UI thread.
///
/// Dropping the watch drops the subscription.
pub struct Watch<T> {
  rx: mpsc::UnboundedReceiver<Option<T>>,
  value: Option<T>,
  _subscription: Subscription,
}

impl<T: Clone + Send + 'static> Watch<T> {
  /// Watch anything that hands out store subscriptions.
  pub fn new<S>(subscribe: S) -> Self
  where
    S: FnOnce(Observer<T>) -> Subscription,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = subscribe(Box::new(move |value: Option<&T>| {
      // Receiver gone means the view was dropped mid-delivery
      let _ = tx.send(value.cloned());
    }));

    let mut watch = Self {
      rx,
      value: None,
      _subscription: subscription,
    };
    // Subscribing replays the current value synchronously
    watch.poll();
    watch
  }

  pub fn store(store: &Store<T>) -> Self
  where
    T: Sync,
  {
    Self::new(|observer| store.subscribe(observer))
  }

  /// Drain pending updates. Returns `true` if anything arrived.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(value) = self.rx.try_recv() {
      self.value = value;
      changed = true;
    }
    changed
  }

  pub fn value(&self) -> Option<&T> {
    self.value.as_ref()
  }
}

/// One background action whose result the view wants back.
pub struct Task<R> {
  rx: Option<oneshot::Receiver<R>>,
}

impl<R> Default for Task<R> {
  fn default() -> Self {
    Self { rx: None }
  }
}

impl<R: Send + 'static> Task<R> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start `future`, forgetting any result still pending.
  pub fn spawn<F>(&mut self, future: F)
  where
    F: Future<Output = R> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    self.rx = Some(rx);
  }

  pub fn is_running(&self) -> bool {
    self.rx.is_some()
  }

  /// The result, once, when it arrives.
  pub fn poll(&mut self) -> Option<R> {
    let rx = self.rx.as_mut()?;
    match rx.try_recv() {
      Ok(result) => {
        self.rx = None;
        Some(result)
      }
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.rx = None;
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn test_watch_replays_current_value() {
    let store = Store::with_value("test", 3);
    let watch = Watch::store(&store);
    assert_eq!(watch.value(), Some(&3));
  }

  #[test]
  fn test_watch_sees_writes_and_resets_on_poll() {
    let store: Store<Vec<i32>> = Store::new("test");
    let mut watch = Watch::store(&store);
    assert!(watch.value().is_none());
    assert!(!watch.poll());

    store.write(vec![1]);
    store.write(vec![1, 2]);
    assert!(watch.poll());
    assert_eq!(watch.value(), Some(&vec![1, 2]));

    store.reset();
    assert!(watch.poll());
    assert!(watch.value().is_none());
  }

  #[test]
  fn test_dropping_watch_unsubscribes() {
    let store = Store::with_value("test", 1);
    let watch = Watch::store(&store);
    assert_eq!(store.subscriber_count(), 1);
    drop(watch);
    assert_eq!(store.subscriber_count(), 0);
  }

  #[tokio::test]
  async fn test_task_delivers_once() {
    let mut task = Task::new();
    assert!(!task.is_running());

    task.spawn(async { 7 });
    assert!(task.is_running());
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(task.poll(), Some(7));
    assert!(!task.is_running());
    assert_eq!(task.poll(), None);
  }
}
