//! Observable single-value store.
//!
//! A `Store<T>` is a cheap handle: clones share one value and one subscriber
//! list. Observers run synchronously on the writing thread, in registration
//! order, and never while the internal lock is held. A write issued while a
//! delivery is already running (from inside an observer, or from another
//! thread) is queued and delivered in order by the running loop.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Observer<T> = Box<dyn Fn(Option<&T>) + Send + Sync>;

struct Subscriber<T> {
  id: u64,
  active: Arc<AtomicBool>,
  observer: Observer<T>,
}

/// One queued notification: the value plus the subscribers registered at write time.
struct Delivery<T> {
  value: Option<T>,
  recipients: Vec<Arc<Subscriber<T>>>,
}

struct Inner<T> {
  value: Option<T>,
  version: u64,
  next_id: u64,
  subscribers: Vec<Arc<Subscriber<T>>>,
  pending: VecDeque<Delivery<T>>,
  delivering: bool,
}

struct Shared<T> {
  name: &'static str,
  inner: Mutex<Inner<T>>,
}

impl<T> Shared<T> {
  fn lock(&self) -> MutexGuard<'_, Inner<T>> {
    // Observers never run under the lock, so a poisoned lock still holds consistent data.
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Removal hook a `Subscription` calls without knowing the store's value type.
trait Detach: Send + Sync {
  fn detach(&self, id: u64);
}

impl<T: Send + 'static> Detach for Shared<T> {
  fn detach(&self, id: u64) {
    self.lock().subscribers.retain(|s| s.id != id);
  }
}

/// Holds the latest value of one entity and broadcasts every replacement.
pub struct Store<T> {
  shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
  /// Create an unloaded store. The name only shows up in logs.
  pub fn new(name: &'static str) -> Self {
    Self {
      shared: Arc::new(Shared {
        name,
        inner: Mutex::new(Inner {
          value: None,
          version: 0,
          next_id: 0,
          subscribers: Vec::new(),
          pending: VecDeque::new(),
          delivering: false,
        }),
      }),
    }
  }

  /// Create a store that already holds a value.
  pub fn with_value(name: &'static str, value: T) -> Self {
    let store = Self::new(name);
    store.shared.lock().value = Some(value);
    store
  }

  pub fn name(&self) -> &'static str {
    self.shared.name
  }

  /// Current value, or `None` if never written (or reset).
  pub fn read(&self) -> Option<T> {
    self.shared.lock().value.clone()
  }

  /// Whether the store holds a value. Does not clone it.
  pub fn is_loaded(&self) -> bool {
    self.shared.lock().value.is_some()
  }

  /// Number of writes and resets so far.
  pub fn version(&self) -> u64 {
    self.shared.lock().version
  }

  pub fn subscriber_count(&self) -> usize {
    self.shared.lock().subscribers.len()
  }

  /// Register an observer.
  ///
  /// The observer is called right away with the current value, then once per
  /// later `write`/`reset` until the returned `Subscription` is dropped or
  /// unsubscribed.
  pub fn subscribe<F>(&self, observer: F) -> Subscription
  where
    F: Fn(Option<&T>) + Send + Sync + 'static,
  {
    let active = Arc::new(AtomicBool::new(true));

    let (subscriber, current) = {
      let mut inner = self.shared.lock();
      let id = inner.next_id;
      inner.next_id += 1;

      let subscriber = Arc::new(Subscriber {
        id,
        active: Arc::clone(&active),
        observer: Box::new(observer),
      });
      inner.subscribers.push(Arc::clone(&subscriber));
      (subscriber, inner.value.clone())
    };

    (subscriber.observer)(current.as_ref());

    let store: Weak<dyn Detach> = Arc::downgrade(&self.shared) as Weak<dyn Detach>;
    Subscription {
      id: subscriber.id,
      active,
      store,
    }
  }

  /// Replace the value unconditionally and notify every active subscriber.
  pub fn write(&self, value: T) {
    self.replace(Some(value));
  }

  /// Return to the unloaded state and notify every active subscriber.
  pub fn reset(&self) {
    self.replace(None);
  }

  fn replace(&self, value: Option<T>) {
    {
      let mut inner = self.shared.lock();
      inner.value = value.clone();
      inner.version += 1;
      tracing::trace!(
        store = self.shared.name,
        version = inner.version,
        loaded = value.is_some(),
        "store write"
      );

      let recipients = inner.subscribers.clone();
      inner.pending.push_back(Delivery { value, recipients });

      if inner.delivering {
        return;
      }
      inner.delivering = true;
    }

    self.deliver();
  }

  fn deliver(&self) {
    loop {
      let delivery = {
        let mut inner = self.shared.lock();
        match inner.pending.pop_front() {
          Some(d) => d,
          None => {
            inner.delivering = false;
            return;
          }
        }
      };

      for subscriber in &delivery.recipients {
        if subscriber.active.load(Ordering::SeqCst) {
          (subscriber.observer)(delivery.value.as_ref());
        }
      }
    }
  }
}

impl<T> Clone for Store<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> fmt::Debug for Store<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.shared.lock();
    f.debug_struct("Store")
      .field("name", &self.shared.name)
      .field("loaded", &inner.value.is_some())
      .field("version", &inner.version)
      .field("subscribers", &inner.subscribers.len())
      .finish()
  }
}

/// Handle for one observer registration.
///
/// Owned by the subscriber. Only a weak reference to the store is kept, so a
/// live subscription never keeps a store alive. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
  id: u64,
  active: Arc<AtomicBool>,
  store: Weak<dyn Detach>,
}

impl Subscription {
  /// Stop delivery to this observer. Other subscriptions are unaffected.
  pub fn unsubscribe(&self) {
    if self.active.swap(false, Ordering::SeqCst) {
      if let Some(store) = self.store.upgrade() {
        store.detach(self.id);
      }
    }
  }

  pub fn is_active(&self) -> bool {
    self.active.load(Ordering::SeqCst)
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("id", &self.id)
      .field("active", &self.is_active())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn recorder<T: Clone + Send + Sync + 'static>(
  ) -> (Arc<Mutex<Vec<Option<T>>>>, impl Fn(Option<&T>) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |v: Option<&T>| {
      sink.lock().unwrap().push(v.cloned());
    })
  }

  #[test]
  fn test_read_is_none_until_written() {
    let store: Store<Vec<u32>> = Store::new("test");
    assert_eq!(store.read(), None);
    assert!(!store.is_loaded());

    store.write(vec![1, 2]);
    assert_eq!(store.read(), Some(vec![1, 2]));
    assert_eq!(store.version(), 1);
  }

  #[test]
  fn test_late_subscriber_receives_current_value() {
    let store = Store::new("test");
    store.write(7u32);

    let (seen, observer) = recorder::<u32>();
    let _sub = store.subscribe(observer);

    assert_eq!(*seen.lock().unwrap(), vec![Some(7)]);
  }

  #[test]
  fn test_subscribe_to_unloaded_store_yields_none() {
    let store: Store<u32> = Store::new("test");
    let (seen, observer) = recorder::<u32>();
    let _sub = store.subscribe(observer);

    assert_eq!(*seen.lock().unwrap(), vec![None]);
  }

  #[test]
  fn test_notifications_follow_write_order() {
    let store = Store::new("test");
    let (seen, observer) = recorder::<u32>();
    let _sub = store.subscribe(observer);

    for v in [1, 2, 2, 3, 1] {
      store.write(v);
    }

    // Equal consecutive values are still delivered
    assert_eq!(
      *seen.lock().unwrap(),
      vec![None, Some(1), Some(2), Some(2), Some(3), Some(1)]
    );
  }

  #[test]
  fn test_subscribers_notified_in_registration_order() {
    let store = Store::new("test");
    let order = Arc::new(Mutex::new(Vec::new()));

    let subs: Vec<Subscription> = (0..3)
      .map(|i| {
        let order = Arc::clone(&order);
        store.subscribe(move |v: Option<&u32>| {
          if v.is_some() {
            order.lock().unwrap().push(i);
          }
        })
      })
      .collect();

    store.write(1);
    store.write(2);

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 0, 1, 2]);
    assert_eq!(subs.len(), 3);
  }

  #[test]
  fn test_unsubscribe_isolation() {
    let store = Store::new("test");
    let (first, obs1) = recorder::<u32>();
    let (second, obs2) = recorder::<u32>();

    let sub1 = store.subscribe(obs1);
    let _sub2 = store.subscribe(obs2);

    store.write(1);
    sub1.unsubscribe();
    store.write(2);

    assert!(!sub1.is_active());
    assert_eq!(*first.lock().unwrap(), vec![None, Some(1)]);
    assert_eq!(*second.lock().unwrap(), vec![None, Some(1), Some(2)]);
    assert_eq!(store.subscriber_count(), 1);
  }

  #[test]
  fn test_dropping_subscription_unsubscribes() {
    let store = Store::new("test");
    let (seen, observer) = recorder::<u32>();

    {
      let _sub = store.subscribe(observer);
      store.write(1);
    }
    store.write(2);

    assert_eq!(*seen.lock().unwrap(), vec![None, Some(1)]);
    assert_eq!(store.subscriber_count(), 0);
  }

  #[test]
  fn test_subscription_does_not_keep_store_alive() {
    let store = Store::new("test");
    let weak = Arc::downgrade(&store.shared);
    let sub = store.subscribe(|_: Option<&u32>| {});

    drop(store);
    assert!(weak.upgrade().is_none());

    // Unsubscribing after the store is gone is a no-op
    sub.unsubscribe();
    assert!(!sub.is_active());
  }

  #[test]
  fn test_reset_notifies_unloaded() {
    let store = Store::with_value("test", 5u32);
    let (seen, observer) = recorder::<u32>();
    let _sub = store.subscribe(observer);

    store.reset();

    assert_eq!(store.read(), None);
    assert_eq!(*seen.lock().unwrap(), vec![Some(5), None]);
  }

  #[test]
  fn test_write_from_observer_is_delivered_in_order() {
    let store = Store::new("test");
    let (seen, observer) = recorder::<u32>();
    let _sub1 = {
      let inner = store.clone();
      store.subscribe(move |v: Option<&u32>| {
        if v == Some(&1) {
          inner.write(2);
        }
      })
    };
    let _sub2 = store.subscribe(observer);

    store.write(1);

    // The nested write is queued behind the delivery of 1 to every subscriber
    assert_eq!(*seen.lock().unwrap(), vec![None, Some(1), Some(2)]);
    assert_eq!(store.read(), Some(2));
  }

  #[test]
  fn test_concurrent_writers_drop_nothing() {
    let store: Store<u32> = Store::new("test");
    let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let _sub = {
      let count = Arc::clone(&count);
      store.subscribe(move |_| {
        count.fetch_add(1, Ordering::SeqCst);
      })
    };

    let handles: Vec<_> = (0..4)
      .map(|t| {
        let store = store.clone();
        std::thread::spawn(move || {
          for i in 0..100 {
            store.write(t * 1000 + i);
          }
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }

    // One replay on subscribe plus one delivery per write
    assert_eq!(count.load(Ordering::SeqCst), 1 + 400);
    assert_eq!(store.version(), 400);
  }
}
