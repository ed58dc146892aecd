//! Auth-state listener registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::types::ProviderUser;

/// Callback invoked with the current user (`None` when signed out).
pub type AuthStateCallback = Box<dyn Fn(Option<&ProviderUser>) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(Option<&ProviderUser>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    /// `None` until the first notification.
    current: Option<Option<ProviderUser>>,
    next_id: u64,
    callbacks: BTreeMap<u64, SharedCallback>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Set of auth-state subscribers plus the last known state.
#[derive(Clone, Default)]
pub struct AuthStateListeners {
    inner: Arc<Mutex<Registry>>,
}

impl AuthStateListeners {
    /// Creates an empty registry with unknown state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber and replays the current state to it when known.
    pub fn subscribe(&self, callback: AuthStateCallback) -> Subscription {
        let callback: SharedCallback = Arc::from(callback);
        let (id, replay) = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id = registry.next_id.wrapping_add(1);
            registry.callbacks.insert(id, Arc::clone(&callback));
            (id, registry.current.clone())
        };

        if let Some(state) = replay {
            callback(state.as_ref());
        }

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Records the new state and invokes every subscriber.
    ///
    /// Callbacks run after the registry lock is released, so a callback
    /// may subscribe or unsubscribe.
    pub fn notify(&self, user: Option<ProviderUser>) {
        let callbacks: Vec<SharedCallback> = {
            let mut registry = lock(&self.inner);
            registry.current = Some(user.clone());
            registry.callbacks.values().cloned().collect()
        };

        tracing::debug!(
            signed_in = user.is_some(),
            subscribers = callbacks.len(),
            "auth state changed"
        );

        for callback in callbacks {
            callback(user.as_ref());
        }
    }

    /// Returns the last notified state, `None` when not yet known.
    #[must_use]
    pub fn current(&self) -> Option<Option<ProviderUser>> {
        lock(&self.inner).current.clone()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }
}

impl fmt::Debug for AuthStateListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.inner);
        f.debug_struct("AuthStateListeners")
            .field("current", &registry.current)
            .field("subscribers", &registry.callbacks.len())
            .finish()
    }
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Unsubscribes explicitly.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).callbacks.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn user(uid: &str) -> ProviderUser {
        ProviderUser {
            uid: String::from(uid),
            email: Some(format!("{uid}@example.com")),
            display_name: None,
        }
    }

    fn counting(counter: &Arc<AtomicUsize>) -> AuthStateCallback {
        let counter = Arc::clone(counter);
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_no_replay_before_first_notification() {
        // Arrange
        let listeners = AuthStateListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));

        // Act
        let _sub = listeners.subscribe(counting(&calls));

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(listeners.current().is_none());
    }

    #[test]
    fn test_replays_known_state_to_late_subscriber() {
        // Arrange
        let listeners = AuthStateListeners::new();
        listeners.notify(Some(user("u1")));
        let seen = Arc::new(Mutex::new(None));
        let seen_in_cb = Arc::clone(&seen);

        // Act
        let _sub = listeners.subscribe(Box::new(move |u| {
            *seen_in_cb.lock().unwrap() = u.map(|u| u.uid.clone());
        }));

        // Assert
        assert_eq!(seen.lock().unwrap().as_deref(), Some("u1"));
    }

    #[test]
    fn test_notify_reaches_every_subscriber() {
        // Arrange
        let listeners = AuthStateListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let _a = listeners.subscribe(counting(&calls));
        let _b = listeners.subscribe(counting(&calls));

        // Act
        listeners.notify(None);

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(listeners.current(), Some(None));
    }

    #[test]
    fn test_dropped_subscription_stops_callbacks() {
        // Arrange
        let listeners = AuthStateListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = listeners.subscribe(counting(&calls));

        // Act
        drop(sub);
        listeners.notify(Some(user("u1")));

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(listeners.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_removes_only_its_callback() {
        // Arrange
        let listeners = AuthStateListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = listeners.subscribe(counting(&calls));
        let _second = listeners.subscribe(counting(&calls));

        // Act
        first.unsubscribe();
        listeners.notify(None);

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(listeners.subscriber_count(), 1);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        // Arrange
        let listeners = AuthStateListeners::new();
        let sub = listeners.subscribe(Box::new(|_| {}));

        // Act
        drop(listeners);

        // Assert (drop must not panic)
        drop(sub);
    }
}
