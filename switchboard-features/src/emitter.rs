//! Topic-keyed listener registry.
//!
//! Listeners are invoked synchronously, in registration order, from a
//! snapshot taken at the start of each emission. A listener may register or
//! remove listeners (or emit again) while it runs; those changes apply to
//! the next emission.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Identity of a registered listener
pub type ListenerId = u64;

/// Shared listener callback.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listener<T, M> {
    id: ListenerId,
    meta: M,
    callback: Callback<T>,
}

struct Topic<T, M> {
    name: String,
    listeners: Vec<Listener<T, M>>,
}

/// Outcome of [`Emitter::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Identity used to remove the listener
    pub id: ListenerId,
    /// The topic had no listeners before this one
    pub first: bool,
}

/// Publish/subscribe registry keyed by topic name.
///
/// Each listener carries a piece of metadata `M` the registry never
/// interprets. Topics are kept in first-registration order and dropped once
/// their last listener is removed.
pub struct Emitter<T, M = ()> {
    topics: Mutex<Vec<Topic<T, M>>>,
    next_id: AtomicU64,
}

impl<T, M: Clone> Emitter<T, M> {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener on `topic`.
    pub fn on(&self, topic: &str, meta: M, callback: Callback<T>) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener = Listener { id, meta, callback };

        let mut topics = self.topics.lock();
        let first = match topics.iter_mut().find(|t| t.name == topic) {
            Some(existing) => {
                existing.listeners.push(listener);
                false
            }
            None => {
                topics.push(Topic {
                    name: topic.to_string(),
                    listeners: vec![listener],
                });
                true
            }
        };

        Registration { id, first }
    }

    /// Remove a listener.
    ///
    /// Returns `None` if the listener was not registered (already removed),
    /// otherwise whether `topic` is now without listeners.
    pub fn off(&self, topic: &str, id: ListenerId) -> Option<bool> {
        let mut topics = self.topics.lock();
        let index = topics.iter().position(|t| t.name == topic)?;

        let listeners = &mut topics[index].listeners;
        let position = listeners.iter().position(|l| l.id == id)?;
        listeners.remove(position);

        if listeners.is_empty() {
            topics.remove(index);
            Some(true)
        } else {
            Some(false)
        }
    }

    /// Invoke every listener of `topic` with `value`.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, topic: &str, value: &T) -> usize {
        let snapshot: Vec<Callback<T>> = {
            let topics = self.topics.lock();
            match topics.iter().find(|t| t.name == topic) {
                Some(t) => t.listeners.iter().map(|l| l.callback.clone()).collect(),
                None => return 0,
            }
        };

        trace!("Emitting on {:?} to {} listener(s)", topic, snapshot.len());
        for callback in &snapshot {
            callback(value);
        }
        snapshot.len()
    }

    pub fn has_listeners(&self, topic: &str) -> bool {
        self.topics.lock().iter().any(|t| t.name == topic)
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .iter()
            .find(|t| t.name == topic)
            .map(|t| t.listeners.len())
            .unwrap_or(0)
    }

    /// Topics with at least one listener
    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().iter().map(|t| t.name.clone()).collect()
    }

    /// Metadata of each listener on `topic`, in registration order
    pub fn metas(&self, topic: &str) -> Vec<M> {
        self.topics
            .lock()
            .iter()
            .find(|t| t.name == topic)
            .map(|t| t.listeners.iter().map(|l| l.meta.clone()).collect())
            .unwrap_or_default()
    }
}

impl<T, M: Clone> Default for Emitter<T, M> {
    fn default() -> Self {
        Self::new()
    }
}
