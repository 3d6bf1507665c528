//! Change watchers.
//!
//! Two levels of observers are supported:
//!
//! - **Flag watchers** receive a flag's value whenever it is set, removed,
//!   defaulted or reset.
//! - **Watch-list observers** receive the list of watched flag names
//!   whenever a flag gains its first watcher or loses its last one.
//!
//! Every watcher is called once with the current state as soon as it is
//! registered. Callbacks run synchronously on the caller's thread and may
//! themselves read or mutate flags.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use switchboard_features::{Features, FlagValue};
//!
//! let features = Features::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let subscription = features.watch("beta", move |value| {
//!     sink.lock().unwrap().push(value.clone());
//! });
//!
//! features.enable("beta");
//! subscription.dispose();
//! features.disable("beta");
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![FlagValue::Boolean(false), FlagValue::Boolean(true)]
//! );
//! ```

use crate::emitter::{Callback, ListenerId};
use crate::features::{Features, Shared};
use crate::flag::FlagValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Topic carrying watch-list notifications.
const LIST_TOPIC: &str = "";

#[derive(Debug, Clone)]
enum Target {
    Flag(String),
    List,
}

/// Handle to a registered watcher.
///
/// Call [`dispose`](Self::dispose) to unregister. Dropping the handle
/// leaves the watcher registered.
#[derive(Debug)]
#[must_use = "a watcher can only be removed through its Subscription"]
pub struct Subscription {
    shared: Weak<Shared>,
    target: Target,
    id: ListenerId,
    disposed: AtomicBool,
}

impl Subscription {
    fn new(shared: &Arc<Shared>, target: Target, id: ListenerId) -> Self {
        Self {
            shared: Arc::downgrade(shared),
            target,
            id,
            disposed: AtomicBool::new(false),
        }
    }

    /// Unregister the watcher. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        let features = Features { shared };
        match &self.target {
            Target::Flag(name) => features.unwatch(name, self.id),
            Target::List => {
                features.shared.list_watchers.off(LIST_TOPIC, self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.disposed.load(Ordering::SeqCst) && self.shared.strong_count() > 0
    }

    /// Watched flag name, or `None` for a watch-list subscription
    pub fn flag(&self) -> Option<&str> {
        match &self.target {
            Target::Flag(name) => Some(name),
            Target::List => None,
        }
    }
}

impl Features {
    /// Watch a flag for any activation.
    ///
    /// Equivalent to [`watch_variant`](Self::watch_variant) with the tag
    /// `true`.
    pub fn watch<F>(&self, name: &str, callback: F) -> Subscription
    where
        F: Fn(&FlagValue) + Send + Sync + 'static,
    {
        self.watch_variant(name, FlagValue::Boolean(true), callback)
    }

    /// Watch a flag, recording the variant the watcher is interested in.
    ///
    /// The tag does not filter notifications; it is reported by
    /// [`options`](Self::options) so tooling can offer the variants a flag
    /// is watched for.
    pub fn watch_variant<F>(
        &self,
        name: &str,
        variant: impl Into<FlagValue>,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&FlagValue) + Send + Sync + 'static,
    {
        let callback: Callback<FlagValue> = Arc::new(callback);
        let registration = self
            .shared
            .watchers
            .on(name, variant.into(), callback.clone());

        callback(&self.resolve(name));

        if registration.first {
            debug!("Flag {} is now watched", name);
            self.notify_list();
        }

        Subscription::new(&self.shared, Target::Flag(name.to_string()), registration.id)
    }

    /// Observe changes to the set of watched flags.
    pub fn watch_list<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        let callback: Callback<Vec<String>> = Arc::new(move |names: &Vec<String>| {
            callback(names.as_slice())
        });
        let registration = self
            .shared
            .list_watchers
            .on(LIST_TOPIC, (), callback.clone());

        callback(&self.list());

        Subscription::new(&self.shared, Target::List, registration.id)
    }

    /// Flag names with at least one watcher.
    pub fn list(&self) -> Vec<String> {
        self.shared.watchers.topics()
    }

    /// Distinct variant tags watched for on a flag, in first-seen order.
    pub fn options(&self, name: &str) -> Vec<FlagValue> {
        let mut options: Vec<FlagValue> = Vec::new();
        for tag in self.shared.watchers.metas(name) {
            if !options.contains(&tag) {
                options.push(tag);
            }
        }
        options
    }

    /// Number of watchers on a flag
    pub fn watcher_count(&self, name: &str) -> usize {
        self.shared.watchers.listener_count(name)
    }

    pub(crate) fn notify_list(&self) {
        let names = self.list();
        self.shared.list_watchers.emit(LIST_TOPIC, &names);
    }

    fn unwatch(&self, name: &str, id: ListenerId) {
        if self.shared.watchers.off(name, id) == Some(true) {
            debug!("Flag {} is no longer watched", name);
            self.notify_list();
        }
    }
}
