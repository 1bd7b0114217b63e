use std::sync::Mutex;

/// Listener invoked with the new state on every login/logout transition.
pub type SessionListener = Box<dyn Fn(bool) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`], usable to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Shared logged-in/logged-out state with synchronous change notification.
///
/// This replaces the original portal's global flag plus broadcast event with
/// one explicitly owned store: the API client and the login/registration
/// flow are its only writers, UI layers subscribe instead of closing over
/// shared mutable state.
///
/// `logged_in` is true iff an access token is believed present; expiry is
/// discovered reactively via a 401, never checked locally. Listeners fire
/// only on actual transitions, so a forced logout emits exactly one
/// notification no matter how many requests fail afterwards.
pub struct SessionStore {
    logged_in: Mutex<bool>,
    listeners: Mutex<Vec<(u64, SessionListener)>>,
    next_id: Mutex<u64>,
}

impl SessionStore {
    /// Create a store with an initial state, normally derived from whether a
    /// persisted access token exists.
    #[must_use]
    pub fn new(logged_in: bool) -> Self {
        Self {
            logged_in: Mutex::new(logged_in),
            listeners: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a listener for state transitions. The listener is called
    /// synchronously from whichever writer performs the transition.
    pub fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        let id = *next;
        *next += 1;
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        SubscriptionId(id)
    }

    /// Remove a previously registered listener. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id.0);
        listeners.len() != before
    }

    /// Flip to logged-in. Writers: login/registration flow only.
    pub fn set_logged_in(&self) {
        self.transition(true);
    }

    /// Flip to logged-out. Writers: explicit logout and the API client's
    /// forced-logout paths (refresh impossible or failed).
    pub fn set_logged_out(&self) {
        self.transition(false);
    }

    fn transition(&self, new_state: bool) {
        {
            let mut state = self.logged_in.lock().unwrap_or_else(|e| e.into_inner());
            if *state == new_state {
                return;
            }
            *state = new_state;
        }
        // Notify outside the state lock so listeners may read the store.
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for (_, listener) in listeners.iter() {
            listener(new_state);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .field(
                "listeners",
                &self.listeners.lock().unwrap_or_else(|e| e.into_inner()).len(),
            )
            .finish()
    }
}
