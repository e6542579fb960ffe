//! Presence hook: the current user as reactive state.
//!
//! ARCHITECTURE
//! ============
//! On mount, one verification call runs while the state reads `loading`.
//! For the lifetime of the mount a subscription to auth-state changes keeps
//! the state current: sign-in and refresh events re-verify, a sign-out
//! clears immediately (absence is certain, no round-trip needed).
//!
//! CONCURRENCY
//! ===========
//! Verifications settle in any order relative to events. A generation
//! counter makes the state last-writer-wins by issue time, not by arrival
//! time: each re-verification bumps the generation, and a settling call
//! whose generation is no longer current is discarded.

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;

use std::cell::Cell;
use std::rc::Rc;

use leptos::prelude::*;

use session::{AuthEvent, AuthUser};

use crate::net::gateway::AuthClient;

/// Authentication state exposed to presentation components.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresenceState {
    /// The verified user, when authenticated.
    pub user: Option<AuthUser>,
    /// A verification is outstanding.
    pub loading: bool,
    /// Verification failed; unknown is not the same as signed out.
    pub error: Option<String>,
}

impl PresenceState {
    /// Initial state while the mount verification is in flight.
    #[must_use]
    pub fn pending() -> Self {
        Self { user: None, loading: true, error: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// State after a verification settles.
pub(crate) fn settled(result: Result<Option<AuthUser>, String>) -> PresenceState {
    match result {
        Ok(user) => PresenceState { user, loading: false, error: None },
        Err(error) => PresenceState { user: None, loading: false, error: Some(error) },
    }
}

/// State after a signed-out event: cleared, certain, no error.
pub(crate) fn signed_out() -> PresenceState {
    PresenceState { user: None, loading: false, error: None }
}

/// Generation counter discarding out-of-order async settles. Cheap to clone;
/// clones share the counter.
#[derive(Clone, Default)]
pub(crate) struct StaleGuard {
    current: Rc<Cell<u64>>,
}

impl StaleGuard {
    /// Start a new verification; anything older is now stale.
    pub(crate) fn begin(&self) -> u64 {
        self.current.set(self.current.get() + 1);
        self.current.get()
    }

    /// Whether a settling verification may still write state.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current.get() == generation
    }

    /// Invalidate every in-flight verification without starting one.
    pub(crate) fn invalidate(&self) {
        self.current.set(self.current.get() + 1);
    }
}

/// Reactive binding to the current user.
///
/// Issues a verification on mount, re-verifies on sign-in/refresh events,
/// clears on sign-out, and cancels its subscription on cleanup. The
/// verification in flight at teardown is not cancelled, just discarded when
/// it arrives.
pub fn use_presence() -> RwSignal<PresenceState> {
    let client = expect_context::<AuthClient>();
    let state = RwSignal::new(PresenceState::pending());
    let guard = StaleGuard::default();

    refresh(client.clone(), state, &guard);

    let subscription = client.clone().on_auth_state_change({
        let guard = guard.clone();
        move |event| match event {
            AuthEvent::SignedOut => {
                guard.invalidate();
                state.set(signed_out());
            }
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed | AuthEvent::UserUpdated => {
                state.update(|s| s.loading = true);
                refresh(client.clone(), state, &guard);
            }
        }
    });
    on_cleanup(move || subscription.unsubscribe());

    state
}

fn refresh(client: AuthClient, state: RwSignal<PresenceState>, guard: &StaleGuard) {
    let generation = guard.begin();
    let guard = guard.clone();
    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        let result = client.get_current_user().await;
        if guard.is_current(generation) {
            state.set(settled(result));
        }
    });
    #[cfg(not(feature = "csr"))]
    {
        // No browser, no session: settle synchronously as signed out.
        let _ = client;
        if guard.is_current(generation) {
            state.set(settled(Ok(None)));
        }
    }
}
