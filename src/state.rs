//! Shared observable application state
//!
//! `Store<S>` is the single source of truth for cross-feature data. Every
//! clone aliases the same underlying value, so there is exactly one
//! `AppState` per running application no matter how many handles exist.
//!
//! Mutations funnel through `watch::Sender::send_modify`, which serializes
//! writers and publishes one committed snapshot per mutation — observers
//! never see a half-applied compound write. Reads always observe the latest
//! committed value.
//!
//! Sub-fields are addressed through `Lens` values (typed key paths), so a
//! consumer can read or write one field without touching the rest of the
//! tree.

use crate::types::{Adopter, AuthSession};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use tokio::sync::watch;
use uuid::Uuid;

/// A stable, typed path from a state root `S` to a field `A`
///
/// Constructed from a pair of accessor functions; const-constructible so
/// lenses can be published as associated consts on the state type.
pub struct Lens<S, A> {
    get: fn(&S) -> &A,
    get_mut: fn(&mut S) -> &mut A,
}

impl<S, A> Lens<S, A> {
    pub const fn new(get: fn(&S) -> &A, get_mut: fn(&mut S) -> &mut A) -> Self {
        Self { get, get_mut }
    }

    /// Project a shared reference through the lens
    pub fn view<'a>(&self, root: &'a S) -> &'a A {
        (self.get)(root)
    }

    /// Project a mutable reference through the lens
    pub fn view_mut<'a>(&self, root: &'a mut S) -> &'a mut A {
        (self.get_mut)(root)
    }
}

// Manual impls: derive would bound S and A.
impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, A> Copy for Lens<S, A> {}

/// Shared observable value holder
///
/// Backed by a `tokio::sync::watch` channel: the sender side holds the
/// value, receivers observe committed snapshots. `Clone` shares the same
/// channel (and therefore the same value).
pub struct Store<S> {
    tx: watch::Sender<S>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Store<S> {
    /// Create a store owning `initial`
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Read one field through a lens
    pub fn get<A: Clone>(&self, lens: Lens<S, A>) -> A {
        lens.view(&self.tx.borrow()).clone()
    }

    /// Replace one field through a lens
    pub fn set<A>(&self, lens: Lens<S, A>, value: A) {
        self.tx.send_modify(|state| {
            *lens.view_mut(state) = value;
        });
    }

    /// Apply a compound mutation to one field through a lens
    ///
    /// The closure runs under the store's write path; the new snapshot is
    /// published only after it returns, so observers never see an
    /// intermediate state.
    pub fn update<A, R>(&self, lens: Lens<S, A>, f: impl FnOnce(&mut A) -> R) -> R {
        let mut out = None;
        self.tx.send_modify(|state| {
            out = Some(f(lens.view_mut(state)));
        });
        // send_modify always runs the closure
        out.expect("send_modify ran")
    }

    /// Read the whole state tree as a committed snapshot
    pub fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Observe committed snapshots
    ///
    /// The receiver sees every committed mutation (coalesced under load),
    /// never an intermediate one.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Insert into a set-valued field; returns whether the set changed
    pub fn insert<T>(&self, lens: Lens<S, HashSet<T>>, value: T) -> bool
    where
        T: Eq + Hash,
    {
        self.update(lens, |set| set.insert(value))
    }

    /// Remove from a set-valued field; returns whether the value was present
    pub fn remove<T>(&self, lens: Lens<S, HashSet<T>>, value: &T) -> bool
    where
        T: Eq + Hash,
    {
        self.update(lens, |set| set.remove(value))
    }

    /// Membership test on a set-valued field
    pub fn contains<T>(&self, lens: Lens<S, HashSet<T>>, value: &T) -> bool
    where
        T: Eq + Hash,
    {
        lens.view(&self.tx.borrow()).contains(value)
    }
}

// ─── Application state tree ──────────────────────────────────────

/// Root of the Pawsinus application state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub user_data: UserData,
    pub session: SessionState,
    pub view: ViewState,
}

/// Per-user data cached on the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Dogs the user has liked
    pub liked_dog_ids: HashSet<Uuid>,

    /// Cached adopter profile, once loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Adopter>,
}

/// Authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSession>,
}

/// Transient UI flags (not persisted)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Current search text on the browse screen
    pub search_text: String,

    pub onboarding_complete: bool,
}

impl AppState {
    pub const USER_DATA: Lens<AppState, UserData> =
        Lens::new(|s| &s.user_data, |s| &mut s.user_data);

    pub const LIKED_DOG_IDS: Lens<AppState, HashSet<Uuid>> = Lens::new(
        |s| &s.user_data.liked_dog_ids,
        |s| &mut s.user_data.liked_dog_ids,
    );

    pub const PROFILE: Lens<AppState, Option<Adopter>> = Lens::new(
        |s| &s.user_data.profile,
        |s| &mut s.user_data.profile,
    );

    pub const AUTH: Lens<AppState, Option<AuthSession>> =
        Lens::new(|s| &s.session.auth, |s| &mut s.session.auth);

    pub const SEARCH_TEXT: Lens<AppState, String> = Lens::new(
        |s| &s.view.search_text,
        |s| &mut s.view.search_text,
    );

    pub const ONBOARDING_COMPLETE: Lens<AppState, bool> = Lens::new(
        |s| &s.view.onboarding_complete,
        |s| &mut s.view.onboarding_complete,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_after_write() {
        let store = Store::new(AppState::default());
        store.set(AppState::SEARCH_TEXT, "jindo".to_string());
        assert_eq!(store.get(AppState::SEARCH_TEXT), "jindo");

        store.set(AppState::ONBOARDING_COMPLETE, true);
        assert!(store.get(AppState::ONBOARDING_COMPLETE));
        // Earlier write still intact
        assert_eq!(store.get(AppState::SEARCH_TEXT), "jindo");
    }

    #[test]
    fn test_clones_alias_one_value() {
        let a = Store::new(AppState::default());
        let b = a.clone();

        let id = Uuid::new_v4();
        a.insert(AppState::LIKED_DOG_IDS, id);

        assert!(b.contains(AppState::LIKED_DOG_IDS, &id));
        assert_eq!(b.get(AppState::LIKED_DOG_IDS).len(), 1);
    }

    #[test]
    fn test_set_insert_remove() {
        let store = Store::new(AppState::default());
        let id = Uuid::new_v4();

        assert!(store.insert(AppState::LIKED_DOG_IDS, id));
        // Second insert is a no-op
        assert!(!store.insert(AppState::LIKED_DOG_IDS, id));
        assert!(store.contains(AppState::LIKED_DOG_IDS, &id));

        assert!(store.remove(AppState::LIKED_DOG_IDS, &id));
        assert!(!store.remove(AppState::LIKED_DOG_IDS, &id));
        assert!(!store.contains(AppState::LIKED_DOG_IDS, &id));
    }

    #[test]
    fn test_update_returns_closure_result() {
        let store = Store::new(AppState::default());
        let len = store.update(AppState::SEARCH_TEXT, |text| {
            text.push_str("corgi");
            text.len()
        });
        assert_eq!(len, 5);
    }

    #[tokio::test]
    async fn test_compound_mutation_is_not_observable_half_applied() {
        let store = Store::new(AppState::default());
        let mut rx = store.subscribe();

        let id1 = Uuid::new_v4();
        let id2 = Uuid::new_v4();

        // Two inserts inside one update commit as one snapshot
        store.update(AppState::LIKED_DOG_IDS, |set| {
            set.insert(id1);
            set.insert(id2);
        });

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().user_data.liked_dog_ids.len();
        assert_eq!(seen, 2, "observer saw a torn compound mutation");
    }

    #[tokio::test]
    async fn test_concurrent_writers_serialize() {
        let store = Store::new(AppState::default());

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.insert(AppState::LIKED_DOG_IDS, Uuid::new_v4());
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get(AppState::LIKED_DOG_IDS).len(), 400);
    }
}
