use crate::notice::{LogNotifier, Notice, Notifier};
use pitlane_http::{ClientError, Session};
use pitlane_types::{EngagementState, LikeDelta, Likeable};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

/// Local state that can be changed ahead of the server and rolled back
pub trait OptimisticState: Debug + Clone + Send {
    type Delta: Debug + Copy + Send;

    /// Applies the change and returns what it did
    fn apply(&mut self) -> Self::Delta;

    /// Inverts exactly what `apply` returned
    fn revert(&mut self, delta: Self::Delta);
}

impl OptimisticState for EngagementState {
    type Delta = LikeDelta;

    fn apply(&mut self) -> LikeDelta {
        self.toggle()
    }

    fn revert(&mut self, delta: LikeDelta) {
        EngagementState::revert(self, delta)
    }
}

/// Read marker of a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadMark {
    pub read: bool,
}

impl OptimisticState for ReadMark {
    /// Whether it was read before
    type Delta = bool;

    fn apply(&mut self) -> bool {
        let was_read = self.read;
        self.read = true;
        was_read
    }

    fn revert(&mut self, was_read: bool) {
        self.read = was_read;
    }
}

/// What to do when a second mutation hits an item whose first is still out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reentrancy {
    /// Reject it with [`ToggleOutcome::Busy`] until the first settles
    #[default]
    Serialize,
    /// Let it through; each failure reverts only its own change
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome<S> {
    /// The server accepted the change; no resync needed
    Confirmed(S),
    /// Another mutation on the item is still pending
    Busy,
    /// The request failed and the local change was undone
    Reverted { state: S, reason: String },
}

/// A change applied locally whose request has not settled yet
#[derive(Debug)]
#[must_use = "a pending change must be settled with its request result"]
pub struct Pending<S: OptimisticState> {
    item_id: String,
    delta: S::Delta,
    /// State the view renders while the request is out
    pub optimistic: S,
}

impl<S: OptimisticState> Pending<S> {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

#[derive(Debug, Clone)]
struct Entry<S> {
    state: S,
    pending: u32,
}

/// Optimistic mutation store keyed by item id.
///
/// Every entry is independent; only mutations on the same item interact, and
/// how they interact is set by [`Reentrancy`].
#[derive(Debug)]
pub struct OptimisticBoard<S: OptimisticState> {
    session: Arc<dyn Session>,
    policy: Reentrancy,
    entries: Mutex<HashMap<String, Entry<S>>>,
    notifier: Arc<dyn Notifier>,
}

pub type EngagementBoard = OptimisticBoard<EngagementState>;
pub type ReadBoard = OptimisticBoard<ReadMark>;

impl<S: OptimisticState> OptimisticBoard<S> {
    pub fn new(session: Arc<dyn Session>, policy: Reentrancy) -> Self {
        OptimisticBoard {
            session,
            policy,
            entries: Mutex::new(HashMap::new()),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn policy(&self) -> Reentrancy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<S>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts tracking `item_id`. An id the board already holds keeps its
    /// local state; cached list items may predate a confirmed change.
    pub fn insert(&self, item_id: impl Into<String>, state: S) {
        self.lock()
            .entry(item_id.into())
            .or_insert(Entry { state, pending: 0 });
    }

    /// Overwrites `item_id` with state the server just returned. An entry with
    /// a mutation in flight keeps its local state.
    pub fn resync(&self, item_id: impl Into<String>, state: S) {
        let mut entries = self.lock();
        let entry = entries.entry(item_id.into()).or_insert(Entry {
            state: state.clone(),
            pending: 0,
        });
        if entry.pending == 0 {
            entry.state = state;
        }
    }

    pub fn forget(&self, item_id: &str) {
        self.lock().remove(item_id);
    }

    pub fn state(&self, item_id: &str) -> Option<S> {
        self.lock().get(item_id).map(|entry| entry.state.clone())
    }

    pub fn is_pending(&self, item_id: &str) -> bool {
        self.lock()
            .get(item_id)
            .map(|entry| entry.pending > 0)
            .unwrap_or(false)
    }

    /// Applies the change locally, before any network round-trip.
    ///
    /// Fails with [`ClientError::SignInRequired`] without touching state when
    /// no one is signed in. Returns `None` when the item is busy under
    /// [`Reentrancy::Serialize`].
    pub fn begin(&self, item_id: &str) -> Result<Option<Pending<S>>, ClientError> {
        if !self.session.is_authenticated() {
            debug!("Rejecting change on {} without a session", item_id);
            return Err(ClientError::SignInRequired);
        }

        let mut entries = self.lock();
        let entry = entries
            .get_mut(item_id)
            .ok_or_else(|| ClientError::UnknownItem(item_id.to_string()))?;

        if self.policy == Reentrancy::Serialize && entry.pending > 0 {
            debug!("Change on {} still pending", item_id);
            return Ok(None);
        }

        let delta = entry.state.apply();
        entry.pending += 1;

        Ok(Some(Pending {
            item_id: item_id.to_string(),
            delta,
            optimistic: entry.state.clone(),
        }))
    }

    /// Settles a pending change with the result of its request
    pub fn settle(&self, pending: Pending<S>, result: Result<(), ClientError>) -> ToggleOutcome<S> {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&pending.item_id) else {
            debug!("Item {} was forgotten before its change settled", pending.item_id);
            return match result {
                Ok(()) => ToggleOutcome::Confirmed(pending.optimistic),
                Err(e) => ToggleOutcome::Reverted {
                    state: pending.optimistic,
                    reason: e.to_string(),
                },
            };
        };

        entry.pending = entry.pending.saturating_sub(1);

        match result {
            Ok(()) => ToggleOutcome::Confirmed(entry.state.clone()),
            Err(e) => {
                warn!("Reverting change on {}: {}", pending.item_id, e);
                entry.state.revert(pending.delta);
                let state = entry.state.clone();
                drop(entries);

                self.notifier
                    .notify(Notice::error(format!("Couldn't save your change: {e}")));
                ToggleOutcome::Reverted {
                    state,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Applies the change, issues `call`, and reverts if it fails
    #[instrument(skip(self, call))]
    pub async fn run<F, Fut>(
        &self,
        item_id: &str,
        call: F,
    ) -> Result<ToggleOutcome<S>, ClientError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<(), ClientError>>,
    {
        let pending = match self.begin(item_id)? {
            Some(pending) => pending,
            None => return Ok(ToggleOutcome::Busy),
        };

        let result = call(item_id.to_string()).await;
        Ok(self.settle(pending, result))
    }
}

impl OptimisticBoard<EngagementState> {
    /// Seeds like state for posts or comments the board has not seen yet.
    ///
    /// Items already on the board are left alone, so handing over a list that
    /// still carries pre-toggle `likes` cannot undo a confirmed change.
    pub fn track<I: Likeable>(&self, items: &[I]) {
        let user_id = self.session.current_user_id();
        for item in items {
            self.insert(
                item.id(),
                EngagementState::from_likes(item.likes(), user_id.as_deref()),
            );
        }
    }

    /// Replaces like state from a fresh server fetch, e.g. after
    /// [`PaginatedLoader::refresh`](crate::loader::PaginatedLoader::refresh)
    pub fn resync_from<I: Likeable>(&self, items: &[I]) {
        let user_id = self.session.current_user_id();
        for item in items {
            self.resync(
                item.id(),
                EngagementState::from_likes(item.likes(), user_id.as_deref()),
            );
        }
    }
}
