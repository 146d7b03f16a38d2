//! Mutations against a feed.
//!
//! Data only changes after the server confirms, with one exception: binary
//! toggles whose outcome the client already knows are flipped immediately
//! and put back if the request fails.

use std::future::Future;

use tracing::{debug, warn};

use crate::controller::FeedController;
use crate::error::{FeedError, Result};
use crate::store::{Keyed, Patch};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
    Applied,
    Failed(FeedError),
}

/// Tracks one triggering control (a reply form, a gift button).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    state: MutationState,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == MutationState::Submitting
    }

    pub fn error(&self) -> Option<&FeedError> {
        match &self.state {
            MutationState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns false if an attempt is already out.
    pub fn begin(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.state = MutationState::Submitting;
        true
    }

    pub fn settle<R>(&mut self, result: &Result<R>) {
        self.state = match result {
            Ok(_) => MutationState::Applied,
            Err(err) => MutationState::Failed(err.clone()),
        };
    }

    /// Back to idle once a failure notice has been dismissed.
    pub fn dismiss(&mut self) {
        if !self.is_submitting() {
            self.state = MutationState::Idle;
        }
    }
}

/// A binary reaction the client can predict: thumbs, follows.
pub trait Toggle<T> {
    /// Fields as they were before the flip.
    type Saved;
    /// What the server answers with.
    type Confirmed;

    fn flip(&self, item: &mut T) -> Self::Saved;

    fn restore(&self, item: &mut T, saved: Self::Saved);

    fn confirm(&self, item: &mut T, confirmed: Self::Confirmed);
}

impl<T: Keyed, F> FeedController<T, F> {
    /// Mark `key` busy. Returns the patch to report instead when it is gone
    /// or already busy.
    fn claim(&self, key: &T::Key) -> Option<Patch> {
        self.update_state(|s| {
            if !s.store.contains(key) {
                return Some(Patch::Stale);
            }
            if s.store.ui(key).busy {
                return Some(Patch::Busy);
            }
            s.store.update_ui(key, |ui| ui.busy = true);
            None
        })
    }

    /// Add the server's copy of a newly created item once `request` succeeds.
    ///
    /// Returns the new key. If the list was reset or detached meanwhile the
    /// item is not added.
    pub async fn create<Fut>(&self, request: Fut) -> Result<T::Key>
    where
        Fut: Future<Output = Result<T>>,
    {
        let generation = self.with_state(|s| s.generation);
        let item = request.await.inspect_err(|err| {
            warn!(error = %err, "create failed");
        })?;
        let key = item.key();
        self.update_state(|s| {
            if s.accepts(generation) {
                s.store.add_local(item);
            } else {
                debug!(?key, "created item belongs to a stale list, not added");
            }
        });
        Ok(key)
    }

    /// Apply a confirmed change to `key`.
    pub async fn update<R, Fut, A>(&self, key: &T::Key, request: Fut, apply: A) -> Result<Patch>
    where
        Fut: Future<Output = Result<R>>,
        A: FnOnce(&mut T, R),
    {
        if let Some(patch) = self.claim(key) {
            return Ok(patch);
        }
        let result = request.await;
        self.update_state(|s| {
            s.store.update_ui(key, |ui| ui.busy = false);
            match result {
                Ok(response) => Ok(s.store.mutate_by_id(key, |item| apply(item, response))),
                Err(err) => {
                    warn!(?key, error = %err, "update failed");
                    Err(err)
                }
            }
        })
    }

    /// Remove `key` once the server confirms the delete.
    pub async fn delete<R, Fut>(&self, key: &T::Key, request: Fut) -> Result<Patch>
    where
        Fut: Future<Output = Result<R>>,
    {
        if let Some(patch) = self.claim(key) {
            return Ok(patch);
        }
        let result = request.await;
        self.update_state(|s| {
            s.store.update_ui(key, |ui| ui.busy = false);
            match result {
                Ok(_) if s.store.remove(key) => Ok(Patch::Applied),
                Ok(_) => Ok(Patch::Stale),
                Err(err) => {
                    warn!(?key, error = %err, "delete failed");
                    Err(err)
                }
            }
        })
    }

    /// Flip `key` now, confirm or roll back when `request` settles.
    ///
    /// A rollback is skipped when a fetched page delivered the item while the
    /// request was out; the server copy already replaced the flipped one.
    pub async fn toggle<G, Fut>(&self, key: &T::Key, toggle: G, request: Fut) -> Result<Patch>
    where
        G: Toggle<T>,
        Fut: Future<Output = Result<G::Confirmed>>,
    {
        let saved = self.update_state(|s| {
            if s.store.ui(key).busy {
                return Err(Patch::Busy);
            }
            let mut saved = None;
            match s.store.mutate_by_id(key, |item| saved = Some(toggle.flip(item))) {
                Patch::Applied => {
                    s.store.update_ui(key, |ui| ui.busy = true);
                    let fetched_at = s.store.fetched_at(key);
                    saved.map(|saved| (saved, fetched_at)).ok_or(Patch::Stale)
                }
                other => Err(other),
            }
        });
        let (saved, fetched_at) = match saved {
            Ok(saved) => saved,
            Err(patch) => return Ok(patch),
        };

        let result = request.await;
        self.update_state(|s| {
            s.store.update_ui(key, |ui| ui.busy = false);
            match result {
                Ok(confirmed) => Ok(s
                    .store
                    .mutate_by_id(key, |item| toggle.confirm(item, confirmed))),
                Err(err) => {
                    if s.store.fetched_at(key) == fetched_at {
                        warn!(?key, error = %err, "toggle rejected, rolling back");
                        s.store.mutate_by_id(key, |item| toggle.restore(item, saved));
                    } else {
                        warn!(?key, error = %err, "toggle rejected, keeping refreshed copy");
                    }
                    Err(err)
                }
            }
        })
    }
}
