use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::page::{ListQuery, Page};
use crate::store::{Keyed, ListStore, Patch, UiState};

/// Everything one list view owns.
#[derive(Debug)]
pub struct ListState<T: Keyed> {
    pub store: ListStore<T>,
    pub cursor: Cursor,
    pub query: ListQuery,
    /// Bumped by every reset; results stamped with an older value are dropped.
    pub generation: u64,
    /// Set once the view is gone.
    pub detached: bool,
}

impl<T: Keyed> ListState<T> {
    pub fn new(query: ListQuery, limit: u64) -> Self {
        Self {
            store: ListStore::new(),
            cursor: Cursor::new(limit),
            query,
            generation: 0,
            detached: false,
        }
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.cursor.reset();
        self.generation += 1;
    }

    pub fn append_page(&mut self, page: Page<T>) {
        let skip = page.skip;
        self.store.append_page(page);
        self.cursor.merged(skip, self.store.has_more());
    }

    /// Whether a result requested under `generation` may still be applied.
    pub fn accepts(&self, generation: u64) -> bool {
        !self.detached && self.generation == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page with this many items was merged.
    Loaded(usize),
    /// Already loading, exhausted, or detached; nothing was requested.
    Skipped,
    /// The list was reset or detached while the request was out.
    Discarded,
}

type Observer = Arc<dyn Fn() + Send + Sync>;

/// A paginated list with optimistic local inserts.
///
/// Cloning is cheap and every clone drives the same list. The lock is only
/// taken for synchronous bookkeeping, never across a request.
pub struct FeedController<T: Keyed, F> {
    pub(crate) state: Arc<Mutex<ListState<T>>>,
    pub(crate) fetcher: Arc<F>,
    observer: Option<Observer>,
}

impl<T: Keyed, F> Clone for FeedController<T, F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fetcher: Arc::clone(&self.fetcher),
            observer: self.observer.clone(),
        }
    }
}

impl<T: Keyed, F> FeedController<T, F> {
    pub fn new(fetcher: Arc<F>, query: ListQuery, limit: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ListState::new(query, limit))),
            fetcher,
            observer: None,
        }
    }

    /// Called after every state change, outside the lock.
    pub fn with_observer(mut self, observer: impl Fn() + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub(crate) fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer();
        }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&ListState<T>) -> R) -> R {
        f(&self.state.lock())
    }

    pub(crate) fn update_state<R>(&self, f: impl FnOnce(&mut ListState<T>) -> R) -> R {
        let out = f(&mut self.state.lock());
        self.notify();
        out
    }

    pub fn query(&self) -> ListQuery {
        self.with_state(|s| s.query.clone())
    }

    pub fn has_more(&self) -> bool {
        self.with_state(|s| s.cursor.has_more())
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|s| s.cursor.is_loading())
    }

    pub fn len(&self) -> usize {
        self.with_state(|s| s.store.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.with_state(|s| s.store.iter().map(Keyed::key).collect())
    }

    pub fn ui(&self, key: &T::Key) -> UiState {
        self.with_state(|s| s.store.ui(key))
    }

    pub fn set_editing(&self, key: &T::Key, editing: bool) -> Patch {
        self.update_state(|s| s.store.update_ui(key, |ui| ui.editing = editing))
    }

    /// Start over with the current criteria.
    pub fn reset(&self) {
        self.update_state(ListState::reset);
    }

    /// Install new criteria (keyword, tab, flavor) and start over.
    pub fn set_query(&self, query: ListQuery) {
        self.update_state(|s| {
            s.query = query;
            s.reset();
        });
    }

    /// The owning view went away; pending results are dropped from now on.
    pub fn detach(&self) {
        self.state.lock().detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.with_state(|s| s.detached)
    }
}

impl<T: Keyed + Clone, F> FeedController<T, F> {
    pub fn snapshot(&self) -> Vec<T> {
        self.with_state(|s| s.store.iter().cloned().collect())
    }

    pub fn item(&self, key: &T::Key) -> Option<T> {
        self.with_state(|s| s.store.get(key).cloned())
    }
}

impl<T, F> FeedController<T, F>
where
    T: Keyed,
    F: PageFetcher<T>,
{
    /// Fetch and merge the next page.
    ///
    /// Calls made while a page is already on its way collapse into that one
    /// request. On failure the cursor stays put so the next call asks for the
    /// same window.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let (query, skip, limit, generation) = {
            let mut state = self.state.lock();
            if state.detached {
                return Ok(LoadOutcome::Skipped);
            }
            match state.cursor.begin() {
                Some((skip, limit)) => (state.query.clone(), skip, limit, state.generation),
                None => return Ok(LoadOutcome::Skipped),
            }
        };
        self.notify();

        let result = self.fetcher.fetch(&query, skip, limit).await;

        let outcome = {
            let mut state = self.state.lock();
            if !state.accepts(generation) {
                debug!(path = query.path(), skip, "page arrived for a stale list, dropped");
                return Ok(LoadOutcome::Discarded);
            }
            match result {
                Ok(page) => {
                    let count = page.items.len();
                    state.append_page(page);
                    Ok(LoadOutcome::Loaded(count))
                }
                Err(err) => {
                    warn!(path = query.path(), skip, limit, error = %err, "page fetch failed");
                    state.cursor.failed();
                    Err(err)
                }
            }
        };
        self.notify();
        outcome
    }
}
