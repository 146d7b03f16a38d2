//! Merge-and-append store.
//!
//! Holds the fetched history of a list plus the items this session created
//! and has not yet seen come back from the server. A key lives in exactly one
//! of the two orders; a fetched page always wins over the local copy.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::page::Page;

/// Items with a stable server-assigned identity.
pub trait Keyed {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

/// Result of an in-place change addressed by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    Applied,
    /// The key is gone; the change was dropped.
    Stale,
    /// Another mutation on this item is still in flight.
    Busy,
}

/// Presentation-only flags, never sent to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub editing: bool,
    pub busy: bool,
}

#[derive(Debug, Clone)]
pub struct ListStore<T: Keyed> {
    items: HashMap<T::Key, T>,
    historical: Vec<T::Key>,
    local: Vec<T::Key>,
    ui: HashMap<T::Key, UiState>,
    /// Page sequence number that last delivered each fetched key.
    fetched: HashMap<T::Key, u64>,
    pages: u64,
    has_more: bool,
}

impl<T: Keyed> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            historical: Vec::new(),
            local: Vec::new(),
            ui: HashMap::new(),
            fetched: HashMap::new(),
            pages: 0,
            has_more: true,
        }
    }
}

impl<T: Keyed> ListStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.historical.clear();
        self.local.clear();
        self.ui.clear();
        self.fetched.clear();
        self.has_more = true;
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.historical.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge a fetched page. A page at skip 0 starts the history over.
    pub fn append_page(&mut self, page: Page<T>) {
        self.has_more = page.has_more();
        self.pages += 1;

        if page.skip == 0 {
            for key in self.historical.drain(..) {
                self.items.remove(&key);
                self.fetched.remove(&key);
            }
        }

        for item in page.items {
            let key = item.key();
            if let Some(pos) = self.local.iter().position(|k| *k == key) {
                self.local.remove(pos);
                self.historical.push(key.clone());
            } else if !self.items.contains_key(&key) {
                self.historical.push(key.clone());
            }
            // Either new, promoted from local, or a refresh of a row we already
            // hold because the server's offsets shifted.
            self.fetched.insert(key.clone(), self.pages);
            self.items.insert(key, item);
        }

        let items = &self.items;
        self.ui.retain(|key, _| items.contains_key(key));
    }

    /// Track an item the server just confirmed creating.
    pub fn add_local(&mut self, item: T) {
        let key = item.key();
        if !self.items.contains_key(&key) {
            self.local.push(key.clone());
        }
        self.items.insert(key, item);
    }

    pub fn remove_local(&mut self, key: &T::Key) -> bool {
        match self.local.iter().position(|k| k == key) {
            Some(pos) => {
                self.local.remove(pos);
                self.forget(key);
                true
            }
            None => false,
        }
    }

    pub fn remove_historical(&mut self, key: &T::Key) -> bool {
        match self.historical.iter().position(|k| k == key) {
            Some(pos) => {
                self.historical.remove(pos);
                self.forget(key);
                true
            }
            None => false,
        }
    }

    /// Remove from whichever order holds the key.
    pub fn remove(&mut self, key: &T::Key) -> bool {
        self.remove_local(key) || self.remove_historical(key)
    }

    fn forget(&mut self, key: &T::Key) {
        self.items.remove(key);
        self.ui.remove(key);
        self.fetched.remove(key);
    }

    /// Changes whenever a fetched page delivers `key`; `None` for items that
    /// only exist locally or not at all.
    pub fn fetched_at(&self, key: &T::Key) -> Option<u64> {
        self.fetched.get(key).copied()
    }

    pub fn mutate_by_id<F>(&mut self, key: &T::Key, patch: F) -> Patch
    where
        F: FnOnce(&mut T),
    {
        match self.items.get_mut(key) {
            Some(item) => {
                patch(item);
                Patch::Applied
            }
            None => {
                debug!(?key, "patch for missing item dropped");
                Patch::Stale
            }
        }
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.items.contains_key(key)
    }

    pub fn is_local(&self, key: &T::Key) -> bool {
        self.local.contains(key)
    }

    /// History in fetch order, then local items in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.historical
            .iter()
            .chain(self.local.iter())
            .filter_map(|key| self.items.get(key))
    }

    pub fn view(&self) -> Vec<&T> {
        self.iter().collect()
    }

    pub fn ui(&self, key: &T::Key) -> UiState {
        self.ui.get(key).copied().unwrap_or_default()
    }

    pub fn update_ui<F>(&mut self, key: &T::Key, f: F) -> Patch
    where
        F: FnOnce(&mut UiState),
    {
        if !self.items.contains_key(key) {
            return Patch::Stale;
        }
        let state = self.ui.entry(key.clone()).or_default();
        f(state);
        if *state == UiState::default() {
            self.ui.remove(key);
        }
        Patch::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{item, keys, page, Item};
    use pretty_assertions::assert_eq;

    fn store_with(items: &[u32], total: u64) -> ListStore<Item> {
        let mut store = ListStore::new();
        store.append_page(page(0, items.len() as u64, items, total));
        store
    }

    #[test]
    fn test_local_item_is_replaced_by_fetched_copy() {
        let mut store = store_with(&[1, 2], 4);
        store.add_local(item(3, "draft"));
        assert_eq!(store.get(&3).map(|i| i.body.as_str()), Some("draft"));

        store.append_page(Page {
            items: vec![item(3, "server"), item(4, "x")],
            skip: 2,
            limit: 2,
            total: 4,
        });

        assert_eq!(keys(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.get(&3).map(|i| i.body.as_str()), Some("server"));
        assert!(!store.is_local(&3));
    }

    #[test]
    fn test_first_page_replaces_history_but_keeps_local() {
        let mut store = store_with(&[1, 2], 10);
        store.add_local(item(99, ""));
        store.append_page(page(0, 2, &[5, 6], 10));
        assert_eq!(keys(&store), vec![5, 6, 99]);
        assert!(!store.contains(&1));
    }

    #[test]
    fn test_first_page_takes_over_local_key() {
        let mut store = store_with(&[1, 2], 10);
        store.add_local(item(99, "draft"));
        store.append_page(Page {
            items: vec![item(5, ""), item(99, "server")],
            skip: 0,
            limit: 2,
            total: 10,
        });

        assert_eq!(keys(&store), vec![5, 99]);
        assert!(!store.is_local(&99));
        assert_eq!(store.get(&99).map(|i| i.body.as_str()), Some("server"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_fetched_at_moves_with_every_delivery() {
        let mut store = store_with(&[1, 2], 6);
        store.add_local(item(9, ""));
        let first = store.fetched_at(&2);
        assert!(first.is_some());
        assert_eq!(store.fetched_at(&9), None);

        store.append_page(page(2, 2, &[3, 4], 6));
        assert_eq!(store.fetched_at(&2), first);

        store.append_page(page(4, 2, &[2, 5], 6));
        assert_ne!(store.fetched_at(&2), first);

        store.remove(&2);
        assert_eq!(store.fetched_at(&2), None);
    }

    #[test]
    fn test_shifted_page_does_not_duplicate() {
        let mut store = store_with(&[1, 2], 6);
        // Someone posted in between; the old #2 shows up again at offset 2.
        store.append_page(page(2, 2, &[2, 3], 6));
        assert_eq!(keys(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_order_is_stable_across_local_adds_and_patches() {
        let mut store = store_with(&[1, 2, 3], 9);
        store.add_local(item(50, ""));
        assert_eq!(store.mutate_by_id(&2, |i| i.count += 5), Patch::Applied);
        store.add_local(item(51, ""));
        assert_eq!(store.mutate_by_id(&1, |i| i.body.push('!')), Patch::Applied);
        store.append_page(page(3, 3, &[4, 5, 6], 9));

        assert_eq!(keys(&store), vec![1, 2, 3, 4, 5, 6, 50, 51]);
        assert_eq!(store.get(&2).map(|i| i.count), Some(5));
    }

    #[test]
    fn test_removal_is_idempotent() {
        let mut store = store_with(&[1, 2, 3], 3);
        store.add_local(item(7, ""));

        assert!(store.remove_historical(&2));
        assert!(store.remove_local(&7));
        let once = keys(&store);

        assert!(!store.remove_historical(&2));
        assert!(!store.remove_local(&7));
        assert!(!store.remove(&2));
        assert_eq!(keys(&store), once);
        assert_eq!(once, vec![1, 3]);
    }

    #[test]
    fn test_remove_historical_ignores_local_keys() {
        let mut store = store_with(&[1], 1);
        store.add_local(item(2, ""));
        assert!(!store.remove_historical(&2));
        assert!(store.remove(&2));
        assert_eq!(keys(&store), vec![1]);
    }

    #[test]
    fn test_stale_patch_is_noop() {
        let mut store = store_with(&[1], 1);
        let before = keys(&store);
        assert_eq!(store.mutate_by_id(&42, |i| i.count = 100), Patch::Stale);
        assert_eq!(store.update_ui(&42, |ui| ui.editing = true), Patch::Stale);
        assert_eq!(keys(&store), before);
        assert_eq!(store.ui(&42), UiState::default());
    }

    #[test]
    fn test_ui_state_is_dropped_with_item() {
        let mut store = store_with(&[1, 2], 2);
        store.update_ui(&1, |ui| ui.editing = true);
        assert!(store.ui(&1).editing);
        assert_eq!(store.get(&1).map(|i| i.body.as_str()), Some(""));

        store.remove(&1);
        assert_eq!(store.ui(&1), UiState::default());

        store.update_ui(&2, |ui| ui.busy = true);
        store.reset();
        assert!(store.is_empty());
        assert!(store.has_more());
        assert_eq!(store.ui(&2), UiState::default());
    }

    #[test]
    fn test_add_local_twice_keeps_one_entry() {
        let mut store: ListStore<Item> = ListStore::new();
        store.add_local(item(1, "a"));
        store.add_local(item(1, "b"));
        assert_eq!(keys(&store), vec![1]);
        assert_eq!(store.get(&1).map(|i| i.body.as_str()), Some("b"));
    }

    #[test]
    fn test_reset_then_three_pages() {
        let mut store = store_with(&[8, 9], 2);
        store.reset();

        store.append_page(page(0, 2, &[1, 2], 5));
        assert_eq!(keys(&store), vec![1, 2]);
        assert!(store.has_more());

        store.add_local(item(99, ""));
        assert_eq!(keys(&store), vec![1, 2, 99]);

        store.append_page(page(2, 2, &[3, 4], 5));
        assert_eq!(keys(&store), vec![1, 2, 3, 4, 99]);

        store.append_page(page(4, 2, &[5], 5));
        assert_eq!(keys(&store), vec![1, 2, 3, 4, 5, 99]);
        assert!(!store.has_more());
    }
}
