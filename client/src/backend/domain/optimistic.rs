//! Optimistic updates with explicit undo tokens.
//!
//! A mutating operation captures an [`UndoToken`] for every key it is about
//! to touch, applies its change locally, releases the lock and awaits the
//! remote call. If the remote call fails the tokens are applied in reverse
//! order, which restores the touched keys exactly as they were captured.
//!
//! The state lock is never held across the remote `await`.

use std::future::Future;
use tokio::sync::RwLock;
use tracing::warn;

use crate::backend::domain::error::LedgerResult;

/// State that can snapshot and restore individual keys
pub trait Undoable {
    type Key: Clone + std::fmt::Debug;
    type Saved;

    fn save(&self, key: &Self::Key) -> Self::Saved;
    fn restore(&mut self, key: &Self::Key, saved: Self::Saved);
}

/// Pre-change snapshot of one key
#[must_use]
pub struct UndoToken<S: Undoable> {
    key: S::Key,
    saved: S::Saved,
}

impl<S: Undoable> UndoToken<S> {
    pub fn capture(state: &S, key: S::Key) -> Self {
        let saved = state.save(&key);
        Self { key, saved }
    }

    pub fn key(&self) -> &S::Key {
        &self.key
    }

    pub fn undo(self, state: &mut S) {
        state.restore(&self.key, self.saved);
    }
}

/// Apply a local change, run the remote call, and roll back if it fails.
///
/// `select` picks the keys to snapshot while the write lock is held, so the
/// snapshot and the change see the same state.
pub async fn run_optimistic<S, T, Sel, A, F>(
    state: &RwLock<S>,
    select: Sel,
    apply: A,
    remote: F,
) -> LedgerResult<T>
where
    S: Undoable,
    Sel: FnOnce(&S) -> Vec<S::Key>,
    A: FnOnce(&mut S),
    F: Future<Output = LedgerResult<T>>,
{
    let tokens: Vec<UndoToken<S>> = {
        let mut guard = state.write().await;
        let keys = select(&*guard);
        let tokens = keys
            .into_iter()
            .map(|key| UndoToken::capture(&*guard, key))
            .collect();
        apply(&mut *guard);
        tokens
    };

    match remote.await {
        Ok(value) => Ok(value),
        Err(error) => {
            let mut guard = state.write().await;
            let keys: Vec<S::Key> = tokens.iter().map(|token| token.key().clone()).collect();
            for token in tokens.into_iter().rev() {
                token.undo(&mut *guard);
            }
            warn!("Remote write failed, rolled back {:?}: {}", keys, error);
            Err(error)
        }
    }
}

/// Entities addressable by a string id
pub trait Identified {
    fn id(&self) -> &str;
}

/// An ordered list of entities plus a "has been loaded" flag
#[derive(Debug, Clone, PartialEq)]
pub struct EntityList<T> {
    items: Vec<T>,
    loaded: bool,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: Identified + Clone> EntityList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Replace the entity with the same id in place, or append it
    pub fn upsert(&mut self, item: T) {
        match self.position(item.id()) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    /// Swap the entity stored under `old_id` for `item`, keeping its position
    pub fn replace_id(&mut self, old_id: &str, item: T) {
        if let Some(existing) = self.position(item.id()) {
            if item.id() != old_id {
                self.items.remove(existing);
            }
        }
        match self.position(old_id) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.position(id).map(|index| self.items.remove(index))
    }
}

impl<T: Identified + Clone> Undoable for EntityList<T> {
    type Key = String;
    type Saved = Option<(usize, T)>;

    fn save(&self, key: &String) -> Self::Saved {
        self.position(key).map(|index| (index, self.items[index].clone()))
    }

    fn restore(&mut self, key: &String, saved: Self::Saved) {
        self.remove(key);
        if let Some((index, item)) = saved {
            let index = index.min(self.items.len());
            self.items.insert(index, item);
        }
    }
}
