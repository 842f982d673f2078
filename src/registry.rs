//! Identity-keyed, insertion-ordered object registry.
//!
//! Every entity in the book data (categories, recipes, ingredients) is
//! identified by its name. The registry enforces that identity: inserting a
//! second item under an existing key is an error, lookups by key either hit
//! or fail with a message naming the entity kind, and `get_or_insert_with`
//! provides get-or-create semantics for entities that are defined implicitly
//! by reference (ingredients appear only inside recipe ingredient lists).
//!
//! Iteration preserves insertion order. The registry never sorts — ordering
//! for display is the job of the grouping queries in [`crate::book`].

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate {kind} name: {key}")]
    Duplicate { kind: &'static str, key: String },
    #[error("no {kind} with name {key}")]
    Missing { kind: &'static str, key: String },
}

/// An item that can live in a [`Registry`].
pub trait Keyed {
    /// The identity of this item. Must be stable for the item's lifetime.
    fn key(&self) -> &str;
}

/// Insertion-ordered map from key to item.
///
/// Items are stored in a `Vec` in insertion order with a side index from key
/// to position. The `kind` label only feeds error messages ("no category
/// with name ...").
#[derive(Debug, Clone)]
pub struct Registry<T: Keyed> {
    kind: &'static str,
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Keyed> Registry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert an item under its own key. Duplicate keys are an error and
    /// leave the registry unchanged.
    pub fn insert(&mut self, item: T) -> Result<&T, RegistryError> {
        let key = item.key().to_string();
        if self.index.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: self.kind,
                key,
            });
        }
        self.index.insert(key, self.items.len());
        self.items.push(item);
        Ok(self.items.last().unwrap())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// Like [`get`](Self::get), but a missing key is an error naming the
    /// entity kind.
    pub fn lookup(&self, key: &str) -> Result<&T, RegistryError> {
        self.get(key).ok_or_else(|| RegistryError::Missing {
            kind: self.kind,
            key: key.to_string(),
        })
    }

    /// Return the item under `key`, constructing and inserting it first if
    /// absent. The constructor runs only on a miss; an existing item wins.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &T {
        if let Some(&i) = self.index.get(key) {
            return &self.items[i];
        }
        let item = make();
        debug_assert_eq!(item.key(), key);
        self.index.insert(key.to_string(), self.items.len());
        self.items.push(item);
        self.items.last().unwrap()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
