//! Code-indexed arena of catalog entities for one import run.
//!
//! Entries are seeded from the persisted catalog, looked up or created by
//! code, merged in place, and finally drained as the set of entities that
//! must be written back.

use std::collections::HashMap;
use tracing::debug;

use crate::constants::COST_EPSILON;

/// Entities carrying a semantic identity code.
pub trait Coded {
    fn code(&self) -> &str;
}

/// Entities carrying a normalized cost.
pub trait Costed: Coded {
    fn cost(&self) -> f64;
    fn set_cost(&mut self, cost: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Persisted,
    Created,
    Updated,
}

/// `original` is the persisted value, `None` for an entry created by this
/// run. Dirtiness is decided against it, so a value written back to what was
/// stored is clean again.
#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    original: Option<T>,
    touched: bool,
}

impl<T: PartialEq> Entry<T> {
    fn state(&self) -> EntryState {
        match &self.original {
            None => EntryState::Created,
            Some(original) if *original != self.value => EntryState::Updated,
            Some(_) => EntryState::Persisted,
        }
    }

    fn is_dirty(&self) -> bool {
        self.state() != EntryState::Persisted
    }
}

#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<Entry<T>>,
    index: HashMap<String, Handle>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Coded + Clone + PartialEq> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load previously persisted entities. A later duplicate code wins.
    pub fn seed(&mut self, values: impl IntoIterator<Item = T>) {
        for value in values {
            let entry = Entry {
                original: Some(value.clone()),
                value,
                touched: false,
            };
            match self.index.get(entry.value.code()) {
                Some(handle) => self.entries[handle.0] = entry,
                None => {
                    let handle = Handle(self.entries.len());
                    self.index.insert(entry.value.code().to_string(), handle);
                    self.entries.push(entry);
                }
            }
        }
    }

    pub fn handle(&self, code: &str) -> Option<Handle> {
        self.index.get(code).copied()
    }

    pub fn get(&self, code: &str) -> Option<&T> {
        self.handle(code).map(|h| &self.entries[h.0].value)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn value(&self, handle: Handle) -> &T {
        &self.entries[handle.0].value
    }

    pub fn state(&self, handle: Handle) -> EntryState {
        self.entries[handle.0].state()
    }

    /// Existing entry for `code`, or a new one built by `shell`. Either way
    /// the entry counts as touched by this run.
    pub fn get_or_insert_with(&mut self, code: &str, shell: impl FnOnce() -> T) -> Handle {
        let handle = match self.index.get(code) {
            Some(handle) => *handle,
            None => {
                let handle = Handle(self.entries.len());
                self.entries.push(Entry {
                    value: shell(),
                    original: None,
                    touched: false,
                });
                self.index.insert(code.to_string(), handle);
                handle
            }
        };
        self.entries[handle.0].touched = true;
        handle
    }

    /// Apply descriptive attributes, returns whether the value changed.
    pub fn merge(&mut self, handle: Handle, apply: impl FnOnce(&mut T)) -> bool {
        let entry = &mut self.entries[handle.0];
        let mut merged = entry.value.clone();
        apply(&mut merged);
        if merged == entry.value {
            return false;
        }
        entry.value = merged;
        true
    }

    pub fn touched_count(&self) -> usize {
        self.entries.iter().filter(|e| e.touched).count()
    }

    pub fn dirty_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_dirty()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Entities to write back: created ones and those whose final value
    /// differs from the persisted one, plus every touched one when `force`
    /// is set.
    pub fn into_changes(self, force: bool) -> Vec<T> {
        self.entries
            .into_iter()
            .filter(|e| e.is_dirty() || (force && e.touched))
            .map(|e| e.value)
            .collect()
    }
}

impl<T: Costed + Clone + PartialEq> Registry<T> {
    /// Write `cost` only when it differs from the stored one.
    pub fn update_cost(&mut self, handle: Handle, cost: f64) -> bool {
        let entry = &mut self.entries[handle.0];
        let stored = entry.value.cost();
        if entry.original.is_some() && (stored - cost).abs() <= COST_EPSILON {
            debug!(code = entry.value.code(), cost, "cost unchanged");
            return false;
        }
        entry.value.set_cost(cost);
        true
    }
}
