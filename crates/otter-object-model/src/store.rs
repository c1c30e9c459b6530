//! Segregated per-object property storage
//!
//! Own keys enumerate as: indices ascending, then names in insertion order,
//! then symbols in insertion order. Private names are never enumerated.

use crate::property::{PrivateName, Property, PropertyKey};
use crate::string::JsString;
use crate::value::Symbol;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Property storage for one object
#[derive(Default)]
pub struct PropertyStore {
    indices: BTreeMap<u64, Property>,
    names: IndexMap<Arc<JsString>, Property, FxBuildHasher>,
    symbols: IndexMap<Symbol, Property, FxBuildHasher>,
    private: FxHashMap<PrivateName, Property>,
}

impl PropertyStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an own property
    pub fn get(&self, key: &PropertyKey) -> Option<&Property> {
        match key {
            PropertyKey::Index(i) => self.indices.get(i),
            PropertyKey::String(s) => self.names.get(s),
            PropertyKey::Symbol(sym) => self.symbols.get(sym),
        }
    }

    /// Look up an own property mutably
    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        match key {
            PropertyKey::Index(i) => self.indices.get_mut(i),
            PropertyKey::String(s) => self.names.get_mut(s),
            PropertyKey::Symbol(sym) => self.symbols.get_mut(sym),
        }
    }

    /// Whether an own property exists
    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace; replacing keeps the original insertion position
    pub fn insert(&mut self, key: PropertyKey, prop: Property) {
        match key {
            PropertyKey::Index(i) => {
                self.indices.insert(i, prop);
            }
            PropertyKey::String(s) => {
                self.names.insert(s, prop);
            }
            PropertyKey::Symbol(sym) => {
                self.symbols.insert(sym, prop);
            }
        }
    }

    /// Remove an own property, preserving the order of the others
    pub fn remove(&mut self, key: &PropertyKey) -> Option<Property> {
        match key {
            PropertyKey::Index(i) => self.indices.remove(i),
            PropertyKey::String(s) => self.names.shift_remove(s),
            PropertyKey::Symbol(sym) => self.symbols.shift_remove(sym),
        }
    }

    /// All own keys in enumeration order
    pub fn keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(self.index_keys());
        keys.extend(self.name_keys());
        keys.extend(self.symbol_keys());
        keys
    }

    /// Index keys ascending
    pub fn index_keys(&self) -> impl Iterator<Item = PropertyKey> + '_ {
        self.indices.keys().map(|i| PropertyKey::Index(*i))
    }

    /// Name keys in insertion order
    pub fn name_keys(&self) -> impl Iterator<Item = PropertyKey> + '_ {
        self.names.keys().map(|s| PropertyKey::String(s.clone()))
    }

    /// Symbol keys in insertion order
    pub fn symbol_keys(&self) -> impl Iterator<Item = PropertyKey> + '_ {
        self.symbols.keys().map(|s| PropertyKey::Symbol(s.clone()))
    }

    /// Stored indices in `[from, to)`, highest first
    pub fn indices_descending(&self, from: u64, to: u64) -> Vec<u64> {
        if from >= to {
            return Vec::new();
        }
        self.indices.range(from..to).rev().map(|(i, _)| *i).collect()
    }

    /// Highest stored index
    pub fn max_index(&self) -> Option<u64> {
        self.indices.keys().next_back().copied()
    }

    /// Number of enumerable-domain properties
    pub fn len(&self) -> usize {
        self.indices.len() + self.names.len() + self.symbols.len()
    }

    /// No enumerable-domain properties
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a private element
    pub fn private_get(&self, name: &PrivateName) -> Option<&Property> {
        self.private.get(name)
    }

    /// Look up a private element mutably
    pub fn private_get_mut(&mut self, name: &PrivateName) -> Option<&mut Property> {
        self.private.get_mut(name)
    }

    /// Add a private element; returns false if it already exists
    pub fn private_insert(&mut self, name: PrivateName, prop: Property) -> bool {
        if self.private.contains_key(&name) {
            return false;
        }
        self.private.insert(name, prop);
        true
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("indices", &self.indices.len())
            .field("names", &self.names.len())
            .field("symbols", &self.symbols.len())
            .field("private", &self.private.len())
            .finish()
    }
}
