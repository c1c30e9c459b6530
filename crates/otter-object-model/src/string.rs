//! Interned strings
//!
//! Property names and string values share one global intern table, so
//! equal names compare by hash first and hash-map lookups never rehash.
//! The UTF-16 code units are the string's identity; they are kept next to
//! a `str` rendering so lone surrogates survive indexing and comparison.

use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Global string intern table
static STRING_TABLE: std::sync::LazyLock<DashMap<u64, Arc<JsString>>> =
    std::sync::LazyLock::new(DashMap::new);

/// An immutable, interned string
pub struct JsString {
    /// Text form; lone surrogates render as U+FFFD
    data: Arc<str>,
    /// The string's UTF-16 code units
    units: Arc<[u16]>,
    /// Precomputed hash of the code units
    hash: u64,
}

impl JsString {
    /// Create or retrieve an interned string
    pub fn intern(s: &str) -> Arc<Self> {
        let units: Vec<u16> = s.encode_utf16().collect();
        Self::intern_units(&units, || Arc::from(s))
    }

    /// Intern a string given as UTF-16 code units, lone surrogates included
    pub fn from_utf16(units: &[u16]) -> Arc<Self> {
        Self::intern_units(units, || Arc::from(String::from_utf16_lossy(units)))
    }

    fn intern_units(units: &[u16], text: impl FnOnce() -> Arc<str>) -> Arc<Self> {
        let hash = Self::compute_hash(units);

        if let Some(existing) = STRING_TABLE.get(&hash)
            && *existing.units == *units
        {
            return existing.clone();
        }

        let js_str = Arc::new(Self {
            data: text(),
            units: Arc::from(units),
            hash,
        });
        STRING_TABLE.insert(hash, js_str.clone());
        js_str
    }

    /// Create a string without interning (for temporary strings)
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        let data: Arc<str> = s.into();
        let units: Arc<[u16]> = data.encode_utf16().collect();
        let hash = Self::compute_hash(&units);
        Self { data, units, hash }
    }

    /// Get the string as a str slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// The UTF-16 code units
    #[inline]
    pub fn as_utf16(&self) -> &[u16] {
        &self.units
    }

    /// Length in UTF-16 code units
    #[inline]
    pub fn len_utf16(&self) -> usize {
        self.units.len()
    }

    /// Check if string is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Get precomputed hash value
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// The UTF-16 code unit at `index`
    #[inline]
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        self.units.get(index).copied()
    }

    /// The single-code-unit string at `index`
    pub fn code_unit_string(&self, index: usize) -> Option<Arc<Self>> {
        self.code_unit_at(index).map(|unit| Self::from_utf16(&[unit]))
    }

    /// Compare by UTF-16 code units, the order used for sorted export names
    pub fn cmp_utf16(&self, other: &JsString) -> Ordering {
        self.units.cmp(&other.units)
    }

    fn compute_hash(units: &[u16]) -> u64 {
        let mut hasher = FxHasher::default();
        units.hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Debug for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsString({:?})", self.data)
    }
}

impl std::fmt::Display for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        self.units == other.units
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
