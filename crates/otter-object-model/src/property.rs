//! Property keys, properties and partial descriptors
//!
//! Keys live in three disjoint domains. A string that is the canonical
//! decimal form of an integer below 2^53 - 1 is always normalized to
//! [`PropertyKey::Index`], so the index and name domains never overlap.

use crate::object::ObjectRef;
use crate::string::JsString;
use crate::value::{Symbol, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest integer index key (2^53 - 2)
pub const MAX_INDEX: u64 = (1 << 53) - 2;

/// Largest array index (2^32 - 2)
pub const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// Property key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Integer index (0 <= n < 2^53 - 1)
    Index(u64),
    /// String property key (never a canonical index)
    String(Arc<JsString>),
    /// Symbol property key
    Symbol(Symbol),
}

impl PropertyKey {
    /// Create a string property key, normalizing canonical indices
    pub fn string(s: &str) -> Self {
        match parse_index(s) {
            Some(index) => Self::Index(index),
            None => Self::String(JsString::intern(s)),
        }
    }

    /// Create from an interned string, normalizing canonical indices
    pub fn from_js_string(s: Arc<JsString>) -> Self {
        match parse_index(s.as_str()) {
            Some(index) => Self::Index(index),
            None => Self::String(s),
        }
    }

    /// Create a key from an integer; values past [`MAX_INDEX`] become names
    pub fn index(n: u64) -> Self {
        if n <= MAX_INDEX {
            Self::Index(n)
        } else {
            let mut buf = itoa::Buffer::new();
            Self::String(JsString::intern(buf.format(n)))
        }
    }

    /// Create a symbol key
    pub fn symbol(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }

    /// The key as a language value (indices become strings)
    pub fn to_value(&self) -> Value {
        match self {
            Self::Index(n) => {
                let mut buf = itoa::Buffer::new();
                Value::string(buf.format(*n))
            }
            Self::String(s) => Value::String(s.clone()),
            Self::Symbol(sym) => Value::Symbol(sym.clone()),
        }
    }

    /// Index payload
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Self::Index(n) => Some(*n),
            _ => None,
        }
    }

    /// Array index payload (indices below 2^32 - 1)
    pub fn as_array_index(&self) -> Option<u32> {
        match self {
            Self::Index(n) if *n <= MAX_ARRAY_INDEX => Some(*n as u32),
            _ => None,
        }
    }

    /// Whether this is the string key `name`
    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, Self::String(s) if s.as_str() == name)
    }

    /// Whether this is a string or index key
    pub fn is_string_like(&self) -> bool {
        !matches!(self, Self::Symbol(_))
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Symbol(sym) => write!(f, "{:?}", sym),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::Index(i as u64)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }
}

/// Parse a canonical decimal integer index: no sign, no leading zeros, below 2^53 - 1
fn parse_index(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 16 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    let n: u64 = s.parse().ok()?;
    (n <= MAX_INDEX).then_some(n)
}

static NEXT_PRIVATE_ID: AtomicU64 = AtomicU64::new(1);

/// A class private name (`#x`), unique per class evaluation
#[derive(Clone)]
pub struct PrivateName(Arc<PrivateNameData>);

struct PrivateNameData {
    id: u64,
    description: Arc<JsString>,
}

impl PrivateName {
    /// Create a fresh private name
    pub fn new(description: &str) -> Self {
        Self(Arc::new(PrivateNameData {
            id: NEXT_PRIVATE_ID.fetch_add(1, Ordering::Relaxed),
            description: JsString::intern(description),
        }))
    }

    /// Description (including the leading `#`)
    pub fn description(&self) -> &Arc<JsString> {
        &self.0.description
    }
}

impl PartialEq for PrivateName {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for PrivateName {}

impl std::hash::Hash for PrivateName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl std::fmt::Debug for PrivateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateName({})", self.0.description)
    }
}

/// A fully populated own property
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// `[[Writable]]`
        writable: bool,
        /// `[[Enumerable]]`
        enumerable: bool,
        /// `[[Configurable]]`
        configurable: bool,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<ObjectRef>,
        /// Setter function
        set: Option<ObjectRef>,
        /// `[[Enumerable]]`
        enumerable: bool,
        /// `[[Configurable]]`
        configurable: bool,
    },
}

impl Property {
    /// Writable, enumerable, configurable data property
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Data property with explicit attributes
    pub fn data_with(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self::Data {
            value,
            writable,
            enumerable,
            configurable,
        }
    }

    /// Accessor property with explicit attributes
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self::Accessor {
            get,
            set,
            enumerable,
            configurable,
        }
    }

    /// `[[Enumerable]]`
    pub fn enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    /// `[[Configurable]]`
    pub fn configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    /// `[[Writable]]` (accessors are never writable)
    pub fn writable(&self) -> bool {
        matches!(self, Self::Data { writable: true, .. })
    }

    /// Is a data property
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Is an accessor property
    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Value of a data property
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Non-configurable and, for data, non-writable
    pub fn is_frozen(&self) -> bool {
        match self {
            Self::Data {
                writable,
                configurable,
                ..
            } => !writable && !configurable,
            Self::Accessor { configurable, .. } => !configurable,
        }
    }

    /// Every field as an explicit descriptor
    pub fn to_descriptor(&self) -> PartialDescriptor {
        match self {
            Self::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => PartialDescriptor {
                value: Some(value.clone()),
                writable: Some(*writable),
                get: None,
                set: None,
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
            Self::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => PartialDescriptor {
                value: None,
                writable: None,
                get: Some(get.clone()),
                set: Some(set.clone()),
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
        }
    }
}

/// A property descriptor carrying only the fields a request specified
///
/// `get`/`set` use a nested option: `Some(None)` is an explicit `undefined`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`
    pub get: Option<Option<ObjectRef>>,
    /// `[[Set]]`
    pub set: Option<Option<ObjectRef>>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PartialDescriptor {
    /// Empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// `{ value }`
    pub fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// `{ value, writable: true, enumerable: true, configurable: true }`
    pub fn data(value: Value) -> Self {
        Self::data_with(value, true, true, true)
    }

    /// Data descriptor with every field present
    pub fn data_with(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Accessor descriptor with every field present
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value: None,
            writable: None,
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Set `[[Value]]`
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set `[[Writable]]`
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Set `[[Get]]`
    pub fn with_get(mut self, get: Option<ObjectRef>) -> Self {
        self.get = Some(get);
        self
    }

    /// Set `[[Set]]`
    pub fn with_set(mut self, set: Option<ObjectRef>) -> Self {
        self.set = Some(set);
        self
    }

    /// Set `[[Enumerable]]`
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Set `[[Configurable]]`
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// IsAccessorDescriptor
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// IsDataDescriptor
    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// IsGenericDescriptor
    pub fn is_generic(&self) -> bool {
        !self.is_accessor() && !self.is_data()
    }

    /// No field present
    pub fn is_empty(&self) -> bool {
        self.is_generic() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// CompletePropertyDescriptor: absent fields take their defaults
    pub fn complete(&self) -> Property {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor() {
            Property::Accessor {
                get: self.get.clone().flatten(),
                set: self.set.clone().flatten(),
                enumerable,
                configurable,
            }
        } else {
            Property::Data {
                value: self.value.clone().unwrap_or(Value::Undefined),
                writable: self.writable.unwrap_or(false),
                enumerable,
                configurable,
            }
        }
    }
}

impl From<Property> for PartialDescriptor {
    fn from(prop: Property) -> Self {
        prop.to_descriptor()
    }
}
