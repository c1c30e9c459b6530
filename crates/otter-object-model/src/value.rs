//! Language values as seen by the object model
//!
//! Unlike the interpreter's NaN-boxed representation this is a plain enum:
//! the object model only needs to move values between stores, bindings and
//! host callables, and to compare them with SameValue.

use crate::error::ObjectResult;
use crate::object::ObjectRef;
use crate::string::JsString;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Host function behind a callable object: `(this, arguments) -> result`
pub type NativeFn = Arc<dyn Fn(&Value, &[Value]) -> ObjectResult<Value> + Send + Sync>;

/// Host construct behaviour: `(arguments, new_target) -> new object`
pub type NativeConstructFn =
    Arc<dyn Fn(&[Value], &ObjectRef) -> ObjectResult<ObjectRef> + Send + Sync>;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Well-known `@@toPrimitive`
static TO_PRIMITIVE: std::sync::LazyLock<Symbol> =
    std::sync::LazyLock::new(|| Symbol::new(Some("Symbol.toPrimitive")));
static TO_STRING_TAG: std::sync::LazyLock<Symbol> =
    std::sync::LazyLock::new(|| Symbol::new(Some("Symbol.toStringTag")));

/// A language value
#[derive(Clone)]
pub enum Value {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// IEEE 754 double
    Number(f64),
    /// String
    String(Arc<JsString>),
    /// Symbol
    Symbol(Symbol),
    /// Object (shared reference)
    Object(ObjectRef),
}

/// A unique symbol
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

struct SymbolData {
    id: u64,
    description: Option<Arc<JsString>>,
}

impl Symbol {
    /// Create a fresh symbol
    pub fn new(description: Option<&str>) -> Self {
        Self(Arc::new(SymbolData {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(JsString::intern),
        }))
    }

    /// The well-known `@@toPrimitive` symbol
    pub fn to_primitive() -> Self {
        TO_PRIMITIVE.clone()
    }

    /// The well-known `@@toStringTag` symbol
    pub fn to_string_tag() -> Self {
        TO_STRING_TAG.clone()
    }

    /// Unique id
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Description given at creation
    pub fn description(&self) -> Option<&Arc<JsString>> {
        self.0.description.as_ref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.description {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

impl Value {
    /// `undefined`
    #[inline]
    pub fn undefined() -> Self {
        Self::Undefined
    }

    /// `null`
    #[inline]
    pub fn null() -> Self {
        Self::Null
    }

    /// Boolean
    #[inline]
    pub fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Number
    #[inline]
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Number from an integer
    #[inline]
    pub fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// Interned string
    pub fn string(s: &str) -> Self {
        Self::String(JsString::intern(s))
    }

    /// Object
    #[inline]
    pub fn object(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }

    /// Symbol
    #[inline]
    pub fn symbol(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }

    /// Object or null
    pub fn from_prototype(proto: Option<ObjectRef>) -> Self {
        proto.map_or(Self::Null, Self::Object)
    }

    /// Is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Is a callable object
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Object(obj) if obj.is_callable())
    }

    /// Boolean payload
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Number payload
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload
    pub fn as_string(&self) -> Option<&Arc<JsString>> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Symbol payload
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Object payload
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// ToBoolean
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !(n.is_nan() || *n == 0.0),
            Self::String(s) => !s.is_empty(),
            Self::Symbol(_) | Self::Object(_) => true,
        }
    }

    /// `typeof` result
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(o) if o.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s.as_str()),
            Self::Symbol(s) => write!(f, "{:?}", s),
            Self::Object(o) => write!(f, "{:?}", o),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Undefined
    }
}

/// Values compare with SameValue
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        same_value(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

/// SameValue: identity-preserving equality (NaN equals itself, +0 differs from -0)
pub fn same_value(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            if *a == 0.0 && *b == 0.0 {
                return a.is_sign_positive() == b.is_sign_positive();
            }
            a == b
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => a == b,
        _ => false,
    }
}
