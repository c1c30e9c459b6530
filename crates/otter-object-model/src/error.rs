//! Object model error types

use crate::value::Value;
use thiserror::Error;

/// Errors raised by internal methods and the abstract operations built on them
#[derive(Debug, Error)]
pub enum ObjectError {
    /// A core or proxy invariant was violated
    #[error("TypeError: {0}")]
    TypeInvariant(#[from] TypeInvariant),

    /// A numeric value cannot serve as a length or index
    #[error("RangeError: {0}")]
    RangeInvalid(String),

    /// Proxy forwarding or prototype walking nested too deeply
    #[error("RangeError: Maximum call stack size exceeded")]
    StackOverflow,

    /// A module or arguments binding is not available
    #[error("ReferenceError: {0}")]
    BindingUnavailable(#[from] BindingError),

    /// A value thrown by a host callable (getter, setter, trap)
    #[error("Uncaught exception: {0:?}")]
    Exception(Value),
}

/// Subtypes of [`ObjectError::TypeInvariant`]
#[derive(Debug, Error)]
pub enum TypeInvariant {
    /// Any internal method on a revoked proxy
    #[error("Cannot perform '{operation}' on a proxy that has been revoked")]
    ProxyRevoked {
        /// Trap name of the attempted operation
        operation: &'static str,
    },

    /// A proxy trap answered something its target contradicts
    #[error(transparent)]
    ProxyInvariant(#[from] ProxyInvariant),

    /// Value is not callable
    #[error("{0} is not a function")]
    NotCallable(String),

    /// Value is not a constructor
    #[error("{0} is not a constructor")]
    NotConstructor(String),

    /// A trap returned a value of the wrong type
    #[error("Proxy '{trap}' trap returned an invalid result: {reason}")]
    InvalidTrapResult {
        /// Trap name
        trap: &'static str,
        /// What was wrong with the result
        reason: &'static str,
    },

    /// Malformed property descriptor object
    #[error("Invalid property descriptor: {0}")]
    InvalidDescriptor(&'static str),

    /// `DefinePropertyOrThrow` was rejected
    #[error("Cannot define property {0}")]
    DefineFailed(String),

    /// `Set` with the throw flag was rejected
    #[error("Cannot assign to read only property '{0}'")]
    SetFailed(String),

    /// `DeletePropertyOrThrow` was rejected
    #[error("Cannot delete property '{0}'")]
    DeleteFailed(String),

    /// Missing or duplicate private element
    #[error("{0}")]
    PrivateName(String),

    /// A value could not be converted (e.g. Symbol to number)
    #[error("{0}")]
    ConversionFailed(&'static str),

    /// `%ThrowTypeError%` was invoked
    #[error(
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict \
         mode functions or the arguments objects for calls to them"
    )]
    PoisonedAccess,
}

/// One variant per proxy trap rule that the trap result can violate
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProxyInvariant {
    /// `getPrototypeOf` disagreed with a non-extensible target
    #[error(
        "Proxy 'getPrototypeOf' trap result must match the prototype of a non-extensible \
         target"
    )]
    GetPrototypeOfMismatch,

    /// `setPrototypeOf` reported success for a non-extensible target with another prototype
    #[error(
        "Proxy 'setPrototypeOf' trap returned true for a non-extensible target with a \
         different prototype"
    )]
    SetPrototypeOfNonExtensible,

    /// `isExtensible` disagreed with the target
    #[error("Proxy 'isExtensible' trap result must match the target's extensibility")]
    IsExtensibleMismatch,

    /// `preventExtensions` reported success while the target stayed extensible
    #[error("Proxy 'preventExtensions' trap returned true but the target is still extensible")]
    PreventExtensionsStillExtensible,

    /// `getOwnPropertyDescriptor` hid a non-configurable property
    #[error(
        "Proxy 'getOwnPropertyDescriptor' trap cannot report a non-configurable property \
         as absent"
    )]
    GetOwnPropertyHidesNonConfigurable,

    /// `getOwnPropertyDescriptor` hid a property of a non-extensible target
    #[error(
        "Proxy 'getOwnPropertyDescriptor' trap cannot report an existing property of a \
         non-extensible target as absent"
    )]
    GetOwnPropertyHidesOnNonExtensible,

    /// `getOwnPropertyDescriptor` reported a descriptor incompatible with the target
    #[error(
        "Proxy 'getOwnPropertyDescriptor' trap reported a descriptor incompatible with \
         the target property"
    )]
    GetOwnPropertyIncompatible,

    /// `getOwnPropertyDescriptor` reported non-configurable for a configurable or absent property
    #[error(
        "Proxy 'getOwnPropertyDescriptor' trap reported non-configurable for a property \
         that is configurable or absent on the target"
    )]
    GetOwnPropertyFalseNonConfigurable,

    /// `getOwnPropertyDescriptor` reported non-writable for a writable non-configurable property
    #[error(
        "Proxy 'getOwnPropertyDescriptor' trap reported non-configurable, non-writable \
         for a writable target property"
    )]
    GetOwnPropertyFalseNonWritable,

    /// `defineProperty` added a property to a non-extensible target
    #[error("Proxy 'defineProperty' trap cannot add a property to a non-extensible target")]
    DefineOnNonExtensible,

    /// `defineProperty` reported non-configurable for a configurable or absent property
    #[error(
        "Proxy 'defineProperty' trap cannot define a non-configurable property that is \
         configurable or absent on the target"
    )]
    DefineFalseNonConfigurable,

    /// `defineProperty` reported success for a descriptor incompatible with the target
    #[error(
        "Proxy 'defineProperty' trap reported success for a descriptor incompatible with \
         the target property"
    )]
    DefineIncompatible,

    /// `defineProperty` reported non-writable for a writable non-configurable property
    #[error(
        "Proxy 'defineProperty' trap cannot define a non-configurable, non-writable \
         property that is writable on the target"
    )]
    DefineFalseNonWritable,

    /// `has` hid a non-configurable property
    #[error("Proxy 'has' trap returned false for a non-configurable property")]
    HasHidesNonConfigurable,

    /// `has` hid a property of a non-extensible target
    #[error("Proxy 'has' trap returned false for a property of a non-extensible target")]
    HasHidesOnNonExtensible,

    /// `get` disagreed with a frozen data property
    #[error(
        "Proxy 'get' trap result differs from the non-configurable, non-writable target \
         property"
    )]
    GetFrozenValueMismatch,

    /// `get` returned a value for an accessor without getter
    #[error(
        "Proxy 'get' trap must return undefined for a non-configurable accessor without \
         getter"
    )]
    GetAccessorWithoutGetter,

    /// `set` changed a frozen data property
    #[error("Proxy 'set' trap cannot change a non-configurable, non-writable target property")]
    SetFrozenValue,

    /// `set` reported success on an accessor without setter
    #[error("Proxy 'set' trap cannot succeed for a non-configurable accessor without setter")]
    SetAccessorWithoutSetter,

    /// `deleteProperty` removed a non-configurable property
    #[error("Proxy 'deleteProperty' trap cannot delete a non-configurable property")]
    DeleteNonConfigurable,

    /// `deleteProperty` removed a property of a non-extensible target
    #[error("Proxy 'deleteProperty' trap cannot delete a property of a non-extensible target")]
    DeleteOnNonExtensible,

    /// `ownKeys` reported a key twice
    #[error("Proxy 'ownKeys' trap result contains duplicate entries")]
    OwnKeysDuplicate,

    /// `ownKeys` omitted a non-configurable key
    #[error("Proxy 'ownKeys' trap result must include every non-configurable key")]
    OwnKeysMissingNonConfigurable,

    /// `ownKeys` omitted a key of a non-extensible target
    #[error("Proxy 'ownKeys' trap result must include every key of a non-extensible target")]
    OwnKeysMissingOnNonExtensible,

    /// `ownKeys` invented a key for a non-extensible target
    #[error("Proxy 'ownKeys' trap result cannot add keys to a non-extensible target")]
    OwnKeysExtraOnNonExtensible,

    /// `construct` returned a non-object
    #[error("Proxy 'construct' trap must return an object")]
    ConstructNonObject,
}

/// Subtypes of [`ObjectError::BindingUnavailable`]
#[derive(Debug, Error)]
pub enum BindingError {
    /// Binding read before its initialization
    #[error("Cannot access '{0}' before initialization")]
    Uninitialized(String),

    /// No binding with that name
    #[error("{0} is not defined")]
    Unresolvable(String),

    /// Export resolves to more than one binding
    #[error("The requested export '{0}' is ambiguous")]
    Ambiguous(String),

    /// Export resolution ran in a cycle
    #[error("Detected cycle while resolving export '{0}'")]
    Circular(String),

    /// The module has no environment yet (linking failed or pending)
    #[error("Module for export '{0}' is not linked")]
    Unlinked(String),
}

impl ObjectError {
    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeInvalid(msg.into())
    }

    /// Create an error wrapping a thrown value
    pub fn exception(value: Value) -> Self {
        Self::Exception(value)
    }

    /// Shorthand for a revoked-proxy error
    pub fn revoked(operation: &'static str) -> Self {
        Self::TypeInvariant(TypeInvariant::ProxyRevoked { operation })
    }

    /// The proxy invariant this error reports, if any
    pub fn proxy_invariant(&self) -> Option<ProxyInvariant> {
        match self {
            Self::TypeInvariant(TypeInvariant::ProxyInvariant(violation)) => Some(*violation),
            _ => None,
        }
    }

    /// Whether this is a revoked-proxy error
    pub fn is_revoked(&self) -> bool {
        matches!(
            self,
            Self::TypeInvariant(TypeInvariant::ProxyRevoked { .. })
        )
    }

    /// Whether this error is of the `TypeInvariant` kind
    pub fn is_type_invariant(&self) -> bool {
        matches!(self, Self::TypeInvariant(_))
    }
}

impl From<ProxyInvariant> for ObjectError {
    fn from(violation: ProxyInvariant) -> Self {
        Self::TypeInvariant(TypeInvariant::ProxyInvariant(violation))
    }
}

/// Result type for object operations
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;
