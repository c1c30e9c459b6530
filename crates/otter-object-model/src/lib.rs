//! # Otter Object Model
//!
//! Objects, properties and the internal methods of the Otter JavaScript
//! runtime: ordinary objects plus the Array, Arguments, String,
//! integer-indexed, module namespace and Proxy exotic kinds.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: objects are `Send + Sync` shared handles
//! - **Explicit dispatch**: one [`InternalMethods`] implementation switches on [`ObjectKind`]
//! - **Pure reconciliation**: descriptor validation is computed before anything is committed
//! - **Bounded walks**: prototype chains and proxy nesting are limited by [`RealmConfig`]

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod arguments;
pub mod array;
pub mod array_buffer;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod integer_indexed;
pub mod module_namespace;
pub mod object;
pub mod operations;
pub mod ordinary;
pub mod property;
pub mod proxy;
pub mod proxy_operations;
pub mod realm;
pub mod reconcile;
pub mod store;
pub mod string;
pub mod string_object;
pub mod typed_array;
pub mod value;

pub use arguments::{Environment, ParameterMap};
pub use array::{ArrayLength, array_create};
pub use config::RealmConfig;
pub use error::{BindingError, ObjectError, ObjectResult, ProxyInvariant, TypeInvariant};
pub use integer_indexed::ElementBuffer;
pub use module_namespace::{ModuleRecord, ResolvedExport};
pub use object::{InternalMethods, JsObject, ObjectKind, ObjectRef};
pub use property::{PartialDescriptor, PrivateName, Property, PropertyKey};
pub use proxy::ProxyData;
pub use realm::Realm;
pub use store::PropertyStore;
pub use string::JsString;
pub use value::{Symbol, Value};
