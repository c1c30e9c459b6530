//! Objects and the internal-method capability
//!
//! Every object is a shared [`ObjectRef`] over a [`JsObject`] holding the
//! state all kinds share (prototype link, extensible flag, property store)
//! plus an [`ObjectKind`] tag carrying kind-specific data. The
//! [`InternalMethods`] implementation dispatches on that tag; exotic kinds
//! explicitly call back into [`crate::ordinary`] for the parts they do not
//! override.
//!
//! Locks on object state are only held for the duration of a store access,
//! never across a call into a getter, setter, trap or binding.

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use crate::arguments::{self, ParameterMap};
use crate::array::{self, ArrayLength};
use crate::error::{ObjectError, ObjectResult, TypeInvariant};
use crate::integer_indexed::{self, ElementBuffer};
use crate::module_namespace::{self, ModuleNamespace};
use crate::ordinary;
use crate::property::{PartialDescriptor, PrivateName, Property, PropertyKey};
use crate::proxy::ProxyData;
use crate::proxy_operations;
use crate::store::PropertyStore;
use crate::string::JsString;
use crate::string_object;
use crate::value::{NativeConstructFn, NativeFn, Value};

/// The fixed set of object operations every kind supports
pub trait InternalMethods {
    /// `[[GetPrototypeOf]]`
    fn get_prototype_of(&self) -> ObjectResult<Option<ObjectRef>>;
    /// `[[SetPrototypeOf]]`
    fn set_prototype_of(&self, prototype: Option<ObjectRef>) -> ObjectResult<bool>;
    /// `[[IsExtensible]]`
    fn is_extensible(&self) -> ObjectResult<bool>;
    /// `[[PreventExtensions]]`
    fn prevent_extensions(&self) -> ObjectResult<bool>;
    /// `[[GetOwnProperty]]`
    fn get_own_property(&self, key: &PropertyKey) -> ObjectResult<Option<Property>>;
    /// `[[DefineOwnProperty]]`
    fn define_own_property(&self, key: &PropertyKey, desc: &PartialDescriptor)
    -> ObjectResult<bool>;
    /// `[[HasProperty]]`
    fn has_property(&self, key: &PropertyKey) -> ObjectResult<bool>;
    /// `[[Get]]`
    fn get(&self, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value>;
    /// `[[Set]]`
    fn set(&self, key: &PropertyKey, value: Value, receiver: &Value) -> ObjectResult<bool>;
    /// `[[Delete]]`
    fn delete(&self, key: &PropertyKey) -> ObjectResult<bool>;
    /// `[[OwnPropertyKeys]]`
    fn own_property_keys(&self) -> ObjectResult<Vec<PropertyKey>>;
    /// `[[Call]]`
    fn call(&self, this: &Value, args: &[Value]) -> ObjectResult<Value>;
    /// `[[Construct]]`
    fn construct(&self, args: &[Value], new_target: &ObjectRef) -> ObjectResult<ObjectRef>;
}

/// Host callable behaviour of a function object
pub struct FunctionData {
    pub(crate) call: NativeFn,
    pub(crate) construct: Option<NativeConstructFn>,
}

/// Kind tag plus kind-specific data
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Host function object
    Function(FunctionData),
    /// Array exotic object
    Array(Mutex<ArrayLength>),
    /// Arguments object; mapped when it carries a parameter map
    Arguments(Option<ParameterMap>),
    /// String exotic object over its primitive value
    String(Arc<JsString>),
    /// Integer-indexed exotic object over an element buffer
    IntegerIndexed(Arc<dyn ElementBuffer>),
    /// Module namespace exotic object
    ModuleNamespace(ModuleNamespace),
    /// Proxy exotic object
    Proxy(ProxyData),
}

/// What an inherited lookup learns from one object on the chain
pub(crate) enum OwnLookup {
    /// An own property answers the lookup
    Found(Property),
    /// The key is definitively absent; the walk stops here
    Absent,
    /// Not an own property; continue with the prototype
    Continue,
    /// The object's own internal method must answer
    Delegate,
}

impl ObjectKind {
    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ordinary => "Object",
            Self::Function(_) => "Function",
            Self::Array(_) => "Array",
            Self::Arguments(_) => "Arguments",
            Self::String(_) => "String",
            Self::IntegerIndexed(_) => "IntegerIndexed",
            Self::ModuleNamespace(_) => "Module",
            Self::Proxy(_) => "Proxy",
        }
    }
}

pub(crate) struct ObjectState {
    pub(crate) prototype: Option<ObjectRef>,
    pub(crate) extensible: bool,
    pub(crate) properties: PropertyStore,
}

/// Object storage behind an [`ObjectRef`]
pub struct JsObject {
    state: RwLock<ObjectState>,
    kind: ObjectKind,
}

impl Drop for JsObject {
    fn drop(&mut self) {
        // Unlink uniquely owned prototype chains iteratively
        let mut next = self.state.get_mut().prototype.take();
        while let Some(proto) = next {
            match Arc::try_unwrap(proto.0) {
                Ok(mut obj) => next = obj.state.get_mut().prototype.take(),
                Err(_) => break,
            }
        }
    }
}

/// Shared handle to an object; equality is identity
#[derive(Clone)]
pub struct ObjectRef(Arc<JsObject>);

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ObjectRef {}

impl std::hash::Hash for ObjectRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {:p}]", self.0.kind.name(), Arc::as_ptr(&self.0))
    }
}

impl ObjectRef {
    /// Create an object of the given kind
    pub fn new(prototype: Option<ObjectRef>, kind: ObjectKind) -> Self {
        Self(Arc::new(JsObject {
            state: RwLock::new(ObjectState {
                prototype,
                extensible: true,
                properties: PropertyStore::new(),
            }),
            kind,
        }))
    }

    /// OrdinaryObjectCreate
    pub fn ordinary(prototype: Option<ObjectRef>) -> Self {
        Self::new(prototype, ObjectKind::Ordinary)
    }

    /// A callable host function object
    pub fn function(
        prototype: Option<ObjectRef>,
        call: impl Fn(&Value, &[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            prototype,
            ObjectKind::Function(FunctionData {
                call: Arc::new(call),
                construct: None,
            }),
        )
    }

    /// A callable and constructible host function object
    pub fn constructor(
        prototype: Option<ObjectRef>,
        call: impl Fn(&Value, &[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
        construct: impl Fn(&[Value], &ObjectRef) -> ObjectResult<ObjectRef> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            prototype,
            ObjectKind::Function(FunctionData {
                call: Arc::new(call),
                construct: Some(Arc::new(construct)),
            }),
        )
    }

    /// Kind tag
    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.0.kind
    }

    /// Identity comparison
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// IsCallable
    pub fn is_callable(&self) -> bool {
        match &self.0.kind {
            ObjectKind::Function(_) => true,
            ObjectKind::Proxy(data) => data.is_callable(),
            _ => false,
        }
    }

    /// IsConstructor
    pub fn is_constructor(&self) -> bool {
        match &self.0.kind {
            ObjectKind::Function(data) => data.construct.is_some(),
            ObjectKind::Proxy(data) => data.is_constructor(),
            _ => false,
        }
    }

    /// Is a proxy exotic object
    pub fn is_proxy(&self) -> bool {
        matches!(self.0.kind, ObjectKind::Proxy(_))
    }

    /// IsArray: sees through proxies, fails on a revoked one
    pub fn is_array(&self) -> ObjectResult<bool> {
        let mut current = self.clone();
        loop {
            let next = match &current.0.kind {
                ObjectKind::Array(_) => return Ok(true),
                ObjectKind::Proxy(data) => data.target_or_revoked("IsArray")?,
                _ => return Ok(false),
            };
            current = next;
        }
    }

    pub(crate) fn state(&self) -> RwLockReadGuard<'_, ObjectState> {
        self.0.state.read()
    }

    pub(crate) fn state_mut(&self) -> RwLockWriteGuard<'_, ObjectState> {
        self.0.state.write()
    }

    /// Prototype link as stored, without dispatch
    pub(crate) fn prototype_raw(&self) -> Option<ObjectRef> {
        self.state().prototype.clone()
    }

    /// Stored own property, without dispatch
    pub(crate) fn own_property_raw(&self, key: &PropertyKey) -> Option<Property> {
        self.state().properties.get(key).cloned()
    }

    /// One step of an inherited lookup against this object
    ///
    /// Kinds whose `[[HasProperty]]`, `[[Get]]` and `[[Set]]` are the
    /// ordinary algorithms answer from `[[GetOwnProperty]]`, so a caller
    /// can keep walking in a loop. The rest ask for delegation.
    pub(crate) fn lookup_own(&self, key: &PropertyKey) -> ObjectResult<OwnLookup> {
        match &self.0.kind {
            ObjectKind::Proxy(_) | ObjectKind::ModuleNamespace(_) => Ok(OwnLookup::Delegate),
            ObjectKind::IntegerIndexed(buffer) => {
                Ok(integer_indexed::lookup_own(self, buffer.as_ref(), key))
            }
            _ => Ok(match self.get_own_property(key)? {
                Some(prop) => OwnLookup::Found(prop),
                None => OwnLookup::Continue,
            }),
        }
    }

    /// Store a property directly, bypassing reconciliation (object construction only)
    pub(crate) fn insert_property(&self, key: PropertyKey, prop: Property) {
        self.state_mut().properties.insert(key, prop);
    }

    /// PrivateElementFind
    pub fn private_element_find(&self, name: &PrivateName) -> Option<Property> {
        self.state().properties.private_get(name).cloned()
    }

    /// PrivateFieldAdd
    pub fn private_field_add(&self, name: &PrivateName, value: Value) -> ObjectResult<()> {
        self.private_add(name, Property::data_with(value, true, false, false))
    }

    /// PrivateMethodOrAccessorAdd; `method` is a non-writable data property or an accessor
    pub fn private_method_or_accessor_add(
        &self,
        name: &PrivateName,
        method: Property,
    ) -> ObjectResult<()> {
        let method = match method {
            Property::Data { value, .. } => Property::data_with(value, false, false, false),
            accessor @ Property::Accessor { .. } => accessor,
        };
        self.private_add(name, method)
    }

    fn private_add(&self, name: &PrivateName, prop: Property) -> ObjectResult<()> {
        if self.state_mut().properties.private_insert(name.clone(), prop) {
            Ok(())
        } else {
            Err(TypeInvariant::PrivateName(format!(
                "Cannot initialize {} twice on the same object",
                name.description()
            ))
            .into())
        }
    }

    /// PrivateGet
    pub fn private_get(&self, name: &PrivateName) -> ObjectResult<Value> {
        match self.private_element_find(name) {
            None => Err(missing_private(name)),
            Some(Property::Data { value, .. }) => Ok(value),
            Some(Property::Accessor { get: Some(getter), .. }) => {
                getter.call(&Value::Object(self.clone()), &[])
            }
            Some(Property::Accessor { get: None, .. }) => Err(TypeInvariant::PrivateName(
                format!("'{}' was defined without a getter", name.description()),
            )
            .into()),
        }
    }

    /// PrivateSet
    pub fn private_set(&self, name: &PrivateName, value: Value) -> ObjectResult<()> {
        let setter = {
            let mut state = self.state_mut();
            match state.properties.private_get_mut(name) {
                None => return Err(missing_private(name)),
                Some(Property::Data {
                    value: slot,
                    writable: true,
                    ..
                }) => {
                    *slot = value;
                    return Ok(());
                }
                Some(Property::Data { .. }) => {
                    return Err(TypeInvariant::PrivateName(format!(
                        "Private method {} is not writable",
                        name.description()
                    ))
                    .into());
                }
                Some(Property::Accessor { set, .. }) => set.clone(),
            }
        };
        match setter {
            Some(setter) => {
                setter.call(&Value::Object(self.clone()), &[value])?;
                Ok(())
            }
            None => Err(TypeInvariant::PrivateName(format!(
                "'{}' was defined without a setter",
                name.description()
            ))
            .into()),
        }
    }
}

fn missing_private(name: &PrivateName) -> ObjectError {
    TypeInvariant::PrivateName(format!(
        "Cannot read private member {} from an object whose class did not declare it",
        name.description()
    ))
    .into()
}

impl InternalMethods for ObjectRef {
    fn get_prototype_of(&self) -> ObjectResult<Option<ObjectRef>> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_get_prototype_of(data),
            _ => Ok(ordinary::get_prototype_of(self)),
        }
    }

    fn set_prototype_of(&self, prototype: Option<ObjectRef>) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_set_prototype_of(data, prototype),
            ObjectKind::ModuleNamespace(_) => {
                Ok(module_namespace::set_prototype_of(self, prototype))
            }
            _ => ordinary::set_prototype_of(self, prototype),
        }
    }

    fn is_extensible(&self) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_is_extensible(data),
            ObjectKind::ModuleNamespace(_) => Ok(false),
            _ => Ok(ordinary::is_extensible(self)),
        }
    }

    fn prevent_extensions(&self) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_prevent_extensions(data),
            ObjectKind::ModuleNamespace(_) => Ok(true),
            _ => Ok(ordinary::prevent_extensions(self)),
        }
    }

    fn get_own_property(&self, key: &PropertyKey) -> ObjectResult<Option<Property>> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => {
                proxy_operations::proxy_get_own_property_descriptor(data, key)
            }
            ObjectKind::Array(length) => Ok(array::get_own_property(self, length, key)),
            ObjectKind::Arguments(Some(map)) => arguments::get_own_property(self, map, key),
            ObjectKind::String(data) => Ok(string_object::get_own_property(self, data, key)),
            ObjectKind::IntegerIndexed(buffer) => {
                Ok(integer_indexed::get_own_property(self, buffer.as_ref(), key))
            }
            ObjectKind::ModuleNamespace(ns) => module_namespace::get_own_property(self, ns, key),
            _ => Ok(ordinary::get_own_property(self, key)),
        }
    }

    fn define_own_property(
        &self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
    ) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_define_property(data, key, desc),
            ObjectKind::Array(length) => array::define_own_property(self, length, key, desc),
            ObjectKind::Arguments(Some(map)) => {
                arguments::define_own_property(self, map, key, desc)
            }
            ObjectKind::String(data) => string_object::define_own_property(self, data, key, desc),
            ObjectKind::IntegerIndexed(buffer) => {
                integer_indexed::define_own_property(self, buffer.as_ref(), key, desc)
            }
            ObjectKind::ModuleNamespace(ns) => {
                module_namespace::define_own_property(self, ns, key, desc)
            }
            _ => ordinary::define_own_property(self, key, desc),
        }
    }

    fn has_property(&self, key: &PropertyKey) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_has(data, key),
            ObjectKind::IntegerIndexed(buffer) => {
                integer_indexed::has_property(self, buffer.as_ref(), key)
            }
            ObjectKind::ModuleNamespace(ns) => module_namespace::has_property(self, ns, key),
            _ => ordinary::has_property(self, key),
        }
    }

    fn get(&self, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_get(data, key, receiver),
            ObjectKind::Arguments(Some(map)) => arguments::get(self, map, key, receiver),
            ObjectKind::IntegerIndexed(buffer) => {
                integer_indexed::get(self, buffer.as_ref(), key, receiver)
            }
            ObjectKind::ModuleNamespace(ns) => module_namespace::get(self, ns, key, receiver),
            _ => ordinary::get(self, key, receiver),
        }
    }

    fn set(&self, key: &PropertyKey, value: Value, receiver: &Value) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_set(data, key, value, receiver),
            ObjectKind::Arguments(Some(map)) => arguments::set(self, map, key, value, receiver),
            ObjectKind::IntegerIndexed(buffer) => {
                integer_indexed::set(self, buffer.as_ref(), key, value, receiver)
            }
            ObjectKind::ModuleNamespace(_) => Ok(false),
            _ => ordinary::set(self, key, value, receiver),
        }
    }

    fn delete(&self, key: &PropertyKey) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_delete_property(data, key),
            ObjectKind::Arguments(Some(map)) => arguments::delete(self, map, key),
            ObjectKind::IntegerIndexed(buffer) => {
                integer_indexed::delete(self, buffer.as_ref(), key)
            }
            ObjectKind::ModuleNamespace(ns) => module_namespace::delete(self, ns, key),
            _ => ordinary::delete(self, key),
        }
    }

    fn own_property_keys(&self) -> ObjectResult<Vec<PropertyKey>> {
        match &self.0.kind {
            ObjectKind::Proxy(data) => proxy_operations::proxy_own_keys(data),
            ObjectKind::Array(_) => Ok(array::own_property_keys(self)),
            ObjectKind::String(data) => Ok(string_object::own_property_keys(self, data)),
            ObjectKind::IntegerIndexed(buffer) => {
                Ok(integer_indexed::own_property_keys(self, buffer.as_ref()))
            }
            ObjectKind::ModuleNamespace(ns) => Ok(module_namespace::own_property_keys(self, ns)),
            _ => Ok(ordinary::own_property_keys(self)),
        }
    }

    fn call(&self, this: &Value, args: &[Value]) -> ObjectResult<Value> {
        match &self.0.kind {
            ObjectKind::Function(data) => (data.call)(this, args),
            ObjectKind::Proxy(data) if data.is_callable() => {
                proxy_operations::proxy_apply(data, this, args)
            }
            kind => Err(TypeInvariant::NotCallable(kind.name().to_string()).into()),
        }
    }

    fn construct(&self, args: &[Value], new_target: &ObjectRef) -> ObjectResult<ObjectRef> {
        match &self.0.kind {
            ObjectKind::Function(FunctionData {
                construct: Some(construct),
                ..
            }) => construct(args, new_target),
            ObjectKind::Proxy(data) if data.is_constructor() => {
                proxy_operations::proxy_construct(data, args, new_target)
            }
            kind => Err(TypeInvariant::NotConstructor(kind.name().to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = ObjectRef::ordinary(None);
        let b = ObjectRef::ordinary(None);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_non_callable() {
        let obj = ObjectRef::ordinary(None);
        let err = obj.call(&Value::Undefined, &[]).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::TypeInvariant(TypeInvariant::NotCallable(_))
        ));
        assert!(!obj.is_callable());
    }

    #[test]
    fn test_function_call_and_construct() {
        let f = ObjectRef::function(None, |_, args| Ok(args.first().cloned().unwrap_or_default()));
        assert!(f.is_callable());
        assert!(!f.is_constructor());
        assert_eq!(f.call(&Value::Undefined, &[Value::int32(3)]).unwrap(), Value::int32(3));
        assert!(f.construct(&[], &f).is_err());

        let c = ObjectRef::constructor(
            None,
            |_, _| Ok(Value::Undefined),
            |_, _| Ok(ObjectRef::ordinary(None)),
        );
        assert!(c.is_constructor());
        assert!(c.construct(&[], &c).is_ok());
    }

    #[test]
    fn test_private_fields() {
        let obj = ObjectRef::ordinary(None);
        let name = PrivateName::new("#x");
        assert!(obj.private_get(&name).is_err());
        obj.private_field_add(&name, Value::int32(1)).unwrap();
        assert!(obj.private_field_add(&name, Value::int32(2)).is_err());
        obj.private_set(&name, Value::int32(5)).unwrap();
        assert_eq!(obj.private_get(&name).unwrap(), Value::int32(5));
        assert!(obj.own_property_keys().unwrap().is_empty());
    }

    #[test]
    fn test_private_methods_are_read_only() {
        let obj = ObjectRef::ordinary(None);
        let name = PrivateName::new("#m");
        let method = ObjectRef::function(None, |_, _| Ok(Value::int32(1)));
        obj.private_method_or_accessor_add(&name, Property::data(Value::Object(method)))
            .unwrap();
        assert!(obj.private_set(&name, Value::Undefined).is_err());
    }

    #[test]
    fn test_private_accessor_receives_object() {
        let obj = ObjectRef::ordinary(None);
        let name = PrivateName::new("#a");
        let getter = ObjectRef::function(None, |this, _| Ok(this.clone()));
        obj.private_method_or_accessor_add(
            &name,
            Property::accessor(Some(getter), None, false, false),
        )
        .unwrap();
        assert_eq!(obj.private_get(&name).unwrap(), Value::Object(obj.clone()));
        assert!(obj.private_set(&name, Value::Undefined).is_err());
    }

    #[test]
    fn test_deep_prototype_chain_drops() {
        let mut head = ObjectRef::ordinary(None);
        for _ in 0..200_000 {
            head = ObjectRef::ordinary(Some(head));
        }
        drop(head);
    }
}
