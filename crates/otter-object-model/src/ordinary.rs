//! Ordinary object internal methods
//!
//! These are the default algorithms every kind builds on. Prototype walks
//! are iterative under one walk budget: every kind whose inherited lookup
//! is ordinary is followed in the loop, and only proxies and module
//! namespaces are asked through their own internal method.

use crate::config::WalkBudget;
use crate::error::ObjectResult;
use crate::object::{InternalMethods, ObjectRef, OwnLookup};
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::reconcile::reconcile;
use crate::value::Value;

/// OrdinaryGetPrototypeOf
pub fn get_prototype_of(obj: &ObjectRef) -> Option<ObjectRef> {
    obj.prototype_raw()
}

/// OrdinarySetPrototypeOf
pub fn set_prototype_of(obj: &ObjectRef, prototype: Option<ObjectRef>) -> ObjectResult<bool> {
    let (current, extensible) = {
        let state = obj.state();
        (state.prototype.clone(), state.extensible)
    };
    if current == prototype {
        return Ok(true);
    }
    if !extensible {
        return Ok(false);
    }

    let mut budget = WalkBudget::new();
    let mut p = prototype.clone();
    while let Some(candidate) = p {
        if candidate == *obj {
            tracing::trace!(target: "otter::object", "prototype cycle rejected");
            return Ok(false);
        }
        // A proxy's [[GetPrototypeOf]] is not ordinary; the walk ends there
        if candidate.is_proxy() {
            break;
        }
        budget.step()?;
        p = candidate.prototype_raw();
    }

    obj.state_mut().prototype = prototype;
    Ok(true)
}

/// OrdinaryIsExtensible
pub fn is_extensible(obj: &ObjectRef) -> bool {
    obj.state().extensible
}

/// OrdinaryPreventExtensions
pub fn prevent_extensions(obj: &ObjectRef) -> bool {
    obj.state_mut().extensible = false;
    true
}

/// OrdinaryGetOwnProperty
pub fn get_own_property(obj: &ObjectRef, key: &PropertyKey) -> Option<Property> {
    obj.own_property_raw(key)
}

/// OrdinaryDefineOwnProperty
///
/// The current property comes from the object's own `[[GetOwnProperty]]`,
/// so kinds with live values (mapped arguments) reconcile against them.
pub fn define_own_property(
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    let current = obj.get_own_property(key)?;
    let mut state = obj.state_mut();
    let extensible = state.extensible;
    match reconcile(current.as_ref(), extensible, desc) {
        Ok(Some(prop)) => {
            state.properties.insert(key.clone(), prop);
            Ok(true)
        }
        Ok(None) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// OrdinaryHasProperty
pub fn has_property(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
    if obj.get_own_property(key)?.is_some() {
        return Ok(true);
    }
    let mut budget = WalkBudget::new();
    let mut parent = obj.prototype_raw();
    while let Some(p) = parent {
        budget.step()?;
        match p.lookup_own(key)? {
            OwnLookup::Found(_) => return Ok(true),
            OwnLookup::Absent => return Ok(false),
            OwnLookup::Delegate => return p.has_property(key),
            OwnLookup::Continue => parent = p.prototype_raw(),
        }
    }
    Ok(false)
}

/// OrdinaryGet
pub fn get(obj: &ObjectRef, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
    let mut budget = WalkBudget::new();
    let mut desc = obj.get_own_property(key)?;
    let mut holder = obj.clone();
    loop {
        match desc {
            Some(Property::Data { value, .. }) => return Ok(value),
            Some(Property::Accessor { get: Some(getter), .. }) => {
                return getter.call(receiver, &[]);
            }
            Some(Property::Accessor { get: None, .. }) => return Ok(Value::Undefined),
            None => {
                let Some(parent) = holder.prototype_raw() else {
                    return Ok(Value::Undefined);
                };
                budget.step()?;
                desc = match parent.lookup_own(key)? {
                    OwnLookup::Found(prop) => Some(prop),
                    OwnLookup::Absent => return Ok(Value::Undefined),
                    OwnLookup::Delegate => return parent.get(key, receiver),
                    OwnLookup::Continue => None,
                };
                holder = parent;
            }
        }
    }
}

/// OrdinarySet
pub fn set(
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> ObjectResult<bool> {
    let own = obj.get_own_property(key)?;
    set_with_own_descriptor(obj, key, value, receiver, own)
}

/// OrdinarySetWithOwnDescriptor
pub fn set_with_own_descriptor(
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
    own: Option<Property>,
) -> ObjectResult<bool> {
    let mut budget = WalkBudget::new();
    let mut own = own;
    let mut holder = obj.clone();
    let own = loop {
        if let Some(prop) = own {
            break prop;
        }
        let Some(parent) = holder.prototype_raw() else {
            break Property::data(Value::Undefined);
        };
        budget.step()?;
        own = match parent.lookup_own(key)? {
            OwnLookup::Found(prop) => Some(prop),
            OwnLookup::Absent => return Ok(true),
            OwnLookup::Delegate => return parent.set(key, value, receiver),
            OwnLookup::Continue => None,
        };
        holder = parent;
    };

    match own {
        Property::Data { writable, .. } => {
            if !writable {
                return Ok(false);
            }
            let Value::Object(receiver) = receiver else {
                return Ok(false);
            };
            match receiver.get_own_property(key)? {
                Some(Property::Accessor { .. }) => Ok(false),
                Some(Property::Data { writable: false, .. }) => Ok(false),
                Some(Property::Data { .. }) => {
                    receiver.define_own_property(key, &PartialDescriptor::value(value))
                }
                None => receiver.define_own_property(key, &PartialDescriptor::data(value)),
            }
        }
        Property::Accessor { set: Some(setter), .. } => {
            setter.call(receiver, &[value])?;
            Ok(true)
        }
        Property::Accessor { set: None, .. } => Ok(false),
    }
}

/// OrdinaryDelete
pub fn delete(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
    match obj.get_own_property(key)? {
        None => Ok(true),
        Some(prop) if prop.configurable() => {
            obj.state_mut().properties.remove(key);
            Ok(true)
        }
        Some(_) => Ok(false),
    }
}

/// OrdinaryOwnPropertyKeys
pub fn own_property_keys(obj: &ObjectRef) -> Vec<PropertyKey> {
    obj.state().properties.keys()
}
