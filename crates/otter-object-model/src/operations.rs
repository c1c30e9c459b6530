//! Abstract operations on objects
//!
//! Thin wrappers over the internal methods. The `*_or_throw` forms turn a
//! `false` outcome into a `TypeInvariant` error.

use crate::array::array_create;
use crate::convert::to_length;
use crate::error::{ObjectResult, TypeInvariant};
use crate::object::{InternalMethods, ObjectRef};
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::value::Value;

/// Integrity level for [`set_integrity_level`] / [`test_integrity_level`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityLevel {
    /// No new properties, none configurable
    Sealed,
    /// Sealed, and every data property read-only
    Frozen,
}

/// Element types accepted by [`create_list_from_array_like`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTypes {
    /// Any value
    All,
    /// Strings and symbols only (property keys)
    PropertyKeys,
}

/// Get(O, P)
pub fn get(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<Value> {
    obj.get(key, &Value::Object(obj.clone()))
}

/// GetV(V, P) for object values; primitives have no own properties here
pub fn get_v(value: &Value, key: &PropertyKey) -> ObjectResult<Value> {
    match value {
        Value::Object(obj) => obj.get(key, value),
        Value::Undefined | Value::Null => Err(TypeInvariant::ConversionFailed(
            "Cannot convert undefined or null to object",
        )
        .into()),
        _ => Ok(Value::Undefined),
    }
}

/// Set(O, P, V, Throw)
pub fn set(obj: &ObjectRef, key: &PropertyKey, value: Value, throw: bool) -> ObjectResult<bool> {
    let success = obj.set(key, value, &Value::Object(obj.clone()))?;
    if !success && throw {
        return Err(TypeInvariant::SetFailed(key.to_string()).into());
    }
    Ok(success)
}

/// CreateDataProperty
pub fn create_data_property(
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
) -> ObjectResult<bool> {
    obj.define_own_property(key, &PartialDescriptor::data(value))
}

/// CreateDataPropertyOrThrow
pub fn create_data_property_or_throw(
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
) -> ObjectResult<()> {
    if create_data_property(obj, key, value)? {
        Ok(())
    } else {
        Err(TypeInvariant::DefineFailed(key.to_string()).into())
    }
}

/// DefinePropertyOrThrow
pub fn define_property_or_throw(
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<()> {
    if obj.define_own_property(key, desc)? {
        Ok(())
    } else {
        Err(TypeInvariant::DefineFailed(key.to_string()).into())
    }
}

/// DeletePropertyOrThrow
pub fn delete_property_or_throw(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<()> {
    if obj.delete(key)? {
        Ok(())
    } else {
        Err(TypeInvariant::DeleteFailed(key.to_string()).into())
    }
}

/// HasProperty
pub fn has_property(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
    obj.has_property(key)
}

/// HasOwnProperty
pub fn has_own_property(obj: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
    Ok(obj.get_own_property(key)?.is_some())
}

/// GetMethod: `undefined`/`null` mean absent, anything else must be callable
pub fn get_method(value: &Value, key: &PropertyKey) -> ObjectResult<Option<ObjectRef>> {
    match get_v(value, key)? {
        Value::Undefined | Value::Null => Ok(None),
        Value::Object(func) if func.is_callable() => Ok(Some(func)),
        _ => Err(TypeInvariant::NotCallable(key.to_string()).into()),
    }
}

/// Call(F, V, args)
pub fn call(func: &Value, this: &Value, args: &[Value]) -> ObjectResult<Value> {
    match func {
        Value::Object(func) if func.is_callable() => func.call(this, args),
        other => Err(TypeInvariant::NotCallable(format!("{:?}", other)).into()),
    }
}

/// Construct(F, args, newTarget)
pub fn construct(
    func: &ObjectRef,
    args: &[Value],
    new_target: Option<&ObjectRef>,
) -> ObjectResult<ObjectRef> {
    func.construct(args, new_target.unwrap_or(func))
}

/// LengthOfArrayLike
pub fn length_of_array_like(obj: &ObjectRef) -> ObjectResult<u64> {
    to_length(&get(obj, &PropertyKey::from("length"))?)
}

/// CreateArrayFromList
pub fn create_array_from_list(
    prototype: Option<ObjectRef>,
    elements: &[Value],
) -> ObjectResult<ObjectRef> {
    let array = array_create(0, prototype)?;
    for (i, element) in elements.iter().enumerate() {
        create_data_property_or_throw(&array, &PropertyKey::index(i as u64), element.clone())?;
    }
    Ok(array)
}

/// CreateListFromArrayLike
pub fn create_list_from_array_like(
    value: &Value,
    types: ElementTypes,
) -> ObjectResult<Vec<Value>> {
    let Value::Object(obj) = value else {
        return Err(TypeInvariant::ConversionFailed(
            "CreateListFromArrayLike called on non-object",
        )
        .into());
    };
    let len = length_of_array_like(obj)?;
    let mut list = Vec::new();
    for i in 0..len {
        let next = get(obj, &PropertyKey::index(i))?;
        if types == ElementTypes::PropertyKeys
            && !matches!(next, Value::String(_) | Value::Symbol(_))
        {
            return Err(TypeInvariant::ConversionFailed("Element is not a property key").into());
        }
        list.push(next);
    }
    Ok(list)
}

/// SetIntegrityLevel
pub fn set_integrity_level(obj: &ObjectRef, level: IntegrityLevel) -> ObjectResult<bool> {
    if !obj.prevent_extensions()? {
        return Ok(false);
    }
    let keys = obj.own_property_keys()?;
    match level {
        IntegrityLevel::Sealed => {
            let desc = PartialDescriptor::new().with_configurable(false);
            for key in &keys {
                define_property_or_throw(obj, key, &desc)?;
            }
        }
        IntegrityLevel::Frozen => {
            for key in &keys {
                if let Some(current) = obj.get_own_property(key)? {
                    let desc = if current.is_accessor() {
                        PartialDescriptor::new().with_configurable(false)
                    } else {
                        PartialDescriptor::new()
                            .with_configurable(false)
                            .with_writable(false)
                    };
                    define_property_or_throw(obj, key, &desc)?;
                }
            }
        }
    }
    Ok(true)
}

/// TestIntegrityLevel
pub fn test_integrity_level(obj: &ObjectRef, level: IntegrityLevel) -> ObjectResult<bool> {
    if obj.is_extensible()? {
        return Ok(false);
    }
    for key in obj.own_property_keys()? {
        if let Some(current) = obj.get_own_property(&key)? {
            if current.configurable() {
                return Ok(false);
            }
            if level == IntegrityLevel::Frozen && current.writable() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// EnumerableOwnProperties with kind `key`: string-keyed enumerable own keys
pub fn enumerable_own_keys(obj: &ObjectRef) -> ObjectResult<Vec<PropertyKey>> {
    let mut out = Vec::new();
    for key in obj.own_property_keys()? {
        if !key.is_string_like() {
            continue;
        }
        if let Some(desc) = obj.get_own_property(&key)?
            && desc.enumerable()
        {
            out.push(key);
        }
    }
    Ok(out)
}

/// A snapshot of every own property, in key order
pub fn own_properties(obj: &ObjectRef) -> ObjectResult<Vec<(PropertyKey, Property)>> {
    let mut out = Vec::new();
    for key in obj.own_property_keys()? {
        if let Some(prop) = obj.get_own_property(&key)? {
            out.push((key, prop));
        }
    }
    Ok(out)
}
