//! Integer-indexed exotic objects
//!
//! Numeric keys never reach the property store: valid indices go to the
//! element buffer, and every other canonical numeric key is an invalid
//! index that reads as absent. Only `"-0"` and non-numeric names use
//! ordinary storage.

use std::sync::Arc;

use crate::convert::{canonical_numeric_index_string, to_number};
use crate::error::ObjectResult;
use crate::object::{ObjectKind, ObjectRef, OwnLookup};
use crate::ordinary;
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::value::Value;

/// Fixed-length element storage behind an integer-indexed object
pub trait ElementBuffer: Send + Sync {
    /// Current element count
    fn length(&self) -> usize;
    /// Read an element; `undefined` out of range
    fn read(&self, index: usize) -> Value;
    /// Write a numeric element; false if it did not land
    fn write(&self, index: usize, value: Value) -> bool;
}

/// IntegerIndexedObjectCreate
pub fn integer_indexed_create(
    buffer: Arc<dyn ElementBuffer>,
    prototype: Option<ObjectRef>,
) -> ObjectRef {
    ObjectRef::new(prototype, ObjectKind::IntegerIndexed(buffer))
}

enum NumericKey {
    Valid(usize),
    Invalid,
    NotNumeric,
}

fn classify(buffer: &dyn ElementBuffer, key: &PropertyKey) -> NumericKey {
    match key {
        PropertyKey::Index(n) => match usize::try_from(*n) {
            Ok(index) if index < buffer.length() => NumericKey::Valid(index),
            _ => NumericKey::Invalid,
        },
        PropertyKey::String(name) => match canonical_numeric_index_string(name.as_str()) {
            Some(n) if n == 0.0 && n.is_sign_negative() => NumericKey::NotNumeric,
            Some(_) => NumericKey::Invalid,
            None => NumericKey::NotNumeric,
        },
        PropertyKey::Symbol(_) => NumericKey::NotNumeric,
    }
}

fn element(buffer: &dyn ElementBuffer, index: usize) -> Property {
    Property::data_with(buffer.read(index), true, true, false)
}

/// Convert then write, re-checking bounds since conversion may run user code
fn set_element(buffer: &dyn ElementBuffer, index: usize, value: &Value) -> ObjectResult<()> {
    let number = Value::number(to_number(value)?);
    if index < buffer.length() && !buffer.write(index, number) {
        tracing::trace!(target: "otter::object", index, "element write dropped");
    }
    Ok(())
}

pub(crate) fn get_own_property(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
) -> Option<Property> {
    match classify(buffer, key) {
        NumericKey::Valid(index) => Some(element(buffer, index)),
        NumericKey::Invalid => None,
        NumericKey::NotNumeric => ordinary::get_own_property(obj, key),
    }
}

/// Invalid numeric keys end an inherited walk instead of reaching the prototype
pub(crate) fn lookup_own(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
) -> OwnLookup {
    match classify(buffer, key) {
        NumericKey::Valid(index) => OwnLookup::Found(element(buffer, index)),
        NumericKey::Invalid => OwnLookup::Absent,
        NumericKey::NotNumeric => match ordinary::get_own_property(obj, key) {
            Some(prop) => OwnLookup::Found(prop),
            None => OwnLookup::Continue,
        },
    }
}

pub(crate) fn has_property(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
) -> ObjectResult<bool> {
    match classify(buffer, key) {
        NumericKey::Valid(_) => Ok(true),
        NumericKey::Invalid => Ok(false),
        NumericKey::NotNumeric => ordinary::has_property(obj, key),
    }
}

pub(crate) fn define_own_property(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    let index = match classify(buffer, key) {
        NumericKey::Valid(index) => index,
        NumericKey::Invalid => return Ok(false),
        NumericKey::NotNumeric => return ordinary::define_own_property(obj, key, desc),
    };
    if desc.configurable == Some(true)
        || desc.enumerable == Some(false)
        || desc.is_accessor()
        || desc.writable == Some(false)
    {
        return Ok(false);
    }
    if let Some(value) = &desc.value {
        set_element(buffer, index, value)?;
    }
    Ok(true)
}

pub(crate) fn get(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
    receiver: &Value,
) -> ObjectResult<Value> {
    match classify(buffer, key) {
        NumericKey::Valid(index) => Ok(buffer.read(index)),
        NumericKey::Invalid => Ok(Value::Undefined),
        NumericKey::NotNumeric => ordinary::get(obj, key, receiver),
    }
}

pub(crate) fn set(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> ObjectResult<bool> {
    let is_self = matches!(receiver, Value::Object(r) if r == obj);
    match classify(buffer, key) {
        NumericKey::Valid(index) if is_self => {
            set_element(buffer, index, &value)?;
            Ok(true)
        }
        NumericKey::Invalid => {
            // The conversion is still observable on a direct write
            if is_self {
                to_number(&value)?;
            }
            Ok(true)
        }
        _ => ordinary::set(obj, key, value, receiver),
    }
}

pub(crate) fn delete(
    obj: &ObjectRef,
    buffer: &dyn ElementBuffer,
    key: &PropertyKey,
) -> ObjectResult<bool> {
    match classify(buffer, key) {
        NumericKey::Valid(_) => Ok(false),
        NumericKey::Invalid => Ok(true),
        NumericKey::NotNumeric => ordinary::delete(obj, key),
    }
}

/// Element indices, then names and symbols
pub(crate) fn own_property_keys(obj: &ObjectRef, buffer: &dyn ElementBuffer) -> Vec<PropertyKey> {
    let length = buffer.length() as u64;
    let state = obj.state();
    let props = &state.properties;
    let mut keys = Vec::with_capacity(length as usize + props.len());
    keys.extend((0..length).map(PropertyKey::Index));
    keys.extend(props.name_keys());
    keys.extend(props.symbol_keys());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::InternalMethods;
    use crate::typed_array::{TypedArray, TypedArrayKind};

    fn int16(len: usize) -> (ObjectRef, Arc<TypedArray>) {
        let ta = Arc::new(TypedArray::with_length(TypedArrayKind::Int16, len));
        (integer_indexed_create(ta.clone(), None), ta)
    }

    #[test]
    fn test_elements_are_fixed_slots() {
        let (obj, _) = int16(2);
        assert_eq!(
            obj.get_own_property(&PropertyKey::Index(0)).unwrap(),
            Some(Property::data_with(Value::int32(0), true, true, false))
        );
        assert!(obj.get_own_property(&PropertyKey::Index(2)).unwrap().is_none());
        assert!(!obj.delete(&PropertyKey::Index(0)).unwrap());
        assert!(obj.delete(&PropertyKey::Index(2)).unwrap());
        assert_eq!(
            obj.own_property_keys().unwrap(),
            vec![PropertyKey::Index(0), PropertyKey::Index(1)]
        );
    }

    #[test]
    fn test_set_converts_through_buffer() {
        let (obj, ta) = int16(1);
        let receiver = Value::Object(obj.clone());
        assert!(obj.set(&PropertyKey::Index(0), Value::string("70000"), &receiver).unwrap());
        assert_eq!(ta.get(0), Some(4464.0));
        assert!(obj.set(&PropertyKey::Index(9), Value::int32(1), &receiver).unwrap());
        assert!(!obj.has_property(&PropertyKey::Index(9)).unwrap());
    }

    #[test]
    fn test_define_rules() {
        let (obj, ta) = int16(1);
        let key = PropertyKey::Index(0);
        assert!(obj.define_own_property(&key, &PartialDescriptor::value(Value::int32(3))).unwrap());
        assert_eq!(ta.get(0), Some(3.0));
        assert!(!obj
            .define_own_property(&key, &PartialDescriptor::data(Value::int32(1)))
            .unwrap());
        assert!(!obj
            .define_own_property(&key, &PartialDescriptor::new().with_writable(false))
            .unwrap());
        assert!(!obj
            .define_own_property(&key, &PartialDescriptor::new().with_get(None))
            .unwrap());
        assert!(!obj
            .define_own_property(&PropertyKey::Index(5), &PartialDescriptor::value(Value::Null))
            .unwrap());
    }

    #[test]
    fn test_numeric_names() {
        let (obj, _) = int16(1);
        let receiver = Value::Object(obj.clone());
        for invalid in ["1.5", "-1", "Infinity", "NaN"] {
            let key = PropertyKey::from(invalid);
            assert!(obj.set(&key, Value::int32(1), &receiver).unwrap());
            assert!(!obj.has_property(&key).unwrap());
            assert!(!obj
                .define_own_property(&key, &PartialDescriptor::value(Value::int32(1)))
                .unwrap());
        }
        for ordinary_name in ["-0", "01", "1.0", "x"] {
            let key = PropertyKey::from(ordinary_name);
            assert!(obj.set(&key, Value::int32(1), &receiver).unwrap());
            assert!(obj.has_property(&key).unwrap());
        }
    }

    #[test]
    fn test_detached_reads_empty() {
        let (obj, ta) = int16(2);
        ta.buffer().detach();
        assert!(!obj.has_property(&PropertyKey::Index(0)).unwrap());
        assert!(obj.own_property_keys().unwrap().is_empty());
        assert_eq!(
            obj.get(&PropertyKey::Index(0), &Value::Undefined).unwrap(),
            Value::Undefined
        );
    }
}
