//! Array exotic objects
//!
//! `length` is not stored in the property store: it is a virtual own data
//! property `{ value, writable, enumerable: false, configurable: false }`
//! backed by [`ArrayLength`]. Shrinking is intentionally non-atomic: indices
//! deleted before a non-configurable one stops the shrink stay deleted.

use parking_lot::Mutex;

use crate::convert::{to_number, to_uint32};
use crate::error::{ObjectError, ObjectResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::reconcile::reconcile;
use crate::value::Value;

/// Length slot of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayLength {
    /// Current length
    pub length: u32,
    /// Whether `length` is writable
    pub writable: bool,
}

impl ArrayLength {
    fn property(self) -> Property {
        Property::data_with(Value::number(self.length as f64), self.writable, false, false)
    }
}

/// ArrayCreate
pub fn array_create(length: u64, prototype: Option<ObjectRef>) -> ObjectResult<ObjectRef> {
    if length > u32::MAX as u64 {
        return Err(ObjectError::range_error("Invalid array length"));
    }
    Ok(ObjectRef::new(
        prototype,
        ObjectKind::Array(Mutex::new(ArrayLength {
            length: length as u32,
            writable: true,
        })),
    ))
}

/// Current length slot of an array object
pub fn array_length(obj: &ObjectRef) -> Option<ArrayLength> {
    match obj.kind() {
        ObjectKind::Array(length) => Some(*length.lock()),
        _ => None,
    }
}

fn is_length(key: &PropertyKey) -> bool {
    key.is_name("length")
}

pub(crate) fn get_own_property(
    obj: &ObjectRef,
    length: &Mutex<ArrayLength>,
    key: &PropertyKey,
) -> Option<Property> {
    if is_length(key) {
        return Some(length.lock().property());
    }
    ordinary::get_own_property(obj, key)
}

pub(crate) fn define_own_property(
    obj: &ObjectRef,
    length: &Mutex<ArrayLength>,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    if is_length(key) {
        return array_set_length(obj, length, desc);
    }
    let Some(index) = key.as_array_index() else {
        return ordinary::define_own_property(obj, key, desc);
    };

    let current = *length.lock();
    if index >= current.length && !current.writable {
        return Ok(false);
    }
    if !ordinary::define_own_property(obj, key, desc)? {
        return Ok(false);
    }
    if index >= current.length {
        let mut slot = length.lock();
        slot.length = slot.length.max(index + 1);
    }
    Ok(true)
}

/// Reconcile a descriptor against the virtual `length` property and commit it
fn define_length(obj: &ObjectRef, length: &Mutex<ArrayLength>, desc: &PartialDescriptor) -> bool {
    let current = *length.lock();
    let extensible = ordinary::is_extensible(obj);
    match reconcile(Some(&current.property()), extensible, desc) {
        Ok(Some(Property::Data {
            value, writable, ..
        })) => {
            let mut slot = length.lock();
            slot.length = value.as_number().map_or(current.length, |n| n as u32);
            slot.writable = writable;
            true
        }
        Ok(_) => true,
        Err(_) => false,
    }
}

/// ArraySetLength
pub fn array_set_length(
    obj: &ObjectRef,
    length: &Mutex<ArrayLength>,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    let Some(value) = &desc.value else {
        return Ok(define_length(obj, length, desc));
    };

    let number = to_number(value)?;
    let new_len = to_uint32(number);
    if new_len as f64 != number {
        return Err(ObjectError::range_error("Invalid array length"));
    }

    let mut new_len_desc = desc.clone();
    new_len_desc.value = Some(Value::number(new_len as f64));

    let old = *length.lock();
    if new_len >= old.length {
        return Ok(define_length(obj, length, &new_len_desc));
    }
    if !old.writable {
        return Ok(false);
    }

    // Writability is dropped only after the deletions
    let new_writable = desc.writable != Some(false);
    if !new_writable {
        new_len_desc.writable = Some(true);
    }
    if !define_length(obj, length, &new_len_desc) {
        return Ok(false);
    }

    let doomed = obj
        .state()
        .properties
        .indices_descending(new_len as u64, old.length as u64);
    for index in doomed {
        if !ordinary::delete(obj, &PropertyKey::Index(index))? {
            let pinned = index as u32 + 1;
            tracing::debug!(
                target: "otter::object",
                old_length = old.length,
                requested = new_len,
                pinned,
                "array length shrink stopped at non-configurable element"
            );
            {
                let mut slot = length.lock();
                slot.length = pinned;
                if !new_writable {
                    slot.writable = false;
                }
            }
            return Ok(false);
        }
    }

    if !new_writable {
        length.lock().writable = false;
    }
    Ok(true)
}

/// Indices ascending, then `length`, then names and symbols in insertion order
pub(crate) fn own_property_keys(obj: &ObjectRef) -> Vec<PropertyKey> {
    let state = obj.state();
    let props = &state.properties;
    let mut keys = Vec::with_capacity(props.len() + 1);
    keys.extend(props.index_keys());
    keys.push(PropertyKey::from("length"));
    keys.extend(props.name_keys());
    keys.extend(props.symbol_keys());
    keys
}
