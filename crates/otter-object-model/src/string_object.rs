//! String exotic objects
//!
//! Index properties below the string's UTF-16 length are synthesized on
//! demand and never stored.

use std::sync::Arc;

use crate::error::ObjectResult;
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::reconcile::reconcile;
use crate::string::JsString;
use crate::value::Value;

/// StringCreate
pub fn string_create(data: Arc<JsString>, prototype: Option<ObjectRef>) -> ObjectRef {
    let length = data.len_utf16();
    let obj = ObjectRef::new(prototype, ObjectKind::String(data));
    obj.insert_property(
        PropertyKey::from("length"),
        Property::data_with(Value::number(length as f64), false, false, false),
    );
    obj
}

/// StringGetOwnProperty: the synthesized code-unit property at an index
fn string_get_own_property(data: &JsString, key: &PropertyKey) -> Option<Property> {
    let index = usize::try_from(key.as_index()?).ok()?;
    let unit = data.code_unit_string(index)?;
    Some(Property::data_with(Value::String(unit), false, true, false))
}

pub(crate) fn get_own_property(
    obj: &ObjectRef,
    data: &Arc<JsString>,
    key: &PropertyKey,
) -> Option<Property> {
    ordinary::get_own_property(obj, key).or_else(|| string_get_own_property(data, key))
}

pub(crate) fn define_own_property(
    obj: &ObjectRef,
    data: &Arc<JsString>,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    if let Some(current) = string_get_own_property(data, key) {
        let extensible = ordinary::is_extensible(obj);
        return Ok(reconcile(Some(&current), extensible, desc).is_ok());
    }
    ordinary::define_own_property(obj, key, desc)
}

/// Virtual indices, then stored indices past the string, then names and symbols
pub(crate) fn own_property_keys(obj: &ObjectRef, data: &Arc<JsString>) -> Vec<PropertyKey> {
    let length = data.len_utf16() as u64;
    let state = obj.state();
    let props = &state.properties;
    let mut keys = Vec::with_capacity(length as usize + props.len());
    keys.extend((0..length).map(PropertyKey::Index));
    keys.extend(
        props
            .index_keys()
            .filter(|key| key.as_index().is_some_and(|i| i >= length)),
    );
    keys.extend(props.name_keys());
    keys.extend(props.symbol_keys());
    keys
}
