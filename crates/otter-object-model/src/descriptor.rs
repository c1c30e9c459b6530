//! Conversions between property descriptors and descriptor objects
//!
//! Used wherever descriptors cross into script-visible objects, most
//! notably the proxy `defineProperty` and `getOwnPropertyDescriptor` traps.

use crate::error::{ObjectResult, TypeInvariant};
use crate::object::{InternalMethods, ObjectRef};
use crate::operations::{create_data_property_or_throw, get};
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::realm::Realm;
use crate::value::Value;

fn field(obj: &ObjectRef, name: &str) -> ObjectResult<Option<Value>> {
    let key = PropertyKey::from(name);
    if obj.has_property(&key)? {
        Ok(Some(get(obj, &key)?))
    } else {
        Ok(None)
    }
}

fn accessor_field(
    value: Option<Value>,
    message: &'static str,
) -> ObjectResult<Option<Option<ObjectRef>>> {
    match value {
        None => Ok(None),
        Some(Value::Undefined) => Ok(Some(None)),
        Some(Value::Object(func)) if func.is_callable() => Ok(Some(Some(func))),
        Some(_) => Err(TypeInvariant::InvalidDescriptor(message).into()),
    }
}

/// ToPropertyDescriptor
pub fn to_property_descriptor(value: &Value) -> ObjectResult<PartialDescriptor> {
    let Value::Object(obj) = value else {
        return Err(
            TypeInvariant::InvalidDescriptor("Property description must be an object").into(),
        );
    };
    let desc = PartialDescriptor {
        enumerable: field(obj, "enumerable")?.map(|v| v.to_boolean()),
        configurable: field(obj, "configurable")?.map(|v| v.to_boolean()),
        value: field(obj, "value")?,
        writable: field(obj, "writable")?.map(|v| v.to_boolean()),
        get: accessor_field(field(obj, "get")?, "Getter must be a function")?,
        set: accessor_field(field(obj, "set")?, "Setter must be a function")?,
    };
    if desc.is_accessor() && desc.is_data() {
        return Err(TypeInvariant::InvalidDescriptor(
            "Invalid property descriptor. Cannot both specify accessors and a value or \
             writable attribute",
        )
        .into());
    }
    Ok(desc)
}

/// FromPropertyDescriptor; `None` maps to `undefined`
pub fn from_property_descriptor(
    desc: Option<&PartialDescriptor>,
    realm: &Realm,
) -> ObjectResult<Value> {
    let Some(desc) = desc else {
        return Ok(Value::Undefined);
    };
    let obj = ObjectRef::ordinary(Some(realm.object_prototype().clone()));
    let accessor = |f: &Option<ObjectRef>| f.clone().map_or(Value::Undefined, Value::Object);
    let fields = [
        ("value", desc.value.clone()),
        ("writable", desc.writable.map(Value::boolean)),
        ("get", desc.get.as_ref().map(accessor)),
        ("set", desc.set.as_ref().map(accessor)),
        ("enumerable", desc.enumerable.map(Value::boolean)),
        ("configurable", desc.configurable.map(Value::boolean)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            create_data_property_or_throw(&obj, &PropertyKey::from(name), value)?;
        }
    }
    Ok(Value::Object(obj))
}

/// CompletePropertyDescriptor
pub fn complete_property_descriptor(desc: &PartialDescriptor) -> Property {
    desc.complete()
}
