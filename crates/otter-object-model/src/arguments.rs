//! Arguments exotic objects
//!
//! A mapped arguments object aliases its leading indices to the formal
//! parameter bindings of the enclosing function. While an index is linked,
//! reads and writes go to the binding; defining it read-only or as an
//! accessor, or deleting it, unlinks it for good.

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::ObjectResult;
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::realm::Realm;
use crate::string::JsString;
use crate::value::Value;

/// Binding environment collaborator
pub trait Environment: Send + Sync {
    /// Read a binding
    fn get_binding(&self, name: &JsString) -> ObjectResult<Value>;
    /// Write a binding
    fn set_binding(&self, name: &JsString, value: Value) -> ObjectResult<()>;
    /// Whether a binding exists
    fn has_binding(&self, name: &JsString) -> bool;
}

/// Aliases from argument indices to formal parameter names
pub struct ParameterMap {
    env: Arc<dyn Environment>,
    names: Vec<Option<Arc<JsString>>>,
    unlinked: Mutex<SmallVec<[u64; 1]>>,
}

impl ParameterMap {
    /// Map index `i` to `names[i]` where present
    pub fn new(env: Arc<dyn Environment>, names: Vec<Option<Arc<JsString>>>) -> Self {
        let words = names.len().div_ceil(64);
        Self {
            env,
            names,
            unlinked: Mutex::new(SmallVec::from_elem(0, words)),
        }
    }

    /// Number of indices the map was created with
    pub fn mapped_len(&self) -> usize {
        self.names.len()
    }

    /// The binding name index `key` is currently linked to
    pub fn linked_name(&self, key: &PropertyKey) -> Option<&Arc<JsString>> {
        let index = key.as_index()?;
        let name = self.names.get(usize::try_from(index).ok()?)?.as_ref()?;
        let unlinked = self.unlinked.lock();
        let word = unlinked[(index / 64) as usize];
        if word & (1 << (index % 64)) != 0 {
            return None;
        }
        Some(name)
    }

    /// Whether index `key` is currently linked
    pub fn is_linked(&self, key: &PropertyKey) -> bool {
        self.linked_name(key).is_some()
    }

    fn unlink(&self, key: &PropertyKey) {
        let Some(index) = key.as_index() else {
            return;
        };
        if index as usize >= self.names.len() {
            return;
        }
        self.unlinked.lock()[(index / 64) as usize] |= 1 << (index % 64);
        tracing::debug!(target: "otter::object", index, "arguments index unlinked");
    }

    fn read(&self, name: &JsString) -> ObjectResult<Value> {
        self.env.get_binding(name)
    }

    fn write(&self, name: &JsString, value: Value) -> ObjectResult<()> {
        self.env.set_binding(name, value)
    }
}

impl std::fmt::Debug for ParameterMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterMap")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

pub(crate) fn get_own_property(
    obj: &ObjectRef,
    map: &ParameterMap,
    key: &PropertyKey,
) -> ObjectResult<Option<Property>> {
    let Some(mut prop) = ordinary::get_own_property(obj, key) else {
        return Ok(None);
    };
    if let Some(name) = map.linked_name(key)
        && let Property::Data { value, .. } = &mut prop
    {
        *value = map.read(name)?;
    }
    Ok(Some(prop))
}

pub(crate) fn define_own_property(
    obj: &ObjectRef,
    map: &ParameterMap,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    let linked = map.linked_name(key).cloned();
    let mut stored = desc.clone();
    if let Some(name) = &linked
        && desc.is_data()
        && desc.value.is_none()
        && desc.writable == Some(false)
    {
        // Freeze the alias at the binding's current value
        stored.value = Some(map.read(name)?);
    }
    if !ordinary::define_own_property(obj, key, &stored)? {
        return Ok(false);
    }
    if let Some(name) = linked {
        if desc.is_accessor() {
            map.unlink(key);
        } else {
            if let Some(value) = &desc.value {
                map.write(&name, value.clone())?;
            }
            if desc.writable == Some(false) {
                map.unlink(key);
            }
        }
    }
    Ok(true)
}

pub(crate) fn get(
    obj: &ObjectRef,
    map: &ParameterMap,
    key: &PropertyKey,
    receiver: &Value,
) -> ObjectResult<Value> {
    match map.linked_name(key) {
        Some(name) => map.read(name),
        None => ordinary::get(obj, key, receiver),
    }
}

pub(crate) fn set(
    obj: &ObjectRef,
    map: &ParameterMap,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> ObjectResult<bool> {
    let is_self = matches!(receiver, Value::Object(r) if r == obj);
    if is_self && let Some(name) = map.linked_name(key) {
        map.write(name, value)?;
        return Ok(true);
    }
    ordinary::set(obj, key, value, receiver)
}

pub(crate) fn delete(obj: &ObjectRef, map: &ParameterMap, key: &PropertyKey) -> ObjectResult<bool> {
    let linked = map.is_linked(key);
    let result = ordinary::delete(obj, key)?;
    if result && linked {
        map.unlink(key);
    }
    Ok(result)
}

/// Indices and `length`, stored directly so a fresh map never writes bindings
fn fill_elements(obj: &ObjectRef, args: &[Value]) {
    for (index, value) in args.iter().enumerate() {
        obj.insert_property(PropertyKey::index(index as u64), Property::data(value.clone()));
    }
    obj.insert_property(
        PropertyKey::from("length"),
        Property::data_with(Value::number(args.len() as f64), true, false, true),
    );
}

/// CreateUnmappedArgumentsObject
pub fn create_unmapped_arguments_object(realm: &Realm, args: &[Value]) -> ObjectRef {
    let obj = ObjectRef::new(
        Some(realm.object_prototype().clone()),
        ObjectKind::Arguments(None),
    );
    fill_elements(&obj, args);
    let thrower = realm.throw_type_error().clone();
    obj.insert_property(
        PropertyKey::from("callee"),
        Property::accessor(Some(thrower.clone()), Some(thrower), false, false),
    );
    obj
}

/// CreateMappedArgumentsObject
///
/// With duplicate formals, only the last occurrence of a name is mapped.
pub fn create_mapped_arguments_object(
    realm: &Realm,
    func: &ObjectRef,
    formals: &[Arc<JsString>],
    args: &[Value],
    env: Arc<dyn Environment>,
) -> ObjectRef {
    let mapped_len = formals.len().min(args.len());
    let mut names: Vec<Option<Arc<JsString>>> = vec![None; mapped_len];
    let mut seen: Vec<&Arc<JsString>> = Vec::with_capacity(formals.len());
    for (index, name) in formals.iter().enumerate().rev() {
        if seen.contains(&name) {
            continue;
        }
        seen.push(name);
        if index < mapped_len {
            names[index] = Some(name.clone());
        }
    }

    let obj = ObjectRef::new(
        Some(realm.object_prototype().clone()),
        ObjectKind::Arguments(Some(ParameterMap::new(env, names))),
    );
    fill_elements(&obj, args);
    obj.insert_property(
        PropertyKey::from("callee"),
        Property::data_with(Value::Object(func.clone()), true, false, true),
    );
    obj
}
