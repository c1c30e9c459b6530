//! Proxy trap operations
//!
//! All 13 internal methods of a proxy. Each one looks up its trap on the
//! handler; without a trap the operation is forwarded to the target as is.
//! With a trap, the trap's answer is checked against the target's actual
//! state, read after the trap returned, and any disagreement is a
//! [`ProxyInvariant`] error.

use rustc_hash::FxHashSet;

use crate::config::ProxyDepthGuard;
use crate::descriptor::{
    complete_property_descriptor, from_property_descriptor, to_property_descriptor,
};
use crate::error::{ObjectError, ObjectResult, ProxyInvariant, TypeInvariant};
use crate::object::{InternalMethods, ObjectRef};
use crate::operations::{
    ElementTypes, create_array_from_list, create_list_from_array_like, get_method,
};
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::proxy::ProxyData;
use crate::reconcile::is_compatible_property_descriptor;
use crate::value::{Value, same_value};

/// A live trap call: target, handler and the trap function if the handler has one
struct Trap {
    name: &'static str,
    target: ObjectRef,
    handler: ObjectRef,
    function: Option<ObjectRef>,
    _depth: ProxyDepthGuard,
}

impl Trap {
    /// Resolve `name` on the handler with GetMethod semantics
    fn lookup(proxy: &ProxyData, name: &'static str) -> ObjectResult<Self> {
        let (target, handler) = proxy.slots_or_revoked(name)?;
        let depth = ProxyDepthGuard::enter()?;
        let function = get_method(&Value::Object(handler.clone()), &PropertyKey::from(name))?;
        Ok(Self {
            name,
            target,
            handler,
            function,
            _depth: depth,
        })
    }

    /// Call the trap with the handler as `this`; `None` if there is no trap
    fn invoke(&self, args: &[Value]) -> ObjectResult<Option<Value>> {
        match &self.function {
            Some(function) => Ok(Some(function.call(&Value::Object(self.handler.clone()), args)?)),
            None => Ok(None),
        }
    }

    fn target_value(&self) -> Value {
        Value::Object(self.target.clone())
    }

    fn violation(&self, rule: ProxyInvariant) -> ObjectError {
        tracing::debug!(
            target: "otter::object",
            trap = self.name,
            rule = ?rule,
            "proxy invariant violated"
        );
        rule.into()
    }

    fn invalid_result(&self, reason: &'static str) -> ObjectError {
        TypeInvariant::InvalidTrapResult {
            trap: self.name,
            reason,
        }
        .into()
    }
}

/// `[[GetPrototypeOf]]`
pub fn proxy_get_prototype_of(proxy: &ProxyData) -> ObjectResult<Option<ObjectRef>> {
    let trap = Trap::lookup(proxy, "getPrototypeOf")?;
    let Some(result) = trap.invoke(&[trap.target_value()])? else {
        return trap.target.get_prototype_of();
    };
    let handler_proto = match result {
        Value::Object(obj) => Some(obj),
        Value::Null => None,
        _ => return Err(trap.invalid_result("must return an object or null")),
    };
    validate_get_prototype_of_invariants(&trap, &handler_proto)?;
    Ok(handler_proto)
}

fn validate_get_prototype_of_invariants(
    trap: &Trap,
    handler_proto: &Option<ObjectRef>,
) -> ObjectResult<()> {
    if trap.target.is_extensible()? {
        return Ok(());
    }
    if trap.target.get_prototype_of()? != *handler_proto {
        return Err(trap.violation(ProxyInvariant::GetPrototypeOfMismatch));
    }
    Ok(())
}

/// `[[SetPrototypeOf]]`
pub fn proxy_set_prototype_of(
    proxy: &ProxyData,
    prototype: Option<ObjectRef>,
) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "setPrototypeOf")?;
    let proto_value = Value::from_prototype(prototype.clone());
    let Some(result) = trap.invoke(&[trap.target_value(), proto_value])? else {
        return trap.target.set_prototype_of(prototype);
    };
    if !result.to_boolean() {
        return Ok(false);
    }
    validate_set_prototype_of_invariants(&trap, &prototype)?;
    Ok(true)
}

fn validate_set_prototype_of_invariants(
    trap: &Trap,
    prototype: &Option<ObjectRef>,
) -> ObjectResult<()> {
    if trap.target.is_extensible()? {
        return Ok(());
    }
    if trap.target.get_prototype_of()? != *prototype {
        return Err(trap.violation(ProxyInvariant::SetPrototypeOfNonExtensible));
    }
    Ok(())
}

/// `[[IsExtensible]]`
pub fn proxy_is_extensible(proxy: &ProxyData) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "isExtensible")?;
    let Some(result) = trap.invoke(&[trap.target_value()])? else {
        return trap.target.is_extensible();
    };
    let result = result.to_boolean();
    if result != trap.target.is_extensible()? {
        return Err(trap.violation(ProxyInvariant::IsExtensibleMismatch));
    }
    Ok(result)
}

/// `[[PreventExtensions]]`
pub fn proxy_prevent_extensions(proxy: &ProxyData) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "preventExtensions")?;
    let Some(result) = trap.invoke(&[trap.target_value()])? else {
        return trap.target.prevent_extensions();
    };
    let result = result.to_boolean();
    if result && trap.target.is_extensible()? {
        return Err(trap.violation(ProxyInvariant::PreventExtensionsStillExtensible));
    }
    Ok(result)
}

/// `[[GetOwnProperty]]`
pub fn proxy_get_own_property_descriptor(
    proxy: &ProxyData,
    key: &PropertyKey,
) -> ObjectResult<Option<Property>> {
    let trap = Trap::lookup(proxy, "getOwnPropertyDescriptor")?;
    let Some(result) = trap.invoke(&[trap.target_value(), key.to_value()])? else {
        return trap.target.get_own_property(key);
    };
    if !matches!(result, Value::Object(_) | Value::Undefined) {
        return Err(trap.invalid_result("must return an object or undefined"));
    }
    let target_desc = trap.target.get_own_property(key)?;

    if result.is_undefined() {
        let Some(target_desc) = target_desc else {
            return Ok(None);
        };
        if !target_desc.configurable() {
            return Err(trap.violation(ProxyInvariant::GetOwnPropertyHidesNonConfigurable));
        }
        if !trap.target.is_extensible()? {
            return Err(trap.violation(ProxyInvariant::GetOwnPropertyHidesOnNonExtensible));
        }
        return Ok(None);
    }

    let extensible = trap.target.is_extensible()?;
    let result_desc = to_property_descriptor(&result)?;
    let completed = complete_property_descriptor(&result_desc);
    validate_get_own_property_descriptor_invariants(
        &trap,
        extensible,
        &completed,
        &result_desc,
        target_desc.as_ref(),
    )?;
    Ok(Some(completed))
}

fn validate_get_own_property_descriptor_invariants(
    trap: &Trap,
    extensible: bool,
    completed: &Property,
    result_desc: &PartialDescriptor,
    target_desc: Option<&Property>,
) -> ObjectResult<()> {
    if !is_compatible_property_descriptor(extensible, &completed.to_descriptor(), target_desc) {
        return Err(trap.violation(ProxyInvariant::GetOwnPropertyIncompatible));
    }
    if completed.configurable() {
        return Ok(());
    }
    match target_desc {
        Some(target_desc) if !target_desc.configurable() => {
            if result_desc.writable == Some(false) && target_desc.writable() {
                return Err(trap.violation(ProxyInvariant::GetOwnPropertyFalseNonWritable));
            }
            Ok(())
        }
        _ => Err(trap.violation(ProxyInvariant::GetOwnPropertyFalseNonConfigurable)),
    }
}

/// `[[DefineOwnProperty]]`
pub fn proxy_define_property(
    proxy: &ProxyData,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "defineProperty")?;
    if trap.function.is_none() {
        return trap.target.define_own_property(key, desc);
    }
    let desc_obj = from_property_descriptor(Some(desc), proxy.realm())?;
    let result = trap
        .invoke(&[trap.target_value(), key.to_value(), desc_obj])?
        .unwrap_or_default();
    if !result.to_boolean() {
        return Ok(false);
    }
    validate_define_property_invariants(&trap, key, desc)?;
    Ok(true)
}

fn validate_define_property_invariants(
    trap: &Trap,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<()> {
    let target_desc = trap.target.get_own_property(key)?;
    let extensible = trap.target.is_extensible()?;
    let setting_config_false = desc.configurable == Some(false);

    let Some(target_desc) = target_desc else {
        if !extensible {
            return Err(trap.violation(ProxyInvariant::DefineOnNonExtensible));
        }
        if setting_config_false {
            return Err(trap.violation(ProxyInvariant::DefineFalseNonConfigurable));
        }
        return Ok(());
    };

    if !is_compatible_property_descriptor(extensible, desc, Some(&target_desc)) {
        return Err(trap.violation(ProxyInvariant::DefineIncompatible));
    }
    if setting_config_false && target_desc.configurable() {
        return Err(trap.violation(ProxyInvariant::DefineFalseNonConfigurable));
    }
    if let Property::Data {
        writable: true,
        configurable: false,
        ..
    } = target_desc
        && desc.writable == Some(false)
    {
        return Err(trap.violation(ProxyInvariant::DefineFalseNonWritable));
    }
    Ok(())
}

/// `[[HasProperty]]`
pub fn proxy_has(proxy: &ProxyData, key: &PropertyKey) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "has")?;
    let Some(result) = trap.invoke(&[trap.target_value(), key.to_value()])? else {
        return trap.target.has_property(key);
    };
    let result = result.to_boolean();
    if !result {
        validate_has_trap_invariants(&trap, key)?;
    }
    Ok(result)
}

/// A `false` answer may not hide a property the target must keep reporting
fn validate_has_trap_invariants(trap: &Trap, key: &PropertyKey) -> ObjectResult<()> {
    if let Some(target_desc) = trap.target.get_own_property(key)? {
        if !target_desc.configurable() {
            return Err(trap.violation(ProxyInvariant::HasHidesNonConfigurable));
        }
        if !trap.target.is_extensible()? {
            return Err(trap.violation(ProxyInvariant::HasHidesOnNonExtensible));
        }
    }
    Ok(())
}

/// `[[Get]]`
pub fn proxy_get(proxy: &ProxyData, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
    let trap = Trap::lookup(proxy, "get")?;
    let args = [trap.target_value(), key.to_value(), receiver.clone()];
    let Some(result) = trap.invoke(&args)? else {
        return trap.target.get(key, receiver);
    };
    validate_get_trap_invariants(&trap, key, &result)?;
    Ok(result)
}

fn validate_get_trap_invariants(
    trap: &Trap,
    key: &PropertyKey,
    result: &Value,
) -> ObjectResult<()> {
    match trap.target.get_own_property(key)? {
        Some(Property::Data {
            value,
            writable: false,
            configurable: false,
            ..
        }) if !same_value(result, &value) => {
            Err(trap.violation(ProxyInvariant::GetFrozenValueMismatch))
        }
        Some(Property::Accessor {
            get: None,
            configurable: false,
            ..
        }) if !result.is_undefined() => {
            Err(trap.violation(ProxyInvariant::GetAccessorWithoutGetter))
        }
        _ => Ok(()),
    }
}

/// `[[Set]]`
pub fn proxy_set(
    proxy: &ProxyData,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "set")?;
    let args = [trap.target_value(), key.to_value(), value.clone(), receiver.clone()];
    let Some(result) = trap.invoke(&args)? else {
        return trap.target.set(key, value, receiver);
    };
    if !result.to_boolean() {
        return Ok(false);
    }
    validate_set_trap_invariants(&trap, key, &value)?;
    Ok(true)
}

fn validate_set_trap_invariants(trap: &Trap, key: &PropertyKey, value: &Value) -> ObjectResult<()> {
    match trap.target.get_own_property(key)? {
        Some(Property::Data {
            value: target_value,
            writable: false,
            configurable: false,
            ..
        }) if !same_value(value, &target_value) => {
            Err(trap.violation(ProxyInvariant::SetFrozenValue))
        }
        Some(Property::Accessor {
            set: None,
            configurable: false,
            ..
        }) => Err(trap.violation(ProxyInvariant::SetAccessorWithoutSetter)),
        _ => Ok(()),
    }
}

/// `[[Delete]]`
pub fn proxy_delete_property(proxy: &ProxyData, key: &PropertyKey) -> ObjectResult<bool> {
    let trap = Trap::lookup(proxy, "deleteProperty")?;
    let Some(result) = trap.invoke(&[trap.target_value(), key.to_value()])? else {
        return trap.target.delete(key);
    };
    if !result.to_boolean() {
        return Ok(false);
    }
    validate_delete_trap_invariants(&trap, key)?;
    Ok(true)
}

fn validate_delete_trap_invariants(trap: &Trap, key: &PropertyKey) -> ObjectResult<()> {
    let Some(target_desc) = trap.target.get_own_property(key)? else {
        return Ok(());
    };
    if !target_desc.configurable() {
        return Err(trap.violation(ProxyInvariant::DeleteNonConfigurable));
    }
    if !trap.target.is_extensible()? {
        return Err(trap.violation(ProxyInvariant::DeleteOnNonExtensible));
    }
    Ok(())
}

/// `[[OwnPropertyKeys]]`
pub fn proxy_own_keys(proxy: &ProxyData) -> ObjectResult<Vec<PropertyKey>> {
    let trap = Trap::lookup(proxy, "ownKeys")?;
    let Some(result) = trap.invoke(&[trap.target_value()])? else {
        return trap.target.own_property_keys();
    };
    let entries = create_list_from_array_like(&result, ElementTypes::PropertyKeys)?;
    let trap_keys: Vec<PropertyKey> = entries
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(PropertyKey::from_js_string(s)),
            Value::Symbol(sym) => Some(PropertyKey::Symbol(sym)),
            _ => None,
        })
        .collect();
    validate_own_keys_trap_invariants(&trap, &trap_keys)?;
    Ok(trap_keys)
}

fn validate_own_keys_trap_invariants(trap: &Trap, trap_keys: &[PropertyKey]) -> ObjectResult<()> {
    let mut unchecked: FxHashSet<&PropertyKey> = FxHashSet::default();
    for key in trap_keys {
        if !unchecked.insert(key) {
            return Err(trap.violation(ProxyInvariant::OwnKeysDuplicate));
        }
    }

    let extensible = trap.target.is_extensible()?;
    let mut configurable_keys = Vec::new();
    let mut nonconfigurable_keys = Vec::new();
    for key in trap.target.own_property_keys()? {
        match trap.target.get_own_property(&key)? {
            Some(desc) if !desc.configurable() => nonconfigurable_keys.push(key),
            _ => configurable_keys.push(key),
        }
    }
    if extensible && nonconfigurable_keys.is_empty() {
        return Ok(());
    }

    for key in &nonconfigurable_keys {
        if !unchecked.remove(key) {
            return Err(trap.violation(ProxyInvariant::OwnKeysMissingNonConfigurable));
        }
    }
    if extensible {
        return Ok(());
    }
    for key in &configurable_keys {
        if !unchecked.remove(key) {
            return Err(trap.violation(ProxyInvariant::OwnKeysMissingOnNonExtensible));
        }
    }
    if !unchecked.is_empty() {
        return Err(trap.violation(ProxyInvariant::OwnKeysExtraOnNonExtensible));
    }
    Ok(())
}

/// `[[Call]]`
pub fn proxy_apply(proxy: &ProxyData, this: &Value, args: &[Value]) -> ObjectResult<Value> {
    let trap = Trap::lookup(proxy, "apply")?;
    if trap.function.is_none() {
        return trap.target.call(this, args);
    }
    let arg_array = create_array_from_list(Some(proxy.realm().array_prototype().clone()), args)?;
    let result = trap.invoke(&[trap.target_value(), this.clone(), Value::Object(arg_array)])?;
    Ok(result.unwrap_or_default())
}

/// `[[Construct]]`
pub fn proxy_construct(
    proxy: &ProxyData,
    args: &[Value],
    new_target: &ObjectRef,
) -> ObjectResult<ObjectRef> {
    let trap = Trap::lookup(proxy, "construct")?;
    if trap.function.is_none() {
        return trap.target.construct(args, new_target);
    }
    let arg_array = create_array_from_list(Some(proxy.realm().array_prototype().clone()), args)?;
    let result = trap.invoke(&[
        trap.target_value(),
        Value::Object(arg_array),
        Value::Object(new_target.clone()),
    ])?;
    match result {
        Some(Value::Object(obj)) => Ok(obj),
        _ => Err(trap.violation(ProxyInvariant::ConstructNonObject)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_data_property;
    use crate::proxy::{proxy_create, proxy_create_revocable};
    use crate::realm::Realm;
    use std::sync::Arc;

    fn handler_with(
        trap: &str,
        f: impl Fn(&Value, &[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
    ) -> ObjectRef {
        let handler = ObjectRef::ordinary(None);
        create_data_property(
            &handler,
            &PropertyKey::from(trap),
            Value::Object(ObjectRef::function(None, f)),
        )
        .unwrap();
        handler
    }

    fn proxy_over(realm: &Arc<Realm>, target: &ObjectRef, handler: &ObjectRef) -> ObjectRef {
        proxy_create(realm, &Value::Object(target.clone()), &Value::Object(handler.clone()))
            .unwrap()
    }

    fn violation<T: std::fmt::Debug>(result: ObjectResult<T>) -> ProxyInvariant {
        result.unwrap_err().proxy_invariant().unwrap()
    }

    #[test]
    fn test_forwarding_without_traps() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let proxy = proxy_over(&realm, &target, &ObjectRef::ordinary(None));
        let key = PropertyKey::from("x");
        assert!(
            proxy
                .define_own_property(&key, &PartialDescriptor::data(Value::int32(1)))
                .unwrap()
        );
        assert_eq!(target.get(&key, &Value::Undefined).unwrap(), Value::int32(1));
        assert!(proxy.has_property(&key).unwrap());
        assert_eq!(proxy.own_property_keys().unwrap(), vec![key.clone()]);
        assert!(proxy.delete(&key).unwrap());
        assert!(!target.has_property(&key).unwrap());
    }

    #[test]
    fn test_get_trap_receives_target_key_receiver() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let handler = handler_with("get", |_, args| Ok(args[1].clone()));
        let proxy = proxy_over(&realm, &target, &handler);
        let receiver = Value::Object(proxy.clone());
        assert_eq!(
            proxy.get(&PropertyKey::from("name"), &receiver).unwrap(),
            Value::string("name")
        );
        assert_eq!(proxy.get(&PropertyKey::Index(3), &receiver).unwrap(), Value::string("3"));
    }

    #[test]
    fn test_get_frozen_value_mismatch() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("k");
        target
            .define_own_property(&key, &PartialDescriptor::value(Value::int32(1)))
            .unwrap();
        let proxy = proxy_over(&realm, &target, &handler_with("get", |_, _| Ok(Value::int32(2))));
        assert_eq!(
            violation(proxy.get(&key, &Value::Undefined)),
            ProxyInvariant::GetFrozenValueMismatch
        );
    }

    #[test]
    fn test_has_cannot_hide_non_configurable() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("k");
        target
            .define_own_property(&key, &PartialDescriptor::value(Value::Null))
            .unwrap();
        let handler = handler_with("has", |_, _| Ok(Value::boolean(false)));
        let proxy = proxy_over(&realm, &target, &handler);
        assert_eq!(
            violation(proxy.has_property(&key)),
            ProxyInvariant::HasHidesNonConfigurable
        );
        assert!(!proxy.has_property(&PropertyKey::from("other")).unwrap());
    }

    #[test]
    fn test_get_own_property_descriptor_rules() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("k");
        let handler = handler_with("getOwnPropertyDescriptor", |_, _| Ok(Value::Undefined));
        let proxy = proxy_over(&realm, &target, &handler);
        assert_eq!(proxy.get_own_property(&key).unwrap(), None);

        target
            .define_own_property(&key, &PartialDescriptor::value(Value::Null))
            .unwrap();
        assert_eq!(
            violation(proxy.get_own_property(&key)),
            ProxyInvariant::GetOwnPropertyHidesNonConfigurable
        );

        let reporting = realm.clone();
        let handler = handler_with("getOwnPropertyDescriptor", move |_, _| {
            from_property_descriptor(
                Some(&PartialDescriptor::data_with(Value::Null, true, false, false)),
                &reporting,
            )
        });
        let fresh = ObjectRef::ordinary(None);
        let proxy = proxy_over(&realm, &fresh, &handler);
        assert_eq!(
            violation(proxy.get_own_property(&key)),
            ProxyInvariant::GetOwnPropertyFalseNonConfigurable
        );
    }

    #[test]
    fn test_define_property_rules() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("k");
        let handler = handler_with("defineProperty", |_, _| Ok(Value::boolean(true)));
        let proxy = proxy_over(&realm, &target, &handler);

        assert!(proxy.define_own_property(&key, &PartialDescriptor::data(Value::Null)).unwrap());
        assert_eq!(
            violation(proxy.define_own_property(
                &key,
                &PartialDescriptor::data_with(Value::Null, true, true, false)
            )),
            ProxyInvariant::DefineFalseNonConfigurable
        );
        target.prevent_extensions().unwrap();
        assert_eq!(
            violation(proxy.define_own_property(&key, &PartialDescriptor::data(Value::Null))),
            ProxyInvariant::DefineOnNonExtensible
        );
    }

    #[test]
    fn test_define_trap_sees_descriptor_object() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let handler = handler_with("defineProperty", |_, args| {
            let desc = to_property_descriptor(&args[2])?;
            Ok(Value::boolean(desc.value == Some(Value::int32(7))))
        });
        let proxy = proxy_over(&realm, &target, &handler);
        let key = PropertyKey::from("k");
        assert!(
            proxy
                .define_own_property(&key, &PartialDescriptor::data(Value::int32(7)))
                .unwrap()
        );
        assert!(
            !proxy
                .define_own_property(&key, &PartialDescriptor::data(Value::int32(8)))
                .unwrap()
        );
    }

    #[test]
    fn test_delete_rules() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("k");
        let proxy = proxy_over(
            &realm,
            &target,
            &handler_with("deleteProperty", |_, _| Ok(Value::boolean(true))),
        );
        assert!(proxy.delete(&key).unwrap());
        create_data_property(&target, &key, Value::Null).unwrap();
        target.prevent_extensions().unwrap();
        assert_eq!(violation(proxy.delete(&key)), ProxyInvariant::DeleteOnNonExtensible);
    }

    #[test]
    fn test_set_prototype_of_on_non_extensible_target() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        target.prevent_extensions().unwrap();
        let proxy = proxy_over(
            &realm,
            &target,
            &handler_with("setPrototypeOf", |_, _| Ok(Value::boolean(true))),
        );
        assert!(proxy.set_prototype_of(None).unwrap());
        assert_eq!(
            violation(proxy.set_prototype_of(Some(ObjectRef::ordinary(None)))),
            ProxyInvariant::SetPrototypeOfNonExtensible
        );
    }

    #[test]
    fn test_get_prototype_of_result_type() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let proxy = proxy_over(
            &realm,
            &target,
            &handler_with("getPrototypeOf", |_, _| Ok(Value::int32(1))),
        );
        assert!(matches!(
            proxy.get_prototype_of(),
            Err(ObjectError::TypeInvariant(TypeInvariant::InvalidTrapResult { .. }))
        ));
    }

    #[test]
    fn test_own_keys_rules() {
        let realm = Realm::new();
        let target = ObjectRef::ordinary(None);
        let key = PropertyKey::from("fixed");
        target
            .define_own_property(&key, &PartialDescriptor::value(Value::Null))
            .unwrap();
        let array_realm = realm.clone();
        let handler = handler_with("ownKeys", move |_, _| {
            let array = create_array_from_list(
                Some(array_realm.array_prototype().clone()),
                &[Value::string("extra")],
            )?;
            Ok(Value::Object(array))
        });
        let proxy = proxy_over(&realm, &target, &handler);
        assert_eq!(
            violation(proxy.own_property_keys()),
            ProxyInvariant::OwnKeysMissingNonConfigurable
        );
    }

    #[test]
    fn test_apply_and_construct() {
        let realm = Realm::new();
        let target = ObjectRef::constructor(
            None,
            |_, _| Ok(Value::int32(0)),
            |_, _| Ok(ObjectRef::ordinary(None)),
        );
        let handler = handler_with("apply", |_, args| {
            let Value::Object(list) = &args[2] else {
                return Ok(Value::Undefined);
            };
            list.get(&PropertyKey::Index(0), &args[2])
        });
        create_data_property(
            &handler,
            &PropertyKey::from("construct"),
            Value::Object(ObjectRef::function(None, |_, _| Ok(Value::int32(1)))),
        )
        .unwrap();
        let proxy = proxy_over(&realm, &target, &handler);
        assert!(proxy.is_callable() && proxy.is_constructor());
        assert_eq!(
            proxy.call(&Value::Undefined, &[Value::int32(5)]).unwrap(),
            Value::int32(5)
        );
        assert_eq!(
            violation(proxy.construct(&[], &proxy)),
            ProxyInvariant::ConstructNonObject
        );
    }

    #[test]
    fn test_non_callable_trap() {
        let realm = Realm::new();
        let handler = ObjectRef::ordinary(None);
        create_data_property(&handler, &PropertyKey::from("get"), Value::int32(1)).unwrap();
        let proxy = proxy_over(&realm, &ObjectRef::ordinary(None), &handler);
        assert!(matches!(
            proxy.get(&PropertyKey::from("x"), &Value::Undefined),
            Err(ObjectError::TypeInvariant(TypeInvariant::NotCallable(_)))
        ));
    }

    #[test]
    fn test_proxy_chain_depth_limit() {
        let realm = Realm::with_config(crate::config::RealmConfig::new().proxy_depth_limit(8));
        let mut head = ObjectRef::ordinary(None);
        for _ in 0..16 {
            head = proxy_over(&realm, &head, &ObjectRef::ordinary(None));
        }
        assert!(matches!(
            head.get(&PropertyKey::from("x"), &Value::Undefined),
            Err(ObjectError::StackOverflow)
        ));
        crate::config::RealmConfig::default().install();
    }

    #[test]
    fn test_revocation_reported_at_depth_limit() {
        let realm = Realm::with_config(crate::config::RealmConfig::new().proxy_depth_limit(1));
        let revocable = proxy_create_revocable(
            &realm,
            &Value::Object(ObjectRef::ordinary(None)),
            &Value::Object(ObjectRef::ordinary(None)),
        )
        .unwrap();
        revocable.revoke.call(&Value::Undefined, &[]).unwrap();
        let outer = proxy_over(&realm, &revocable.proxy, &ObjectRef::ordinary(None));
        let key = PropertyKey::from("x");
        assert!(outer.get(&key, &Value::Undefined).unwrap_err().is_revoked());
        assert!(outer.has_property(&key).unwrap_err().is_revoked());
        crate::config::RealmConfig::default().install();
    }
}
