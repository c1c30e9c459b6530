//! Module namespace exotic objects
//!
//! A namespace is a frozen view of a module's exports. Its string keys are
//! the sorted export names; each read resolves the export again and reads
//! the live binding from the exporting module's environment.

use std::sync::Arc;

use crate::arguments::Environment;
use crate::error::{BindingError, ObjectResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property::{PartialDescriptor, Property, PropertyKey};
use crate::string::JsString;
use crate::value::{Symbol, Value, same_value};

/// Module resolution collaborator
pub trait ModuleRecord: Send + Sync {
    /// ResolveExport
    fn resolve_export(&self, name: &JsString) -> ResolvedExport;
    /// The module's binding environment, once linked
    fn environment(&self) -> Option<Arc<dyn Environment>>;
    /// GetModuleNamespace
    fn namespace(&self) -> ObjectResult<ObjectRef>;
}

/// What a resolved export refers to
#[derive(Debug, Clone)]
pub enum BindingName {
    /// A binding in the target module's environment
    Name(Arc<JsString>),
    /// The target module's namespace object (`export * as ns`)
    Namespace,
}

/// A successfully resolved export
#[derive(Clone)]
pub struct ResolvedBinding {
    /// Module owning the binding
    pub module: Arc<dyn ModuleRecord>,
    /// Binding within that module
    pub binding_name: BindingName,
}

/// Outcome of export resolution
#[derive(Clone)]
pub enum ResolvedExport {
    /// Resolved to exactly one binding
    Resolved(ResolvedBinding),
    /// Star exports provide conflicting bindings
    Ambiguous,
    /// No such export
    NotFound,
    /// Resolution ran in a cycle
    Circular,
}

/// Namespace-specific data
pub struct ModuleNamespace {
    module: Arc<dyn ModuleRecord>,
    exports: Vec<Arc<JsString>>,
}

impl ModuleNamespace {
    /// Exported names, sorted by UTF-16 code units
    pub fn exports(&self) -> &[Arc<JsString>] {
        &self.exports
    }

    /// The export name a key refers to, if it is one
    fn export_name(&self, key: &PropertyKey) -> Option<&Arc<JsString>> {
        let wanted = match key {
            PropertyKey::Symbol(_) => return None,
            PropertyKey::String(s) => s.clone(),
            PropertyKey::Index(n) => {
                let mut buf = itoa::Buffer::new();
                JsString::intern(buf.format(*n))
            }
        };
        self.exports
            .binary_search_by(|name| name.cmp_utf16(&wanted))
            .ok()
            .map(|i| &self.exports[i])
    }

    /// Read the current value of an export
    fn read(&self, name: &Arc<JsString>) -> ObjectResult<Value> {
        let binding = match self.module.resolve_export(name) {
            ResolvedExport::Resolved(binding) => binding,
            ResolvedExport::Ambiguous => {
                return Err(BindingError::Ambiguous(name.to_string()).into());
            }
            ResolvedExport::NotFound => {
                return Err(BindingError::Unresolvable(name.to_string()).into());
            }
            ResolvedExport::Circular => {
                return Err(BindingError::Circular(name.to_string()).into());
            }
        };
        match binding.binding_name {
            BindingName::Namespace => Ok(Value::Object(binding.module.namespace()?)),
            BindingName::Name(local) => match binding.module.environment() {
                Some(env) => env.get_binding(&local),
                None => Err(BindingError::Unlinked(name.to_string()).into()),
            },
        }
    }
}

impl std::fmt::Debug for ModuleNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleNamespace")
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}

/// ModuleNamespaceCreate
pub fn module_namespace_create(
    module: Arc<dyn ModuleRecord>,
    names: impl IntoIterator<Item = Arc<JsString>>,
) -> ObjectRef {
    let mut exports: Vec<Arc<JsString>> = names.into_iter().collect();
    exports.sort_by(|a, b| a.cmp_utf16(b));
    exports.dedup();

    let obj = ObjectRef::new(
        None,
        ObjectKind::ModuleNamespace(ModuleNamespace { module, exports }),
    );
    obj.insert_property(
        PropertyKey::Symbol(Symbol::to_string_tag()),
        Property::data_with(Value::string("Module"), false, false, false),
    );
    obj.state_mut().extensible = false;
    obj
}

/// SetImmutablePrototype
pub(crate) fn set_prototype_of(obj: &ObjectRef, prototype: Option<ObjectRef>) -> bool {
    obj.prototype_raw() == prototype
}

pub(crate) fn get_own_property(
    obj: &ObjectRef,
    ns: &ModuleNamespace,
    key: &PropertyKey,
) -> ObjectResult<Option<Property>> {
    if let PropertyKey::Symbol(_) = key {
        return Ok(ordinary::get_own_property(obj, key));
    }
    let Some(name) = ns.export_name(key) else {
        return Ok(None);
    };
    let value = ns.read(name)?;
    Ok(Some(Property::data_with(value, true, true, false)))
}

pub(crate) fn define_own_property(
    obj: &ObjectRef,
    ns: &ModuleNamespace,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> ObjectResult<bool> {
    if let PropertyKey::Symbol(_) = key {
        return ordinary::define_own_property(obj, key, desc);
    }
    let Some(current) = get_own_property(obj, ns, key)? else {
        return Ok(false);
    };
    if desc.configurable == Some(true)
        || desc.enumerable == Some(false)
        || desc.is_accessor()
        || desc.writable == Some(false)
    {
        return Ok(false);
    }
    match (&desc.value, current.value()) {
        (Some(requested), Some(live)) => Ok(same_value(requested, live)),
        _ => Ok(true),
    }
}

pub(crate) fn has_property(
    obj: &ObjectRef,
    ns: &ModuleNamespace,
    key: &PropertyKey,
) -> ObjectResult<bool> {
    if let PropertyKey::Symbol(_) = key {
        return ordinary::has_property(obj, key);
    }
    Ok(ns.export_name(key).is_some())
}

pub(crate) fn get(
    obj: &ObjectRef,
    ns: &ModuleNamespace,
    key: &PropertyKey,
    receiver: &Value,
) -> ObjectResult<Value> {
    if let PropertyKey::Symbol(_) = key {
        return ordinary::get(obj, key, receiver);
    }
    match ns.export_name(key) {
        Some(name) => ns.read(name),
        None => Ok(Value::Undefined),
    }
}

pub(crate) fn delete(
    obj: &ObjectRef,
    ns: &ModuleNamespace,
    key: &PropertyKey,
) -> ObjectResult<bool> {
    if let PropertyKey::Symbol(_) = key {
        return ordinary::delete(obj, key);
    }
    Ok(ns.export_name(key).is_none())
}

/// Export names in sorted order, then symbols
pub(crate) fn own_property_keys(obj: &ObjectRef, ns: &ModuleNamespace) -> Vec<PropertyKey> {
    let mut keys: Vec<PropertyKey> = ns
        .exports
        .iter()
        .map(|name| PropertyKey::from_js_string(name.clone()))
        .collect();
    keys.extend(obj.state().properties.symbol_keys());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use crate::object::InternalMethods;
    use parking_lot::Mutex;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct Bindings(Mutex<FxHashMap<String, Option<Value>>>);

    impl Environment for Bindings {
        fn get_binding(&self, name: &JsString) -> ObjectResult<Value> {
            match self.0.lock().get(name.as_str()) {
                Some(Some(value)) => Ok(value.clone()),
                Some(None) => Err(BindingError::Uninitialized(name.to_string()).into()),
                None => Err(BindingError::Unresolvable(name.to_string()).into()),
            }
        }

        fn set_binding(&self, name: &JsString, value: Value) -> ObjectResult<()> {
            self.0.lock().insert(name.to_string(), Some(value));
            Ok(())
        }

        fn has_binding(&self, name: &JsString) -> bool {
            self.0.lock().contains_key(name.as_str())
        }
    }

    struct Module {
        env: Arc<Bindings>,
    }

    impl ModuleRecord for Module {
        fn resolve_export(&self, name: &JsString) -> ResolvedExport {
            match name.as_str() {
                "ambiguous" => ResolvedExport::Ambiguous,
                _ => ResolvedExport::Resolved(ResolvedBinding {
                    module: Arc::new(Module {
                        env: self.env.clone(),
                    }),
                    binding_name: BindingName::Name(JsString::intern(name.as_str())),
                }),
            }
        }

        fn environment(&self) -> Option<Arc<dyn Environment>> {
            Some(self.env.clone())
        }

        fn namespace(&self) -> ObjectResult<ObjectRef> {
            Ok(ObjectRef::ordinary(None))
        }
    }

    fn namespace(names: &[&str]) -> (ObjectRef, Arc<Bindings>) {
        let env = Arc::new(Bindings::default());
        let module = Arc::new(Module { env: env.clone() });
        let ns = module_namespace_create(module, names.iter().map(|n| JsString::intern(n)));
        (ns, env)
    }

    #[test]
    fn test_sorted_unique_keys() {
        let (ns, _) = namespace(&["b", "a", "b", "Z"]);
        let keys = ns.own_property_keys().unwrap();
        assert_eq!(
            keys,
            vec![
                PropertyKey::from("Z"),
                PropertyKey::from("a"),
                PropertyKey::from("b"),
                PropertyKey::Symbol(Symbol::to_string_tag()),
            ]
        );
    }

    #[test]
    fn test_live_binding_reads() {
        let (ns, env) = namespace(&["x"]);
        let key = PropertyKey::from("x");
        env.0.lock().insert("x".into(), None);
        let err = ns.get(&key, &Value::Undefined).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::BindingUnavailable(BindingError::Uninitialized(_))
        ));
        env.0.lock().insert("x".into(), Some(Value::int32(1)));
        assert_eq!(ns.get(&key, &Value::Undefined).unwrap(), Value::int32(1));
        assert_eq!(
            ns.get_own_property(&key).unwrap(),
            Some(Property::data_with(Value::int32(1), true, true, false))
        );
    }

    #[test]
    fn test_ambiguous_export() {
        let (ns, _) = namespace(&["ambiguous"]);
        let err = ns.get(&PropertyKey::from("ambiguous"), &Value::Undefined).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::BindingUnavailable(BindingError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_immutable_surface() {
        let (ns, env) = namespace(&["x"]);
        env.0.lock().insert("x".into(), Some(Value::int32(1)));
        let key = PropertyKey::from("x");
        assert!(!ns.is_extensible().unwrap());
        assert!(ns.prevent_extensions().unwrap());
        assert!(ns.set_prototype_of(None).unwrap());
        assert!(!ns.set_prototype_of(Some(ObjectRef::ordinary(None))).unwrap());
        assert!(!ns.set(&key, Value::int32(2), &Value::Object(ns.clone())).unwrap());
        assert!(!ns.delete(&key).unwrap());
        assert!(ns.delete(&PropertyKey::from("missing")).unwrap());
        assert!(ns
            .define_own_property(&key, &PartialDescriptor::value(Value::int32(1)))
            .unwrap());
        assert!(!ns
            .define_own_property(&key, &PartialDescriptor::value(Value::int32(2)))
            .unwrap());
        assert!(!ns
            .define_own_property(&PropertyKey::from("y"), &PartialDescriptor::value(Value::Null))
            .unwrap());
    }

    #[test]
    fn test_numeric_export_names() {
        let (ns, env) = namespace(&["0"]);
        env.0.lock().insert("0".into(), Some(Value::boolean(true)));
        assert!(ns.has_property(&PropertyKey::Index(0)).unwrap());
        assert_eq!(
            ns.get(&PropertyKey::Index(0), &Value::Undefined).unwrap(),
            Value::boolean(true)
        );
    }
}
