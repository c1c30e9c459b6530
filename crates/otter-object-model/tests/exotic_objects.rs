//! Exotic object behaviour through the public internal-method surface

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use otter_object_model::arguments::create_mapped_arguments_object;
use otter_object_model::array::array_length;
use otter_object_model::integer_indexed::integer_indexed_create;
use otter_object_model::module_namespace::{
    BindingName, ResolvedBinding, module_namespace_create,
};
use otter_object_model::operations::{
    create_data_property, define_property_or_throw, set,
};
use otter_object_model::string_object::string_create;
use otter_object_model::typed_array::{TypedArray, TypedArrayKind};
use otter_object_model::{
    BindingError, Environment, InternalMethods, JsString, ModuleRecord, ObjectError, ObjectRef,
    ObjectResult, PartialDescriptor, Property, PropertyKey, Realm, ResolvedExport, Value,
    array_create,
};

#[derive(Default)]
struct Scope(Mutex<FxHashMap<String, Option<Value>>>);

impl Scope {
    fn with(bindings: &[(&str, Option<Value>)]) -> Arc<Self> {
        let scope = Self::default();
        for (name, value) in bindings {
            scope.0.lock().insert(name.to_string(), value.clone());
        }
        Arc::new(scope)
    }

    fn read(&self, name: &str) -> Option<Value> {
        self.0.lock().get(name).cloned().flatten()
    }

    fn write(&self, name: &str, value: Value) {
        self.0.lock().insert(name.to_string(), Some(value));
    }
}

impl Environment for Scope {
    fn get_binding(&self, name: &JsString) -> ObjectResult<Value> {
        match self.0.lock().get(name.as_str()) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(BindingError::Uninitialized(name.to_string()).into()),
            None => Err(BindingError::Unresolvable(name.to_string()).into()),
        }
    }

    fn set_binding(&self, name: &JsString, value: Value) -> ObjectResult<()> {
        self.write(name.as_str(), value);
        Ok(())
    }

    fn has_binding(&self, name: &JsString) -> bool {
        self.0.lock().contains_key(name.as_str())
    }
}

fn get(obj: &ObjectRef, key: impl Into<PropertyKey>) -> Value {
    obj.get(&key.into(), &Value::Object(obj.clone())).unwrap()
}

// ============================================================================
// Array
// ============================================================================

#[test]
fn test_array_shrink_stops_at_non_configurable_element() {
    let realm = Realm::new();
    let array = array_create(0, Some(realm.array_prototype().clone())).unwrap();
    for i in 0..10u32 {
        create_data_property(&array, &PropertyKey::from(i), Value::int32(i as i32)).unwrap();
    }
    array
        .define_own_property(
            &PropertyKey::Index(5),
            &PartialDescriptor::new().with_configurable(false),
        )
        .unwrap();

    let shrunk = array
        .define_own_property(
            &PropertyKey::from("length"),
            &PartialDescriptor::value(Value::int32(0)),
        )
        .unwrap();

    assert!(!shrunk);
    assert_eq!(array_length(&array).map(|l| l.length), Some(6));
    for i in 0..=5u32 {
        assert!(array.get_own_property(&PropertyKey::from(i)).unwrap().is_some());
    }
    for i in 6..10u32 {
        assert!(array.get_own_property(&PropertyKey::from(i)).unwrap().is_none());
    }
}

#[test]
fn test_array_length_tracks_highest_index() {
    let array = array_create(0, None).unwrap();
    create_data_property(&array, &PropertyKey::from(41u32), Value::Null).unwrap();
    assert_eq!(get(&array, "length"), Value::int32(42));

    assert!(set(&array, &PropertyKey::from("length"), Value::int32(2), true).unwrap());
    assert!(array.get_own_property(&PropertyKey::from(41u32)).unwrap().is_none());
    assert_eq!(
        array.own_property_keys().unwrap(),
        vec![PropertyKey::from("length")]
    );
}

#[test]
fn test_array_length_rejects_fractions() {
    let array = array_create(3, None).unwrap();
    let result = array.define_own_property(
        &PropertyKey::from("length"),
        &PartialDescriptor::value(Value::number(1.5)),
    );
    assert!(matches!(result, Err(ObjectError::RangeInvalid(_))));
    assert_eq!(array_length(&array).map(|l| l.length), Some(3));
}

#[test]
fn test_frozen_length_blocks_appends() {
    let array = array_create(1, None).unwrap();
    define_property_or_throw(
        &array,
        &PropertyKey::from("length"),
        &PartialDescriptor::new().with_writable(false),
    )
    .unwrap();
    assert!(!create_data_property(&array, &PropertyKey::from(1u32), Value::Null).unwrap());
    assert!(create_data_property(&array, &PropertyKey::from(0u32), Value::Null).unwrap());
}

// ============================================================================
// Arguments
// ============================================================================

fn mapped(scope: &Arc<Scope>, formals: &[&str], args: &[Value]) -> ObjectRef {
    let realm = Realm::new();
    let func = ObjectRef::function(None, |_, _| Ok(Value::Undefined));
    let formals: Vec<Arc<JsString>> = formals.iter().map(|f| JsString::intern(f)).collect();
    create_mapped_arguments_object(&realm, &func, &formals, args, scope.clone())
}

#[test]
fn test_arguments_write_is_visible_through_parameter() {
    let scope = Scope::with(&[("a", Some(Value::int32(1)))]);
    let arguments = mapped(&scope, &["a"], &[Value::int32(1)]);

    assert!(set(&arguments, &PropertyKey::from(0u32), Value::int32(99), true).unwrap());
    assert_eq!(scope.read("a"), Some(Value::int32(99)));

    scope.write("a", Value::int32(7));
    assert_eq!(get(&arguments, 0u32), Value::int32(7));
}

#[test]
fn test_arguments_non_writable_define_breaks_alias() {
    let scope = Scope::with(&[("a", Some(Value::int32(1)))]);
    let arguments = mapped(&scope, &["a"], &[Value::int32(1)]);

    scope.write("a", Value::int32(2));
    define_property_or_throw(
        &arguments,
        &PropertyKey::from(0u32),
        &PartialDescriptor::new().with_writable(false),
    )
    .unwrap();

    scope.write("a", Value::int32(3));
    assert_eq!(get(&arguments, 0u32), Value::int32(2));
    assert_eq!(
        arguments.get_own_property(&PropertyKey::from(0u32)).unwrap(),
        Some(Property::data_with(Value::int32(2), false, true, true))
    );
}

#[test]
fn test_arguments_delete_then_redefine_is_unmapped() {
    let scope = Scope::with(&[("a", Some(Value::int32(1)))]);
    let arguments = mapped(&scope, &["a"], &[Value::int32(1)]);

    assert!(arguments.delete(&PropertyKey::from(0u32)).unwrap());
    assert!(create_data_property(&arguments, &PropertyKey::from(0u32), Value::int32(5)).unwrap());
    assert_eq!(scope.read("a"), Some(Value::int32(1)));
    assert_eq!(get(&arguments, 0u32), Value::int32(5));
}

// ============================================================================
// String
// ============================================================================

#[test]
fn test_string_object_indices_are_read_only() {
    let realm = Realm::new();
    let boxed = string_create(JsString::intern("ab"), Some(realm.string_prototype().clone()));

    assert_eq!(get(&boxed, 1u32), Value::string("b"));
    assert!(!set(&boxed, &PropertyKey::from(0u32), Value::string("z"), false).unwrap());
    assert!(!boxed.delete(&PropertyKey::from(0u32)).unwrap());
    assert!(create_data_property(&boxed, &PropertyKey::from(5u32), Value::Null).unwrap());
    assert_eq!(
        boxed.own_property_keys().unwrap(),
        vec![
            PropertyKey::from(0u32),
            PropertyKey::from(1u32),
            PropertyKey::from(5u32),
            PropertyKey::from("length"),
        ]
    );
}

// ============================================================================
// Integer-indexed
// ============================================================================

#[test]
fn test_typed_elements_through_object_surface() {
    let elements = Arc::new(TypedArray::with_length(TypedArrayKind::Uint8Clamped, 2));
    let obj = integer_indexed_create(elements.clone(), None);

    assert!(set(&obj, &PropertyKey::from(0u32), Value::number(300.0), true).unwrap());
    assert!(set(&obj, &PropertyKey::from(1u32), Value::number(2.5), true).unwrap());
    assert_eq!(elements.get(0), Some(255.0));
    assert_eq!(elements.get(1), Some(2.0));

    assert!(set(&obj, &PropertyKey::from("-0"), Value::int32(1), true).unwrap());
    assert!(obj.get_own_property(&PropertyKey::from("-0")).unwrap().is_some());
    assert!(obj.get_own_property(&PropertyKey::from("2")).unwrap().is_none());
}

// ============================================================================
// Module namespace
// ============================================================================

struct Module {
    env: Arc<Scope>,
}

impl ModuleRecord for Module {
    fn resolve_export(&self, name: &JsString) -> ResolvedExport {
        if name.as_str() == "missing" {
            return ResolvedExport::NotFound;
        }
        ResolvedExport::Resolved(ResolvedBinding {
            module: Arc::new(Module {
                env: self.env.clone(),
            }),
            binding_name: BindingName::Name(JsString::intern(name.as_str())),
        })
    }

    fn environment(&self) -> Option<Arc<dyn Environment>> {
        Some(self.env.clone())
    }

    fn namespace(&self) -> ObjectResult<ObjectRef> {
        Err(BindingError::Unlinked("namespace".to_string()).into())
    }
}

#[test]
fn test_namespace_reads_live_bindings() {
    let env = Scope::with(&[("count", Some(Value::int32(0))), ("later", None)]);
    let ns = module_namespace_create(
        Arc::new(Module { env: env.clone() }),
        ["later", "count"].map(JsString::intern),
    );

    assert_eq!(get(&ns, "count"), Value::int32(0));
    env.write("count", Value::int32(1));
    assert_eq!(get(&ns, "count"), Value::int32(1));

    assert!(matches!(
        ns.get(&PropertyKey::from("later"), &Value::Undefined),
        Err(ObjectError::BindingUnavailable(BindingError::Uninitialized(_)))
    ));
    assert_eq!(
        ns.own_property_keys().unwrap()[..2],
        [PropertyKey::from("count"), PropertyKey::from("later")]
    );
    assert!(!ns.is_extensible().unwrap());
    assert!(!set(&ns, &PropertyKey::from("count"), Value::Null, false).unwrap());
    assert!(!ns.delete(&PropertyKey::from("count")).unwrap());
}
