//! Realms and their intrinsics.
//!
//! A Realm owns the handful of intrinsic objects the object model itself
//! needs: the base prototypes every exotic constructor links to and the
//! `%ThrowTypeError%` singleton used to poison `callee`.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::array::ArrayLength;
use crate::config::RealmConfig;
use crate::error::TypeInvariant;
use crate::object::{ObjectKind, ObjectRef};
use crate::property::{Property, PropertyKey};
use crate::string::JsString;
use crate::string_object::string_create;
use crate::value::Value;

/// Unique realm identifier.
pub type RealmId = u32;

static NEXT_REALM_ID: AtomicU32 = AtomicU32::new(0);

/// A realm record with its intrinsics.
pub struct Realm {
    id: RealmId,
    config: RealmConfig,
    object_prototype: ObjectRef,
    function_prototype: ObjectRef,
    array_prototype: ObjectRef,
    string_prototype: ObjectRef,
    throw_type_error: ObjectRef,
}

impl Realm {
    /// Create a realm with default limits.
    pub fn new() -> Arc<Self> {
        Self::with_config(RealmConfig::default())
    }

    /// Create a realm and make its limits active on the current thread.
    pub fn with_config(config: RealmConfig) -> Arc<Self> {
        config.install();

        let object_prototype = ObjectRef::ordinary(None);
        let function_prototype =
            ObjectRef::function(Some(object_prototype.clone()), |_, _| Ok(Value::Undefined));
        let array_prototype = ObjectRef::new(
            Some(object_prototype.clone()),
            ObjectKind::Array(Mutex::new(ArrayLength {
                length: 0,
                writable: true,
            })),
        );
        let string_prototype = string_create(JsString::intern(""), Some(object_prototype.clone()));
        let throw_type_error = create_throw_type_error(&function_prototype);

        let id = NEXT_REALM_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "otter::object", realm = id, "realm created");

        Arc::new(Self {
            id,
            config,
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            throw_type_error,
        })
    }

    /// Re-activate this realm's limits on the current thread.
    pub fn enter(&self) {
        self.config.install();
    }

    /// Realm id.
    pub fn id(&self) -> RealmId {
        self.id
    }

    /// Limits this realm was created with.
    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    /// `%Object.prototype%`
    pub fn object_prototype(&self) -> &ObjectRef {
        &self.object_prototype
    }

    /// `%Function.prototype%`
    pub fn function_prototype(&self) -> &ObjectRef {
        &self.function_prototype
    }

    /// `%Array.prototype%`
    pub fn array_prototype(&self) -> &ObjectRef {
        &self.array_prototype
    }

    /// `%String.prototype%`
    pub fn string_prototype(&self) -> &ObjectRef {
        &self.string_prototype
    }

    /// `%ThrowTypeError%`
    pub fn throw_type_error(&self) -> &ObjectRef {
        &self.throw_type_error
    }
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Frozen function that throws on every call
fn create_throw_type_error(function_prototype: &ObjectRef) -> ObjectRef {
    let func = ObjectRef::function(Some(function_prototype.clone()), |_, _| {
        Err(TypeInvariant::PoisonedAccess.into())
    });
    func.insert_property(
        PropertyKey::from("length"),
        Property::data_with(Value::int32(0), false, false, false),
    );
    func.insert_property(
        PropertyKey::from("name"),
        Property::data_with(Value::string(""), false, false, false),
    );
    func.state_mut().extensible = false;
    func
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use crate::object::InternalMethods;
    use crate::operations::{IntegrityLevel, test_integrity_level};

    #[test]
    fn test_intrinsic_links() {
        let realm = Realm::new();
        let op = realm.object_prototype();
        assert_eq!(op.get_prototype_of().unwrap(), None);
        assert_eq!(realm.function_prototype().get_prototype_of().unwrap().as_ref(), Some(op));
        assert!(realm.array_prototype().is_array().unwrap());
        assert!(realm.function_prototype().is_callable());
        assert_ne!(Realm::new().id(), realm.id());
    }

    #[test]
    fn test_throw_type_error_is_frozen_and_throws() {
        let realm = Realm::new();
        let thrower = realm.throw_type_error();
        assert!(test_integrity_level(thrower, IntegrityLevel::Frozen).unwrap());
        assert!(matches!(
            thrower.call(&Value::Undefined, &[]),
            Err(ObjectError::TypeInvariant(TypeInvariant::PoisonedAccess))
        ));
        assert_eq!(
            thrower.get_own_property(&PropertyKey::from("length")).unwrap(),
            Some(Property::data_with(Value::int32(0), false, false, false))
        );
    }

    #[test]
    fn test_with_config_installs_limits() {
        let realm = Realm::with_config(RealmConfig::new().proxy_depth_limit(7));
        assert_eq!(crate::config::active().proxy_depth_limit, 7);
        Realm::new();
        realm.enter();
        assert_eq!(crate::config::active().proxy_depth_limit, 7);
        RealmConfig::default().install();
    }
}
