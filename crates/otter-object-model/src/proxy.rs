//! Proxy exotic objects
//!
//! A proxy forwards every internal method to a handler object and checks
//! the handler's answers against its target (see [`crate::proxy_operations`]).
//! Revocation clears target and handler together and cannot be undone.
//!
//! ## Usage
//!
//! ```
//! use otter_object_model::{InternalMethods, ObjectRef, PropertyKey, Realm, Value};
//! use otter_object_model::proxy::proxy_create_revocable;
//!
//! let realm = Realm::new();
//! let target = Value::Object(ObjectRef::ordinary(None));
//! let handler = Value::Object(ObjectRef::ordinary(None));
//! let revocable = proxy_create_revocable(&realm, &target, &handler).unwrap();
//! revocable.revoke.call(&Value::Undefined, &[]).unwrap();
//! assert!(revocable.proxy.get_own_property(&PropertyKey::from("x")).is_err());
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::error::{ObjectError, ObjectResult, TypeInvariant};
use crate::object::{ObjectKind, ObjectRef};
use crate::realm::Realm;
use crate::value::Value;

struct ProxySlots {
    target: ObjectRef,
    handler: ObjectRef,
}

/// Proxy-specific data
pub struct ProxyData {
    slots: RwLock<Option<ProxySlots>>,
    callable: bool,
    constructor: bool,
    realm: Arc<Realm>,
}

impl std::fmt::Debug for ProxyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.slots.read() {
            None => write!(f, "Proxy {{ <revoked> }}"),
            Some(slots) => write!(f, "Proxy {{ target: {:?} }}", slots.target),
        }
    }
}

impl ProxyData {
    /// Whether the proxy was created over a callable target
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Whether the proxy was created over a constructor target
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    /// Check if this proxy has been revoked
    pub fn is_revoked(&self) -> bool {
        self.slots.read().is_none()
    }

    /// Get the target object; `None` once revoked
    pub fn target(&self) -> Option<ObjectRef> {
        self.slots.read().as_ref().map(|s| s.target.clone())
    }

    /// Get the handler object; `None` once revoked
    pub fn handler(&self) -> Option<ObjectRef> {
        self.slots.read().as_ref().map(|s| s.handler.clone())
    }

    pub(crate) fn target_or_revoked(&self, operation: &'static str) -> ObjectResult<ObjectRef> {
        self.target().ok_or_else(|| ObjectError::revoked(operation))
    }

    /// Target and handler, cloned out so no lock is held across a trap
    pub(crate) fn slots_or_revoked(
        &self,
        operation: &'static str,
    ) -> ObjectResult<(ObjectRef, ObjectRef)> {
        self.slots
            .read()
            .as_ref()
            .map(|s| (s.target.clone(), s.handler.clone()))
            .ok_or_else(|| ObjectError::revoked(operation))
    }

    pub(crate) fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Revoke this proxy
    ///
    /// After revocation, every internal method fails with a TypeError.
    pub fn revoke(&self) {
        if self.slots.write().take().is_some() {
            tracing::debug!(target: "otter::object", "proxy revoked");
        }
    }
}

/// ProxyCreate
pub fn proxy_create(
    realm: &Arc<Realm>,
    target: &Value,
    handler: &Value,
) -> ObjectResult<ObjectRef> {
    let (Value::Object(target), Value::Object(handler)) = (target, handler) else {
        return Err(TypeInvariant::ConversionFailed(
            "Cannot create proxy with a non-object as target or handler",
        )
        .into());
    };
    let data = ProxyData {
        callable: target.is_callable(),
        constructor: target.is_constructor(),
        slots: RwLock::new(Some(ProxySlots {
            target: target.clone(),
            handler: handler.clone(),
        })),
        realm: realm.clone(),
    };
    Ok(ObjectRef::new(None, ObjectKind::Proxy(data)))
}

/// Result of creating a revocable proxy
#[derive(Debug, Clone)]
pub struct RevocableProxy {
    /// The proxy object
    pub proxy: ObjectRef,
    /// Function object that revokes the proxy on first call
    pub revoke: ObjectRef,
}

/// `Proxy.revocable`
pub fn proxy_create_revocable(
    realm: &Arc<Realm>,
    target: &Value,
    handler: &Value,
) -> ObjectResult<RevocableProxy> {
    let proxy = proxy_create(realm, target, handler)?;
    let slot = Mutex::new(Some(proxy.clone()));
    let revoke = ObjectRef::function(Some(realm.function_prototype().clone()), move |_, _| {
        if let Some(proxy) = slot.lock().take() {
            proxy.revoke_proxy();
        }
        Ok(Value::Undefined)
    });
    Ok(RevocableProxy { proxy, revoke })
}

impl ObjectRef {
    /// Revoke a proxy; false if this is not a proxy
    pub fn revoke_proxy(&self) -> bool {
        match self.kind() {
            ObjectKind::Proxy(data) => {
                data.revoke();
                true
            }
            _ => false,
        }
    }

    /// Proxy data, if this is a proxy
    pub fn as_proxy(&self) -> Option<&ProxyData> {
        match self.kind() {
            ObjectKind::Proxy(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::InternalMethods;

    fn objects() -> (Value, Value) {
        (
            Value::Object(ObjectRef::ordinary(None)),
            Value::Object(ObjectRef::ordinary(None)),
        )
    }

    #[test]
    fn test_proxy_creation() {
        let realm = Realm::new();
        let (target, handler) = objects();
        let proxy = proxy_create(&realm, &target, &handler).unwrap();
        let data = proxy.as_proxy().unwrap();
        assert!(!data.is_revoked());
        assert_eq!(data.target().map(Value::Object), Some(target));
        assert!(!data.is_callable());
        assert!(proxy.is_proxy());
    }

    #[test]
    fn test_proxy_create_requires_objects() {
        let realm = Realm::new();
        let (target, _) = objects();
        assert!(proxy_create(&realm, &target, &Value::Null).is_err());
        assert!(proxy_create(&realm, &Value::int32(1), &target).is_err());
    }

    #[test]
    fn test_callable_target_makes_callable_proxy() {
        let realm = Realm::new();
        let func = Value::Object(ObjectRef::function(None, |_, _| Ok(Value::Undefined)));
        let (_, handler) = objects();
        let proxy = proxy_create(&realm, &func, &handler).unwrap();
        assert!(proxy.is_callable());
        assert!(!proxy.is_constructor());
    }

    #[test]
    fn test_proxy_revoke() {
        let realm = Realm::new();
        let (target, handler) = objects();
        let proxy = proxy_create(&realm, &target, &handler).unwrap();
        assert!(proxy.revoke_proxy());
        let data = proxy.as_proxy().unwrap();
        assert!(data.is_revoked());
        assert!(data.target().is_none());
        assert!(data.handler().is_none());
        assert!(data.target_or_revoked("get").unwrap_err().is_revoked());
        assert!(!ObjectRef::ordinary(None).revoke_proxy());
    }

    #[test]
    fn test_revocable_proxy() {
        let realm = Realm::new();
        let (target, handler) = objects();
        let RevocableProxy { proxy, revoke } =
            proxy_create_revocable(&realm, &target, &handler).unwrap();
        assert!(!proxy.as_proxy().unwrap().is_revoked());
        revoke.call(&Value::Undefined, &[]).unwrap();
        assert!(proxy.as_proxy().unwrap().is_revoked());
        revoke.call(&Value::Undefined, &[]).unwrap();
    }
}
