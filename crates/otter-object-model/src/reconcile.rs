//! Descriptor reconciliation (ValidateAndApplyPropertyDescriptor)
//!
//! [`reconcile`] is a pure function: it decides whether a requested
//! descriptor may be applied to a property in its current state and, if so,
//! computes the resulting property. Callers own the write. Proxies and
//! string exotic objects call it as a dry run through
//! [`is_compatible_property_descriptor`].

use crate::property::{PartialDescriptor, Property};
use crate::value::same_value;

/// Why a descriptor was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// New property on a non-extensible object
    NotExtensible,
    /// `configurable: true` requested on a non-configurable property
    ConfigurableChange,
    /// `enumerable` flip on a non-configurable property
    EnumerableChange,
    /// Data/accessor conversion of a non-configurable property
    KindChange,
    /// `writable: true` requested on a frozen data property
    WritableChange,
    /// Different value for a frozen data property
    ValueChange,
    /// Different getter on a non-configurable accessor
    GetterChange,
    /// Different setter on a non-configurable accessor
    SetterChange,
}

/// Reconcile `desc` against `current`.
///
/// - `Ok(Some(prop))`: accepted, `prop` is the property to store
/// - `Ok(None)`: accepted, nothing to change (empty request on an existing property)
/// - `Err(reason)`: rejected
pub fn reconcile(
    current: Option<&Property>,
    extensible: bool,
    desc: &PartialDescriptor,
) -> Result<Option<Property>, Reject> {
    let result = reconcile_inner(current, extensible, desc);
    if let Err(reason) = &result {
        tracing::trace!(target: "otter::object", ?reason, "descriptor rejected");
    }
    result
}

fn reconcile_inner(
    current: Option<&Property>,
    extensible: bool,
    desc: &PartialDescriptor,
) -> Result<Option<Property>, Reject> {
    let Some(current) = current else {
        if !extensible {
            return Err(Reject::NotExtensible);
        }
        return Ok(Some(desc.complete()));
    };

    if desc.is_empty() {
        return Ok(None);
    }

    if !current.configurable() {
        if desc.configurable == Some(true) {
            return Err(Reject::ConfigurableChange);
        }
        if let Some(enumerable) = desc.enumerable
            && enumerable != current.enumerable()
        {
            return Err(Reject::EnumerableChange);
        }
        if !desc.is_generic() && desc.is_accessor() != current.is_accessor() {
            return Err(Reject::KindChange);
        }
        match current {
            Property::Data {
                value, writable, ..
            } if !writable => {
                if desc.writable == Some(true) {
                    return Err(Reject::WritableChange);
                }
                if let Some(new_value) = &desc.value
                    && !same_value(new_value, value)
                {
                    return Err(Reject::ValueChange);
                }
            }
            Property::Accessor { get, set, .. } => {
                if let Some(new_get) = &desc.get
                    && new_get != get
                {
                    return Err(Reject::GetterChange);
                }
                if let Some(new_set) = &desc.set
                    && new_set != set
                {
                    return Err(Reject::SetterChange);
                }
            }
            Property::Data { .. } => {}
        }
    }

    Ok(Some(merge(current, desc)))
}

/// Apply the present fields of `desc` over `current`, converting kind wholesale
fn merge(current: &Property, desc: &PartialDescriptor) -> Property {
    let enumerable = desc.enumerable.unwrap_or(current.enumerable());
    let configurable = desc.configurable.unwrap_or(current.configurable());

    match current {
        Property::Data {
            value, writable, ..
        } if !desc.is_accessor() => Property::Data {
            value: desc.value.clone().unwrap_or_else(|| value.clone()),
            writable: desc.writable.unwrap_or(*writable),
            enumerable,
            configurable,
        },
        Property::Data { .. } => Property::Accessor {
            get: desc.get.clone().flatten(),
            set: desc.set.clone().flatten(),
            enumerable,
            configurable,
        },
        Property::Accessor { get, set, .. } if !desc.is_data() => Property::Accessor {
            get: desc.get.clone().unwrap_or_else(|| get.clone()),
            set: desc.set.clone().unwrap_or_else(|| set.clone()),
            enumerable,
            configurable,
        },
        Property::Accessor { .. } => Property::Data {
            value: desc.value.clone().unwrap_or_default(),
            writable: desc.writable.unwrap_or(false),
            enumerable,
            configurable,
        },
    }
}

/// IsCompatiblePropertyDescriptor: dry run of [`reconcile`]
pub fn is_compatible_property_descriptor(
    extensible: bool,
    desc: &PartialDescriptor,
    current: Option<&Property>,
) -> bool {
    reconcile(current, extensible, desc).is_ok()
}
