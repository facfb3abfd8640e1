//! Instance decoration
//!
//! Decoration grafts members onto one already-constructed instance. The
//! descriptor runs with the instance as receiver and a base view of the
//! instance's effective members at that moment, so an override added here
//! can still reach the member it replaces. Two calling conventions work:
//!
//! - mutation style: assign onto `this` and return `undefined`
//! - merge style: return a member mapping
//!
//! Only the target's own state changes; its class table and its siblings
//! are untouched.

use std::sync::Arc;

use crate::base::BaseView;
use crate::descriptor::Descriptor;
use crate::instance::Instance;
use crate::members::INIT;
use crate::value::Value;
use crate::{EngineError, EngineResult};

/// Decorate `target` with each descriptor in order
///
/// Fails with `InvalidTarget` when `target` is not an instance and with
/// `Configuration` when a descriptor is not invocable or returns something
/// other than a mapping or `undefined`.
pub fn decorate(target: &Value, descriptors: &[Descriptor]) -> EngineResult<Instance> {
    match target {
        Value::Instance(instance) => decorate_instance(instance, descriptors),
        other => Err(EngineError::InvalidTarget {
            found: other.type_name().to_string(),
        }),
    }
}

pub(crate) fn decorate_instance(
    instance: &Instance,
    descriptors: &[Descriptor],
) -> EngineResult<Instance> {
    for descriptor in descriptors {
        descriptor.ensure_invocable()?;
    }
    for descriptor in descriptors {
        apply(instance, descriptor)?;
    }
    Ok(instance.clone())
}

fn apply(instance: &Instance, descriptor: &Descriptor) -> EngineResult<()> {
    let base = BaseView::new(
        instance.constructor().clone(),
        Arc::new(instance.effective_members()),
    );
    let this = Value::Instance(instance.clone());

    match descriptor.invoke(&this, &base)? {
        Value::Undefined => {
            tracing::debug!(
                class = %instance.constructor().name(),
                instance = instance.id().as_u64(),
                "decorated instance in place"
            );
        }
        Value::Map(members) => {
            if members.contains(INIT) {
                return Err(EngineError::configuration(format!(
                    "decorator cannot define '{}'",
                    INIT
                )));
            }
            for (name, value) in members.iter() {
                instance.set(name, value.clone())?;
            }
            tracing::debug!(
                class = %instance.constructor().name(),
                instance = instance.id().as_u64(),
                members = members.len(),
                "decorated instance"
            );
        }
        other => {
            return Err(EngineError::configuration(format!(
                "decorator must return a member mapping or undefined, got {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}
