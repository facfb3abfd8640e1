//! Class and decoration descriptors
//!
//! A descriptor is the callback that describes one class level or one
//! decoration. It is called with a receiver (`undefined` for class levels,
//! the target instance for decorations) and a single argument: the
//! [`BaseView`] of whatever it builds on.

use crate::base::BaseView;
use crate::members::MemberTable;
use crate::value::{Function, Value};
use crate::{EngineError, EngineResult};

/// Description callback for `extend`, `mixin` and `decorate`
#[derive(Clone, Debug)]
pub struct Descriptor(Value);

impl Descriptor {
    /// Build a descriptor from a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &BaseView) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Descriptor(Value::Function(Function::new(move |this, args| {
            match args.first() {
                Some(Value::Base(base)) => f(this, base),
                _ => Err(EngineError::configuration(
                    "descriptor invoked without a base view",
                )),
            }
        })))
    }

    /// Descriptor that ignores its base and always yields `members`
    pub fn members(members: MemberTable) -> Self {
        let members = Value::from(members);
        Descriptor::new(move |_, _| Ok(members.clone()))
    }

    /// The wrapped value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Check that the descriptor can be invoked
    pub fn is_invocable(&self) -> bool {
        matches!(self.0, Value::Function(_))
    }

    pub(crate) fn ensure_invocable(&self) -> EngineResult<()> {
        if self.is_invocable() {
            Ok(())
        } else {
            Err(EngineError::configuration(format!(
                "descriptor is not invocable (got {})",
                self.0.type_name()
            )))
        }
    }

    /// Call the descriptor with `this` and `base`
    pub(crate) fn invoke(&self, this: &Value, base: &BaseView) -> EngineResult<Value> {
        match &self.0 {
            Value::Function(f) => f.call(this, &[Value::Base(base.clone())]),
            other => Err(EngineError::configuration(format!(
                "descriptor is not invocable (got {})",
                other.type_name()
            ))),
        }
    }
}

impl From<Value> for Descriptor {
    fn from(value: Value) -> Self {
        Descriptor(value)
    }
}

impl From<Function> for Descriptor {
    fn from(function: Function) -> Self {
        Descriptor(Value::Function(function))
    }
}

impl From<MemberTable> for Descriptor {
    fn from(members: MemberTable) -> Self {
        Descriptor::members(members)
    }
}
