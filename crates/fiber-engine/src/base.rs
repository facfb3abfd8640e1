//! Base views
//!
//! A [`BaseView`] is the read-only snapshot an overriding method uses to reach
//! the implementation it replaced. For a class at level N it exposes exactly
//! the flattened table of levels 0..N-1; for a decoration it exposes the
//! target instance's effective members at decoration time.
//!
//! Base calls always run against the receiver passed in, never against some
//! ancestor instance, so ancestor code that itself goes through its own base
//! view keeps resolving down the chain.
//!
//! ```rust,ignore
//! let sub = sup.extend(Descriptor::new(|_, base| {
//!     let base = base.clone();
//!     Ok(MemberTable::new()
//!         .method("increment", move |this, args| base.call("increment", this, args))
//!         .into())
//! }))?;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::class::Class;
use crate::instance::Instance;
use crate::members::MemberTable;
use crate::options::BaseLookup;
use crate::value::{Function, Value};
use crate::{EngineError, EngineResult};

#[derive(Debug)]
struct BaseInner {
    /// Class whose table this view snapshots
    owner: Class,
    members: Arc<MemberTable>,
    lookup: BaseLookup,
}

/// Immutable view of an ancestor member table
#[derive(Clone)]
pub struct BaseView {
    inner: Arc<BaseInner>,
}

impl BaseView {
    pub(crate) fn new(owner: Class, members: Arc<MemberTable>) -> Self {
        let lookup = owner.options().base_lookup;
        Self {
            inner: Arc::new(BaseInner {
                owner,
                members,
                lookup,
            }),
        }
    }

    /// Class this view was built from
    ///
    /// For a class created by `Parent.extend(..)` this is `Parent`, no matter
    /// how far down the chain the calling instance lives.
    pub fn constructor(&self) -> &Class {
        &self.inner.owner
    }

    /// Check if the snapshot defines `name`
    pub fn contains(&self, name: &str) -> bool {
        self.inner.members.contains(name)
    }

    /// Member names in the snapshot, sorted
    pub fn names(&self) -> Vec<&str> {
        self.inner.members.names()
    }

    /// The snapshot itself
    pub fn members(&self) -> &MemberTable {
        &self.inner.members
    }

    /// Resolve `name` against the snapshot
    pub fn get(&self, name: &str) -> EngineResult<Value> {
        match self.inner.members.get(name) {
            Some(value) => Ok(value.clone()),
            None => self.missing(name).map(|_| Value::Undefined),
        }
    }

    /// Resolve `name` to a function that runs the ancestor implementation
    /// against whatever receiver it is called with
    pub fn function(&self, name: &str) -> EngineResult<Function> {
        match self.inner.members.get(name) {
            Some(Value::Function(f)) => Ok(f.clone()),
            Some(other) => Err(EngineError::NotCallable {
                name: name.to_string(),
                found: other.type_name().to_string(),
            }),
            None => self.missing(name).map(|_| Function::noop()),
        }
    }

    /// Run the ancestor `name` with `this` as receiver
    pub fn call(&self, name: &str, this: &Instance, args: &[Value]) -> EngineResult<Value> {
        self.call_with(name, &Value::Instance(this.clone()), args)
    }

    /// Run the ancestor `name` with an arbitrary receiver
    pub fn call_with(&self, name: &str, this: &Value, args: &[Value]) -> EngineResult<Value> {
        self.function(name)?.call(this, args)
    }

    /// Pre-bind a receiver
    pub fn bind(&self, this: &Instance) -> BoundBase {
        BoundBase {
            base: self.clone(),
            receiver: this.clone(),
        }
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &BaseView) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn missing(&self, name: &str) -> EngineResult<()> {
        match self.inner.lookup {
            BaseLookup::Strict => Err(EngineError::MissingBaseMember {
                name: name.to_string(),
                class: self.inner.owner.name().to_string(),
            }),
            BaseLookup::Lenient => {
                tracing::trace!(
                    member = name,
                    class = %self.inner.owner.name(),
                    "lenient base lookup miss"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for BaseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseView")
            .field("class", &self.inner.owner.name())
            .field("members", &self.inner.members)
            .finish()
    }
}

/// Base view with its receiver already bound
#[derive(Clone, Debug)]
pub struct BoundBase {
    base: BaseView,
    receiver: Instance,
}

impl BoundBase {
    /// Run the ancestor `name` against the bound receiver
    pub fn call(&self, name: &str, args: &[Value]) -> EngineResult<Value> {
        self.base.call(name, &self.receiver, args)
    }

    /// Resolve `name` against the snapshot
    pub fn get(&self, name: &str) -> EngineResult<Value> {
        self.base.get(name)
    }

    /// The bound receiver
    pub fn receiver(&self) -> &Instance {
        &self.receiver
    }

    /// The unbound view
    pub fn base(&self) -> &BaseView {
        &self.base
    }
}
