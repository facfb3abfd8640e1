//! Instances and the instantiation protocol
//!
//! An instance delegates member lookup to its class's flattened table and
//! keeps its own state (fields and decorations) in a private map that is
//! consulted first. The table supplies shared behavior only; every write
//! lands in the instance's own map.
//!
//! The lifecycle initializer `init` runs exactly once during
//! [`Class::construct`] and is never reachable through the instance
//! afterwards.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class::Class;
use crate::descriptor::Descriptor;
use crate::members::{MemberTable, INIT};
use crate::value::Value;
use crate::{EngineError, EngineResult};

/// Unique identifier for an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        InstanceId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

struct InstanceInner {
    id: InstanceId,
    class: Class,
    /// Fields and decorated members, shadowing the class table
    own: RwLock<FxHashMap<String, Value>>,
}

/// Handle to a constructed object
///
/// Cloning is cheap; clones refer to the same object.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    pub(crate) fn construct(class: &Class, args: &[Value]) -> EngineResult<Instance> {
        let instance = Instance {
            inner: Arc::new(InstanceInner {
                id: InstanceId::next(),
                class: class.clone(),
                own: RwLock::new(FxHashMap::default()),
            }),
        };

        let table = class.table();
        match table.get(INIT) {
            Some(Value::Function(init)) => {
                init.call(&Value::Instance(instance.clone()), args)?;
            }
            Some(other) => {
                return Err(EngineError::configuration(format!(
                    "'{}' must be a function, got {}",
                    INIT,
                    other.type_name()
                )))
            }
            None => {}
        }

        tracing::trace!(
            class = %class.name(),
            instance = instance.id().as_u64(),
            args = args.len(),
            "constructed instance"
        );
        Ok(instance)
    }

    /// Unique instance ID
    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    /// Exact class this instance was constructed from
    pub fn constructor(&self) -> &Class {
        &self.inner.class
    }

    /// Check if the instance's class is `class` or derives from it
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.inner.class.is_subclass_of(class)
    }

    /// Resolve a member, own state first, then the class table
    ///
    /// Returns `None` for `init` and for unknown names.
    pub fn member(&self, name: &str) -> Option<Value> {
        if name == INIT {
            return None;
        }
        if let Some(value) = self.inner.own.read().get(name) {
            return Some(value.clone());
        }
        self.inner.class.table().get(name).cloned()
    }

    /// Resolve a member, `undefined` if absent
    pub fn get(&self, name: &str) -> Value {
        self.member(name).unwrap_or_default()
    }

    /// Check if a member resolves
    pub fn has(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Assign an own member, shadowing the class table
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> EngineResult<()> {
        let name = name.into();
        if name == INIT {
            return Err(EngineError::configuration(format!(
                "'{}' is reserved for construction",
                INIT
            )));
        }
        self.inner.own.write().insert(name, value.into());
        Ok(())
    }

    /// Remove an own member, uncovering the class table entry if any
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.inner.own.write().remove(name)
    }

    /// Names of own members, sorted
    pub fn own_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.own.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Call a method with this instance as receiver
    pub fn call(&self, name: &str, args: &[Value]) -> EngineResult<Value> {
        match self.member(name) {
            Some(Value::Function(f)) => f.call(&Value::Instance(self.clone()), args),
            Some(other) => Err(EngineError::NotCallable {
                name: name.to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(EngineError::UndefinedMember {
                name: name.to_string(),
                class: self.inner.class.name().to_string(),
            }),
        }
    }

    /// Apply a decoration to this instance only
    ///
    /// The decoration's base view still holds the class's `init`, so a
    /// decorator can call it again through `base`; the instance itself never
    /// exposes it.
    pub fn decorate(&self, descriptor: impl Into<Descriptor>) -> EngineResult<Instance> {
        crate::decorate::decorate_instance(self, &[descriptor.into()])
    }

    /// Snapshot of everything the instance currently resolves
    ///
    /// The class table's `init` is kept so a decoration's base view can
    /// still reach it.
    pub fn effective_members(&self) -> MemberTable {
        let mut members = (*self.inner.class.table()).clone();
        for (name, value) in self.inner.own.read().iter() {
            members.insert(name.clone(), value.clone());
        }
        members
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.inner.id.as_u64())
            .field("class", &self.inner.class.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn definition() -> Class {
        Class::root()
            .extend(MemberTable::new().method("init", |this, args| {
                this.set("name", args.first().cloned().unwrap_or_default())?;
                Ok(Value::Undefined)
            }))
            .unwrap()
    }

    #[test]
    fn test_init_sets_fields_and_disappears() {
        let class = definition();
        let instance = class.construct(&[Value::from("x")]).unwrap();

        assert_eq!(instance.get("name"), Value::from("x"));
        assert_eq!(instance.get("init"), Value::Undefined);
        assert!(!instance.has("init"));
        assert!(class.table().contains("init"));
    }

    #[test]
    fn test_init_not_callable_through_instance() {
        let instance = definition().construct(&[Value::from("x")]).unwrap();
        let err = instance.call("init", &[Value::from("y")]).unwrap_err();
        assert!(matches!(err, EngineError::UndefinedMember { .. }));
        assert_eq!(instance.get("name"), Value::from("x"));
    }

    #[test]
    fn test_init_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let class = Class::root()
            .extend(MemberTable::new().method("init", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Undefined)
            }))
            .unwrap();

        class.construct(&[]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        class.construct(&[]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_init_propagates() {
        let class = Class::root()
            .extend(MemberTable::new().method("init", |_, _| Err(EngineError::runtime("bad input"))))
            .unwrap();
        let err = class.construct(&[]).unwrap_err();
        assert_eq!(err, EngineError::Runtime("bad input".to_string()));
    }

    #[test]
    fn test_non_function_init() {
        let class = Class::root().extend(MemberTable::new().with("init", 5)).unwrap();
        let err = class.construct(&[]).unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }

    #[test]
    fn test_init_is_reserved() {
        let instance = definition().construct(&[]).unwrap();
        assert!(instance.set("init", 1).is_err());
        assert!(instance.own_names().contains(&"name".to_string()));
    }

    #[test]
    fn test_fields_are_per_instance() {
        let class = definition();
        let a = class.construct(&[Value::from("a")]).unwrap();
        let b = class.construct(&[Value::from("b")]).unwrap();

        a.set("name", "changed").unwrap();
        assert_eq!(a.get("name"), Value::from("changed"));
        assert_eq!(b.get("name"), Value::from("b"));
    }

    #[test]
    fn test_own_member_shadows_table() {
        let class = Class::root()
            .extend(MemberTable::new().with("color", "red"))
            .unwrap();
        let instance = class.construct(&[]).unwrap();

        instance.set("color", "blue").unwrap();
        assert_eq!(instance.get("color"), Value::from("blue"));
        assert_eq!(instance.remove("color"), Some(Value::from("blue")));
        assert_eq!(instance.get("color"), Value::from("red"));
    }

    #[test]
    fn test_call_errors() {
        let class = Class::root()
            .extend(MemberTable::new().with("color", "red"))
            .unwrap();
        let instance = class.construct(&[]).unwrap();

        assert!(matches!(
            instance.call("color", &[]),
            Err(EngineError::NotCallable { .. })
        ));
        assert!(matches!(
            instance.call("missing", &[]),
            Err(EngineError::UndefinedMember { .. })
        ));
    }

    #[test]
    fn test_constructor_identity() {
        let class = definition();
        let instance = class.construct(&[]).unwrap();
        assert_eq!(instance.constructor(), &class);
        assert!(instance.is_instance_of(&class));
        assert!(instance.is_instance_of(class.parent().unwrap()));
    }
}
