//! Classes and chain composition
//!
//! A [`Class`] is a constructor identity plus the flattened member table of
//! its whole chain. `extend` never touches the parent: it snapshots the
//! parent's table into a [`BaseView`], runs the descriptor against it and
//! layers the returned members on top.
//!
//! The first `construct` or `extend` seals a class. After that its table is
//! frozen and `mixin` is rejected.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::base::BaseView;
use crate::descriptor::Descriptor;
use crate::instance::Instance;
use crate::members::{self, MemberTable, INIT};
use crate::options::EngineOptions;
use crate::value::{Function, Value};
use crate::{EngineError, EngineResult};

/// Unique identifier for a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ClassId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

struct ClassInner {
    id: ClassId,
    name: String,
    parent: Option<Class>,
    /// View of the parent's table, captured at extend time
    base: Option<BaseView>,
    /// Members introduced at this level (descriptor result plus mixins)
    own: RwLock<Arc<MemberTable>>,
    /// Flattened table of the whole chain
    table: RwLock<Arc<MemberTable>>,
    sealed: AtomicBool,
    options: Arc<EngineOptions>,
}

/// Class handle
///
/// Cloning is cheap; clones share identity.
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// Create a root class with default options
    pub fn root() -> Self {
        Self::root_with_options(EngineOptions::default())
    }

    /// Create a root class
    ///
    /// The root defines a no-op `init`, so every level can call `base.init`.
    pub fn root_with_options(options: EngineOptions) -> Self {
        let table = Arc::new(
            MemberTable::new().with(INIT, Function::noop().with_name(INIT)),
        );
        Self::from_parts(
            Some(options.root_name.clone()),
            None,
            None,
            Arc::clone(&table),
            table,
            Arc::new(options),
        )
    }

    fn from_parts(
        name: Option<String>,
        parent: Option<Class>,
        base: Option<BaseView>,
        own: Arc<MemberTable>,
        table: Arc<MemberTable>,
        options: Arc<EngineOptions>,
    ) -> Self {
        let id = ClassId::next();
        let name = name.unwrap_or_else(|| format!("Class#{}", id.as_u64()));
        Self {
            inner: Arc::new(ClassInner {
                id,
                name,
                parent,
                base,
                own: RwLock::new(own),
                table: RwLock::new(table),
                sealed: AtomicBool::new(false),
                options,
            }),
        }
    }

    /// Derive a subclass
    pub fn extend(&self, descriptor: impl Into<Descriptor>) -> EngineResult<Class> {
        self.extend_as(None, descriptor.into())
    }

    /// Derive a named subclass
    pub fn extend_named(
        &self,
        name: impl Into<String>,
        descriptor: impl Into<Descriptor>,
    ) -> EngineResult<Class> {
        self.extend_as(Some(name.into()), descriptor.into())
    }

    fn extend_as(&self, name: Option<String>, descriptor: Descriptor) -> EngineResult<Class> {
        descriptor.ensure_invocable()?;

        // Sealed before the snapshot so the descriptor cannot mix into it
        self.seal();
        let parent_table = self.table();
        let base = BaseView::new(self.clone(), Arc::clone(&parent_table));
        let own = members::describe_level(&descriptor, &base)?;
        let table = parent_table.merged_with(&own);

        let class = Self::from_parts(
            name,
            Some(self.clone()),
            Some(base),
            Arc::new(own),
            Arc::new(table),
            Arc::clone(&self.inner.options),
        );

        tracing::debug!(
            class = %class.name(),
            parent = %self.name(),
            depth = class.depth(),
            members = class.own_members().len(),
            "extended class"
        );
        Ok(class)
    }

    /// Construct an instance, running the chain's `init` once
    pub fn construct(&self, args: &[Value]) -> EngineResult<Instance> {
        self.seal();
        Instance::construct(self, args)
    }

    /// Decorate this class's own template
    ///
    /// Every descriptor runs against a base view of the current table and
    /// must return a mapping (or `undefined` to add nothing). Only allowed
    /// before the class has instances or subclasses.
    pub fn mixin(&self, descriptors: &[Descriptor]) -> EngineResult<()> {
        for descriptor in descriptors {
            descriptor.ensure_invocable()?;
        }

        for descriptor in descriptors {
            if self.is_sealed() {
                return Err(EngineError::Sealed {
                    class: self.name().to_string(),
                    reason: "class already has instances or subclasses".to_string(),
                });
            }

            let current = self.table();
            let base = BaseView::new(self.clone(), Arc::clone(&current));
            let added = match descriptor.invoke(&Value::Class(self.clone()), &base)? {
                Value::Undefined => continue,
                Value::Map(added) => members::unwrap_table(added),
                other => {
                    return Err(EngineError::configuration(format!(
                        "mixin must return a member mapping, got {}",
                        other.type_name()
                    )))
                }
            };

            // The descriptor may have extended or constructed this class
            let mut table = self.inner.table.write();
            if self.is_sealed() {
                return Err(EngineError::Sealed {
                    class: self.name().to_string(),
                    reason: "class was extended or constructed during mixin".to_string(),
                });
            }
            let mut own = self.inner.own.write();
            *own = Arc::new(own.merged_with(&added));
            *table = Arc::new(table.merged_with(&added));
            drop(own);
            drop(table);

            tracing::debug!(class = %self.name(), members = added.len(), "applied mixin");
        }
        Ok(())
    }

    /// Decorate a single instance
    ///
    /// See [`crate::decorate`].
    pub fn decorate(target: &Value, descriptors: &[Descriptor]) -> EngineResult<Instance> {
        crate::decorate::decorate(target, descriptors)
    }

    /// Unique class ID
    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Options inherited from the root
    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Parent class (`None` for a root)
    pub fn parent(&self) -> Option<&Class> {
        self.inner.parent.as_ref()
    }

    /// Check if this is a root class
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Base view captured when this class was extended (`None` for a root)
    pub fn base(&self) -> Option<&BaseView> {
        self.inner.base.as_ref()
    }

    /// Flattened member table of the whole chain
    pub fn table(&self) -> Arc<MemberTable> {
        Arc::clone(&self.inner.table.read())
    }

    /// Members introduced at this level
    pub fn own_members(&self) -> Arc<MemberTable> {
        Arc::clone(&self.inner.own.read())
    }

    /// Number of extend steps from the root
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Iterate over ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Check if `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self == other || self.ancestors().any(|ancestor| ancestor == other)
    }

    /// Check if the template is frozen
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.load(Ordering::Acquire)
    }

    fn seal(&self) {
        self.inner.sealed.store(true, Ordering::Release);
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.inner.id.as_u64())
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Class::name))
            .finish()
    }
}

/// Iterator over a class's ancestors
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
