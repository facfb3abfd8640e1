//! Member tables
//!
//! A [`MemberTable`] maps member names to implementations. Each class level
//! produces one from its descriptor; the class then stores the flattened
//! table of its whole chain, with the most-derived level winning.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::BaseView;
use crate::descriptor::Descriptor;
use crate::instance::Instance;
use crate::value::{Function, Value};
use crate::{EngineError, EngineResult};

/// Name of the lifecycle initializer
pub const INIT: &str = "init";

/// Mapping of member name to implementation
#[derive(Clone, Default, PartialEq)]
pub struct MemberTable {
    entries: FxHashMap<String, Value>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a method that requires an instance receiver (builder style)
    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        let function = Function::method(f).with_name(name);
        self.with(name, function)
    }

    /// Insert a member, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up a member
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Check if a member exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a member
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Member names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over members in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// New table with `overrides` layered on top of `self`
    pub fn merged_with(&self, overrides: &MemberTable) -> MemberTable {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.insert(name, value.clone());
        }
        merged
    }
}

impl fmt::Debug for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MemberTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = MemberTable::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

/// Run a class-level descriptor and return the level's own members
///
/// The descriptor must return a mapping; anything else is a configuration
/// error. The parent table behind `base` is never touched.
pub(crate) fn describe_level(descriptor: &Descriptor, base: &BaseView) -> EngineResult<MemberTable> {
    match descriptor.invoke(&Value::Undefined, base)? {
        Value::Map(table) => Ok(unwrap_table(table)),
        other => Err(EngineError::configuration(format!(
            "class descriptor must return a member mapping, got {}",
            other.type_name()
        ))),
    }
}

/// Take the table out of its `Arc`, cloning only when it is still shared
pub(crate) fn unwrap_table(table: Arc<MemberTable>) -> MemberTable {
    Arc::try_unwrap(table).unwrap_or_else(|shared| (*shared).clone())
}
