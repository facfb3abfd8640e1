//! Global export binding
//!
//! Binds a root class under a process-wide name, remembering whatever the
//! name held before so the previous binding can be restored with
//! [`Export::no_conflict`]. This sits outside the composition engine; it
//! never touches classes or instances.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use fiber_engine::{Class, Value};

/// Name the root is exported under by default
pub const DEFAULT_BINDING: &str = "Fiber";

static BINDINGS: Lazy<Mutex<FxHashMap<String, Value>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

/// Read a binding
pub fn lookup(name: &str) -> Option<Value> {
    BINDINGS.lock().get(name).cloned()
}

/// Set a binding, returning the value it displaced
pub fn bind(name: &str, value: Value) -> Option<Value> {
    BINDINGS.lock().insert(name.to_string(), value)
}

/// Clear a binding, returning its value
pub fn unbind(name: &str) -> Option<Value> {
    BINDINGS.lock().remove(name)
}

/// A root class exported under a global name
#[derive(Debug)]
pub struct Export {
    name: String,
    root: Class,
    previous: Option<Value>,
}

impl Export {
    /// Export `root` under `name`
    pub fn install(name: impl Into<String>, root: Class) -> Export {
        let name = name.into();
        let previous = bind(&name, Value::Class(root.clone()));
        tracing::debug!(
            binding = %name,
            class = %root.name(),
            displaced = previous.is_some(),
            "installed export"
        );
        Export {
            name,
            root,
            previous,
        }
    }

    /// Export the shared root under [`DEFAULT_BINDING`]
    pub fn install_default() -> Export {
        Self::install(DEFAULT_BINDING, crate::root())
    }

    /// Binding name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported root
    pub fn root(&self) -> &Class {
        &self.root
    }

    /// Value displaced by the export, if any
    pub fn previous(&self) -> Option<&Value> {
        self.previous.as_ref()
    }

    /// Restore the displaced binding and hand back the root
    pub fn no_conflict(self) -> Class {
        match self.previous {
            Some(previous) => {
                bind(&self.name, previous);
            }
            None => {
                unbind(&self.name);
            }
        }
        tracing::debug!(binding = %self.name, "restored previous binding");
        self.root
    }
}
