//! Fiber
//!
//! Class composition for dynamic object models. This crate re-exports the
//! engine, owns the process-wide root class and the global export binding.
//!
//! # Example
//!
//! ```rust,ignore
//! let animal = fiber::root().extend(
//!     MemberTable::new().method("speak", |_, _| Ok(Value::from("..."))),
//! )?;
//! let dog = animal.extend(MemberTable::new().method("speak", |_, _| Ok(Value::from("woof"))))?;
//! assert_eq!(dog.construct(&[])?.call("speak", &[])?, Value::from("woof"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod global;

use once_cell::sync::Lazy;

pub use fiber_engine::*;
pub use global::{Export, DEFAULT_BINDING};

static ROOT: Lazy<Class> = Lazy::new(Class::root);

/// Shared root class with default options
///
/// Every call returns the same class. Extending it seals it, so it never
/// accepts mixins; build a private root with [`Class::root_with_options`]
/// for that.
pub fn root() -> Class {
    ROOT.clone()
}
