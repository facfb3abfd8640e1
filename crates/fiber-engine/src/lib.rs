//! Fiber composition engine
//!
//! This crate provides runtime class composition for dynamic object models:
//! - Class chains built from description callbacks (`extend`)
//! - Base views for calling an overridden ancestor implementation
//! - Instantiation with a one-shot `init` lifecycle initializer
//! - Per-instance decoration and class-level mixins
//!
//! # Example
//!
//! ```rust,ignore
//! use fiber_engine::{Class, Descriptor, MemberTable, Value};
//!
//! let sup = Class::root().extend(
//!     MemberTable::new()
//!         .method("init", |this, args| {
//!             this.set("num", args[0].clone())?;
//!             Ok(Value::Undefined)
//!         })
//!         .method("increment", |this, _| {
//!             Ok(Value::Int(this.get("num").as_int().unwrap_or(0) + 1))
//!         }),
//! )?;
//!
//! let sub = sup.extend(Descriptor::new(|_, base| {
//!     let base = base.clone();
//!     Ok(MemberTable::new()
//!         .method("increment", move |this, args| base.call("increment", this, args))
//!         .into())
//! }))?;
//!
//! assert_eq!(sub.construct(&[Value::Int(0)])?.call("increment", &[])?, Value::Int(1));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod base;
pub mod class;
pub mod decorate;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod members;
pub mod options;
pub mod value;

pub use base::{BaseView, BoundBase};
pub use class::{Ancestors, Class, ClassId};
pub use decorate::decorate;
pub use descriptor::Descriptor;
pub use error::{EngineError, EngineResult};
pub use instance::{Instance, InstanceId};
pub use members::{MemberTable, INIT};
pub use options::{BaseLookup, EngineOptions};
pub use value::{Function, NativeFn, Value};
