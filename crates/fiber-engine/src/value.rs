//! Dynamic values and callable functions
//!
//! Every member of a class, every field of an instance and every argument
//! passed to a method is a [`Value`]. Functions receive their receiver
//! explicitly, so the same function can run against any instance that
//! inherits it.

use std::fmt;
use std::sync::Arc;

use crate::base::BaseView;
use crate::class::Class;
use crate::instance::Instance;
use crate::members::MemberTable;
use crate::{EngineError, EngineResult};

/// Native callable signature: `(receiver, arguments) -> result`
pub type NativeFn = dyn Fn(&Value, &[Value]) -> EngineResult<Value> + Send + Sync;

/// Shared callable value
#[derive(Clone)]
pub struct Function {
    name: Option<Arc<str>>,
    inner: Arc<NativeFn>,
}

impl Function {
    /// Wrap a closure that receives its receiver as a plain value
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: None,
            inner: Arc::new(f),
        }
    }

    /// Wrap a closure that only accepts an instance receiver
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Self::new(move |this, args| match this {
            Value::Instance(instance) => f(instance, args),
            other => Err(EngineError::InvalidReceiver {
                expected: "instance".to_string(),
                found: other.type_name().to_string(),
            }),
        })
    }

    /// Function that ignores its arguments and returns `undefined`
    pub fn noop() -> Self {
        Self::new(|_, _| Ok(Value::Undefined))
    }

    /// Attach a debug name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(Arc::from(name));
        self
    }

    /// Debug name, if one was attached
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke with an explicit receiver
    pub fn call(&self, this: &Value, args: &[Value]) -> EngineResult<Value> {
        (self.inner)(this, args)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "[Function {}]", name),
            None => write!(f, "[Function]"),
        }
    }
}

/// Dynamic value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent member or no result
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Callable
    Function(Function),
    /// Member table literal, as returned by descriptors
    Map(Arc<MemberTable>),
    /// Constructed object
    Instance(Instance),
    /// Class
    Class(Class),
    /// Base view handed to a descriptor
    Base(BaseView),
}

impl Value {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::Map(_) => "map",
            Value::Instance(_) => "instance",
            Value::Class(_) => "class",
            Value::Base(_) => "base",
        }
    }

    /// Check for `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check for `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as function
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get as member table literal
    pub fn as_map(&self) -> Option<&MemberTable> {
        match self {
            Value::Map(table) => Some(table),
            _ => None,
        }
    }

    /// Get as instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Get as class
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Get as base view
    pub fn as_base(&self) -> Option<&BaseView> {
        match self {
            Value::Base(base) => Some(base),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Base(a), Value::Base(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Function(func) => fmt::Debug::fmt(func, f),
            Value::Map(table) => fmt::Debug::fmt(table, f),
            Value::Instance(instance) => fmt::Debug::fmt(instance, f),
            Value::Class(class) => fmt::Debug::fmt(class, f),
            Value::Base(base) => fmt::Debug::fmt(base, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<MemberTable> for Value {
    fn from(table: MemberTable) -> Self {
        Value::Map(Arc::new(table))
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<Class> for Value {
    fn from(class: Class) -> Self {
        Value::Class(class)
    }
}

impl From<BaseView> for Value {
    fn from(base: BaseView) -> Self {
        Value::Base(base)
    }
}
