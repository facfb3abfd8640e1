//! Composition engine errors

use thiserror::Error;

/// Errors raised by class definition, construction, base dispatch and decoration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Descriptor is not invocable or did not produce a usable mapping
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What was wrong with the descriptor or member
        reason: String,
    },

    /// A base view was asked for a name its ancestor table does not define
    #[error("Missing base member '{name}' (base of {class})")]
    MissingBaseMember {
        /// Requested member name
        name: String,
        /// Class the base view was built from
        class: String,
    },

    /// Decoration attempted on something that is not an instance
    #[error("Invalid decoration target: expected an instance, got {found}")]
    InvalidTarget {
        /// Type name of the rejected target
        found: String,
    },

    /// Instance has no member with this name
    #[error("Undefined member '{name}' on instance of {class}")]
    UndefinedMember {
        /// Requested member name
        name: String,
        /// Class of the instance
        class: String,
    },

    /// Member exists but holds a plain value
    #[error("Member '{name}' is not callable (found {found})")]
    NotCallable {
        /// Member name
        name: String,
        /// Type name of the value found
        found: String,
    },

    /// Method invoked with a receiver it cannot operate on
    #[error("Invalid receiver: expected {expected}, got {found}")]
    InvalidReceiver {
        /// Expected receiver kind
        expected: String,
        /// Type name of the receiver passed
        found: String,
    },

    /// Class template can no longer change
    #[error("Class {class} is sealed: {reason}")]
    Sealed {
        /// Class name
        class: String,
        /// What sealed it
        reason: String,
    },

    /// Engine options failed to parse
    #[error("Invalid engine options: {0}")]
    Options(String),

    /// Error raised by user code running inside a method
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl EngineError {
    /// Raise an error from inside a method body
    pub fn runtime(message: impl Into<String>) -> Self {
        EngineError::Runtime(message.into())
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        EngineError::Configuration {
            reason: reason.into(),
        }
    }
}

/// Engine operation result
pub type EngineResult<T> = Result<T, EngineError>;
