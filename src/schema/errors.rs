//! Schema engine error types
//!
//! Error codes:
//! - MODEL_ATTRIBUTE_PARSE_FAILED (REJECT)
//! - MODEL_ATTRIBUTE_SERIALIZE_FAILED (REJECT)
//! - MODEL_MUTATOR_REJECTED (REJECT)
//!
//! Every message is prefixed with the attribute's qualified name
//! (`'Entity.visibleName'`), except whole-input rejections, which carry the
//! bare entity name. Declaration bugs are not errors: they panic.

use std::fmt;

use thiserror::Error;

/// Severity levels for engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input rejected; the caller may recover
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorCode {
    /// Value failed its attribute's type or constraint checks
    ModelAttributeParseFailed,
    /// Stored value could not be serialized by its attribute
    ModelAttributeSerializeFailed,
    /// A mutator setter rejected the value
    ModelMutatorRejected,
}

impl ModelErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ModelErrorCode::ModelAttributeParseFailed => "MODEL_ATTRIBUTE_PARSE_FAILED",
            ModelErrorCode::ModelAttributeSerializeFailed => "MODEL_ATTRIBUTE_SERIALIZE_FAILED",
            ModelErrorCode::ModelMutatorRejected => "MODEL_MUTATOR_REJECTED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ModelErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result type for schema and model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Schema engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Wrong type, out of range, bad format, not in set, missing required
    #[error("'{attribute}' {message}")]
    Parse { attribute: String, message: String },

    /// Stored value cannot be rendered by its attribute
    #[error("'{attribute}' {message}")]
    Serialize { attribute: String, message: String },

    /// Raised by a mutator setter through its context
    #[error("'{attribute}' {message}")]
    Mutator { attribute: String, message: String },
}

impl ModelError {
    pub fn parse(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Parse {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn serialize(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Serialize {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Mutator rejection; `None` uses the generic message
    pub fn mutator(attribute: impl Into<String>, message: Option<&str>) -> Self {
        ModelError::Mutator {
            attribute: attribute.into(),
            message: message
                .unwrap_or("Failed to validate/mutate attribute")
                .to_string(),
        }
    }

    pub fn missing_required(attribute: impl Into<String>) -> Self {
        Self::parse(attribute, "Missing required attribute")
    }

    /// `expected` names the element type, e.g. `list<Review>`
    pub fn not_a_list(attribute: impl Into<String>, expected: &str) -> Self {
        Self::parse(
            attribute,
            format!("Provided value is not a list. Expected {}", expected),
        )
    }

    /// Whole-input rejection; carries the entity name in place of an attribute
    pub fn not_an_object(entity: &str, value: impl fmt::Display) -> Self {
        Self::parse(
            entity,
            format!("Provided value '{}' is not a valid {}", value, entity),
        )
    }

    pub fn code(&self) -> ModelErrorCode {
        match self {
            ModelError::Parse { .. } => ModelErrorCode::ModelAttributeParseFailed,
            ModelError::Serialize { .. } => ModelErrorCode::ModelAttributeSerializeFailed,
            ModelError::Mutator { .. } => ModelErrorCode::ModelMutatorRejected,
        }
    }

    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Qualified name of the offending attribute
    pub fn attribute(&self) -> &str {
        match self {
            ModelError::Parse { attribute, .. }
            | ModelError::Serialize { attribute, .. }
            | ModelError::Mutator { attribute, .. } => attribute,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ModelError::Parse { message, .. }
            | ModelError::Serialize { message, .. }
            | ModelError::Mutator { message, .. } => message,
        }
    }

    /// Whether `try_*` variants turn this error into `None`
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ModelError::Parse { .. } | ModelError::Mutator { .. })
    }
}
