//! Error types for the claw_modes crate
//!
//! This module defines the error hierarchy for mode resolution, migration and
//! management using `thiserror`. All fallible operations return
//! `Result<T, ModeError>`.
//!
//! # Error Variants
//!
//! - [`ModeError::InvalidInput`]: Blank ids or otherwise unusable requests
//! - [`ModeError::NotFound`]: Unknown mode id on switch or removal
//! - [`ModeError::DuplicateMode`]: Adding a mode whose id is already taken
//! - [`ModeError::BuiltInImmutable`]: Removing a built-in mode
//! - [`ModeError::EmptyToolSet`]: A mode that grants no tools
//! - [`ModeError::MissingDefaultMode`]: The `"default"` built-in is gone (fatal)
//! - [`ModeError::Io`]: Settings file I/O (auto-converts from `std::io::Error`)
//! - [`ModeError::Json`]: Settings (de)serialization (auto-converts from `serde_json::Error`)
//! - [`ModeError::Store`]: Configuration store failures that are neither I/O nor JSON
//!
//! # Example
//!
//! ```rust
//! use claw_modes::error::ModeError;
//!
//! fn example() -> Result<(), ModeError> {
//!     // Auto-conversion from std::io::Error
//!     let _file = std::fs::read_to_string("/nonexistent")?;
//!
//!     // Manual construction
//!     Err(ModeError::NotFound { id: "research".to_string() })
//! }
//! ```

use thiserror::Error;

/// The main error type for all claw_modes operations
///
/// Request-level failures (`InvalidInput`, `NotFound`, `DuplicateMode`,
/// `BuiltInImmutable`, `EmptyToolSet`) never leave partial state behind.
/// `MissingDefaultMode` is only produced during initialization and means the
/// built-in catalog is corrupt.
#[derive(Error, Debug)]
pub enum ModeError {
    /// The request itself is malformed (e.g. a blank mode id)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No mode with the given id exists
    #[error("Mode not found: {id}")]
    NotFound {
        /// The id that was requested
        id: String,
    },

    /// A mode with the same id (case-insensitive) already exists
    #[error("A mode with id '{id}' already exists")]
    DuplicateMode {
        /// The conflicting id
        id: String,
    },

    /// Built-in modes are managed by migration and cannot be removed
    #[error("Mode '{id}' is built-in and cannot be removed")]
    BuiltInImmutable {
        /// The built-in mode id
        id: String,
    },

    /// The mode resolves to an empty tool set
    ///
    /// A mode that grants no tools cannot be persisted or made active.
    #[error("Mode '{id}' does not grant any tools")]
    EmptyToolSet {
        /// The offending mode id
        id: String,
    },

    /// The `"default"` built-in mode could not be found
    ///
    /// This indicates a corrupted built-in catalog; initialization cannot continue.
    #[error("Built-in mode 'default' is missing; the built-in catalog is corrupt")]
    MissingDefaultMode,

    /// Settings file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings document could not be (de)serialized
    #[error("Failed to (de)serialize settings: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration store failure
    #[error("Settings store error: {0}")]
    Store(String),
}

impl ModeError {
    /// Whether this error leaves the mode system unable to proceed
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModeError::MissingDefaultMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = ModeError::InvalidInput("mode id must not be blank".to_string());
        assert_eq!(err.to_string(), "Invalid input: mode id must not be blank");
    }

    #[test]
    fn test_not_found_names_id() {
        let err = ModeError::NotFound {
            id: "research".to_string(),
        };
        assert_eq!(err.to_string(), "Mode not found: research");
    }

    #[test]
    fn test_conflict_messages() {
        let err = ModeError::DuplicateMode {
            id: "Default".to_string(),
        };
        assert!(err.to_string().contains("'Default' already exists"));

        let err = ModeError::BuiltInImmutable {
            id: "default".to_string(),
        };
        assert!(err.to_string().contains("cannot be removed"));
    }

    #[test]
    fn test_empty_tool_set_message() {
        let err = ModeError::EmptyToolSet {
            id: "ghost".to_string(),
        };
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_only_missing_default_is_fatal() {
        assert!(ModeError::MissingDefaultMode.is_fatal());
        assert!(!ModeError::InvalidInput("x".into()).is_fatal());
        assert!(!ModeError::NotFound { id: "x".into() }.is_fatal());
        assert!(!ModeError::Store("x".into()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ModeError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_with_question_mark_json() {
        fn parse() -> Result<serde_json::Value, ModeError> {
            Ok(serde_json::from_str("{ invalid }")?)
        }

        let err = parse().unwrap_err();
        assert!(matches!(err, ModeError::Json(_)));
    }
}
