//! Error types for the contingency library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants for category-scheme validation, degenerate tables, p-value
//! computation and report persistence.

use thiserror::Error;

use crate::category::Axis;

/// The main error type for the contingency library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ Configuration Errors ============
    /// Invalid scheme or analysis configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what is invalid.
        message: String,
    },

    /// A raw label is accepted by more than one category on the same axis.
    #[error("label {label:?} on the {axis} axis is accepted by both {first:?} and {second:?}")]
    DuplicateLabel {
        /// The ambiguous raw label.
        label: String,
        /// The axis the categories belong to.
        axis: Axis,
        /// The category that first claimed the label.
        first: String,
        /// The category that claimed it again.
        second: String,
    },

    /// An axis declares fewer than two categories, so the test is undefined.
    #[error("insufficient categories: the {axis} axis has {count}, at least 2 are required")]
    InsufficientCategories {
        /// The offending axis.
        axis: Axis,
        /// Number of declared categories.
        count: usize,
    },

    // ============ Computation Errors ============
    /// The table has a grand total of zero.
    #[error("no data: the contingency table has a grand total of zero")]
    NoData,

    /// Two tables that must align do not.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected shape or labels.
        expected: String,
        /// Actual shape or labels.
        actual: String,
    },

    /// A p-value engine could not evaluate the distribution.
    #[error("distribution evaluation failed: {message}")]
    Distribution {
        /// Description of the numeric failure.
        message: String,
    },

    // ============ Output Errors ============
    /// A report sink could not persist the report.
    #[error("could not persist report: {message}")]
    Persistence {
        /// Description of the failure, as reported by the sink.
        message: String,
    },
}

/// A specialized `Result` type for contingency operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidConfig` error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new `Distribution` error.
    #[must_use]
    pub fn distribution(message: impl Into<String>) -> Self {
        Self::Distribution {
            message: message.into(),
        }
    }

    /// Create a new `Persistence` error.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DuplicateLabel {
            label: "Terror".into(),
            axis: Axis::Columns,
            first: "Terror".into(),
            second: "Suspenso".into(),
        };
        assert!(err.to_string().contains("\"Terror\""));
        assert!(err.to_string().contains("column"));
        assert!(err.to_string().contains("Suspenso"));

        let err = Error::InsufficientCategories {
            axis: Axis::Rows,
            count: 1,
        };
        assert!(err.to_string().contains("row"));
        assert!(err.to_string().contains("at least 2"));

        assert!(Error::NoData.to_string().contains("no data"));
        assert!(Error::persistence("file locked")
            .to_string()
            .contains("file locked"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::invalid_config("alpha");
        let err2 = Error::invalid_config("alpha");
        let err3 = Error::invalid_config("beta");

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
