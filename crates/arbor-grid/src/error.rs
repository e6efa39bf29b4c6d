//! Error types for the Arbor grid data engine.

use std::fmt;

use crate::value::FieldType;

/// The main error type for data engine operations.
///
/// Empty results are never errors: a filter or search that matches nothing
/// yields an empty view, and grouping an empty view yields an empty tree.
/// Errors are reserved for malformed calls and invalid value conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A field-scoped search was invoked without any target fields.
    MissingSearchFields,
    /// A field-scoped search was given differently sized text and field lists.
    FieldCountMismatch {
        /// Number of search texts supplied.
        texts: usize,
        /// Number of target fields supplied.
        fields: usize,
    },
    /// A value could not be converted to the requested type.
    InvalidConversion {
        /// The type of the source value.
        from: FieldType,
        /// The requested target type.
        to: FieldType,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSearchFields => {
                write!(f, "Field search requires at least one target field")
            }
            Self::FieldCountMismatch { texts, fields } => {
                write!(
                    f,
                    "Field search requires one text per field: got {texts} texts for {fields} fields"
                )
            }
            Self::InvalidConversion { from, to } => {
                write!(f, "Cannot convert a {from} value to {to}")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// A specialized Result type for data engine operations.
pub type Result<T> = std::result::Result<T, DataError>;
