//! Rule violations raised while checking inventory input.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A record or command that breaks an inventory rule.
///
/// Field names are the wire names (`unit_cost`, `desired_count`, ...) so a
/// message can be shown next to the offending form input as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Counts, costs and targets never go below zero.
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    /// A name that is not one of a closed set (status, movement type, review action).
    #[error("unknown {kind} '{value}'")]
    Unknown { kind: &'static str, value: String },

    #[error("sub-category '{0}' does not belong to the item's category")]
    SubCategoryMismatch(String),

    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },
}

impl DomainError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unknown {
            kind,
            value: value.into(),
        }
    }

    /// Input problems the caller can fix by editing the request.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::SubCategoryMismatch(_))
    }
}
