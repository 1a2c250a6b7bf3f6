//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::ElementKind;

/// Domain errors represent invalid loot values.
/// These are independent of XML and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid {kind} count {value:?}: {reason}")]
    InvalidCount {
        kind: ElementKind,
        value: String,
        reason: String,
    },

    #[error("invalid multiplier {value:?}: {reason}")]
    InvalidMultiplier { value: String, reason: String },
}
