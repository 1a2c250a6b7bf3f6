//! Domain layer: count values and scaling arithmetic
//!
//! This layer is independent of external concerns (no I/O, no XML, no config loading).

pub mod count;
pub mod error;

pub use count::{CountValue, ElementKind, Multiplier, RANGE_SEPARATOR};
pub use error::DomainError;
