//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod loot_xml;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loot_xml::{
    rescale_loot_xml, InvalidCount, InvalidCountPolicy, RescaleStats, RescaledDocument,
    CONTAINER_TAG, COUNT_ATTR,
};
