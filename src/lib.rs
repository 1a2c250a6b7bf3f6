//! lootscale: rescale item and block counts in 7 Days To Die `loot.xml` files
//!
//! Layers, innermost first:
//! - [`domain`]: count values and scaling arithmetic
//! - [`application`]: the XML rescale pass and the rescale service
//! - [`infrastructure`]: filesystem/prompt implementations and wiring
//! - [`cli`]: argument parsing, command handlers, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
