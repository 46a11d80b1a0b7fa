//! Configuration management
//!
//! Handles machine configuration types, validation and parsing of the
//! embedded TOML configuration.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
