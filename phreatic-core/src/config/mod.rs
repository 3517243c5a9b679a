//! Configuration types, parsing and validation

pub mod error;
pub mod parse;
pub mod types;

pub use error::ConfigError;
pub use parse::{parse_config, REQUIRED_ZONE_FIELDS};
pub use types::*;
