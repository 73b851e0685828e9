//! Error types for engine configuration.
//!
//! Attribute parsing deliberately never errors (bad clauses degrade to
//! inert ones), so the only fallible surface is configuration:
//! breakpoint definitions loaded from text or YAML.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("breakpoint list is empty")]
    EmptyBreakpoints,

    #[error("malformed breakpoint entry: {0:?}")]
    MalformedBreakpoint(String),

    #[error("invalid threshold {value:?} for breakpoint {name:?}")]
    InvalidThreshold { name: String, value: String },

    #[error("duplicate breakpoint name: {0:?}")]
    DuplicateBreakpoint(String),

    #[error("breakpoints must include a zero-width base entry")]
    MissingBase,

    #[error("invalid breakpoint YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
