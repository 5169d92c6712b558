/*
 * Error Module
 *
 * Errors raised while loading a configuration and while running the world.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("malformed configuration")]
    Syntax(#[source] toml::de::Error),
    /// A value parsed fine but cannot be used by the simulation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the world while it is stepping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// An affinity entry names a flock id that no flock in the world carries.
    #[error("no flock exists with id \"{0}\"")]
    UnknownFlock(String),
}
