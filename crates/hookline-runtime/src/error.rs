//! Runtime error types.

use hookline_framework::{BoxError, PluginError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while preparing or running plugins.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A plugin could not be registered.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// A plugin's setup hook failed.
    #[error("Setup of plugin {plugin} failed: {source}")]
    Setup {
        plugin: String,
        #[source]
        source: BoxError,
    },

    /// The async runtime could not be built.
    #[error("Failed to build async runtime: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
