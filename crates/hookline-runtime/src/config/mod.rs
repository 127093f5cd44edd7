//! Configuration for Hookline hosts and the example harness.
//!
//! Layered loading is handled by [`ConfigLoader`]; the shape of the result
//! is [`HooklineConfig`]. Loading always validates.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX, Profile, load_config, load_config_from_file};
pub use schema::{
    CoreConfig, HooklineConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
    TestingConfig,
};
pub use validation::validate_config;
