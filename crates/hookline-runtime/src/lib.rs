//! Hookline Runtime - host-side support for the Hookline plugin framework.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `HooklineConfig`)
//! - Logging setup (`LoggingBuilder`)
//! - The example test harness (`testing`, [`example_tests!`])
//!
//! # Example Tests
//!
//! Examples declared on a plugin's callables become a single `#[test]`:
//!
//! ```ignore
//! use hookline::prelude::*;
//!
//! pub static GREETER: PluginDescriptor = define_plugin! {
//!     name: "greeter",
//!     callables: [
//!         Callable::new(greet)
//!             .commands(["greet"])
//!             .example(Example::new(".greet").result("Hello, Tester!")),
//!     ],
//! };
//!
//! #[cfg(test)]
//! mod tests {
//!     hookline::example_tests!(super::GREETER);
//! }
//! ```
//!
//! # Host Logging
//!
//! ```ignore
//! let config = hookline_runtime::config::load_config()?;
//! hookline_runtime::logging::init_from_config(&config.logging);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod testing;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, CoreConfig, HooklineConfig, LoggingConfig,
    TestingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use testing::{ExampleReport, ExampleRunner, RecordingBot, Throttle};

// Re-export tracing for use by plugin crates
pub use tracing;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
