//! # Hookline
//!
//! Declarative plugin handlers for IRC bots.
//!
//! ## Overview
//!
//! A plugin author writes plain async functions and declares, next to each
//! one, when it should fire, who may trigger it, and what it is expected to
//! answer. A host dispatcher reads those declarations; the example harness
//! turns the expectations into tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────────────────────────┐     ┌─────────────┐
//! │ Dispatcher │────▶│ Callable                     │────▶│   Handler   │──▶ Bot::say
//! │  (host)    │     │  metadata · guards · examples│     │ (async fn)  │
//! └────────────┘     └──────────────────────────────┘     └─────────────┘
//!                                  │
//!                                  ▼
//!                    PluginRegistry ──▶ help entries, example cases
//! ```
//!
//! - **Core**: triggers, privilege ranks, the `Bot` trait
//! - **Framework**: callables, guards, examples, plugin descriptors
//! - **Runtime**: configuration, logging, the example test harness
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookline::prelude::*;
//!
//! async fn greet(bot: BotHandle) -> String {
//!     format!("Hello, {}!", bot.trigger().nick())
//! }
//!
//! pub static GREETER: PluginDescriptor = define_plugin! {
//!     /// Says hello.
//!     name: "greeter",
//!     callables: [
//!         Callable::new(greet)
//!             .commands(["greet", "hello"])
//!             .require_chanmsg()
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
//! ## Features
//!
//! - `toml-config`: read `hookline.toml` (default)
//! - `yaml-config`: read `hookline.yaml`
//! - `json-log`: JSON log output

pub use hookline_core as core;
pub use hookline_framework as framework;
pub use hookline_runtime as runtime;

pub use hookline_framework::define_plugin;
pub use hookline_runtime::example_tests;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use hookline::prelude::*;
/// ```
pub mod prelude {
    // Plugin system
    pub use hookline_framework::{PluginDescriptor, define_plugin};

    // Declaring callables
    pub use hookline_framework::{Callable, Example, Notice, Priority, RateLimit};

    // Handler arguments and results
    pub use hookline_framework::{BotHandle, BoxError, Outcome, UrlMatch};

    // Event and bot types
    pub use hookline_core::{ADMIN, Bot, HALFOP, OP, OWNER, Privilege, Trigger, VOICE};

    pub use std::sync::Arc;
}
