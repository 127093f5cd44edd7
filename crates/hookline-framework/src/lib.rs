//! # Hookline Framework
//!
//! Everything a plugin author declares about a handler, and the machinery
//! that turns those declarations into something a dispatcher and a test
//! harness can use:
//!
//! - [`HandlerMeta`] – the metadata bag (rules, commands, events, rates, ...)
//! - [`pattern`] – URL pattern compilation and command expansion
//! - [`GuardChain`] – authorization and venue preconditions
//! - [`Handler`] – async handlers with extractable arguments
//! - [`Callable`] – a handler plus its metadata and guards
//! - [`Example`] – documented invocations, compiled to [`ExampleCase`]s
//! - [`PluginDescriptor`] / [`define_plugin!`] – static plugin handles
//! - [`PluginRegistry`] – registration, duplicate detection and help output
//!
//! Dispatching (matching lines against rules, rate-limit bookkeeping,
//! threading) is the host's job; the types here only declare intent.

pub mod callable;
pub mod error;
pub mod example;
pub mod extract;
pub mod guard;
pub mod handle;
pub mod handler;
pub mod meta;
pub mod pattern;
pub mod plugin;
pub mod registry;

pub use callable::{Callable, Dispatch, IntoCallable};
pub use error::{
    ExampleError, ExtractError, ExtractResult, PatternError, PluginError, PluginResult,
};
pub use example::{Example, ExampleCase, ExampleFixture, ExampleRecord, Expected};
pub use extract::{FromInvocation, Invocation};
pub use guard::{Denial, Guard, GuardChain, Notice, NoticeText, NotifyMethod, Requirement, Verdict};
pub use handle::BotHandle;
pub use handler::{BoxedHandler, Handler, IntoOutcome, Outcome, into_handler};
pub use meta::{HandlerMeta, ParsePriorityError, Priority, RateLimit};
pub use pattern::{CommandPattern, CommandStyle, UrlMatch, UrlPattern};
pub use plugin::{HOOKLINE_PLUGIN_API_VERSION, Plugin, PluginDescriptor, PluginMetadata, SetupFn};
pub use registry::{HelpEntry, PluginRegistry, RegistrationMode};

/// Error type returned by plugin setup hooks.
pub use tower::BoxError;
