//! Plugin system.
//!
//! # Architecture
//!
//! A [`Plugin`] bundles an ordered list of [`Callable`](crate::Callable)s, an
//! optional setup hook and descriptive metadata. A [`PluginDescriptor`] is
//! the *static, `Copy` handle* to a plugin: it carries only metadata and a
//! factory function pointer, and the registry calls
//! [`PluginDescriptor::instantiate`] to create the live [`Plugin`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use hookline::prelude::*;
//!
//! async fn echo(trigger: Arc<Trigger>) -> Option<String> {
//!     trigger.group(2).map(str::to_string)
//! }
//!
//! pub static ECHO: PluginDescriptor = define_plugin! {
//!     name: "echo",
//!     callables: [
//!         Callable::new(echo)
//!             .commands(["echo"])
//!             .example(Example::new(".echo hi").result("hi")),
//!     ],
//! };
//! ```

// ─── Submodules ──────────────────────────────────────────────────────────────
pub mod core;
pub mod descriptor;
pub mod macros;

// ─── Re-exports from submodules ──────────────────────────────────────────────
pub use self::core::{Plugin, PluginMetadata, SetupFn};
pub use descriptor::{HOOKLINE_PLUGIN_API_VERSION, PluginDescriptor};
