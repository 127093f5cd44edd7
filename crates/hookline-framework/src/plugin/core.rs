use std::fmt;
use std::sync::Arc;

use hookline_core::Bot;
use tower::BoxError;

use crate::callable::Callable;

/// Type of a plugin's optional `setup` hook.
///
/// Called once when the plugin is loaded, and once against the recording
/// bot before the plugin's example cases run.
pub type SetupFn = fn(&dyn Bot) -> Result<(), BoxError>;

// ─── PluginMetadata ───────────────────────────────────────────────────────────

/// Descriptive metadata attached to every plugin.
///
/// Populated by [`define_plugin!`](crate::define_plugin). Unless overridden,
/// `version` and `desc` come from the defining crate's `CARGO_PKG_VERSION`
/// and `CARGO_PKG_DESCRIPTION`, and the doc comment above `name:` becomes
/// `full_desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Semver version string of the plugin.
    pub version: &'static str,
    /// One-line description.
    pub desc: &'static str,
    /// Optional long-form description.
    pub full_desc: Option<&'static str>,
}

// ─── Plugin ───────────────────────────────────────────────────────────────────

/// A live plugin: its callables, setup hook and metadata.
///
/// Create via the [`define_plugin!`](crate::define_plugin) macro.
pub struct Plugin {
    name: &'static str,
    callables: Vec<Arc<Callable>>,
    setup: Option<SetupFn>,
    metadata: PluginMetadata,
}

impl Plugin {
    /// Returns the plugin's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the plugin's metadata.
    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// The plugin's callables, in declaration order.
    pub fn callables(&self) -> &[Arc<Callable>] {
        &self.callables
    }

    /// Looks up a callable by name.
    pub fn callable(&self, name: &str) -> Option<&Arc<Callable>> {
        self.callables.iter().find(|c| c.name() == name)
    }

    /// Returns `true` if the plugin declares a setup hook.
    pub fn has_setup(&self) -> bool {
        self.setup.is_some()
    }

    /// Runs the setup hook, if any.
    pub fn setup(&self, bot: &dyn Bot) -> Result<(), BoxError> {
        match self.setup {
            Some(f) => f(bot),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field(
                "callables",
                &self.callables.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("setup", &self.setup.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}

// ─── Internal constructor (used by define_plugin! macro) ─────────────────────

impl Plugin {
    /// Creates a `Plugin` directly.  Only called by the `define_plugin!` macro.
    #[doc(hidden)]
    pub fn __new(
        name: &'static str,
        callables: Vec<Callable>,
        setup: Option<SetupFn>,
        metadata: PluginMetadata,
    ) -> Self {
        Plugin {
            name,
            callables: callables.into_iter().map(Arc::new).collect(),
            setup,
            metadata,
        }
    }
}
