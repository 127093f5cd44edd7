//! Plugin descriptor: the static, `Copy` handle to a plugin.

use super::Plugin;
use super::core::PluginMetadata;
use crate::error::PatternError;

// ─── API versioning ─────────────────────────────────────────────────────────────────────────────

/// Current Hookline plugin API version (1.0).
pub const HOOKLINE_PLUGIN_API_VERSION: u32 = 0x0001_0000;

// ─── PluginDescriptor ─────────────────────────────────────────────────────────

/// A static, `Copy` descriptor that identifies and instantiates a plugin.
///
/// Use the [`define_plugin!`](crate::define_plugin) macro to create one; the
/// result can be stored in a `static` item and handed to
/// [`PluginRegistry::register`](crate::PluginRegistry::register).
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    /// Plugin API version this descriptor was compiled against.
    pub api_version: u32,

    /// Plugin name, used in logs, case names and duplicate reports.
    pub name: &'static str,

    /// Factory that builds the live [`Plugin`]. Fails if a URL pattern does
    /// not compile.
    pub create: fn() -> Result<Plugin, PatternError>,

    /// Static metadata snapshot for this plugin.
    pub metadata: PluginMetadata,
}

impl PluginDescriptor {
    /// Returns `true` if this descriptor's API version is compatible with the
    /// running framework.
    ///
    /// The major part must match exactly; the descriptor's minor part must be
    /// at most the host's minor part.
    pub fn is_compatible(&self) -> bool {
        let host_major = HOOKLINE_PLUGIN_API_VERSION >> 16;
        let desc_major = self.api_version >> 16;
        let desc_minor = self.api_version & 0xFFFF;
        let host_minor = HOOKLINE_PLUGIN_API_VERSION & 0xFFFF;
        desc_major == host_major && desc_minor <= host_minor
    }

    /// Creates the live plugin from the factory function.
    ///
    /// Prefer [`PluginRegistry::register`](crate::PluginRegistry::register),
    /// which also checks compatibility and callable names.
    #[inline]
    pub fn instantiate(&self) -> Result<Plugin, PatternError> {
        (self.create)()
    }

    /// Returns this plugin's static [`PluginMetadata`].
    #[inline]
    pub fn metadata(&self) -> PluginMetadata {
        self.metadata
    }
}
