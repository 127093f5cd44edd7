//! Error types for the Hookline framework.

use thiserror::Error;

/// A pattern could not be compiled.
///
/// Raised while a callable is being declared, so a broken pattern stops the
/// plugin from loading instead of failing on the first matching line.
#[derive(Debug, Clone, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    /// The pattern as written by the plugin author.
    pub pattern: String,
    /// The underlying compiler error.
    #[source]
    pub source: regex::Error,
}

impl PatternError {
    pub(crate) fn new(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self {
            pattern: pattern.into(),
            source,
        }
    }
}

/// An example could not be turned into a test case.
#[derive(Debug, Clone, Error)]
pub enum ExampleError {
    /// The callable declares no command the example text could trigger.
    #[error("callable `{callable}` has an example with results but no commands")]
    NotACommand {
        /// Name of the callable.
        callable: String,
    },

    /// An expected result or ignore entry is not a valid pattern.
    #[error("example `{example}` on `{callable}`: {source}")]
    Pattern {
        /// Name of the callable.
        callable: String,
        /// The example text.
        example: String,
        /// The pattern failure.
        #[source]
        source: PatternError,
    },

    /// The example asks to run zero times.
    #[error("example `{example}` on `{callable}` has a repeat count of zero")]
    ZeroRepeat {
        /// Name of the callable.
        callable: String,
        /// The example text.
        example: String,
    },
}

/// Errors raised while registering plugins.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The plugin was built against an incompatible framework API.
    #[error("plugin `{plugin}` targets API {found:#010x}, host provides {expected:#010x}")]
    IncompatibleApi {
        /// Plugin name.
        plugin: &'static str,
        /// API version declared by the plugin.
        found: u32,
        /// API version of the running framework.
        expected: u32,
    },

    /// Two callables share a name.
    #[error("callable `{callable}` is registered twice (plugins `{first}` and `{second}`)")]
    DuplicateCallable {
        /// The clashing callable name.
        callable: String,
        /// Plugin that registered it first.
        first: String,
        /// Plugin that tried to register it again.
        second: String,
    },

    /// A closure was wrapped with [`Callable::new`](crate::Callable::new),
    /// which cannot derive a usable name for it.
    #[error("plugin `{plugin}` has a closure callable without a name; use `Callable::named`")]
    AnonymousCallable {
        /// Plugin name.
        plugin: String,
    },

    /// A pattern failed to compile while the plugin was instantiated.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// An example failed to compile in test mode.
    #[error(transparent)]
    Example(#[from] ExampleError),
}

/// Errors that can occur while extracting handler arguments.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The handler takes a URL match but the dispatch carried none.
    #[error("handler expects a URL match but none was dispatched")]
    MissingUrlMatch,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for plugin registration.
pub type PluginResult<T> = Result<T, PluginError>;
