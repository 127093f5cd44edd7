//! Example test harness.
//!
//! Plugins declare examples on their callables; this module turns them into
//! ordinary `cargo test` tests.
//!
//! ```rust,ignore
//! pub static GREETER: PluginDescriptor = define_plugin! { ... };
//!
//! #[cfg(test)]
//! mod tests {
//!     hookline::example_tests!(super::GREETER);
//! }
//! ```
//!
//! The harness reads the same layered configuration as a host
//! (`hookline.toml`, `HOOKLINE_*`), so `HOOKLINE_TESTING__ONLINE=true` enables
//! examples that need network access.

pub mod bot;
pub mod runner;

pub use bot::{LineKind, RecordingBot, SentLine};
pub use runner::{CaseFailure, CaseReport, CaseStatus, ExampleReport, ExampleRunner, Throttle};

use hookline_framework::{PluginDescriptor, PluginRegistry, RegistrationMode};

use crate::config::{HooklineConfig, load_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Registers `descriptors` in test mode and runs every example case.
///
/// Registration errors, such as an invalid expected pattern, are returned
/// rather than reported per case.
pub fn run_examples(
    config: &HooklineConfig,
    descriptors: &[&PluginDescriptor],
) -> RuntimeResult<ExampleReport> {
    let mut registry = PluginRegistry::new(RegistrationMode::Test);
    registry.register_all(descriptors.iter().copied())?;
    Ok(ExampleRunner::new(config)?.run(&registry))
}

/// Runs the examples of `descriptors`, panicking if any case fails.
///
/// This is what [`example_tests!`](crate::example_tests) expands to.
///
/// # Panics
///
/// Panics if configuration cannot be loaded, a plugin cannot be registered,
/// or any case fails.
pub fn assert_examples(descriptors: &[&PluginDescriptor]) {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => panic!("failed to load configuration: {e}"),
    };
    logging::init_for_tests(&config.logging);

    match run_examples(&config, descriptors) {
        Ok(report) if report.is_success() => {}
        Ok(report) => panic!("example cases failed\n{report}"),
        Err(e) => panic!("failed to prepare example cases: {e}"),
    }
}

/// Generates a `#[test]` that runs the examples of the given plugins.
///
/// ```rust,ignore
/// hookline::example_tests!(GREETER, ADMIN);
/// ```
#[macro_export]
macro_rules! example_tests {
    ($($descriptor:path),+ $(,)?) => {
        #[test]
        fn examples() {
            $crate::testing::assert_examples(&[$(&$descriptor),+]);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookline_framework::{BotHandle, Callable, Example, define_plugin};

    async fn shout(bot: BotHandle) {
        let text = bot.trigger().group(2).unwrap_or_default().to_uppercase();
        bot.say(&text);
    }

    static SHOUT: PluginDescriptor = define_plugin! {
        name: "shout",
        callables: [
            Callable::new(shout)
                .commands(["shout"])
                .example(Example::new(".shout hello").result("HELLO"))
                .example(Example::new(".shout hey there").result("HEY THERE")),
        ],
    };

    static BAD_PATTERN: PluginDescriptor = define_plugin! {
        name: "bad_pattern",
        callables: [
            Callable::new(shout)
                .commands(["loud"])
                .example(Example::new(".loud x").result("(").regex()),
        ],
    };

    example_tests!(SHOUT);

    #[test]
    fn test_run_examples() {
        let report = run_examples(&HooklineConfig::default(), &[&SHOUT]).unwrap();
        assert_eq!(report.passed(), 2);
    }

    #[test]
    fn test_registration_error_is_returned() {
        let err = run_examples(&HooklineConfig::default(), &[&BAD_PATTERN]).unwrap_err();
        assert!(matches!(err, crate::RuntimeError::Plugin(_)));
    }

    #[test]
    #[should_panic(expected = "failed to prepare example cases")]
    fn test_assert_examples_panics() {
        assert_examples(&[&BAD_PATTERN]);
    }
}
