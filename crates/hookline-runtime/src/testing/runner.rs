//! Runs compiled example cases against a recording bot.

use std::fmt;
use std::sync::Arc;

use hookline_core::{BoxedBot, Trigger};
use hookline_framework::{
    CommandPattern, CommandStyle, Dispatch, ExampleCase, ExampleFixture, HandlerMeta, Outcome,
    PatternError, PluginRegistry, RateLimit,
};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, info_span, warn};

use super::bot::RecordingBot;
use crate::config::HooklineConfig;
use crate::error::RuntimeResult;

/// Why a case failed.
#[derive(Error, Debug)]
pub enum CaseFailure {
    /// The case names a plugin or callable the registry does not hold.
    #[error("Callable {plugin}::{callable} is not registered")]
    UnknownCallable { plugin: String, callable: String },

    /// A command name could not be expanded.
    #[error("Invalid command pattern: {0}")]
    Pattern(#[from] PatternError),

    /// The example text does not invoke any of the callable's commands.
    #[error("Example {input:?} does not match any command")]
    NoMatchingCommand { input: String },

    /// The plugin's setup hook failed.
    #[error("Setup of plugin {plugin} failed: {message}")]
    Setup { plugin: String, message: String },

    /// The bot sent a different number of lines than expected.
    #[error("Expected {expected} line(s), got {}: {actual:?}", actual.len())]
    LineCount { expected: usize, actual: Vec<String> },

    /// A line differs from its expected counterpart.
    #[error("Line {index}: expected {expected:?}, got {actual:?}")]
    Mismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// The outcome of one case.
#[derive(Debug)]
pub enum CaseStatus {
    /// Output matched.
    Passed,
    /// Not run.
    Skipped(&'static str),
    /// Output did not match, or the case could not run.
    Failed(CaseFailure),
}

/// A case name with its outcome.
#[derive(Debug)]
pub struct CaseReport {
    /// The case name.
    pub name: String,
    /// The outcome.
    pub status: CaseStatus,
}

/// Outcomes of a whole run.
#[derive(Debug, Default)]
pub struct ExampleReport {
    /// Per-case outcomes, in run order.
    pub cases: Vec<CaseReport>,
}

impl ExampleReport {
    fn count(&self, f: impl Fn(&CaseStatus) -> bool) -> usize {
        self.cases.iter().filter(|c| f(&c.status)).count()
    }

    /// Number of passed cases.
    pub fn passed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Passed))
    }

    /// Number of failed cases.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Failed(_)))
    }

    /// Number of skipped cases.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Skipped(_)))
    }

    /// Failed cases with their failure.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CaseFailure)> {
        self.cases.iter().filter_map(|c| match &c.status {
            CaseStatus::Failed(failure) => Some((c.name.as_str(), failure)),
            _ => None,
        })
    }

    /// Returns `true` if no case failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for ExampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, failure) in self.failures() {
            writeln!(f, "FAILED {name}: {failure}")?;
        }
        write!(
            f,
            "example cases: {} passed; {} failed; {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Executes example cases.
///
/// Each case gets a fresh [`RecordingBot`]. The owning plugin's setup hook
/// runs against it first, then the callable is invoked once per repetition
/// with a trigger synthesized from the example text.
///
/// With a [`Throttle`] attached, every repetition is checked against the
/// rate limits of the callable's metadata after its [`ExampleFixture`] is
/// applied, so a rate-limited callable still answers every repetition.
#[derive(Debug)]
pub struct ExampleRunner {
    config: HooklineConfig,
    runtime: Runtime,
    throttle: Option<Arc<dyn Throttle>>,
}

/// Rate-limit enforcement supplied by the host's dispatcher.
///
/// Window state and exemptions live in the implementation; the runner only
/// asks before each repetition and reports calls that count.
pub trait Throttle: fmt::Debug + Send + Sync {
    /// Returns `true` if `trigger` may invoke `callable` under `limit`.
    fn admits(&self, callable: &str, limit: &RateLimit, trigger: &Trigger) -> bool;

    /// Counts a call that returned [`Outcome::Done`].
    fn record(&self, callable: &str, trigger: &Trigger);
}

impl ExampleRunner {
    /// Creates a runner using the identity and testing settings of `config`.
    pub fn new(config: &HooklineConfig) -> RuntimeResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            config: config.clone(),
            runtime,
            throttle: None,
        })
    }

    /// Consults `throttle` before each repetition.
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Runs every case in `registry`.
    pub fn run(&self, registry: &PluginRegistry) -> ExampleReport {
        let cases = registry
            .cases()
            .iter()
            .map(|case| CaseReport {
                name: case.name.clone(),
                status: self.run_case(registry, case),
            })
            .collect();
        let report = ExampleReport { cases };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Example run finished"
        );
        report
    }

    /// Runs a single case.
    pub fn run_case(&self, registry: &PluginRegistry, case: &ExampleCase) -> CaseStatus {
        let _span = info_span!("example", case = %case.name).entered();

        if case.online && !self.config.testing.online {
            debug!("Skipping online example");
            return CaseStatus::Skipped("needs network access");
        }

        match self.execute(registry, case) {
            Ok(()) => {
                debug!("Example passed");
                CaseStatus::Passed
            }
            Err(failure) => {
                warn!(%failure, "Example failed");
                CaseStatus::Failed(failure)
            }
        }
    }

    fn execute(&self, registry: &PluginRegistry, case: &ExampleCase) -> Result<(), CaseFailure> {
        let unknown = || CaseFailure::UnknownCallable {
            plugin: case.plugin.clone(),
            callable: case.callable.clone(),
        };
        let plugin = registry.plugin(&case.plugin).ok_or_else(unknown)?;
        let callable = plugin.callable(&case.callable).ok_or_else(unknown)?;

        let meta = registry
            .fixture(&case.callable)
            .cloned()
            .unwrap_or_else(|| ExampleFixture::for_callable(&case.callable))
            .apply(callable.meta());

        let core = &self.config.core;
        let input = case.input.replace("$nickname", &core.nick);
        let (style, groups) = self
            .parse_command(&meta, &input)?
            .ok_or_else(|| CaseFailure::NoMatchingCommand {
                input: input.clone(),
            })?;

        let bot = Arc::new(RecordingBot::new(core.nick.as_str()));
        plugin.setup(&*bot).map_err(|e| CaseFailure::Setup {
            plugin: case.plugin.clone(),
            message: e.to_string(),
        })?;
        bot.clear();

        let reply_prefix = format!("{}: ", self.config.testing.nick);
        let mut lines = Vec::with_capacity(case.expected_len());
        for run in 0..case.repeat {
            let trigger = Arc::new(self.trigger(case, &input, style, &groups));
            let admitted = self
                .throttle
                .as_ref()
                .is_none_or(|t| t.admits(&case.callable, &meta.rate, &trigger));
            if !admitted {
                debug!(run, "Repetition rate limited");
                continue;
            }
            let boxed: BoxedBot = bot.clone();
            let outcome = self
                .runtime
                .block_on(callable.invoke(Dispatch::new(boxed, Arc::clone(&trigger))));
            if let (Some(throttle), Some(Outcome::Done)) = (&self.throttle, outcome) {
                throttle.record(&case.callable, &trigger);
            }

            lines.extend(bot.take_texts().into_iter().map(|line| {
                line.strip_prefix(&reply_prefix)
                    .map(str::to_string)
                    .unwrap_or(line)
            }));
        }
        lines.retain(|line| !case.is_ignored(line));

        compare(case, lines)
    }

    /// Finds the first command of `meta` that `input` invokes.
    fn parse_command(
        &self,
        meta: &HandlerMeta,
        input: &str,
    ) -> Result<Option<(CommandStyle, Vec<Option<String>>)>, CaseFailure> {
        let core = &self.config.core;
        let styled = meta
            .commands
            .iter()
            .map(|c| (CommandStyle::Prefixed, c))
            .chain(meta.nickname_commands.iter().map(|c| (CommandStyle::Nickname, c)))
            .chain(meta.action_commands.iter().map(|c| (CommandStyle::Action, c)));

        for (style, command) in styled {
            let pattern = CommandPattern::expand(style, command, &core.help_prefix, &core.nick)?;
            if let Some(groups) = pattern.parse(input) {
                return Ok(Some((style, groups)));
            }
        }
        Ok(None)
    }

    fn trigger(
        &self,
        case: &ExampleCase,
        input: &str,
        style: CommandStyle,
        groups: &[Option<String>],
    ) -> Trigger {
        let testing = &self.config.testing;
        let builder = if case.privmsg {
            Trigger::private(testing.nick.as_str(), input)
        } else {
            Trigger::channel(testing.channel.as_str(), testing.nick.as_str(), input)
        };
        let builder = builder
            .admin(case.admin || case.owner)
            .owner(case.owner)
            .groups(groups.iter().cloned());
        match style {
            CommandStyle::Action => builder.intent("ACTION").build(),
            _ => builder.build(),
        }
    }
}

/// Checks the collected output against the case's expectations.
///
/// Line `i` is compared with expected entry `i % expected.len()`, so every
/// repetition must produce the same sequence.
fn compare(case: &ExampleCase, lines: Vec<String>) -> Result<(), CaseFailure> {
    if lines.len() != case.expected_len() {
        return Err(CaseFailure::LineCount {
            expected: case.expected_len(),
            actual: lines,
        });
    }

    for (index, line) in lines.iter().enumerate() {
        let expected = &case.expected[index % case.expected.len()];
        if !expected.matches(line) {
            return Err(CaseFailure::Mismatch {
                index,
                expected: expected.as_str().to_string(),
                actual: line.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookline_core::{Bot, OP};
    use parking_lot::Mutex;
    use hookline_framework::{
        BotHandle, BoxError, Callable, Example, Notice, PluginDescriptor, RegistrationMode,
        define_plugin,
    };

    async fn echo(bot: BotHandle) {
        let text = bot.trigger().group(2).unwrap_or_default().to_string();
        bot.say(&text);
    }

    async fn chatty(bot: BotHandle) {
        bot.say("DEBUG: about to answer");
        bot.reply("done");
    }

    async fn whoami(bot: BotHandle) {
        let trigger = bot.trigger();
        let role = if trigger.is_owner() {
            "owner"
        } else if trigger.is_admin() {
            "admin"
        } else {
            "user"
        };
        bot.say(&format!("{} in {}", role, trigger.sender()));
    }

    async fn setup_marker(bot: BotHandle) {
        bot.say("ready");
    }

    async fn waves(bot: BotHandle) {
        let trigger = bot.trigger();
        let reply = match trigger.intent() {
            Some("ACTION") => "waves back",
            _ => "no action",
        };
        bot.say(reply);
    }

    async fn quiet(bot: BotHandle) -> Outcome {
        bot.say("shh");
        Outcome::NoLimit
    }

    fn failing_setup(bot: &dyn Bot) -> Result<(), BoxError> {
        bot.say("setting up", "#channel");
        Err("database unavailable".into())
    }

    fn announcing_setup(bot: &dyn Bot) -> Result<(), BoxError> {
        bot.say("setting up", "#channel");
        Ok(())
    }

    static DEMO: PluginDescriptor = define_plugin! {
        name: "demo",
        callables: [
            Callable::new(echo)
                .commands(["echo"])
                .rate(RateLimit::per_user(60))
                .example(Example::new(".echo hi").result("hi"))
                .example(Example::new(".echo hi").result("bye"))
                .example(Example::new(".echo again").result("again").repeat(3))
                .example(Example::new(".echo 42").result(r"\d+").regex()),
            Callable::new(chatty)
                .nickname_commands(["chatty"])
                .example(Example::new("$nickname: chatty").result("done").ignore("DEBUG: .*")),
            Callable::new(whoami)
                .commands(["whoami"])
                .example(Example::new(".whoami").result("user in #channel"))
                .example(Example::new(".whoami").result("admin in Tester").privmsg().admin())
                .example(Example::new(".whoami").result("owner in #channel").owner())
                .example(Example::new(".whoami").result("nope").online()),
        ],
    };

    static GUARDED: PluginDescriptor = define_plugin! {
        name: "guarded",
        callables: [
            Callable::new(setup_marker)
                .commands(["op"])
                .require_privilege_with(OP, Notice::say("Operators only."))
                .example(Example::new(".op").result("Operators only."))
                .example(Example::new(".op").result("ready").privmsg()),
        ],
    };

    static BROKEN_SETUP: PluginDescriptor = define_plugin! {
        name: "broken_setup",
        callables: [
            Callable::new(setup_marker)
                .commands(["marker"])
                .example(Example::new(".marker").result("ready")),
        ],
        setup: failing_setup,
    };

    static ANNOUNCED: PluginDescriptor = define_plugin! {
        name: "announced",
        callables: [
            Callable::named("marker", setup_marker)
                .commands(["marker"])
                .example(Example::new(".marker").result("ready")),
        ],
        setup: announcing_setup,
    };

    static ACTIONS: PluginDescriptor = define_plugin! {
        name: "actions",
        callables: [
            Callable::new(waves)
                .action_commands(["waves"])
                .example(Example::new("waves").result("waves back"))
                .example(Example::new("waves at you").result("waves back").privmsg()),
        ],
    };

    static LIMITED: PluginDescriptor = define_plugin! {
        name: "limited",
        callables: [
            Callable::new(echo)
                .commands(["echo"])
                .rate(RateLimit::per_user(60))
                .example(Example::new(".echo again").result("again").repeat(3)),
            Callable::new(quiet)
                .commands(["quiet"])
                .rate(RateLimit::from_secs(0, 60, 0))
                .example(Example::new(".quiet").result("shh").repeat(2)),
        ],
    };

    fn run(descriptor: &PluginDescriptor, config: &HooklineConfig) -> ExampleReport {
        let mut registry = PluginRegistry::new(RegistrationMode::Test);
        registry.register(descriptor).unwrap();
        ExampleRunner::new(config).unwrap().run(&registry)
    }

    fn status<'a>(report: &'a ExampleReport, name: &str) -> &'a CaseStatus {
        &report
            .cases
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no case named {name}"))
            .status
    }

    #[test]
    fn test_literal_and_mismatch() {
        let report = run(&DEMO, &HooklineConfig::default());
        assert!(matches!(status(&report, "test_example_echo_0"), CaseStatus::Passed));
        match status(&report, "test_example_echo_1") {
            CaseStatus::Failed(CaseFailure::Mismatch {
                index,
                expected,
                actual,
            }) => {
                assert_eq!(*index, 0);
                assert_eq!(expected, "bye");
                assert_eq!(actual, "hi");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn test_repeat_and_regex() {
        let report = run(&DEMO, &HooklineConfig::default());
        assert!(matches!(status(&report, "test_example_echo_2"), CaseStatus::Passed));
        assert!(matches!(status(&report, "test_example_echo_3"), CaseStatus::Passed));
    }

    #[test]
    fn test_nickname_ignore_and_reply_prefix() {
        let report = run(&DEMO, &HooklineConfig::default());
        assert!(matches!(status(&report, "test_example_chatty_0"), CaseStatus::Passed));
    }

    #[test]
    fn test_venue_and_roles() {
        let report = run(&DEMO, &HooklineConfig::default());
        assert!(matches!(status(&report, "test_example_whoami_0"), CaseStatus::Passed));
        assert!(matches!(status(&report, "test_example_whoami_1"), CaseStatus::Passed));
        assert!(matches!(status(&report, "test_example_whoami_2"), CaseStatus::Passed));
    }

    #[test]
    fn test_online_cases_are_skipped() {
        let report = run(&DEMO, &HooklineConfig::default());
        assert!(matches!(
            status(&report, "test_example_whoami_3"),
            CaseStatus::Skipped(_)
        ));
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());

        let summary = report.to_string();
        assert!(summary.contains("FAILED test_example_echo_1"));
        assert!(summary.ends_with("1 failed; 1 skipped"));
    }

    #[test]
    fn test_online_cases_run_when_enabled() {
        let mut config = HooklineConfig::default();
        config.testing.online = true;
        let report = run(&DEMO, &config);
        assert!(matches!(
            status(&report, "test_example_whoami_3"),
            CaseStatus::Failed(CaseFailure::Mismatch { .. })
        ));
    }

    #[test]
    fn test_guard_notice_and_privmsg_bypass() {
        let report = run(&GUARDED, &HooklineConfig::default());
        assert!(report.is_success(), "{report}");
        assert_eq!(report.passed(), 2);
    }

    #[test]
    fn test_setup_failure() {
        let report = run(&BROKEN_SETUP, &HooklineConfig::default());
        match status(&report, "test_example_setup_marker_0") {
            CaseStatus::Failed(CaseFailure::Setup { plugin, message }) => {
                assert_eq!(plugin, "broken_setup");
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn test_setup_output_is_not_counted() {
        let report = run(&ANNOUNCED, &HooklineConfig::default());
        assert!(
            matches!(status(&report, "test_example_marker_0"), CaseStatus::Passed),
            "{report}"
        );
    }

    #[test]
    fn test_action_only_callable() {
        let report = run(&ACTIONS, &HooklineConfig::default());
        assert!(report.is_success(), "{report}");
        assert_eq!(report.passed(), 2);
    }

    /// Denies any repeat call to a callable with a limit in any scope.
    #[derive(Debug, Default)]
    struct StrictThrottle {
        limits: Mutex<Vec<RateLimit>>,
        counted: Mutex<Vec<String>>,
    }

    impl Throttle for StrictThrottle {
        fn admits(&self, callable: &str, limit: &RateLimit, _trigger: &Trigger) -> bool {
            self.limits.lock().push(*limit);
            limit.is_unlimited() || !self.counted.lock().iter().any(|c| c == callable)
        }

        fn record(&self, callable: &str, _trigger: &Trigger) {
            self.counted.lock().push(callable.to_string());
        }
    }

    #[test]
    fn test_fixture_lifts_rate_limits() {
        let throttle = Arc::new(StrictThrottle::default());
        let mut registry = PluginRegistry::new(RegistrationMode::Test);
        registry.register(&LIMITED).unwrap();
        let report = ExampleRunner::new(&HooklineConfig::default())
            .unwrap()
            .with_throttle(throttle.clone())
            .run(&registry);

        assert!(report.is_success(), "{report}");
        assert_eq!(report.passed(), 2);
        let limits = throttle.limits.lock();
        assert_eq!(limits.len(), 5);
        assert!(limits.iter().all(RateLimit::is_unlimited));
        assert_eq!(*throttle.counted.lock(), vec!["echo"; 3]);
    }

    #[test]
    fn test_strict_throttle_blocks_declared_limit() {
        let throttle = StrictThrottle::default();
        let trigger = Trigger::channel("#channel", "Tester", ".echo again").build();
        let limit = RateLimit::per_user(60);
        assert!(throttle.admits("echo", &limit, &trigger));
        throttle.record("echo", &trigger);
        assert!(!throttle.admits("echo", &limit, &trigger));
        assert!(throttle.admits("echo", &RateLimit::NONE, &trigger));
    }

    #[test]
    fn test_custom_prefix() {
        let mut config = HooklineConfig::default();
        config.core.help_prefix = "!".to_string();
        let report = run(&DEMO, &config);
        assert!(matches!(
            status(&report, "test_example_echo_0"),
            CaseStatus::Failed(CaseFailure::NoMatchingCommand { .. })
        ));
    }

    #[test]
    fn test_line_count() {
        let report = run(&DEMO, &HooklineConfig::default());
        let case = report
            .cases
            .iter()
            .find(|c| c.name == "test_example_echo_2")
            .unwrap();
        assert!(matches!(case.status, CaseStatus::Passed));

        let compiled = {
            let mut registry = PluginRegistry::new(RegistrationMode::Test);
            registry.register(&DEMO).unwrap();
            registry.cases()[0].clone()
        };
        let failure = compare(&compiled, vec!["hi".into(), "hi".into()]).unwrap_err();
        assert!(matches!(failure, CaseFailure::LineCount { expected: 1, .. }));
    }
}
