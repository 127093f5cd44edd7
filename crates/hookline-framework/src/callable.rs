//! Callables: a handler plus its declarations and guards.
//!
//! Plugins build callables with a chain of combinators. Each one records a
//! declaration or adds a guard and hands the callable back:
//!
//! ```rust,ignore
//! Callable::new(kick)
//!     .commands(["kick"])
//!     .priority(Priority::High)
//!     .require_chanmsg()
//!     .require_privilege_with(OP, Notice::reply("You are not a channel operator."))
//!     .example(Example::new(".kick spammer"))
//! ```
//!
//! # Tower Service Integration
//!
//! `Callable` implements `tower::Service<Dispatch>`, so a dispatcher can wrap
//! it in tower middleware such as timeouts.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use hookline_core::{BoxedBot, Privilege, Trigger};
use tower::Service;
use tracing::trace;

use crate::error::PatternError;
use crate::example::Example;
use crate::extract::Invocation;
use crate::guard::{Denial, Guard, GuardChain, Notice, Requirement};
use crate::handle::BotHandle;
use crate::handler::{BoxedHandler, Handler, Outcome, into_handler};
use crate::meta::{HandlerMeta, Priority, RateLimit};
use crate::pattern::{UrlMatch, UrlPattern};

/// One event delivered to a callable.
#[derive(Clone)]
pub struct Dispatch {
    /// The bot the event arrived on.
    pub bot: BoxedBot,
    /// The event.
    pub trigger: Arc<Trigger>,
    /// The URL match, when a URL pattern selected this callable.
    pub url_match: Option<UrlMatch>,
}

impl Dispatch {
    /// A dispatch without a URL match.
    pub fn new(bot: BoxedBot, trigger: impl Into<Arc<Trigger>>) -> Self {
        Self {
            bot,
            trigger: trigger.into(),
            url_match: None,
        }
    }

    /// Attaches a URL match.
    pub fn with_url_match(mut self, url_match: UrlMatch) -> Self {
        self.url_match = Some(url_match);
        self
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("bot", &self.bot.nick())
            .field("trigger", &self.trigger)
            .field("url_match", &self.url_match)
            .finish()
    }
}

/// A handler wrapped with its metadata bag and guard chain.
///
/// Wrapping never changes what the handler does. The guards run first; if
/// any denies, the handler is not called.
#[derive(Clone)]
pub struct Callable {
    name: String,
    meta: HandlerMeta,
    examples: Vec<Example>,
    guards: GuardChain,
    handler: BoxedHandler,
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    // Generic arguments may contain `::` as well.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl Callable {
    /// Wraps `handler`, naming the callable after the handler function.
    ///
    /// Closures have no usable name; wrap them with [`Callable::named`].
    /// A registry rejects an unnamed closure.
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        Self::named(short_type_name::<H>(), handler)
    }

    /// Wraps `handler` under an explicit name.
    pub fn named<H, T>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        Self {
            name: name.into(),
            meta: HandlerMeta::new(),
            examples: Vec::new(),
            guards: GuardChain::new(),
            handler: into_handler(handler),
        }
    }

    /// The callable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metadata bag.
    pub fn meta(&self) -> &HandlerMeta {
        &self.meta
    }

    /// The guards, in the order they are evaluated.
    pub fn guards(&self) -> &GuardChain {
        &self.guards
    }

    /// Examples as declared, including test-only settings.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Adds rule patterns.
    pub fn rule<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_rules(patterns);
        self
    }

    /// Adds prefixed commands.
    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_commands(commands);
        self
    }

    /// Adds commands addressed to the bot by nick.
    pub fn nickname_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_nickname_commands(commands);
        self
    }

    /// Adds action commands. The intent list becomes exactly `ACTION`.
    pub fn action_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_action_commands(commands);
        self
    }

    /// Adds protocol events.
    pub fn event<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_events(events);
        self
    }

    /// Adds message intents.
    pub fn intent<I, S>(mut self, intents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.add_intents(intents);
        self
    }

    /// Sets the dispatch priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.meta.priority = priority;
        self
    }

    /// Adds periodic intervals, in seconds.
    pub fn interval<I>(mut self, seconds: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.meta.add_intervals(seconds);
        self
    }

    /// Replaces the rate-limit thresholds.
    pub fn rate(mut self, limit: RateLimit) -> Self {
        self.meta.rate = limit;
        self
    }

    /// Sets whether the callable runs off the main dispatch sequence.
    pub fn thread(mut self, value: bool) -> Self {
        self.meta.thread = Some(value);
        self
    }

    /// Lets the callable see the bot's own messages.
    pub fn echo(self) -> Self {
        self.with_echo(true)
    }

    /// Sets the echo flag explicitly.
    pub fn with_echo(mut self, value: bool) -> Self {
        self.meta.echo = value;
        self
    }

    /// Exempts the callable from blocklist filtering.
    pub fn unblockable(mut self) -> Self {
        self.meta.unblockable = true;
        self
    }

    /// Sets the prefix applied to `say` and `notice` output.
    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.meta.output_prefix = Some(prefix.into());
        self
    }

    /// Adds URL patterns, compiling each one now.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile. Nothing is added in
    /// that case.
    pub fn url<I, S>(mut self, patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| UrlPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.meta.add_url_patterns(compiled);
        Ok(self)
    }

    /// Attaches an example.
    pub fn example(mut self, example: Example) -> Self {
        self.meta.example.push(example.record());
        self.examples.push(example);
        self
    }

    // ========================================================================
    // Guards
    // ========================================================================

    /// Wraps the callable in a guard. Guards added later run earlier.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.wrap(guard);
        self
    }

    fn require(self, requirement: Requirement, notice: Option<Notice>) -> Self {
        let guard = match notice {
            Some(notice) => Guard::with_notice(requirement, notice),
            None => Guard::new(requirement),
        };
        self.guard(guard)
    }

    /// Only private messages.
    pub fn require_privmsg(self) -> Self {
        self.require(Requirement::PrivateMessage, None)
    }

    /// Only private messages, with a notice on denial.
    pub fn require_privmsg_with(self, notice: Notice) -> Self {
        self.require(Requirement::PrivateMessage, Some(notice))
    }

    /// Only channel messages.
    pub fn require_chanmsg(self) -> Self {
        self.require(Requirement::ChannelMessage, None)
    }

    /// Only channel messages, with a notice on denial.
    pub fn require_chanmsg_with(self, notice: Notice) -> Self {
        self.require(Requirement::ChannelMessage, Some(notice))
    }

    /// Only nicks logged in to a services account.
    pub fn require_account(self) -> Self {
        self.require(Requirement::Account, None)
    }

    /// Only logged-in nicks, with a notice on denial.
    pub fn require_account_with(self, notice: Notice) -> Self {
        self.require(Requirement::Account, Some(notice))
    }

    /// Only nicks with at least `level` in the channel.
    pub fn require_privilege(self, level: Privilege) -> Self {
        self.require(Requirement::Privilege(level), None)
    }

    /// Only nicks with at least `level`, with a notice on denial.
    pub fn require_privilege_with(self, level: Privilege, notice: Notice) -> Self {
        self.require(Requirement::Privilege(level), Some(notice))
    }

    /// Only bot admins.
    pub fn require_admin(self) -> Self {
        self.require(Requirement::Admin, None)
    }

    /// Only bot admins, with a notice on denial.
    pub fn require_admin_with(self, notice: Notice) -> Self {
        self.require(Requirement::Admin, Some(notice))
    }

    /// Only the bot owner.
    pub fn require_owner(self) -> Self {
        self.require(Requirement::Owner, None)
    }

    /// Only the bot owner, with a notice on denial.
    pub fn require_owner_with(self, notice: Notice) -> Self {
        self.require(Requirement::Owner, Some(notice))
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    fn bind(&self, dispatch: &Dispatch) -> BotHandle {
        BotHandle::new(dispatch.bot.clone(), dispatch.trigger.clone())
            .with_output_prefix(self.meta.output_prefix.as_deref())
    }

    /// Reports which guard would deny `dispatch`, without sending anything
    /// or calling the handler.
    pub fn check(&self, dispatch: &Dispatch) -> Result<(), Denial> {
        let bot = self.bind(dispatch);
        self.guards.check(&bot).map_err(|(denial, _)| denial)
    }

    /// Runs the guards and, if they allow it, returns the handler's future.
    fn start(&self, dispatch: Dispatch) -> Option<BoxFuture<'static, Outcome>> {
        let bot = self.bind(&dispatch);
        self.guards.evaluate(&bot).ok()?;
        trace!(callable = %self.name, "Invoking handler");
        let inv = Arc::new(Invocation::new(bot, dispatch.url_match));
        Some((self.handler)(inv))
    }

    /// Delivers one event.
    ///
    /// Returns `None` if a guard denied the call.
    pub async fn invoke(&self, dispatch: Dispatch) -> Option<Outcome> {
        match self.start(dispatch) {
            Some(fut) => Some(fut.await),
            None => None,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

impl Service<Dispatch> for Callable {
    type Response = Option<Outcome>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, dispatch: Dispatch) -> Self::Future {
        let started = self.start(dispatch);
        Box::pin(async move {
            Ok(match started {
                Some(fut) => Some(fut.await),
                None => None,
            })
        })
    }
}

/// Values a plugin factory can list as callables.
///
/// Lets `url(...)` results sit in the same list as plain callables; the
/// first compile error aborts plugin creation.
pub trait IntoCallable {
    /// Converts into a callable.
    fn into_callable(self) -> Result<Callable, PatternError>;
}

impl IntoCallable for Callable {
    fn into_callable(self) -> Result<Callable, PatternError> {
        Ok(self)
    }
}

impl IntoCallable for Result<Callable, PatternError> {
    fn into_callable(self) -> Result<Callable, PatternError> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::tests::TestBot;
    use hookline_core::{HALFOP, OP, VOICE};
    use tokio_test::block_on;
    use tower::ServiceExt;

    async fn echo(bot: BotHandle) {
        let text = bot.trigger().group(2).unwrap_or_default().to_string();
        bot.say(&text);
    }

    fn dispatch(bot: &Arc<TestBot>, trigger: Trigger) -> Dispatch {
        Dispatch::new(bot.clone(), trigger)
    }

    fn echo_trigger(builder: hookline_core::TriggerBuilder) -> Trigger {
        builder
            .groups([Some("echo"), Some("hi")])
            .build()
    }

    #[test]
    fn test_name_from_function() {
        let callable = Callable::new(echo);
        assert_eq!(callable.name(), "echo");
        assert_eq!(Callable::named("other", echo).name(), "other");
    }

    #[test]
    fn test_combinators_are_idempotent() {
        let callable = Callable::new(echo)
            .commands(["a", "a"])
            .commands(["b", "a"])
            .interval([5, 5, 10]);
        assert_eq!(callable.meta().commands, vec!["a", "b"]);
        assert_eq!(callable.meta().interval, vec![5, 10]);
    }

    #[test]
    fn test_scalar_declarations() {
        let callable = Callable::new(echo)
            .priority(Priority::Low)
            .thread(false)
            .echo()
            .unblockable()
            .output_prefix("[echo] ")
            .rate(RateLimit::per_user(5));
        let meta = callable.meta();
        assert_eq!(meta.priority, Priority::Low);
        assert_eq!(meta.thread, Some(false));
        assert!(meta.echo);
        assert!(meta.unblockable);
        assert_eq!(meta.output_prefix.as_deref(), Some("[echo] "));
        assert_eq!(meta.rate, RateLimit::per_user(5));

        let callable = callable.with_echo(false);
        assert!(!callable.meta().echo);
    }

    #[test]
    fn test_url_dedup_and_failure() {
        let pattern = r"https://example\.com/(\d+)";
        let callable = Callable::new(echo)
            .url([pattern])
            .and_then(|c| c.url([pattern]))
            .unwrap();
        assert_eq!(callable.meta().url_regex.len(), 1);

        let err = Callable::new(echo).url(["(broken"]).unwrap_err();
        assert_eq!(err.pattern, "(broken");
    }

    #[test]
    fn test_example_records_kept() {
        let callable = Callable::new(echo)
            .commands(["echo"])
            .example(Example::new(".echo hi").result("hi"))
            .example(Example::new(".echo").user_help());
        assert_eq!(callable.meta().example.len(), 2);
        assert_eq!(callable.examples().len(), 2);
        assert!(callable.meta().example[1].help);
    }

    #[test]
    fn test_unguarded_invocation() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo);
        let outcome = block_on(callable.invoke(dispatch(
            &bot,
            echo_trigger(Trigger::channel("#c", "alice", ".echo hi")),
        )));
        assert_eq!(outcome, Some(Outcome::Done));
        assert_eq!(bot.texts(), vec!["hi"]);
    }

    #[test]
    fn test_output_prefix_applied() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo).output_prefix("> ");
        block_on(callable.invoke(dispatch(
            &bot,
            echo_trigger(Trigger::channel("#c", "alice", ".echo hi")),
        )));
        assert_eq!(bot.texts(), vec!["> hi"]);
    }

    #[test]
    fn test_chanmsg_guard_silently_denies_private() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo).require_chanmsg();
        let outcome = block_on(callable.invoke(dispatch(
            &bot,
            echo_trigger(Trigger::private("alice", ".echo hi")),
        )));
        assert_eq!(outcome, None);
        assert!(bot.texts().is_empty());
    }

    #[test]
    fn test_privilege_guard_bypassed_in_private() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo).require_privilege(OP);
        let outcome = block_on(callable.invoke(dispatch(
            &bot,
            echo_trigger(Trigger::private("alice", ".echo hi")),
        )));
        assert_eq!(outcome, Some(Outcome::Done));
        assert_eq!(bot.texts(), vec!["hi"]);
    }

    #[test]
    fn test_privilege_levels() {
        let bot = Arc::new(TestBot::default());
        bot.privileges.grant("#c", "alice", HALFOP);
        let trigger = echo_trigger(Trigger::channel("#c", "alice", ".echo hi"));

        let op_only = Callable::new(echo)
            .require_privilege_with(OP, Notice::reply("Ops only."));
        assert_eq!(block_on(op_only.invoke(dispatch(&bot, trigger.clone()))), None);
        assert_eq!(bot.texts(), vec!["alice: Ops only."]);

        let voiced = Callable::new(echo).require_privilege(VOICE);
        assert!(block_on(voiced.invoke(dispatch(&bot, trigger))).is_some());
    }

    #[test]
    fn test_check_reports_outer_guard() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo)
            .require_chanmsg_with(Notice::say("channel only"))
            .require_owner();
        let d = dispatch(&bot, echo_trigger(Trigger::private("alice", ".echo hi")));

        let denial = callable.check(&d).unwrap_err();
        assert_eq!(denial.position, 0);
        assert_eq!(denial.requirement, Requirement::Owner);
        assert!(bot.texts().is_empty());

        // The outer guard denies silently and the inner notice never fires.
        assert_eq!(block_on(callable.invoke(d)), None);
        assert!(bot.texts().is_empty());
    }

    #[test]
    fn test_guard_order_is_introspectable() {
        let callable = Callable::new(echo).require_account().require_admin();
        let order: Vec<_> = callable.guards().iter().map(Guard::requirement).collect();
        assert_eq!(order, vec![Requirement::Admin, Requirement::Account]);
    }

    #[test]
    fn test_service_call() {
        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(echo).require_chanmsg();

        let allowed = block_on(callable.clone().oneshot(dispatch(
            &bot,
            echo_trigger(Trigger::channel("#c", "alice", ".echo hi")),
        )));
        assert_eq!(allowed, Ok(Some(Outcome::Done)));

        let denied = block_on(callable.oneshot(dispatch(
            &bot,
            echo_trigger(Trigger::private("alice", ".echo hi")),
        )));
        assert_eq!(denied, Ok(None));
    }

    #[test]
    fn test_url_handler_receives_match() {
        async fn ticket(bot: BotHandle, url: UrlMatch) {
            bot.say(&format!("ticket {}", url.group(1).unwrap_or("?")));
        }

        let bot = Arc::new(TestBot::default());
        let callable = Callable::new(ticket)
            .url([r"https://bugs\.test/(\d+)"])
            .unwrap();
        let url_match = callable.meta().url_regex[0]
            .captures("see https://bugs.test/7")
            .unwrap();
        let d = dispatch(&bot, Trigger::channel("#c", "alice", "see https://bugs.test/7").build())
            .with_url_match(url_match);
        block_on(callable.invoke(d));
        assert_eq!(bot.texts(), vec!["ticket 7"]);
    }
}
