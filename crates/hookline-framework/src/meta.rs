//! The metadata bag a dispatcher reads to decide whether and how to invoke a
//! callable.
//!
//! Every field is a declaration. Nothing here changes how the handler runs;
//! the [`Callable`](crate::Callable) builder methods forward to the setters
//! below.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::example::ExampleRecord;
use crate::pattern::{UrlPattern, extend_unique};

/// Dispatch ordering hint among callables matching the same line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Runs before medium and low.
    High,
    /// The default.
    #[default]
    Medium,
    /// Runs last.
    Low,
}

impl Priority {
    /// Returns the priority name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown priority name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority `{0}`, expected one of: high, medium, low")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Minimum time between triggers, per scope. Zero means unlimited.
///
/// Only thresholds live here. Window tracking and admin exemptions belong to
/// the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Per triggering user.
    #[serde(rename = "rate", with = "secs")]
    pub user: Duration,
    /// Per channel.
    #[serde(rename = "channel_rate", with = "secs")]
    pub channel: Duration,
    /// Across the whole server.
    #[serde(rename = "global_rate", with = "secs")]
    pub server: Duration,
}

impl RateLimit {
    /// No limits in any scope.
    pub const NONE: Self = Self {
        user: Duration::ZERO,
        channel: Duration::ZERO,
        server: Duration::ZERO,
    };

    /// Builds a limit from whole seconds per scope.
    pub const fn from_secs(user: u64, channel: u64, server: u64) -> Self {
        Self {
            user: Duration::from_secs(user),
            channel: Duration::from_secs(channel),
            server: Duration::from_secs(server),
        }
    }

    /// A per-user limit only.
    pub const fn per_user(secs: u64) -> Self {
        Self::from_secs(secs, 0, 0)
    }

    /// Returns `true` if no scope is limited.
    pub fn is_unlimited(&self) -> bool {
        *self == Self::NONE
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// All declarations attached to one callable.
///
/// List fields are ordered sets: values keep the order they were first
/// declared in and repeats are ignored. An empty list means "not declared".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HandlerMeta {
    /// Raw rule patterns.
    pub rule: Vec<String>,
    /// Prefixed command names.
    pub commands: Vec<String>,
    /// Commands addressed to the bot by nick.
    pub nickname_commands: Vec<String>,
    /// Commands sent as CTCP ACTION.
    pub action_commands: Vec<String>,
    /// Protocol events the callable listens to.
    pub event: Vec<String>,
    /// Message intents the callable listens to.
    pub intents: Vec<String>,
    /// Dispatch ordering hint.
    pub priority: Priority,
    /// Periodic invocation intervals, in seconds.
    pub interval: Vec<u64>,
    /// Rate-limit thresholds.
    #[serde(flatten)]
    pub rate: RateLimit,
    /// Whether to run off the main dispatch sequence. `None` leaves it to
    /// the dispatcher's default and is left out of the serialized form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<bool>,
    /// Whether the callable also sees the bot's own messages.
    pub echo: bool,
    /// Whether blocked nicks and hosts can still trigger it.
    pub unblockable: bool,
    /// Prefix applied to text the handler says or notices.
    pub output_prefix: Option<String>,
    /// Compiled URL patterns.
    pub url_regex: Vec<UrlPattern>,
    /// Example records, in declaration order.
    pub example: Vec<ExampleRecord>,
}

impl HandlerMeta {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_rules<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.rule, patterns.into_iter().map(Into::into));
    }

    pub(crate) fn add_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.commands, commands.into_iter().map(Into::into));
    }

    pub(crate) fn add_nickname_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(
            &mut self.nickname_commands,
            commands.into_iter().map(Into::into),
        );
    }

    /// Action commands are CTCP ACTION lines by definition, so the intent
    /// list is reset to exactly `ACTION`.
    pub(crate) fn add_action_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intents = vec!["ACTION".to_string()];
        extend_unique(
            &mut self.action_commands,
            commands.into_iter().map(Into::into),
        );
    }

    pub(crate) fn add_events<I, S>(&mut self, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.event, events.into_iter().map(Into::into));
    }

    pub(crate) fn add_intents<I, S>(&mut self, intents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.intents, intents.into_iter().map(Into::into));
    }

    pub(crate) fn add_intervals<I>(&mut self, intervals: I)
    where
        I: IntoIterator<Item = u64>,
    {
        extend_unique(&mut self.interval, intervals);
    }

    pub(crate) fn add_url_patterns<I>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = UrlPattern>,
    {
        extend_unique(&mut self.url_regex, patterns);
    }

    /// Returns `true` if any command family is declared.
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
            || !self.nickname_commands.is_empty()
            || !self.action_commands.is_empty()
    }

    /// Returns `true` if the callable is triggered by URLs.
    pub fn is_url_callable(&self) -> bool {
        !self.url_regex.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_deduplicated() {
        let mut meta = HandlerMeta::new();
        meta.add_commands(["a", "a"]);
        assert_eq!(meta.commands, vec!["a"]);
    }

    #[test]
    fn test_declarations_keep_call_order() {
        let mut meta = HandlerMeta::new();
        meta.add_rules(["first", "second"]);
        meta.add_rules(["third", "first"]);
        meta.add_events(["JOIN"]);
        meta.add_events(["PART", "JOIN"]);
        assert_eq!(meta.rule, vec!["first", "second", "third"]);
        assert_eq!(meta.event, vec!["JOIN", "PART"]);
    }

    #[test]
    fn test_action_commands_force_intent() {
        let mut meta = HandlerMeta::new();
        meta.add_intents(["VERSION", "TIME"]);
        meta.add_action_commands(["waves"]);
        assert_eq!(meta.intents, vec!["ACTION"]);
        assert_eq!(meta.action_commands, vec!["waves"]);

        // Intent declarations after the fact still accumulate.
        meta.add_intents(["ACTION", "PING"]);
        assert_eq!(meta.intents, vec!["ACTION", "PING"]);
    }

    #[test]
    fn test_url_patterns_are_deduplicated() {
        let mut meta = HandlerMeta::new();
        let pattern = r"https://example\.com/(\d+)";
        meta.add_url_patterns([UrlPattern::new(pattern).unwrap()]);
        meta.add_url_patterns([UrlPattern::new(pattern).unwrap()]);
        assert_eq!(meta.url_regex.len(), 1);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_rate_limit() {
        assert!(RateLimit::NONE.is_unlimited());
        let limit = RateLimit::from_secs(20, 0, 5);
        assert!(!limit.is_unlimited());
        assert_eq!(limit.user, Duration::from_secs(20));
        assert_eq!(RateLimit::per_user(3).server, Duration::ZERO);
    }

    #[test]
    fn test_serializes_plugin_abi_names() {
        let mut meta = HandlerMeta::new();
        meta.add_commands(["echo"]);
        meta.rate = RateLimit::from_secs(1, 2, 3);
        meta.add_url_patterns([UrlPattern::new(r"https://x\.y/").unwrap()]);

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["commands"][0], "echo");
        assert_eq!(value["rate"], 1);
        assert_eq!(value["channel_rate"], 2);
        assert_eq!(value["global_rate"], 3);
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["url_regex"][0], r"https://x\.y/");
    }

    #[test]
    fn test_thread_is_omitted_until_declared() {
        let mut meta = HandlerMeta::new();
        let value = serde_json::to_value(&meta).unwrap();
        assert!(value.get("thread").is_none());

        meta.thread = Some(false);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["thread"], false);
    }
}
