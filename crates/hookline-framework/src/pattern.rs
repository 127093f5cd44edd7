//! Pattern compilation.
//!
//! Rule and command patterns are kept as raw strings; the dispatcher expands
//! them once it knows the bot's nick and command prefix. URL patterns are the
//! exception and are compiled as soon as they are declared.
//!
//! The command expansion helpers at the bottom mirror what a dispatcher does
//! and are used by the example harness to build synthetic triggers.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use crate::error::PatternError;

/// Appends each value not already in `list`, keeping first-insertion order.
pub(crate) fn extend_unique<T, I>(list: &mut Vec<T>, values: I)
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    for value in values {
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

/// Compiles `pattern`, keeping the source text in the error.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|e| PatternError::new(pattern, e))
}

// ============================================================================
// URL patterns
// ============================================================================

/// A compiled URL pattern.
///
/// Two patterns are equal when their sources are identical, which is what
/// lets the same URL rule be declared twice without registering it twice.
#[derive(Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    /// Compiles a URL pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        compile(pattern).map(|regex| Self { regex })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// The compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Matches `url` and captures its groups.
    pub fn captures(&self, url: &str) -> Option<UrlMatch> {
        self.regex.captures(url).map(|caps| UrlMatch {
            groups: caps
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        })
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for UrlPattern {}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlPattern").field(&self.as_str()).finish()
    }
}

impl Serialize for UrlPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The groups captured when a URL pattern matched.
///
/// Owned so it can travel with a dispatch; group 0 is the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    groups: Vec<Option<String>>,
}

impl UrlMatch {
    /// Returns group `index`.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// The full matched text.
    pub fn as_str(&self) -> &str {
        self.group(0).unwrap_or_default()
    }
}

// ============================================================================
// Command expansion
// ============================================================================

/// How a command name is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStyle {
    /// `<prefix><command> args`
    Prefixed,
    /// `<nick>: <command> args`
    Nickname,
    /// `/me <command> args`
    Action,
}

/// A command name expanded into an anchored, case-insensitive matcher.
///
/// Group 1 is the command, group 2 the rest of the line without leading
/// whitespace.
#[derive(Debug, Clone)]
pub struct CommandPattern {
    style: CommandStyle,
    regex: Regex,
}

impl CommandPattern {
    /// Expands `command` for the given style.
    ///
    /// `prefix` is used by [`CommandStyle::Prefixed`] and `nick` by
    /// [`CommandStyle::Nickname`]; both are matched literally. The command
    /// itself may be a regular expression.
    pub fn expand(
        style: CommandStyle,
        command: &str,
        prefix: &str,
        nick: &str,
    ) -> Result<Self, PatternError> {
        let head = match style {
            CommandStyle::Prefixed => regex::escape(prefix),
            CommandStyle::Nickname => format!(r"{}[:,]?\s+", regex::escape(nick)),
            CommandStyle::Action => String::new(),
        };
        let source = format!(r"^{head}({command})(?:\s+(.*))?$");
        RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map(|regex| Self { style, regex })
            .map_err(|e| PatternError::new(command, e))
    }

    /// The style this pattern was expanded for.
    pub fn style(&self) -> CommandStyle {
        self.style
    }

    /// Matches a full line, returning groups 1 and onward.
    pub fn parse(&self, line: &str) -> Option<Vec<Option<String>>> {
        self.regex.captures(line).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_unique_keeps_order() {
        let mut list = vec!["b".to_string()];
        extend_unique(&mut list, ["a", "b", "c", "a"].map(String::from));
        assert_eq!(list, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_url_pattern_equality() {
        let a = UrlPattern::new(r"https://example\.com/(\w+)").unwrap();
        let b = UrlPattern::new(r"https://example\.com/(\w+)").unwrap();
        let c = UrlPattern::new(r"https://example\.org/(\w+)").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_url_pattern_rejects_malformed() {
        let err = UrlPattern::new(r"https://(unclosed").unwrap_err();
        assert_eq!(err.pattern, "https://(unclosed");
    }

    #[test]
    fn test_url_captures() {
        let pattern = UrlPattern::new(r"https://bugs\.example\.com/([a-z0-9]+)").unwrap();
        let m = pattern.captures("see https://bugs.example.com/ab12 now").unwrap();
        assert_eq!(m.as_str(), "https://bugs.example.com/ab12");
        assert_eq!(m.group(1), Some("ab12"));
        assert!(pattern.captures("https://example.com").is_none());
    }

    #[test]
    fn test_prefixed_command() {
        let cmd = CommandPattern::expand(CommandStyle::Prefixed, "echo", ".", "Bot").unwrap();
        let groups = cmd.parse(".echo  hello world").unwrap();
        assert_eq!(groups[0].as_deref(), Some("echo"));
        assert_eq!(groups[1].as_deref(), Some("hello world"));

        let groups = cmd.parse(".ECHO").unwrap();
        assert_eq!(groups[1], None);

        assert!(cmd.parse(".echoes").is_none());
        assert!(cmd.parse("echo hi").is_none());
    }

    #[test]
    fn test_prefix_is_literal() {
        let cmd = CommandPattern::expand(CommandStyle::Prefixed, "help", "?", "Bot").unwrap();
        assert!(cmd.parse("?help").is_some());
        assert!(cmd.parse("help").is_none());
    }

    #[test]
    fn test_nickname_command() {
        let cmd = CommandPattern::expand(CommandStyle::Nickname, "hello!", ".", "Bot").unwrap();
        assert!(cmd.parse("Bot: hello!").is_some());
        assert!(cmd.parse("bot,   hello! p1 p2").is_some());
        assert!(cmd.parse("Bot hello!").is_some());
        assert!(cmd.parse("Other: hello!").is_none());
    }

    #[test]
    fn test_action_command() {
        let cmd = CommandPattern::expand(CommandStyle::Action, "waves", ".", "Bot").unwrap();
        let groups = cmd.parse("waves at everyone").unwrap();
        assert_eq!(groups[1].as_deref(), Some("at everyone"));
    }
}
