//! Documented example invocations.
//!
//! An [`Example`] does two jobs. Its [`ExampleRecord`] is kept on the
//! callable for help output. When plugins are registered in test mode, an
//! example with expected results is also compiled into an [`ExampleCase`]
//! that the runtime's example runner executes.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExampleError, PatternError};
use crate::meta::{HandlerMeta, RateLimit};
use crate::pattern::compile;

/// An example invocation of a callable.
///
/// ```
/// use hookline_framework::Example;
///
/// let ex = Example::new(".echo hi")
///     .result("hi")
///     .ignore("^DEBUG:")
///     .user_help();
/// assert_eq!(ex.record().example, ".echo hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    msg: String,
    results: Vec<String>,
    privmsg: bool,
    admin: bool,
    owner: bool,
    repeat: usize,
    regex: bool,
    ignore: Vec<String>,
    user_help: bool,
    online: bool,
}

impl Example {
    /// An example sending `msg`, with no expected output.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            results: Vec::new(),
            privmsg: false,
            admin: false,
            owner: false,
            repeat: 1,
            regex: false,
            ignore: Vec::new(),
            user_help: false,
            online: false,
        }
    }

    /// Adds one expected output line.
    pub fn result(mut self, line: impl Into<String>) -> Self {
        self.results.push(line.into());
        self
    }

    /// Adds several expected output lines.
    pub fn results<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.results.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Sends the example as a private message.
    pub fn privmsg(mut self) -> Self {
        self.privmsg = true;
        self
    }

    /// Sends the example as a bot admin.
    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Sends the example as the bot owner.
    pub fn owner(mut self) -> Self {
        self.owner = true;
        self
    }

    /// Runs the example `times` times.
    pub fn repeat(mut self, times: usize) -> Self {
        self.repeat = times;
        self
    }

    /// Treats expected lines as regular expressions.
    pub fn regex(mut self) -> Self {
        self.regex = true;
        self
    }

    /// Drops output lines matching `pattern` at their start before comparison.
    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    /// Shows this example in help output.
    pub fn user_help(mut self) -> Self {
        self.user_help = true;
        self
    }

    /// Marks the example as needing network access.
    pub fn online(mut self) -> Self {
        self.online = true;
        self
    }

    /// The example text.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Returns `true` if the example declares expected output.
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// The record kept for help output.
    pub fn record(&self) -> ExampleRecord {
        ExampleRecord {
            example: self.msg.clone(),
            result: self.has_results().then(|| self.results.clone()),
            privmsg: self.privmsg,
            admin: self.admin,
            owner: self.owner,
            help: self.user_help,
        }
    }
}

/// The help-facing part of an example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    /// The example text.
    pub example: String,
    /// Expected output lines, if any were declared.
    pub result: Option<Vec<String>>,
    /// Sent as a private message.
    pub privmsg: bool,
    /// Sent by a bot admin.
    pub admin: bool,
    /// Sent by the bot owner.
    pub owner: bool,
    /// Shown in help output.
    pub help: bool,
}

// ============================================================================
// Compiled cases
// ============================================================================

/// One expected output line.
#[derive(Debug, Clone)]
pub enum Expected {
    /// Must equal the line exactly.
    Literal(String),
    /// Must match at the start of the line.
    Pattern(Regex),
}

impl Expected {
    /// Checks one output line.
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Literal(text) => text == line,
            Self::Pattern(re) => re.is_match(line),
        }
    }

    /// The expectation as written.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            // Strip the `^(?:` ... `)` anchoring added at compile time.
            Self::Pattern(re) => {
                let src = re.as_str();
                src.get(4..src.len().saturating_sub(1)).unwrap_or(src)
            }
        }
    }
}

/// A runnable test synthesized from an example.
#[derive(Debug, Clone)]
pub struct ExampleCase {
    /// Case name, `test_example_<callable>_<n>`.
    pub name: String,
    /// Name of the owning plugin.
    pub plugin: String,
    /// Name of the callable under test.
    pub callable: String,
    /// The example text.
    pub input: String,
    /// Expected lines for a single run.
    pub expected: Vec<Expected>,
    /// Lines matching any of these at their start are dropped.
    pub ignore: Vec<Regex>,
    /// Sent as a private message.
    pub privmsg: bool,
    /// Sent by a bot admin.
    pub admin: bool,
    /// Sent by the bot owner.
    pub owner: bool,
    /// Number of runs.
    pub repeat: usize,
    /// Needs network access.
    pub online: bool,
}

impl ExampleCase {
    /// Compiles `example` into the `index`-th case of `callable`.
    ///
    /// Returns `Ok(None)` for examples without expected output.
    pub fn compile(
        plugin: &str,
        callable: &str,
        meta: &HandlerMeta,
        index: usize,
        example: &Example,
    ) -> Result<Option<Self>, ExampleError> {
        if !example.has_results() {
            return Ok(None);
        }
        if !meta.has_commands() {
            return Err(ExampleError::NotACommand {
                callable: callable.to_string(),
            });
        }
        if example.repeat == 0 {
            return Err(ExampleError::ZeroRepeat {
                callable: callable.to_string(),
                example: example.msg.clone(),
            });
        }

        let wrap = |source: PatternError| ExampleError::Pattern {
            callable: callable.to_string(),
            example: example.msg.clone(),
            source,
        };

        let expected = example
            .results
            .iter()
            .map(|line| {
                if example.regex {
                    compile(&format!("^(?:{line})"))
                        .map(Expected::Pattern)
                        .map_err(|e| PatternError::new(line.as_str(), e.source))
                } else {
                    Ok(Expected::Literal(line.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;

        let ignore = example
            .ignore
            .iter()
            .map(|pattern| {
                compile(&format!("^(?:{pattern})"))
                    .map_err(|e| PatternError::new(pattern.as_str(), e.source))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;

        Ok(Some(Self {
            name: format!("test_example_{callable}_{index}"),
            plugin: plugin.to_string(),
            callable: callable.to_string(),
            input: example.msg.clone(),
            expected,
            ignore,
            privmsg: example.privmsg,
            admin: example.admin,
            owner: example.owner,
            repeat: example.repeat,
            online: example.online,
        }))
    }

    /// Name of the fixture that runs around this case.
    pub fn fixture_name(&self) -> String {
        ExampleFixture::name_for(&self.callable)
    }

    /// Returns `true` if `line` should be dropped before comparison.
    pub fn is_ignored(&self, line: &str) -> bool {
        self.ignore.iter().any(|re| re.is_match(line))
    }

    /// Total number of lines the case expects across all runs.
    pub fn expected_len(&self) -> usize {
        self.expected.len() * self.repeat
    }
}

/// Set-up applied to a callable while its example cases run.
///
/// Rate limits would make repeated runs fail, so the fixture hands out a
/// copy of the metadata with every limit removed. The callable itself is
/// never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFixture {
    /// Fixture name, `disable_setup_<callable>`.
    pub name: String,
}

impl ExampleFixture {
    /// The fixture for `callable`.
    pub fn for_callable(callable: &str) -> Self {
        Self {
            name: Self::name_for(callable),
        }
    }

    fn name_for(callable: &str) -> String {
        format!("disable_setup_{callable}")
    }

    /// Returns `meta` with rate limits disabled.
    pub fn apply(&self, meta: &HandlerMeta) -> HandlerMeta {
        HandlerMeta {
            rate: RateLimit::NONE,
            ..meta.clone()
        }
    }
}
