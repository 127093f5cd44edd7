//! A bot that records what it sends instead of sending it.

use std::fmt;

use hookline_core::{Bot, ChannelPrivileges};
use parking_lot::Mutex;
use tracing::trace;

/// How a recorded line was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A `PRIVMSG`.
    Say,
    /// A `NOTICE`.
    Notice,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Say => f.write_str("PRIVMSG"),
            Self::Notice => f.write_str("NOTICE"),
        }
    }
}

/// One line the bot would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentLine {
    /// Message type.
    pub kind: LineKind,
    /// Target channel or nick.
    pub destination: String,
    /// Message text.
    pub text: String,
}

/// An in-memory [`Bot`] for example cases and plugin tests.
///
/// Replies go through the default [`Bot::reply`], so they are recorded as
/// `<nick>: <text>` lines.
#[derive(Debug)]
pub struct RecordingBot {
    nick: String,
    lines: Mutex<Vec<SentLine>>,
    privileges: ChannelPrivileges,
}

impl RecordingBot {
    /// Creates a bot called `nick` that has sent nothing.
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            lines: Mutex::new(Vec::new()),
            privileges: ChannelPrivileges::new(),
        }
    }

    /// The privilege store consulted by privilege guards.
    pub fn privileges(&self) -> &ChannelPrivileges {
        &self.privileges
    }

    /// Everything sent so far.
    pub fn lines(&self) -> Vec<SentLine> {
        self.lines.lock().clone()
    }

    /// The text of everything sent so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.lines.lock().iter().map(|l| l.text.clone()).collect()
    }

    /// Drains the recorded text.
    pub fn take_texts(&self) -> Vec<String> {
        self.lines.lock().drain(..).map(|l| l.text).collect()
    }

    /// Forgets everything sent so far.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn record(&self, kind: LineKind, destination: &str, text: &str) {
        trace!(%kind, destination, text, "Recording line");
        self.lines.lock().push(SentLine {
            kind,
            destination: destination.to_string(),
            text: text.to_string(),
        });
    }
}

impl Bot for RecordingBot {
    fn nick(&self) -> &str {
        &self.nick
    }

    fn say(&self, message: &str, destination: &str) {
        self.record(LineKind::Say, destination, message);
    }

    fn notice(&self, message: &str, destination: &str) {
        self.record(LineKind::Notice, destination, message);
    }

    fn privilege(&self, channel: &str, nick: &str) -> Option<u8> {
        self.privileges.get(channel, nick)
    }
}
