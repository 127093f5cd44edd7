//! The event context handed to handlers and guards.

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// A single triggering event, as seen by a handler.
///
/// A `Trigger` is produced by the external dispatcher from a parsed protocol
/// line (or synthesised by the example harness). It is immutable once built.
///
/// # Example
///
/// ```rust
/// use hookline_core::Trigger;
///
/// let trigger = Trigger::channel("#rust", "alice", ".echo hi")
///     .account("alice")
///     .groups([Some("echo"), Some("hi")])
///     .build();
///
/// assert!(!trigger.is_privmsg());
/// assert_eq!(trigger.group(2), Some("hi"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    nick: Identifier,
    sender: Identifier,
    text: String,
    event: String,
    intent: Option<String>,
    account: Option<String>,
    is_privmsg: bool,
    admin: bool,
    owner: bool,
    groups: Vec<Option<String>>,
}

impl Trigger {
    /// Starts a trigger for a message sent to `channel` by `nick`.
    pub fn channel(
        channel: impl Into<Identifier>,
        nick: impl Into<Identifier>,
        text: impl Into<String>,
    ) -> TriggerBuilder {
        TriggerBuilder::new(channel.into(), nick.into(), text.into(), false)
    }

    /// Starts a trigger for a private message from `nick`.
    ///
    /// The sender of a private message is the nick itself, so replies go
    /// back to the user.
    pub fn private(nick: impl Into<Identifier>, text: impl Into<String>) -> TriggerBuilder {
        let nick = nick.into();
        TriggerBuilder::new(nick.clone(), nick, text.into(), true)
    }

    /// The nick that caused this event.
    pub fn nick(&self) -> &Identifier {
        &self.nick
    }

    /// The channel the event happened in, or the nick for private messages.
    pub fn sender(&self) -> &Identifier {
        &self.sender
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The protocol event name (`PRIVMSG`, `JOIN`, a numeric, ...).
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The message intent, such as `ACTION`.
    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    /// The services account the nick is authenticated as.
    ///
    /// Empty account names are normalised to `None` at build time.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Whether the event arrived as a private message.
    pub fn is_privmsg(&self) -> bool {
        self.is_privmsg
    }

    /// Whether the nick is a bot admin.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Whether the nick is the bot owner.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Returns match group `index`; group 0 is the whole text.
    pub fn group(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.text);
        }
        self.groups.get(index - 1).and_then(|g| g.as_deref())
    }

    /// All match groups after group 0.
    pub fn groups(&self) -> &[Option<String>] {
        &self.groups
    }
}

/// Builder for [`Trigger`].
#[derive(Debug, Clone)]
pub struct TriggerBuilder {
    trigger: Trigger,
}

impl TriggerBuilder {
    fn new(sender: Identifier, nick: Identifier, text: String, is_privmsg: bool) -> Self {
        Self {
            trigger: Trigger {
                nick,
                sender,
                text,
                event: "PRIVMSG".to_string(),
                intent: None,
                account: None,
                is_privmsg,
                admin: false,
                owner: false,
                groups: Vec::new(),
            },
        }
    }

    /// Sets the protocol event name.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.trigger.event = event.into();
        self
    }

    /// Sets the message intent.
    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.trigger.intent = Some(intent.into());
        self
    }

    /// Sets the authenticated account.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        let account = account.into();
        self.trigger.account = (!account.is_empty()).then_some(account);
        self
    }

    /// Marks the nick as a bot admin.
    pub fn admin(mut self, admin: bool) -> Self {
        self.trigger.admin = admin;
        self
    }

    /// Marks the nick as the bot owner.
    pub fn owner(mut self, owner: bool) -> Self {
        self.trigger.owner = owner;
        self
    }

    /// Sets the match groups (group 1 onward).
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.trigger.groups = groups.into_iter().map(|g| g.map(Into::into)).collect();
        self
    }

    /// Finishes the trigger.
    pub fn build(self) -> Trigger {
        self.trigger
    }
}
