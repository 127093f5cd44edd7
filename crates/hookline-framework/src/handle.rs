//! A bot bound to the trigger it is answering.

use std::fmt;
use std::sync::Arc;

use hookline_core::{BoxedBot, Trigger};

/// The bot as a handler sees it.
///
/// Binding the trigger gives `say`, `reply` and `notice` a default
/// destination (the trigger's sender) and applies the callable's output
/// prefix to `say` and `notice` text. Cloning is cheap.
#[derive(Clone)]
pub struct BotHandle {
    bot: BoxedBot,
    trigger: Arc<Trigger>,
    output_prefix: Option<Arc<str>>,
}

impl BotHandle {
    /// Binds `bot` to `trigger`.
    pub fn new(bot: BoxedBot, trigger: Arc<Trigger>) -> Self {
        Self {
            bot,
            trigger,
            output_prefix: None,
        }
    }

    /// Prepends `prefix` to everything sent with `say` and `notice`.
    pub fn with_output_prefix(mut self, prefix: Option<&str>) -> Self {
        self.output_prefix = prefix.map(Arc::from);
        self
    }

    /// The bot's nick.
    pub fn nick(&self) -> &str {
        self.bot.nick()
    }

    /// The trigger this handle answers.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// A shared reference to the trigger.
    pub fn shared_trigger(&self) -> Arc<Trigger> {
        Arc::clone(&self.trigger)
    }

    /// The unbound bot.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    fn prefixed(&self, message: &str) -> String {
        match &self.output_prefix {
            Some(prefix) => format!("{prefix}{message}"),
            None => message.to_string(),
        }
    }

    /// Says `message` where the trigger came from.
    pub fn say(&self, message: &str) {
        self.say_to(message, self.trigger.sender().as_str());
    }

    /// Says `message` to an explicit destination.
    pub fn say_to(&self, message: &str, destination: &str) {
        self.bot.say(&self.prefixed(message), destination);
    }

    /// Replies to the triggering nick where the trigger came from.
    pub fn reply(&self, message: &str) {
        self.bot.reply(
            message,
            self.trigger.sender().as_str(),
            self.trigger.nick().as_str(),
        );
    }

    /// Sends a notice where the trigger came from.
    pub fn notice(&self, message: &str) {
        self.notice_to(message, self.trigger.sender().as_str());
    }

    /// Sends a notice to an explicit destination.
    pub fn notice_to(&self, message: &str, destination: &str) {
        self.bot.notice(&self.prefixed(message), destination);
    }

    /// Rank of `nick` in `channel`, treating unknown entries as rank 0.
    pub fn rank(&self, channel: &str, nick: &str) -> u8 {
        self.bot.privilege(channel, nick).unwrap_or(0)
    }
}

impl fmt::Debug for BotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotHandle")
            .field("nick", &self.bot.nick())
            .field("trigger", &self.trigger)
            .field("output_prefix", &self.output_prefix)
            .finish()
    }
}
