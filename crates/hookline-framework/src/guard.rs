//! Authorization guards.
//!
//! A [`Guard`] pairs one [`Requirement`] with an optional [`Notice`] sent when
//! the requirement fails. A callable keeps its guards in a [`GuardChain`]:
//! each guard added wraps everything added before it, so the chain runs from
//! the most recently added guard inward and stops at the first failure.
//!
//! ```text
//! .require_chanmsg()          ← added first, innermost
//! .require_privilege(OP)      ← added last, checked first
//! ```
//!
//! Guards hold no state between calls. A denial is not an error: the handler
//! simply does not run and the dispatcher gets no outcome back.

use std::fmt;
use std::sync::Arc;

use hookline_core::{Privilege, Trigger};
use tracing::{debug, trace};

use crate::handle::BotHandle;

/// A precondition on the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The event must be a private message.
    PrivateMessage,
    /// The event must come from a channel.
    ChannelMessage,
    /// The nick must be logged in to a services account.
    Account,
    /// The nick must hold at least this rank in the channel. Private
    /// messages always pass.
    Privilege(Privilege),
    /// The nick must be a bot admin.
    Admin,
    /// The nick must be the bot owner.
    Owner,
}

impl Requirement {
    /// Evaluates the requirement against the bound trigger.
    pub fn is_met(&self, bot: &BotHandle) -> bool {
        let trigger = bot.trigger();
        match self {
            Self::PrivateMessage => trigger.is_privmsg(),
            Self::ChannelMessage => !trigger.is_privmsg(),
            Self::Account => trigger.account().is_some_and(|a| !a.is_empty()),
            Self::Privilege(level) => {
                trigger.is_privmsg()
                    || level.is_met_by(bot.rank(trigger.sender().as_str(), trigger.nick().as_str()))
            }
            Self::Admin => trigger.is_admin(),
            Self::Owner => trigger.is_owner(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateMessage => f.write_str("private message"),
            Self::ChannelMessage => f.write_str("channel message"),
            Self::Account => f.write_str("services account"),
            Self::Privilege(level) => write!(f, "channel privilege {level} or higher"),
            Self::Admin => f.write_str("bot admin"),
            Self::Owner => f.write_str("bot owner"),
        }
    }
}

/// Which bound send method delivers a notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifyMethod {
    /// `BotHandle::say`
    #[default]
    Say,
    /// `BotHandle::reply`
    Reply,
}

/// The text of a [`Notice`].
#[derive(Clone)]
pub enum NoticeText {
    /// Fixed text.
    Static(String),
    /// Text computed from the trigger. Not sent at the moment; see
    /// [`Notice::send`].
    Computed(Arc<dyn Fn(&Trigger) -> String + Send + Sync>),
}

impl fmt::Debug for NoticeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// What to tell the user when a guard denies them.
#[derive(Debug, Clone)]
pub struct Notice {
    text: NoticeText,
    method: NotifyMethod,
}

impl Notice {
    /// Says `text` to the trigger's sender.
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            text: NoticeText::Static(text.into()),
            method: NotifyMethod::Say,
        }
    }

    /// Replies `text` to the triggering nick.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: NoticeText::Static(text.into()),
            method: NotifyMethod::Reply,
        }
    }

    /// A notice whose text depends on the trigger.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Trigger) -> String + Send + Sync + 'static,
    {
        Self {
            text: NoticeText::Computed(Arc::new(f)),
            method: NotifyMethod::Say,
        }
    }

    /// Switches delivery to `method`.
    pub fn via(mut self, method: NotifyMethod) -> Self {
        self.method = method;
        self
    }

    /// The notice text.
    pub fn text(&self) -> &NoticeText {
        &self.text
    }

    /// The delivery method.
    pub fn method(&self) -> NotifyMethod {
        self.method
    }

    /// Sends the notice through `bot`.
    ///
    /// Static text is said or replied. Computed text is not sent; the denial
    /// is only logged.
    pub fn send(&self, bot: &BotHandle) {
        let text = match &self.text {
            NoticeText::Static(text) if !text.is_empty() => text,
            NoticeText::Static(_) => return,
            NoticeText::Computed(_) => {
                debug!("Computed guard notice is not sent");
                return;
            }
        };
        match self.method {
            NotifyMethod::Say => bot.say(text),
            NotifyMethod::Reply => bot.reply(text),
        }
    }
}

/// Result of evaluating a single guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The requirement holds; evaluation continues inward.
    Allowed,
    /// The requirement failed; the chain stops here.
    Denied,
}

/// One link of a guard chain.
#[derive(Debug, Clone)]
pub struct Guard {
    requirement: Requirement,
    notice: Option<Notice>,
}

impl Guard {
    /// A guard that denies silently.
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            notice: None,
        }
    }

    /// A guard that sends `notice` when it denies.
    pub fn with_notice(requirement: Requirement, notice: Notice) -> Self {
        Self {
            requirement,
            notice: Some(notice),
        }
    }

    /// The guarded requirement.
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    /// The configured notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Evaluates the requirement without sending anything.
    pub fn verdict(&self, bot: &BotHandle) -> Verdict {
        if self.requirement.is_met(bot) {
            Verdict::Allowed
        } else {
            Verdict::Denied
        }
    }
}

/// Why a call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    /// Position of the failing guard in evaluation order (0 is outermost).
    pub position: usize,
    /// The requirement that failed.
    pub requirement: Requirement,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guard {} requires {}",
            self.position, self.requirement
        )
    }
}

/// The guards of one callable.
#[derive(Debug, Clone, Default)]
pub struct GuardChain {
    // Stored in the order they were added; evaluated in reverse.
    guards: Vec<Guard>,
}

impl GuardChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the chain in `guard`, making it the outermost link.
    pub fn wrap(&mut self, guard: Guard) {
        self.guards.push(guard);
    }

    /// Number of guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns `true` if there are no guards.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Guards in evaluation order, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Guard> {
        self.guards.iter().rev()
    }

    /// Finds the first guard that would deny, without sending notices.
    pub fn check(&self, bot: &BotHandle) -> Result<(), (Denial, &Guard)> {
        for (position, guard) in self.iter().enumerate() {
            trace!(position, requirement = %guard.requirement, "Evaluating guard");
            if guard.verdict(bot) == Verdict::Denied {
                let denial = Denial {
                    position,
                    requirement: guard.requirement,
                };
                return Err((denial, guard));
            }
        }
        Ok(())
    }

    /// Evaluates the chain, sending the failing guard's notice on denial.
    pub fn evaluate(&self, bot: &BotHandle) -> Result<(), Denial> {
        self.check(bot).map_err(|(denial, guard)| {
            debug!(
                nick = %bot.trigger().nick(),
                sender = %bot.trigger().sender(),
                %denial,
                "Call denied"
            );
            if let Some(notice) = &guard.notice {
                notice.send(bot);
            }
            denial
        })
    }
}
