//! Handler argument extraction.

use std::sync::Arc;

use hookline_core::{BoxedBot, Trigger};

use crate::error::{ExtractError, ExtractResult};
use crate::handle::BotHandle;
use crate::pattern::UrlMatch;

/// Everything one handler call can draw its arguments from.
#[derive(Debug, Clone)]
pub struct Invocation {
    bot: BotHandle,
    url_match: Option<UrlMatch>,
}

impl Invocation {
    /// Creates an invocation for an already-bound bot handle.
    pub fn new(bot: BotHandle, url_match: Option<UrlMatch>) -> Self {
        Self { bot, url_match }
    }

    /// The bound bot.
    pub fn bot(&self) -> &BotHandle {
        &self.bot
    }

    /// The triggering event.
    pub fn trigger(&self) -> &Trigger {
        self.bot.trigger()
    }

    /// The URL match, for URL-triggered calls.
    pub fn url_match(&self) -> Option<&UrlMatch> {
        self.url_match.as_ref()
    }
}

/// A type that can be produced from an [`Invocation`].
///
/// Types implementing this trait can be used directly as handler
/// parameters. If extraction fails the handler is skipped and the failure
/// is logged.
pub trait FromInvocation: Sized {
    /// Attempts to extract this type.
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self>;
}

impl FromInvocation for BotHandle {
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self> {
        Ok(inv.bot.clone())
    }
}

impl FromInvocation for Arc<Trigger> {
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self> {
        Ok(inv.bot.shared_trigger())
    }
}

/// The unbound bot, for handlers that manage destinations themselves.
impl FromInvocation for BoxedBot {
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self> {
        Ok(inv.bot.bot().clone())
    }
}

impl FromInvocation for UrlMatch {
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self> {
        inv.url_match.clone().ok_or(ExtractError::MissingUrlMatch)
    }
}

/// Optional parameters never fail to extract.
impl<T: FromInvocation> FromInvocation for Option<T> {
    fn from_invocation(inv: &Invocation) -> ExtractResult<Self> {
        Ok(T::from_invocation(inv).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::tests::TestBot;
    use crate::pattern::UrlPattern;

    fn invocation(url_match: Option<UrlMatch>) -> Invocation {
        let bot = Arc::new(TestBot::default());
        let trigger = Arc::new(Trigger::channel("#c", "alice", "hi").build());
        Invocation::new(BotHandle::new(bot, trigger), url_match)
    }

    #[test]
    fn test_extract_trigger_and_bot() {
        let inv = invocation(None);
        let trigger = Arc::<Trigger>::from_invocation(&inv).unwrap();
        assert_eq!(trigger.text(), "hi");
        let bot = BotHandle::from_invocation(&inv).unwrap();
        assert_eq!(bot.nick(), "TestBot");
    }

    #[test]
    fn test_url_match_required() {
        let inv = invocation(None);
        assert!(matches!(
            UrlMatch::from_invocation(&inv),
            Err(ExtractError::MissingUrlMatch)
        ));
        assert_eq!(Option::<UrlMatch>::from_invocation(&inv).unwrap(), None);
    }

    #[test]
    fn test_url_match_present() {
        let pattern = UrlPattern::new(r"https://x\.test/(\d+)").unwrap();
        let inv = invocation(pattern.captures("https://x.test/42"));
        let m = UrlMatch::from_invocation(&inv).unwrap();
        assert_eq!(m.group(1), Some("42"));
    }
}
