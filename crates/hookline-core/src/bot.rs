//! The bot context: how handlers and guards talk back to the network.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::identifier::fold;
use crate::privilege::Privilege;

/// The outgoing side of a connected bot.
///
/// Implementations queue text for the transport; none of these methods may
/// block on the network. Destinations are explicit here; the context-bound
/// forms (`say` to the trigger's sender, ...) live on the framework's
/// `BotHandle`.
pub trait Bot: Send + Sync {
    /// The bot's current nick.
    fn nick(&self) -> &str;

    /// Sends `message` to `destination` as a `PRIVMSG`.
    fn say(&self, message: &str, destination: &str);

    /// Sends `message` to `destination` as a `NOTICE`.
    fn notice(&self, message: &str, destination: &str);

    /// Sends `message` to `destination`, addressed to `reply_to`.
    fn reply(&self, message: &str, destination: &str, reply_to: &str) {
        self.say(&format!("{reply_to}: {message}"), destination);
    }

    /// Returns the rank `nick` holds in `channel`, if the bot knows of one.
    fn privilege(&self, channel: &str, nick: &str) -> Option<u8>;
}

/// A shared, type-erased bot.
pub type BoxedBot = Arc<dyn Bot>;

/// Channel → nick → rank store.
///
/// Written by whatever tracks `MODE`/`NAMES` replies, read by privilege
/// guards. Names are case-folded on the way in and out.
#[derive(Debug, Default)]
pub struct ChannelPrivileges {
    channels: RwLock<HashMap<String, HashMap<String, u8>>>,
}

impl ChannelPrivileges {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rank of `nick` in `channel`, replacing any previous rank.
    pub fn set(&self, channel: &str, nick: &str, rank: u8) {
        trace!(channel, nick, rank, "Setting channel privilege");
        self.channels
            .write()
            .entry(fold(channel))
            .or_default()
            .insert(fold(nick), rank);
    }

    /// Grants `privilege` to `nick` in `channel`.
    pub fn grant(&self, channel: &str, nick: &str, privilege: Privilege) {
        self.set(channel, nick, privilege.rank());
    }

    /// Returns the rank of `nick` in `channel`.
    pub fn get(&self, channel: &str, nick: &str) -> Option<u8> {
        self.channels
            .read()
            .get(&fold(channel))
            .and_then(|nicks| nicks.get(&fold(nick)))
            .copied()
    }

    /// Forgets `nick` in `channel`.
    pub fn remove(&self, channel: &str, nick: &str) {
        if let Some(nicks) = self.channels.write().get_mut(&fold(channel)) {
            nicks.remove(&fold(nick));
        }
    }

    /// Forgets a whole channel.
    pub fn remove_channel(&self, channel: &str) {
        self.channels.write().remove(&fold(channel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::{HALFOP, OP};

    #[test]
    fn test_lookup_is_case_insensitive() {
        let privileges = ChannelPrivileges::new();
        privileges.grant("#Rust", "Alice", OP);
        assert_eq!(privileges.get("#rust", "alice"), Some(4));
        assert_eq!(privileges.get("#rust", "bob"), None);
        assert_eq!(privileges.get("#other", "alice"), None);
    }

    #[test]
    fn test_set_replaces() {
        let privileges = ChannelPrivileges::new();
        privileges.grant("#c", "alice", OP);
        privileges.grant("#c", "alice", HALFOP);
        assert_eq!(privileges.get("#c", "alice"), Some(2));
    }

    #[test]
    fn test_remove() {
        let privileges = ChannelPrivileges::new();
        privileges.grant("#c", "alice", OP);
        privileges.grant("#c", "bob", OP);
        privileges.remove("#c", "alice");
        assert_eq!(privileges.get("#c", "alice"), None);
        privileges.remove_channel("#C");
        assert_eq!(privileges.get("#c", "bob"), None);
    }
}
