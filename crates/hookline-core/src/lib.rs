//! # Hookline Core
//!
//! The protocol-independent model that every Hookline layer shares:
//!
//! - [`Privilege`] – ordered channel privilege ranks
//! - [`Identifier`] – case-insensitive IRC nick/channel names
//! - [`ChannelPrivileges`] – the channel → nick → rank store read by guards
//! - [`Trigger`] – the event context a handler is invoked with
//! - [`Bot`] – the bot context used to send text back to the network
//!
//! Nothing in this crate performs I/O. The transport, protocol parser and
//! dispatcher live outside Hookline and talk to it through these types.

pub mod bot;
pub mod identifier;
pub mod privilege;
pub mod trigger;

pub use bot::{Bot, BoxedBot, ChannelPrivileges};
pub use identifier::Identifier;
pub use privilege::{ADMIN, HALFOP, OP, OWNER, Privilege, VOICE};
pub use trigger::{Trigger, TriggerBuilder};
