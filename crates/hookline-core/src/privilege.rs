//! Channel privilege ranks.
//!
//! Ranks keep their historical power-of-two values so they line up with the
//! numbers a dispatcher's permission store already holds, but they are only
//! ever compared with `>=`. A rank is a threshold, not a permission mask.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A channel privilege level, ordered from lowest to highest.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    /// `+v`
    Voice = 1,
    /// `+h`
    HalfOp = 2,
    /// `+o`
    Op = 4,
    /// `+a`
    Admin = 8,
    /// `+q`
    Owner = 16,
}

/// Privilege level for the `+v` channel mode.
pub const VOICE: Privilege = Privilege::Voice;
/// Privilege level for the `+h` channel mode.
pub const HALFOP: Privilege = Privilege::HalfOp;
/// Privilege level for the `+o` channel mode.
pub const OP: Privilege = Privilege::Op;
/// Privilege level for the `+a` channel mode.
pub const ADMIN: Privilege = Privilege::Admin;
/// Privilege level for the `+q` channel mode.
pub const OWNER: Privilege = Privilege::Owner;

impl Privilege {
    /// All levels, lowest first.
    pub const ALL: [Privilege; 5] = [VOICE, HALFOP, OP, ADMIN, OWNER];

    /// Returns the numeric rank of this level.
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Returns the level with exactly this rank, if any.
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.rank() == rank)
    }

    /// Returns the level granted by a channel mode character (`v`, `h`, `o`, `a`, `q`).
    pub fn from_mode(mode: char) -> Option<Self> {
        match mode {
            'v' => Some(VOICE),
            'h' => Some(HALFOP),
            'o' => Some(OP),
            'a' => Some(ADMIN),
            'q' => Some(OWNER),
            _ => None,
        }
    }

    /// Returns `true` if a user holding `rank` meets this level.
    pub const fn is_met_by(self, rank: u8) -> bool {
        rank >= self.rank()
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Voice => "voice",
            Self::HalfOp => "halfop",
            Self::Op => "op",
            Self::Admin => "admin",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}
