//! Error type shared by the codecs, the turn state machine and the players

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JassError {
    /// A packed word is outside its legal range or breaks a positional invariant
    #[error("invalid {what} encoding: {value:#x}")]
    Encoding { what: &'static str, value: u64 },

    #[error("bit range start={start} size={size} does not fit a {word}-bit word")]
    BitRange { start: u32, size: u32, word: u32 },

    #[error("value {value:#x} does not fit in {size} bits")]
    PackOverflow { value: u64, size: u32 },

    #[error("illegal transition: {0}")]
    IllegalTransition(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// The other end of a queued seat went away
    #[error("player channel closed")]
    Disconnected,
}

impl JassError {
    pub(crate) fn encoding(what: &'static str, value: impl Into<u64>) -> Self {
        JassError::Encoding {
            what,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JassError>;
