//! Lossless text form of the packed words
//!
//! Words are written as unsigned lowercase hexadecimal without prefix. A turn
//! state is its score, unplayed cards and trick words joined by commas.

use super::error::{JassError, Result};
use super::turn::TurnState;

const SEPARATOR: char = ',';

pub fn serialize_u32(value: u32) -> String {
    format!("{value:x}")
}

pub fn serialize_u64(value: u64) -> String {
    format!("{value:x}")
}

pub fn deserialize_u32(s: &str) -> Result<u32> {
    u32::from_str_radix(s, 16).map_err(|e| JassError::Parse(format!("bad 32-bit word {s:?}: {e}")))
}

pub fn deserialize_u64(s: &str) -> Result<u64> {
    u64::from_str_radix(s, 16).map_err(|e| JassError::Parse(format!("bad 64-bit word {s:?}: {e}")))
}

pub fn serialize_turn_state(state: &TurnState) -> String {
    format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}",
        serialize_u64(state.packed_score()),
        serialize_u64(state.packed_unplayed_cards()),
        serialize_u32(state.packed_trick())
    )
}

/// Parse and validate the form written by [`serialize_turn_state`]
pub fn deserialize_turn_state(s: &str) -> Result<TurnState> {
    let parts: Vec<&str> = s.split(SEPARATOR).collect();
    let [score, unplayed, trick] = parts.as_slice() else {
        return Err(JassError::Parse(format!(
            "expected score{SEPARATOR}unplayed{SEPARATOR}trick, got {s:?}"
        )));
    };
    TurnState::from_packed_components(
        deserialize_u64(score)?,
        deserialize_u64(unplayed)?,
        deserialize_u32(trick)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Score;
    use crate::types::*;

    #[test]
    fn test_words() {
        assert_eq!(serialize_u32(0), "0");
        assert_eq!(serialize_u32(u32::MAX), "ffffffff");
        assert_eq!(serialize_u64(0x01FF_01FF_01FF_01FF), "1ff01ff01ff01ff");
        assert_eq!(deserialize_u32("ffffffff").unwrap(), u32::MAX);
        assert_eq!(deserialize_u64("1FF").unwrap(), 0x1ff);
        assert!(deserialize_u32("100000000").is_err());
        assert!(deserialize_u64("").is_err());
        assert!(deserialize_u64("-1").is_err());
        assert!(deserialize_u32("xyz").is_err());
    }

    #[test]
    fn test_turn_state() {
        let state = TurnState::initial(Color::Diamond, Score::INITIAL, PlayerId::Player4)
            .with_new_card_played("D7".parse().unwrap())
            .unwrap();
        let text = serialize_turn_state(&state);
        assert_eq!(text.split(',').count(), 3);
        assert_eq!(deserialize_turn_state(&text).unwrap(), state);
    }

    #[test]
    fn test_turn_state_rejected() {
        assert!(deserialize_turn_state("0,0").is_err());
        assert!(deserialize_turn_state("0,0,0,0").is_err());
        // Unplayed word outside the card universe
        assert!(deserialize_turn_state("0,ffffffffffffffff,ffffffff").is_err());
        let terminal = deserialize_turn_state("0,0,ffffffff").unwrap();
        assert!(terminal.is_terminal());
    }
}
