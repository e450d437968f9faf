//! Turn state: score, unplayed cards and current trick
//!
//! Every transition returns a new value; the state is `Copy`, so search code
//! can snapshot it freely.

use std::fmt;

use super::cards::*;
use super::error::{JassError, Result};
use super::meld::MeldSet;
use super::score::Score;
use super::trick::Trick;
use super::types::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnState {
    score: Score,
    unplayed: CardSet,
    trick: Trick,
}

impl TurnState {
    /// State at the start of a turn: all 36 cards unplayed, empty first trick
    pub fn initial(trump: Color, score: Score, first_player: PlayerId) -> Self {
        TurnState {
            score,
            unplayed: CardSet::ALL_CARDS,
            trick: Trick::first_empty(trump, first_player),
        }
    }

    /// Rebuild a state from its three packed words.
    ///
    /// The trick word may be the terminal sentinel. Cards lying in the trick
    /// must not also be listed as unplayed.
    pub fn from_packed_components(score: u64, unplayed: u64, trick: u32) -> Result<Self> {
        let score = Score::from_packed(score)?;
        let unplayed = CardSet::from_packed(unplayed)?;
        let trick = if trick == Trick::INVALID.packed() {
            Trick::INVALID
        } else {
            Trick::from_packed(trick)?
        };
        if !trick.is_invalid() && trick.cards().any(|card| unplayed.contains(card)) {
            return Err(JassError::encoding("turn state", trick.packed()));
        }
        Ok(TurnState {
            score,
            unplayed,
            trick,
        })
    }

    #[inline]
    pub fn packed_score(&self) -> u64 {
        self.score.packed()
    }

    #[inline]
    pub fn packed_unplayed_cards(&self) -> u64 {
        self.unplayed.packed()
    }

    #[inline]
    pub fn packed_trick(&self) -> u32 {
        self.trick.packed()
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn unplayed_cards(&self) -> CardSet {
        self.unplayed
    }

    #[inline]
    pub fn trick(&self) -> Trick {
        self.trick
    }

    /// True once the last trick is full or has been collected
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.trick.is_invalid() || (self.trick.is_full() && self.trick.is_last())
    }

    /// Seat expected to play the next card
    pub fn next_player(&self) -> Result<PlayerId> {
        if self.trick.is_invalid() || self.trick.is_full() {
            return Err(JassError::IllegalTransition("no card can be played on a full trick"));
        }
        Ok(self.trick.player(self.trick.size()))
    }

    pub fn with_new_card_played(&self, card: Card) -> Result<TurnState> {
        if self.trick.is_invalid() {
            return Err(JassError::IllegalTransition("turn is over"));
        }
        if !self.unplayed.contains(card) {
            return Err(JassError::IllegalTransition("card has already been played"));
        }
        Ok(TurnState {
            score: self.score,
            unplayed: self.unplayed.remove(card),
            trick: self.trick.with_added_card(card)?,
        })
    }

    /// Score the full trick for its winner and move on to the next one
    pub fn with_trick_collected(&self) -> Result<TurnState> {
        if self.trick.is_invalid() || !self.trick.is_full() {
            return Err(JassError::IllegalTransition("trick is not full"));
        }
        let winner = self.trick.winning_player()?;
        Ok(TurnState {
            score: self
                .score
                .with_additional_trick(winner.team(), self.trick.points())?,
            unplayed: self.unplayed,
            trick: self.trick.next_empty()?,
        })
    }

    /// Play a card, collecting the trick if it became full
    pub fn with_new_card_played_and_trick_collected(&self, card: Card) -> Result<TurnState> {
        let played = self.with_new_card_played(card)?;
        if played.trick.is_full() {
            played.with_trick_collected()
        } else {
            Ok(played)
        }
    }

    /// Credit a team's announced melds
    pub fn with_melds(&self, team: TeamId, melds: &MeldSet) -> Result<TurnState> {
        Ok(TurnState {
            score: self.score.with_meld_points(team, melds.points())?,
            ..*self
        })
    }
}

impl fmt::Debug for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnState")
            .field("score", &self.score)
            .field("unplayed", &self.unplayed)
            .field("trick", &self.trick)
            .finish()
    }
}
