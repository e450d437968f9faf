//! Trick representation packed into one 32-bit word
//!
//! Layout (low to high):
//! - bits 0..24: four 6-bit card slots, in play order (empty slot = sentinel)
//! - bits 24..28: trick index within the turn (0..8)
//! - bits 28..30: seat of the player who leads
//! - bits 30..32: trump color

use std::fmt;

use super::bits::{field32, raw_mask32};
use super::cards::*;
use super::error::{JassError, Result};
use super::types::*;

const CARD_BITS: u32 = 6;
const INDEX_START: u32 = 24;
const INDEX_BITS: u32 = 4;
const PLAYER_START: u32 = 28;
const PLAYER_BITS: u32 = 2;
const TRUMP_START: u32 = 30;
const TRUMP_BITS: u32 = 2;
const SLOTS: usize = NUM_PLAYERS;

/// All four slots empty
const EMPTY_SLOTS: u32 = raw_mask32(0, CARD_BITS * SLOTS as u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trick {
    packed: u32,
}

impl Trick {
    /// Sentinel following the last trick of a turn
    pub const INVALID: Trick = Trick { packed: u32::MAX };

    /// Empty first trick of a turn
    #[inline]
    pub const fn first_empty(trump: Color, first_player: PlayerId) -> Self {
        Trick::empty(0, first_player, trump)
    }

    #[inline]
    const fn empty(index: u32, first_player: PlayerId, trump: Color) -> Self {
        Trick {
            packed: EMPTY_SLOTS
                | (index << INDEX_START)
                | ((first_player as u32) << PLAYER_START)
                | ((trump as u32) << TRUMP_START),
        }
    }

    /// Check a packed trick: index below 9, no card after an empty slot and
    /// no card twice
    pub fn is_valid(packed: u32) -> bool {
        if packed == Trick::INVALID.packed {
            return false;
        }
        if field32(packed, INDEX_START, INDEX_BITS) as usize >= TRICKS_PER_TURN {
            return false;
        }
        let mut seen_empty = false;
        let mut seen = CardSet::EMPTY;
        for slot in 0..SLOTS {
            let card = field32(packed, slot as u32 * CARD_BITS, CARD_BITS);
            if card == PACKED_INVALID {
                seen_empty = true;
                continue;
            }
            if seen_empty || !is_valid_packed(card) {
                return false;
            }
            let card = Card::from_packed_unchecked(card);
            if seen.contains(card) {
                return false;
            }
            seen = seen.add(card);
        }
        true
    }

    pub fn from_packed(packed: u32) -> Result<Self> {
        if Trick::is_valid(packed) {
            Ok(Trick { packed })
        } else {
            Err(JassError::encoding("trick", packed))
        }
    }

    #[inline]
    pub const fn packed(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Trick::INVALID
    }

    #[inline]
    fn slot(self, slot: usize) -> u32 {
        field32(self.packed, slot as u32 * CARD_BITS, CARD_BITS)
    }

    /// Number of cards played so far
    #[inline]
    pub fn size(self) -> usize {
        (0..SLOTS)
            .take_while(|&slot| self.slot(slot) != PACKED_INVALID)
            .count()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.slot(0) == PACKED_INVALID
    }

    #[inline]
    pub fn is_full(self) -> bool {
        self.slot(SLOTS - 1) != PACKED_INVALID
    }

    #[inline]
    pub fn is_last(self) -> bool {
        self.index() == TRICKS_PER_TURN - 1
    }

    #[inline]
    pub fn index(self) -> usize {
        field32(self.packed, INDEX_START, INDEX_BITS) as usize
    }

    #[inline]
    pub fn trump(self) -> Color {
        Color::from_bits(field32(self.packed, TRUMP_START, TRUMP_BITS))
    }

    /// Seat playing the `index`-th card of this trick (0 = leader)
    #[inline]
    pub fn player(self, index: usize) -> PlayerId {
        PlayerId::from_bits(field32(self.packed, PLAYER_START, PLAYER_BITS)).offset(index)
    }

    /// Card in play position `index`, if it has been played
    #[inline]
    pub fn card(self, index: usize) -> Option<Card> {
        if index >= SLOTS {
            return None;
        }
        let packed = self.slot(index);
        if packed == PACKED_INVALID {
            None
        } else {
            Some(Card::from_packed_unchecked(packed))
        }
    }

    /// Cards played so far, in play order
    pub fn cards(self) -> impl Iterator<Item = Card> {
        (0..SLOTS).map_while(move |i| self.card(i))
    }

    /// Color of the first card, once one has been played
    #[inline]
    pub fn base_color(self) -> Option<Color> {
        self.card(0).map(Card::color)
    }

    pub fn with_added_card(self, card: Card) -> Result<Trick> {
        if self.is_invalid() {
            return Err(JassError::IllegalTransition("turn is over"));
        }
        if self.is_full() {
            return Err(JassError::IllegalTransition("trick is already full"));
        }
        let start = self.size() as u32 * CARD_BITS;
        let cleared = self.packed & !raw_mask32(start, CARD_BITS);
        Ok(Trick {
            packed: cleared | (card.packed() << start),
        })
    }

    /// Next empty trick, led by this trick's winner.
    ///
    /// After the last trick of the turn this is [`Trick::INVALID`].
    pub fn next_empty(self) -> Result<Trick> {
        if !self.is_full() {
            return Err(JassError::IllegalTransition("trick is not full"));
        }
        if self.is_last() {
            return Ok(Trick::INVALID);
        }
        let winner = self.winning_player()?;
        Ok(Trick::empty(self.index() as u32 + 1, winner, self.trump()))
    }

    /// Position (0..4) of the strongest card played so far
    fn winning_position(self) -> Option<usize> {
        let trump = self.trump();
        let mut cards = self.cards().enumerate();
        let (mut best, mut best_card) = cards.next()?;
        for (i, card) in cards {
            if card.is_better(trump, best_card) {
                best = i;
                best_card = card;
            }
        }
        Some(best)
    }

    pub fn winning_card(self) -> Option<Card> {
        self.winning_position().and_then(|i| self.card(i))
    }

    pub fn winning_player(self) -> Result<PlayerId> {
        self.winning_position()
            .map(|i| self.player(i))
            .ok_or(JassError::IllegalTransition("trick is empty"))
    }

    /// Trick points with the trump scale, plus the last trick bonus
    pub fn points(self) -> u32 {
        let trump = self.trump();
        let cards: u32 = self.cards().map(|c| c.points(trump)).sum();
        if self.is_last() {
            cards + LAST_TRICK_ADDITIONAL_POINTS
        } else {
            cards
        }
    }

    /// Subset of `hand` that may legally be played next.
    ///
    /// Empty if the trick is already full; otherwise non-empty whenever the
    /// hand is.
    pub fn playable_cards(self, hand: CardSet) -> CardSet {
        if self.is_full() {
            return CardSet::EMPTY;
        }
        let Some(first) = self.card(0) else {
            return hand;
        };
        let trump = self.trump();
        let led = first.color();
        let trump_hand = hand.subset_of_color(trump);
        let trump_jack = CardSet::singleton(Card::new(trump, Rank::Jack));
        // Holding no trump, or only the trump jack, never forces a trump
        let free_of_trump = trump_hand.is_empty() || trump_hand == trump_jack;

        let mut trump_to_play = if free_of_trump {
            trump_hand
        } else {
            match self.winning_card() {
                Some(winning) if winning.color() == trump => {
                    trump_hand.intersection(CardSet::trump_above(winning))
                }
                _ => trump_hand,
            }
        };

        let color_to_play = if led == trump {
            if free_of_trump {
                hand.difference(trump_hand)
            } else {
                trump_to_play = trump_hand;
                CardSet::EMPTY
            }
        } else {
            let color_hand = hand.subset_of_color(led);
            if color_hand.is_empty() {
                hand.difference(trump_hand)
            } else {
                color_hand
            }
        };

        if trump_to_play.is_empty() && color_to_play.is_empty() {
            // Only trumps too weak to overtake are left
            trump_to_play = trump_hand;
        }
        trump_to_play.union(color_to_play)
    }
}

impl fmt::Debug for Trick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trick({self})")
    }
}

impl fmt::Display for Trick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return write!(f, "invalid");
        }
        write!(f, "#{} {} led by {}:", self.index() + 1, self.trump(), self.player(0))?;
        for i in 0..SLOTS {
            match self.card(i) {
                Some(card) => write!(f, " {card}")?,
                None => write!(f, " -")?,
            }
        }
        Ok(())
    }
}
