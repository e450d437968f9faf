//! Card and card set bitboard representation
//!
//! A card packs into 6 bits as `rank | color << 4`; 0b111111 is the
//! "no card" sentinel used in empty trick slots.
//!
//! A card set is a 64-bit word with bit `packed(card)` set for every member.
//! Each color owns a 16-bit slice of which only the 9 low bits are used:
//! bit 0 = Spade 6, bit 8 = Spade Ace, bit 16 = Heart 6, etc.

use std::fmt;
use std::str::FromStr;

use super::bits::field32;
use super::error::{JassError, Result};
use super::types::*;

/// Packed value of the "no card" sentinel
pub const PACKED_INVALID: u32 = 0b11_1111;

const RANK_BITS: u32 = 4;
const COLOR_BITS: u32 = 2;
const COLOR_STRIDE: usize = 16;

/// Check that a 6-bit word is a real card
#[inline]
pub fn is_valid_packed(packed: u32) -> bool {
    packed < PACKED_INVALID && (field32(packed, 0, RANK_BITS) as usize) < NUM_RANKS
}

/// A single card, immutable
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    packed: u8,
}

impl Card {
    #[inline]
    pub const fn new(color: Color, rank: Rank) -> Self {
        Card {
            packed: (rank as u8) | ((color as u8) << RANK_BITS),
        }
    }

    /// Decode a packed card, rejecting the sentinel and ranks >= 9
    #[inline]
    pub fn from_packed(packed: u32) -> Result<Self> {
        if is_valid_packed(packed) {
            Ok(Card {
                packed: packed as u8,
            })
        } else {
            Err(JassError::encoding("card", packed))
        }
    }

    /// Build from an index already known to be a valid card
    #[inline]
    pub(crate) const fn from_packed_unchecked(packed: u32) -> Self {
        Card {
            packed: packed as u8,
        }
    }

    #[inline]
    pub const fn packed(self) -> u32 {
        self.packed as u32
    }

    #[inline]
    pub const fn color(self) -> Color {
        Color::from_bits(field32(self.packed as u32, RANK_BITS, COLOR_BITS))
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[field32(self.packed as u32, 0, RANK_BITS) as usize]
    }

    /// True if this card beats `that`, given the trump color.
    ///
    /// Cards of different non-trump colors never beat each other.
    #[inline]
    pub fn is_better(self, trump: Color, that: Card) -> bool {
        let (color, other) = (self.color(), that.color());
        if color == other {
            if color == trump {
                self.rank().trump_ordinal() > that.rank().trump_ordinal()
            } else {
                self.rank().plain_ordinal() > that.rank().plain_ordinal()
            }
        } else {
            color == trump
        }
    }

    #[inline]
    pub fn points(self, trump: Color) -> u32 {
        if self.color() == trump {
            TRUMP_POINTS[self.rank().index()]
        } else {
            PLAIN_POINTS[self.rank().index()]
        }
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({}{})", self.color(), self.rank())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color(), self.rank())
    }
}

/// Parse "S6", "hj", "DT", "C10" or "♠A"
impl FromStr for Card {
    type Err = JassError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        let color = chars
            .next()
            .and_then(char_to_color)
            .ok_or_else(|| JassError::Parse(format!("bad card color in {s:?}")))?;
        let rest: String = chars.collect();
        let rank = match rest.as_str() {
            "10" => Some(Rank::Ten),
            r if r.chars().count() == 1 => r.chars().next().and_then(char_to_rank),
            _ => None,
        }
        .ok_or_else(|| JassError::Parse(format!("bad card rank in {s:?}")))?;
        Ok(Card::new(color, rank))
    }
}

/// Mask of one color's 9 cards
#[inline]
pub const fn mask_of(color: Color) -> u64 {
    0x1FF << (color as usize * COLOR_STRIDE)
}

/// Set of cards as a 36-bit-populated bitboard
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardSet {
    bits: u64,
}

impl CardSet {
    pub const EMPTY: CardSet = CardSet { bits: 0 };
    pub const ALL_CARDS: CardSet = CardSet {
        bits: 0x01FF_01FF_01FF_01FF,
    };

    /// Create empty card set
    #[inline]
    pub const fn new() -> Self {
        CardSet::EMPTY
    }

    /// Decode a packed set, rejecting bits outside the 36-card universe
    #[inline]
    pub fn from_packed(bits: u64) -> Result<Self> {
        if bits & !CardSet::ALL_CARDS.bits == 0 {
            Ok(CardSet { bits })
        } else {
            Err(JassError::encoding("card set", bits))
        }
    }

    #[inline]
    pub const fn singleton(card: Card) -> Self {
        CardSet {
            bits: 1u64 << card.packed,
        }
    }

    pub fn from_cards<I: IntoIterator<Item = Card>>(cards: I) -> Self {
        cards
            .into_iter()
            .fold(CardSet::EMPTY, |set, card| set.add(card))
    }

    /// Get raw bits value
    #[inline]
    pub const fn packed(self) -> u64 {
        self.bits
    }

    /// Count number of cards
    #[inline]
    pub const fn size(self) -> usize {
        self.bits.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub const fn contains(self, card: Card) -> bool {
        self.bits & (1u64 << card.packed) != 0
    }

    /// The `index`-th card in ascending bit order, if any
    #[inline]
    pub fn get(self, index: usize) -> Option<Card> {
        self.iter().nth(index)
    }

    #[inline]
    pub const fn add(self, card: Card) -> CardSet {
        CardSet {
            bits: self.bits | (1u64 << card.packed),
        }
    }

    #[inline]
    pub const fn remove(self, card: Card) -> CardSet {
        CardSet {
            bits: self.bits & !(1u64 << card.packed),
        }
    }

    #[inline]
    pub const fn union(self, other: CardSet) -> CardSet {
        CardSet {
            bits: self.bits | other.bits,
        }
    }

    #[inline]
    pub const fn intersection(self, other: CardSet) -> CardSet {
        CardSet {
            bits: self.bits & other.bits,
        }
    }

    /// Cards in self but not in other
    #[inline]
    pub const fn difference(self, other: CardSet) -> CardSet {
        CardSet {
            bits: self.bits & !other.bits,
        }
    }

    /// All cards of the universe not in self
    #[inline]
    pub const fn complement(self) -> CardSet {
        CardSet {
            bits: CardSet::ALL_CARDS.bits & !self.bits,
        }
    }

    /// Check if self includes all cards in other
    #[inline]
    pub const fn includes(self, other: CardSet) -> bool {
        self.bits & other.bits == other.bits
    }

    #[inline]
    pub const fn subset_of_color(self, color: Color) -> CardSet {
        CardSet {
            bits: self.bits & mask_of(color),
        }
    }

    /// Cards of the same color that beat `card` when its color is trump
    pub fn trump_above(card: Card) -> CardSet {
        let strength = card.rank().trump_ordinal();
        Rank::ALL
            .iter()
            .filter(|rank| rank.trump_ordinal() > strength)
            .fold(CardSet::EMPTY, |set, &rank| {
                set.add(Card::new(card.color(), rank))
            })
    }

    /// Iterate over cards in ascending bit order
    #[inline]
    pub fn iter(self) -> CardSetIterator {
        CardSetIterator { bits: self.bits }
    }
}

impl fmt::Debug for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardSet(")?;
        for color in Color::ALL {
            let cards = self.subset_of_color(color);
            if !cards.is_empty() {
                write!(f, "{}: ", color.letter())?;
                for card in cards {
                    write!(f, "{}", card.rank())?;
                }
                write!(f, " ")?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, card) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{card}")?;
        }
        write!(f, "}}")
    }
}

/// Iterator over cards in a CardSet
pub struct CardSetIterator {
    bits: u64,
}

impl Iterator for CardSetIterator {
    type Item = Card;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let packed = self.bits.trailing_zeros();
            self.bits &= self.bits - 1; // Clear lowest set bit
            Some(Card::from_packed_unchecked(packed))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CardSetIterator {}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        CardSet::from_cards(iter)
    }
}
