//! Four hands, one per seat
//!
//! Text notation for one hand lists ranks per color, colors separated by
//! dots in spade.heart.diamond.club order: "6789.TJ.QK.A". A deal lists the
//! four hands separated by whitespace, Player1 first.

use rand::seq::SliceRandom;
use rand::Rng;

use super::cards::*;
use super::error::{JassError, Result};
use super::types::*;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Hands {
    hands: [CardSet; NUM_PLAYERS],
}

impl Hands {
    /// Create empty hands
    #[inline]
    pub const fn new() -> Self {
        Hands {
            hands: [CardSet::EMPTY; NUM_PLAYERS],
        }
    }

    /// Shuffle the 36 cards and deal nine to each seat
    pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck: Vec<Card> = CardSet::ALL_CARDS.iter().collect();
        deck.shuffle(rng);
        let mut hands = Hands::new();
        for (player, cards) in PlayerId::ALL.iter().zip(deck.chunks(HAND_SIZE)) {
            hands[*player] = CardSet::from_cards(cards.iter().copied());
        }
        hands
    }

    #[inline]
    pub fn hand(&self, player: PlayerId) -> CardSet {
        self.hands[player.index()]
    }

    /// Get all cards across all hands
    #[inline]
    pub fn all_cards(&self) -> CardSet {
        self.hands
            .iter()
            .fold(CardSet::EMPTY, |all, hand| all.union(*hand))
    }

    /// Cards held by a team (seat and partner)
    #[inline]
    pub fn team_cards(&self, team: TeamId) -> CardSet {
        PlayerId::ALL
            .iter()
            .filter(|p| p.team() == team)
            .fold(CardSet::EMPTY, |all, &p| all.union(self.hand(p)))
    }

    /// Seat holding a given card
    pub fn holder(&self, card: Card) -> Option<PlayerId> {
        PlayerId::ALL
            .iter()
            .copied()
            .find(|&p| self.hand(p).contains(card))
    }

    /// The holder of the seven of diamonds leads the first turn of a game
    pub fn first_player(&self) -> PlayerId {
        self.holder(Card::new(Color::Diamond, Rank::Seven))
            .unwrap_or(PlayerId::Player1)
    }

    /// Remove a played card from its seat
    pub fn with_card_played(mut self, player: PlayerId, card: Card) -> Result<Self> {
        if !self.hand(player).contains(card) {
            return Err(JassError::IllegalTransition("card is not in the player's hand"));
        }
        self.hands[player.index()] = self.hand(player).remove(card);
        Ok(self)
    }

    /// Parse four whitespace-separated hands, Player1 first
    pub fn from_notation(s: &str) -> Result<Self> {
        let hand_strs: Vec<&str> = s.split_whitespace().collect();
        if hand_strs.len() != NUM_PLAYERS {
            return Err(JassError::Parse(format!(
                "expected {NUM_PLAYERS} hands, found {}",
                hand_strs.len()
            )));
        }

        let mut hands = Hands::new();
        for (player, hand_str) in PlayerId::ALL.iter().zip(hand_strs) {
            let hand = parse_hand(hand_str)?;
            if !hands.all_cards().intersection(hand).is_empty() {
                return Err(JassError::Parse(format!("card dealt twice in {hand_str:?}")));
            }
            hands[*player] = hand;
        }
        Ok(hands)
    }
}

impl std::ops::Index<PlayerId> for Hands {
    type Output = CardSet;

    #[inline]
    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.hands[player.index()]
    }
}

impl std::ops::IndexMut<PlayerId> for Hands {
    #[inline]
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.hands[player.index()]
    }
}

impl std::fmt::Debug for Hands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for player in PlayerId::ALL {
            write!(f, "{}: {} ", player, format_hand(self.hand(player)))?;
        }
        Ok(())
    }
}

/// Format one hand in dotted notation
pub fn format_hand(hand: CardSet) -> String {
    let suits: Vec<String> = Color::ALL
        .iter()
        .map(|&color| {
            hand.subset_of_color(color)
                .iter()
                .map(|card| match card.rank() {
                    Rank::Ten => 'T',
                    rank => rank.name().chars().next().unwrap_or('?'),
                })
                .collect()
        })
        .collect();
    suits.join(".")
}

/// Parse a single hand from dotted notation (SHDC separated by dots)
pub fn parse_hand(s: &str) -> Result<CardSet> {
    let suits: Vec<&str> = s.split('.').collect();
    if suits.len() != NUM_COLORS {
        return Err(JassError::Parse(format!(
            "expected {NUM_COLORS} colors in {s:?}"
        )));
    }

    let mut cards = CardSet::EMPTY;
    for (color, suit_str) in Color::ALL.iter().zip(suits) {
        for c in suit_str.chars() {
            if c == '-' {
                continue; // Void marker
            }
            let rank = char_to_rank(c)
                .ok_or_else(|| JassError::Parse(format!("bad rank {c:?} in {s:?}")))?;
            cards = cards.add(Card::new(*color, rank));
        }
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DEAL: &str = "6789.TJ.QK.A TJQKA.6.6.67 -.789QKA.789. ..TJA.89TJQK";

    #[test]
    fn test_parse_hand() {
        let hand = parse_hand("6789.TJ.QK.A").unwrap();
        assert_eq!(hand.size(), 9);
        assert!(hand.contains(Card::new(Color::Spade, Rank::Six)));
        assert!(hand.contains(Card::new(Color::Heart, Rank::Ten)));
        assert!(hand.contains(Card::new(Color::Club, Rank::Ace)));
        assert_eq!(format_hand(hand), "6789.TJ.QK.A");
        assert!(parse_hand("6789.TJ.QK").is_err());
        assert!(parse_hand("6789.TJ.QK.X").is_err());
    }

    #[test]
    fn test_notation_rejects_duplicates() {
        assert!(Hands::from_notation("6... 6... 7... 8...").is_err());
        assert!(Hands::from_notation("6... 7...").is_err());
    }

    #[test]
    fn test_deal_is_a_partition() {
        let mut rng = StdRng::seed_from_u64(7);
        let hands = Hands::deal(&mut rng);
        assert_eq!(hands.all_cards(), CardSet::ALL_CARDS);
        for player in PlayerId::ALL {
            assert_eq!(hands[player].size(), HAND_SIZE);
        }
        // Same seed, same deal
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Hands::deal(&mut rng), hands);
    }

    #[test]
    fn test_first_player() {
        let mut hands = Hands::new();
        hands[PlayerId::Player3] = parse_hand(".A.7.").unwrap();
        assert_eq!(hands.first_player(), PlayerId::Player3);
        assert_eq!(Hands::new().first_player(), PlayerId::Player1);
    }

    #[test]
    fn test_team_cards_and_play() {
        let hands = Hands::from_notation(DEAL).unwrap();
        assert_eq!(hands.all_cards(), CardSet::ALL_CARDS);
        assert_eq!(hands.team_cards(TeamId::Team1).size(), 18);
        let card = Card::new(Color::Club, Rank::Ace);
        assert_eq!(hands.holder(card), Some(PlayerId::Player1));
        let after = hands.with_card_played(PlayerId::Player1, card).unwrap();
        assert_eq!(after[PlayerId::Player1].size(), 8);
        assert!(after.with_card_played(PlayerId::Player1, card).is_err());
    }
}
