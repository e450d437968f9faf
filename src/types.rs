//! Core type definitions: colors, ranks, seats, teams and rule constants

use std::fmt;

/// Cards dealt to each player at the start of a turn
pub const HAND_SIZE: usize = 9;
/// Tricks in one turn
pub const TRICKS_PER_TURN: usize = 9;
/// Points a team needs to win the game
pub const WINNING_POINTS: u32 = 1000;
/// Bonus for a team taking every trick of a turn
pub const MATCH_ADDITIONAL_POINTS: u32 = 100;
/// Bonus for taking the last trick of a turn ("cinq de der")
pub const LAST_TRICK_ADDITIONAL_POINTS: u32 = 5;
/// Card points of a turn, last trick bonus included
pub const POINTS_PER_TURN: u32 = 157;
/// Smallest iteration budget accepted by the search player
pub const MINIMUM_ITERATIONS: usize = 9;

pub const NUM_COLORS: usize = 4;
pub const NUM_RANKS: usize = 9;
pub const NUM_PLAYERS: usize = 4;
pub const NUM_TEAMS: usize = 2;
pub const TOTAL_CARDS: usize = NUM_COLORS * NUM_RANKS;

/// Card colors, in packed order SPADE=0 .. CLUB=3
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Spade = 0,
    Heart = 1,
    Diamond = 2,
    Club = 3,
}

impl Color {
    pub const ALL: [Color; NUM_COLORS] = [Color::Spade, Color::Heart, Color::Diamond, Color::Club];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert 0..3 to a color. Only the two low bits are looked at.
    #[inline]
    pub const fn from_bits(bits: u32) -> Color {
        match bits & 0x3 {
            0 => Color::Spade,
            1 => Color::Heart,
            2 => Color::Diamond,
            _ => Color::Club,
        }
    }

    pub fn symbol(self) -> char {
        const SYMBOLS: [char; NUM_COLORS] = ['\u{2660}', '\u{2665}', '\u{2666}', '\u{2663}'];
        SYMBOLS[self.index()]
    }

    pub fn letter(self) -> char {
        const LETTERS: [char; NUM_COLORS] = ['S', 'H', 'D', 'C'];
        LETTERS[self.index()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Card ranks, in plain playing order SIX=0 .. ACE=8.
///
/// The trump order differs and lives in [`TRUMP_ORDER`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    Six = 0,
    Seven = 1,
    Eight = 2,
    Nine = 3,
    Ten = 4,
    Jack = 5,
    Queen = 6,
    King = 7,
    Ace = 8,
}

/// Strength of each rank when its color is trump, indexed by plain rank.
/// 6 < 7 < 8 < 10 < Q < K < A < 9 < J
pub const TRUMP_ORDER: [u8; NUM_RANKS] = [0, 1, 2, 7, 3, 8, 4, 5, 6];

/// Points of a card of a non-trump color, indexed by rank
pub const PLAIN_POINTS: [u32; NUM_RANKS] = [0, 0, 0, 0, 10, 2, 3, 4, 11];

/// Points of a trump card, indexed by rank
pub const TRUMP_POINTS: [u32; NUM_RANKS] = [0, 0, 0, 14, 10, 20, 3, 4, 11];

impl Rank {
    pub const ALL: [Rank; NUM_RANKS] = [
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert 0..8 to a rank
    #[inline]
    pub const fn from_index(index: usize) -> Option<Rank> {
        if index < NUM_RANKS {
            Some(Rank::ALL[index])
        } else {
            None
        }
    }

    /// Position of the rank in the plain order
    #[inline]
    pub const fn plain_ordinal(self) -> u8 {
        self as u8
    }

    /// Position of the rank in the trump order
    #[inline]
    pub const fn trump_ordinal(self) -> u8 {
        TRUMP_ORDER[self as usize]
    }

    pub fn name(self) -> &'static str {
        const NAMES: [&str; NUM_RANKS] = ["6", "7", "8", "9", "10", "J", "Q", "K", "A"];
        NAMES[self.index()]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seats around the table; seats 1 and 3 partner seats 2 and 4 across
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    Player1 = 0,
    Player2 = 1,
    Player3 = 2,
    Player4 = 3,
}

impl PlayerId {
    pub const ALL: [PlayerId; NUM_PLAYERS] = [
        PlayerId::Player1,
        PlayerId::Player2,
        PlayerId::Player3,
        PlayerId::Player4,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> PlayerId {
        match bits & 0x3 {
            0 => PlayerId::Player1,
            1 => PlayerId::Player2,
            2 => PlayerId::Player3,
            _ => PlayerId::Player4,
        }
    }

    #[inline]
    pub const fn team(self) -> TeamId {
        if self as u8 % 2 == 0 {
            TeamId::Team1
        } else {
            TeamId::Team2
        }
    }

    /// The seat `offset` places after this one, clockwise
    #[inline]
    pub const fn offset(self, offset: usize) -> PlayerId {
        PlayerId::from_bits(((self as usize + offset) % NUM_PLAYERS) as u32)
    }

    /// Next seat (clockwise)
    #[inline]
    pub const fn next(self) -> PlayerId {
        self.offset(1)
    }

    #[inline]
    pub const fn partner(self) -> PlayerId {
        self.offset(2)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player{}", self.index() + 1)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamId {
    Team1 = 0,
    Team2 = 1,
}

impl TeamId {
    pub const ALL: [TeamId; NUM_TEAMS] = [TeamId::Team1, TeamId::Team2];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn other(self) -> TeamId {
        match self {
            TeamId::Team1 => TeamId::Team2,
            TeamId::Team2 => TeamId::Team1,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team{}", self.index() + 1)
    }
}

/// Convert character to color
pub fn char_to_color(c: char) -> Option<Color> {
    match c.to_ascii_uppercase() {
        'S' | '\u{2660}' => Some(Color::Spade),
        'H' | '\u{2665}' => Some(Color::Heart),
        'D' | '\u{2666}' => Some(Color::Diamond),
        'C' | '\u{2663}' => Some(Color::Club),
        _ => None,
    }
}

/// Convert character to rank ('T' stands for the ten)
pub fn char_to_rank(c: char) -> Option<Rank> {
    match c.to_ascii_uppercase() {
        '6' => Some(Rank::Six),
        '7' => Some(Rank::Seven),
        '8' => Some(Rank::Eight),
        '9' => Some(Rank::Nine),
        'T' => Some(Rank::Ten),
        'J' => Some(Rank::Jack),
        'Q' => Some(Rank::Queen),
        'K' => Some(Rank::King),
        'A' => Some(Rank::Ace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teams() {
        assert_eq!(PlayerId::Player1.team(), TeamId::Team1);
        assert_eq!(PlayerId::Player2.team(), TeamId::Team2);
        assert_eq!(PlayerId::Player3.team(), TeamId::Team1);
        assert_eq!(PlayerId::Player4.team(), TeamId::Team2);
        assert_eq!(TeamId::Team1.other(), TeamId::Team2);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(PlayerId::Player4.next(), PlayerId::Player1);
        assert_eq!(PlayerId::Player2.partner(), PlayerId::Player4);
        assert_eq!(PlayerId::Player3.offset(3), PlayerId::Player2);
    }

    #[test]
    fn test_trump_order() {
        // Jack is the strongest trump, then the nine
        assert_eq!(Rank::Jack.trump_ordinal(), 8);
        assert_eq!(Rank::Nine.trump_ordinal(), 7);
        assert!(Rank::Ace.trump_ordinal() > Rank::King.trump_ordinal());
        assert!(Rank::Ten.trump_ordinal() < Rank::Queen.trump_ordinal());
        // Plain order keeps the enum order
        assert!(Rank::Ten.plain_ordinal() > Rank::Nine.plain_ordinal());
    }

    #[test]
    fn test_points_tables() {
        let plain: u32 = PLAIN_POINTS.iter().sum();
        let trump: u32 = TRUMP_POINTS.iter().sum();
        assert_eq!(plain * 3 + trump + LAST_TRICK_ADDITIONAL_POINTS, POINTS_PER_TURN);
    }

    #[test]
    fn test_char_parsers() {
        assert_eq!(char_to_color('s'), Some(Color::Spade));
        assert_eq!(char_to_color('\u{2663}'), Some(Color::Club));
        assert_eq!(char_to_color('X'), None);
        assert_eq!(char_to_rank('t'), Some(Rank::Ten));
        assert_eq!(char_to_rank('A'), Some(Rank::Ace));
        assert_eq!(char_to_rank('5'), None);
    }
}
