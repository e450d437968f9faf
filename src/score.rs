//! Score of both teams packed into one 64-bit word
//!
//! Each team owns a 32-bit half (Team1 low, Team2 high) laid out as:
//! - bits 0..4: tricks won this turn (0..9)
//! - bits 4..13: points won this turn (0..257)
//! - bits 13..24: game points from previous turns and melds (0..2000)

use std::fmt;

use super::bits::{field64, pack64};
use super::error::{JassError, Result};
use super::types::*;

const TRICKS_BITS: u32 = 4;
const TURN_START: u32 = TRICKS_BITS;
const TURN_BITS: u32 = 9;
const GAME_START: u32 = TURN_START + TURN_BITS;
const GAME_BITS: u32 = 11;
const USED_BITS: u32 = GAME_START + GAME_BITS;
const TEAM_STRIDE: u32 = 32;

const MAX_TURN_POINTS: u32 = POINTS_PER_TURN + MATCH_ADDITIONAL_POINTS;
const MAX_GAME_POINTS: u32 = WINNING_POINTS * 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Score {
    packed: u64,
}

#[inline]
fn team_fields(packed: u64, team: TeamId) -> (u32, u32, u32) {
    let half = field64(packed, team.index() as u32 * TEAM_STRIDE, TEAM_STRIDE);
    (
        field64(half, 0, TRICKS_BITS) as u32,
        field64(half, TURN_START, TURN_BITS) as u32,
        field64(half, GAME_START, GAME_BITS) as u32,
    )
}

fn pack_team(tricks: u32, turn: u32, game: u32) -> Result<u64> {
    if tricks as usize > TRICKS_PER_TURN || turn > MAX_TURN_POINTS || game > MAX_GAME_POINTS {
        return Err(JassError::encoding(
            "score",
            (tricks as u64) | (turn as u64) << TURN_START | (game as u64) << GAME_START,
        ));
    }
    pack64(&[
        (tricks as u64, TRICKS_BITS),
        (turn as u64, TURN_BITS),
        (game as u64, GAME_BITS),
    ])
}

impl Score {
    pub const INITIAL: Score = Score { packed: 0 };

    /// Check both halves: no stray bits and every field within its bound
    pub fn is_valid(packed: u64) -> bool {
        TeamId::ALL.iter().all(|&team| {
            let half = field64(packed, team.index() as u32 * TEAM_STRIDE, TEAM_STRIDE);
            let (tricks, turn, game) = team_fields(packed, team);
            half >> USED_BITS == 0
                && tricks as usize <= TRICKS_PER_TURN
                && turn <= MAX_TURN_POINTS
                && game <= MAX_GAME_POINTS
        })
    }

    pub fn from_packed(packed: u64) -> Result<Self> {
        if Score::is_valid(packed) {
            Ok(Score { packed })
        } else {
            Err(JassError::encoding("score", packed))
        }
    }

    /// Build a score from its six fields, Team1 first
    pub fn new(team1: (u32, u32, u32), team2: (u32, u32, u32)) -> Result<Self> {
        let low = pack_team(team1.0, team1.1, team1.2)?;
        let high = pack_team(team2.0, team2.1, team2.2)?;
        Ok(Score {
            packed: low | high << TEAM_STRIDE,
        })
    }

    #[inline]
    pub const fn packed(self) -> u64 {
        self.packed
    }

    #[inline]
    pub fn turn_tricks(self, team: TeamId) -> u32 {
        team_fields(self.packed, team).0
    }

    #[inline]
    pub fn turn_points(self, team: TeamId) -> u32 {
        team_fields(self.packed, team).1
    }

    #[inline]
    pub fn game_points(self, team: TeamId) -> u32 {
        team_fields(self.packed, team).2
    }

    /// Game points plus points of the turn in progress
    #[inline]
    pub fn total_points(self, team: TeamId) -> u32 {
        let (_, turn, game) = team_fields(self.packed, team);
        turn + game
    }

    fn with_team(self, team: TeamId, fields: (u32, u32, u32)) -> Result<Score> {
        let other = team_fields(self.packed, team.other());
        match team {
            TeamId::Team1 => Score::new(fields, other),
            TeamId::Team2 => Score::new(other, fields),
        }
    }

    /// Credit a collected trick to `winning_team`.
    ///
    /// Taking all nine tricks of a turn adds the match bonus.
    pub fn with_additional_trick(self, winning_team: TeamId, trick_points: u32) -> Result<Score> {
        let (tricks, turn, game) = team_fields(self.packed, winning_team);
        if tricks as usize >= TRICKS_PER_TURN {
            return Err(JassError::IllegalTransition(
                "team already took every trick of the turn",
            ));
        }
        let tricks = tricks + 1;
        let mut turn = turn + trick_points;
        if tricks as usize == TRICKS_PER_TURN {
            turn += MATCH_ADDITIONAL_POINTS;
        }
        self.with_team(winning_team, (tricks, turn, game))
    }

    /// Add meld points straight to a team's game points
    pub fn with_meld_points(self, team: TeamId, points: u32) -> Result<Score> {
        let (tricks, turn, game) = team_fields(self.packed, team);
        self.with_team(team, (tricks, turn, game + points))
    }

    /// Roll turn points into game points and reset both turn tallies
    pub fn next_turn(self) -> Result<Score> {
        let (_, turn1, game1) = team_fields(self.packed, TeamId::Team1);
        let (_, turn2, game2) = team_fields(self.packed, TeamId::Team2);
        Score::new((0, 0, game1 + turn1), (0, 0, game2 + turn2))
    }

    /// Team with strictly more total points, if any
    pub fn leader(self) -> Option<TeamId> {
        let (t1, t2) = (
            self.total_points(TeamId::Team1),
            self.total_points(TeamId::Team2),
        );
        match t1.cmp(&t2) {
            std::cmp::Ordering::Greater => Some(TeamId::Team1),
            std::cmp::Ordering::Less => Some(TeamId::Team2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({self})")
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, team) in TeamId::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            let (tricks, turn, game) = team_fields(self.packed, *team);
            write!(f, "{team}: {tricks}/{turn}/{game}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial() {
        for team in TeamId::ALL {
            assert_eq!(Score::INITIAL.turn_tricks(team), 0);
            assert_eq!(Score::INITIAL.turn_points(team), 0);
            assert_eq!(Score::INITIAL.game_points(team), 0);
        }
        assert_eq!(Score::INITIAL.leader(), None);
    }

    #[test]
    fn test_layout() {
        let s = Score::new((3, 55, 120), (6, 102, 940)).unwrap();
        let low = 3 | 55 << 4 | 120 << 13;
        let high: u64 = 6 | 102 << 4 | 940 << 13;
        assert_eq!(s.packed(), low | high << 32);
        assert_eq!(s.turn_tricks(TeamId::Team2), 6);
        assert_eq!(s.turn_points(TeamId::Team1), 55);
        assert_eq!(s.game_points(TeamId::Team2), 940);
        assert_eq!(s.total_points(TeamId::Team2), 1042);
        assert_eq!(Score::from_packed(s.packed()).unwrap(), s);
    }

    #[test]
    fn test_validation() {
        assert!(Score::new((10, 0, 0), (0, 0, 0)).is_err());
        assert!(Score::new((0, 258, 0), (0, 0, 0)).is_err());
        assert!(Score::new((0, 0, 0), (0, 0, 2001)).is_err());
        assert!(Score::from_packed(1 << 24).is_err());
        assert!(Score::from_packed(1 << 63).is_err());
        assert!(Score::from_packed(9 | 257 << 4 | 2000 << 13).is_ok());
    }

    #[test]
    fn test_additional_trick() {
        let s = Score::INITIAL
            .with_additional_trick(TeamId::Team1, 25)
            .unwrap()
            .with_additional_trick(TeamId::Team2, 12)
            .unwrap()
            .with_additional_trick(TeamId::Team1, 7)
            .unwrap();
        assert_eq!(s.turn_tricks(TeamId::Team1), 2);
        assert_eq!(s.turn_points(TeamId::Team1), 32);
        assert_eq!(s.turn_tricks(TeamId::Team2), 1);
        assert_eq!(s.turn_points(TeamId::Team2), 12);
        assert_eq!(s.leader(), Some(TeamId::Team1));
    }

    #[test]
    fn test_match_bonus() {
        let mut s = Score::INITIAL;
        for _ in 0..8 {
            s = s.with_additional_trick(TeamId::Team2, 10).unwrap();
        }
        assert_eq!(s.turn_points(TeamId::Team2), 80);
        s = s.with_additional_trick(TeamId::Team2, 77).unwrap();
        assert_eq!(s.turn_tricks(TeamId::Team2), 9);
        assert_eq!(s.turn_points(TeamId::Team2), 157 + MATCH_ADDITIONAL_POINTS);
        assert!(s.with_additional_trick(TeamId::Team2, 0).is_err());
    }

    #[test]
    fn test_next_turn() {
        let s = Score::new((4, 70, 300), (5, 87, 410)).unwrap();
        let next = s.next_turn().unwrap();
        assert_eq!(next.turn_tricks(TeamId::Team1), 0);
        assert_eq!(next.turn_points(TeamId::Team1), 0);
        assert_eq!(next.game_points(TeamId::Team1), 370);
        assert_eq!(next.turn_tricks(TeamId::Team2), 0);
        assert_eq!(next.turn_points(TeamId::Team2), 0);
        assert_eq!(next.game_points(TeamId::Team2), 497);
    }

    #[test]
    fn test_meld_points() {
        let s = Score::INITIAL
            .with_meld_points(TeamId::Team2, 200)
            .unwrap();
        assert_eq!(s.game_points(TeamId::Team2), 200);
        assert_eq!(s.game_points(TeamId::Team1), 0);
        assert!(s.with_meld_points(TeamId::Team2, 1900).is_err());
    }
}
