//! Melds: same-rank quartets and same-color runs announced from one hand
//!
//! The catalogue is built once on first use and never mutated afterwards.

use std::fmt;
use std::sync::OnceLock;

use super::cards::*;
use super::error::{JassError, Result};
use super::types::*;

const MIN_RUN: usize = 3;
const MAX_RUN: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Meld {
    cards: CardSet,
    points: u32,
}

fn quartet_points(rank: Rank) -> Option<u32> {
    match rank {
        Rank::Nine => Some(150),
        Rank::Jack => Some(200),
        Rank::Ten | Rank::Queen | Rank::King | Rank::Ace => Some(100),
        _ => None,
    }
}

fn run_points(length: usize) -> u32 {
    match length {
        3 => 20,
        4 => 50,
        _ => 100,
    }
}

fn build_catalogue() -> Vec<Meld> {
    let mut melds = Vec::new();
    for rank in Rank::ALL {
        if let Some(points) = quartet_points(rank) {
            let cards = Color::ALL
                .iter()
                .map(|&color| Card::new(color, rank))
                .collect();
            melds.push(Meld { cards, points });
        }
    }
    for color in Color::ALL {
        for length in MIN_RUN..=MAX_RUN {
            for window in Rank::ALL.windows(length) {
                let cards = window.iter().map(|&rank| Card::new(color, rank)).collect();
                melds.push(Meld {
                    cards,
                    points: run_points(length),
                });
            }
        }
    }
    melds
}

impl Meld {
    /// Every meld of the game: 6 quartets and 60 runs
    pub fn all() -> &'static [Meld] {
        static ALL_MELDS: OnceLock<Vec<Meld>> = OnceLock::new();
        ALL_MELDS.get_or_init(build_catalogue)
    }

    /// Melds whose cards all lie in `hand`
    pub fn all_in(hand: CardSet) -> Vec<Meld> {
        Meld::all()
            .iter()
            .copied()
            .filter(|meld| hand.includes(meld.cards))
            .collect()
    }

    #[inline]
    pub fn cards(&self) -> CardSet {
        self.cards
    }

    #[inline]
    pub fn points(&self) -> u32 {
        self.points
    }
}

impl fmt::Debug for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Meld({self})")
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:3}: {}", self.points, self.cards)
    }
}

/// Melds sharing no card
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MeldSet {
    melds: Vec<Meld>,
}

impl MeldSet {
    pub const EMPTY: MeldSet = MeldSet { melds: Vec::new() };

    pub fn of(melds: &[Meld]) -> Result<Self> {
        let mut used = CardSet::EMPTY;
        for meld in melds {
            let shared = used.intersection(meld.cards);
            if !shared.is_empty() {
                return Err(JassError::encoding("meld set", shared.packed()));
            }
            used = used.union(meld.cards);
        }
        Ok(MeldSet {
            melds: melds.to_vec(),
        })
    }

    /// Highest scoring set of disjoint melds in `hand`.
    ///
    /// Branches only over melds compatible with the ones already taken and
    /// stops a branch once the remaining melds cannot beat the best total.
    pub fn best_in(hand: CardSet) -> MeldSet {
        let mut candidates = Meld::all_in(hand);
        candidates.sort_by(|a, b| b.points.cmp(&a.points));

        // suffix[i] = points of candidates[i..]
        let mut suffix = vec![0u32; candidates.len() + 1];
        for i in (0..candidates.len()).rev() {
            suffix[i] = suffix[i + 1] + candidates[i].points;
        }

        let mut search = BestSearch {
            candidates: &candidates,
            suffix: &suffix,
            chosen: Vec::new(),
            best: Vec::new(),
            best_points: 0,
        };
        search.visit(0, CardSet::EMPTY, 0);
        MeldSet { melds: search.best }
    }

    /// Every set of disjoint melds in `hand`, the empty set included
    pub fn all_in(hand: CardSet) -> Vec<MeldSet> {
        fn collect(
            candidates: &[Meld],
            used: CardSet,
            chosen: &mut Vec<Meld>,
            sets: &mut Vec<MeldSet>,
        ) {
            let Some((&meld, rest)) = candidates.split_first() else {
                sets.push(MeldSet {
                    melds: chosen.clone(),
                });
                return;
            };
            if used.intersection(meld.cards).is_empty() {
                chosen.push(meld);
                collect(rest, used.union(meld.cards), chosen, sets);
                chosen.pop();
            }
            collect(rest, used, chosen, sets);
        }

        let mut sets = Vec::new();
        collect(&Meld::all_in(hand), CardSet::EMPTY, &mut Vec::new(), &mut sets);
        sets
    }

    pub fn points(&self) -> u32 {
        self.melds.iter().map(Meld::points).sum()
    }

    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    pub fn is_empty(&self) -> bool {
        self.melds.is_empty()
    }

    /// Union of the cards of every meld
    pub fn cards(&self) -> CardSet {
        self.melds
            .iter()
            .fold(CardSet::EMPTY, |all, meld| all.union(meld.cards))
    }
}

struct BestSearch<'a> {
    candidates: &'a [Meld],
    suffix: &'a [u32],
    chosen: Vec<Meld>,
    best: Vec<Meld>,
    best_points: u32,
}

impl BestSearch<'_> {
    fn visit(&mut self, index: usize, used: CardSet, points: u32) {
        if points > self.best_points {
            self.best_points = points;
            self.best = self.chosen.clone();
        }
        if index >= self.candidates.len() || points + self.suffix[index] <= self.best_points {
            return;
        }
        let meld = self.candidates[index];
        if used.intersection(meld.cards).is_empty() {
            self.chosen.push(meld);
            self.visit(index + 1, used.union(meld.cards), points + meld.points);
            self.chosen.pop();
        }
        self.visit(index + 1, used, points);
    }
}

impl fmt::Debug for MeldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.melds.iter()).finish()
    }
}

impl fmt::Display for MeldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.melds.is_empty() {
            return write!(f, "No melds");
        }
        write!(f, "{:3} points:", self.points())?;
        for meld in &self.melds {
            write!(f, " {}", meld.cards)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hands::parse_hand;

    fn hand(s: &str) -> CardSet {
        parse_hand(s).unwrap()
    }

    #[test]
    fn test_catalogue() {
        let all = Meld::all();
        assert_eq!(all.len(), 6 + 4 * (7 + 6 + 5));
        let quartets = all.iter().filter(|m| m.cards().size() == 4 && m.points() >= 100);
        assert_eq!(quartets.count(), 6);
        assert!(all.iter().all(|m| m.points() > 0));
    }

    #[test]
    fn test_all_in() {
        let melds = Meld::all_in(hand("6789..AK.A"));
        // 678, 789, 6789 in spades
        assert_eq!(melds.len(), 3);
        assert!(Meld::all_in(hand("6.7.8.9")).is_empty());
    }

    #[test]
    fn test_best_prefers_jack_quartet() {
        let best = MeldSet::best_in(hand("67J.TJQK.J.J"));
        assert_eq!(best.points(), 200);
        assert_eq!(best.melds().len(), 1);
        assert_eq!(best.cards(), hand("J.J.J.J"));
    }

    #[test]
    fn test_best_combines_disjoint() {
        let best = MeldSet::best_in(hand("678A.A.A.AK"));
        assert_eq!(best.points(), 100 + 20);
    }

    #[test]
    fn test_best_splits_long_run() {
        // Nine spades: 6-7-8-9-10 (100) + J-Q-K-A (50)
        let best = MeldSet::best_in(CardSet::ALL_CARDS.subset_of_color(Color::Spade));
        assert_eq!(best.points(), 150);
    }

    #[test]
    fn test_best_quartet_of_nines_beats_runs() {
        // Two disjoint 789 runs (40) against the nines (150)
        let best = MeldSet::best_in(hand("789.789.9.9"));
        assert_eq!(best.points(), 150);
    }

    #[test]
    fn test_empty() {
        let best = MeldSet::best_in(hand("6.8.T.Q"));
        assert!(best.is_empty());
        assert_eq!(best.points(), 0);
        assert_eq!(format!("{best}"), "No melds");
    }

    #[test]
    fn test_all_disjoint_sets() {
        // 678, 789 and 6789 overlap pairwise: empty set plus one each
        let sets = MeldSet::all_in(hand("6789..."));
        assert_eq!(sets.len(), 4);
        assert!(sets.iter().any(MeldSet::is_empty));
        assert!(sets.iter().all(|s| s.melds().len() <= 1));

        // Spade run 678 and the ace quartet share nothing
        let sets = MeldSet::all_in(hand("678A.A.A.A"));
        assert_eq!(sets.len(), 4);
        let best = sets.iter().map(MeldSet::points).max().unwrap();
        assert_eq!(best, MeldSet::best_in(hand("678A.A.A.A")).points());
        assert_eq!(best, 120);

        assert_eq!(MeldSet::all_in(hand("6.8.T.Q")), vec![MeldSet::EMPTY]);
    }

    #[test]
    fn test_of_rejects_overlap() {
        let melds = Meld::all_in(hand("6789..."));
        assert!(MeldSet::of(&melds).is_err());
        assert_eq!(MeldSet::of(&melds[..1]).unwrap().points(), melds[0].points());
    }
}
