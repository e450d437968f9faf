//! Monte-Carlo tree search player
//!
//! UCT search over turn states. The cards of the three other seats are
//! unknown, so they are pooled: whenever another seat moves, in the tree or
//! in a rollout, it may play any playable card of the pool of cards that are
//! neither played nor in our own hand.
//!
//! The reward of an iteration is the turn points our own team made in its
//! rollout. It is added to every node on the path from the root to the newly
//! expanded child.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::cards::*;
use super::error::{JassError, Result};
use super::player::Player;
use super::score::Score;
use super::turn::TurnState;
use super::types::*;

pub(crate) static ROLLOUT_COUNT: AtomicU64 = AtomicU64::new(0);

/// Total number of rollouts simulated by every search so far (for profiling)
pub fn get_rollout_count() -> u64 {
    ROLLOUT_COUNT.load(Ordering::Relaxed)
}

/// Search settings of an [`MctsPlayer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    /// Iterations per decision, split across workers
    pub iterations: usize,
    /// UCT exploration constant, in turn points
    pub exploration: f64,
    pub seed: u64,
    /// Independent search trees per decision. Trees run in parallel with the
    /// `parallel` feature and one after the other without it.
    pub workers: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            iterations: 10_000,
            exploration: 40.0,
            seed: 0,
            workers: 1,
        }
    }
}

impl MctsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations < MINIMUM_ITERATIONS {
            return Err(JassError::Config(format!(
                "at least {MINIMUM_ITERATIONS} iterations are needed, got {}",
                self.iterations
            )));
        }
        if self.workers == 0 {
            return Err(JassError::Config("at least one worker is needed".into()));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(JassError::Config(format!(
                "exploration must be finite and non-negative, got {}",
                self.exploration
            )));
        }
        Ok(())
    }
}

/// Cards the next seat may play from `state`: its own playable cards for
/// `own_id`, playable cards of the unknown pool for everybody else
fn playable_for(state: &TurnState, own_id: PlayerId, hand: CardSet) -> Result<CardSet> {
    if state.is_terminal() {
        return Ok(CardSet::EMPTY);
    }
    let unplayed = state.unplayed_cards();
    let pool = if state.next_player()? == own_id {
        unplayed.intersection(hand)
    } else {
        unplayed.difference(hand)
    };
    Ok(state.trick().playable_cards(pool))
}

/// Search context shared by every node of one tree
struct Search<'a> {
    own_id: PlayerId,
    hand: CardSet,
    exploration: f64,
    rng: &'a mut StdRng,
}

impl Search<'_> {
    /// Turn points of our own team
    #[inline]
    fn reward(&self, score: Score) -> f64 {
        score.turn_points(self.own_id.team()) as f64
    }

    /// Play random legal cards until the turn is over
    fn rollout(&mut self, mut state: TurnState) -> Result<Score> {
        ROLLOUT_COUNT.fetch_add(1, Ordering::Relaxed);
        while !state.is_terminal() {
            let playable = playable_for(&state, self.own_id, self.hand)?;
            if playable.is_empty() {
                return Err(JassError::IllegalTransition("no playable card during rollout"));
            }
            let index = self.rng.gen_range(0..playable.size());
            let card = playable
                .get(index)
                .ok_or(JassError::IllegalTransition("no playable card during rollout"))?;
            state = state.with_new_card_played_and_trick_collected(card)?;
        }
        Ok(state.score())
    }
}

struct Node {
    state: TurnState,
    /// Cards playable from this node, one child slot per card in set order
    candidates: CardSet,
    children: Vec<Option<Box<Node>>>,
    visits: u32,
    points: f64,
}

impl Node {
    fn new(state: TurnState, candidates: CardSet) -> Self {
        Node {
            state,
            candidates,
            children: (0..candidates.size()).map(|_| None).collect(),
            visits: 0,
            points: 0.0,
        }
    }

    fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.points += reward;
    }

    #[inline]
    fn mean(&self) -> f64 {
        self.points / self.visits as f64
    }

    /// UCT value of `child` seen from a parent visited `parent_visits` times
    fn uct(child: &Option<Box<Node>>, parent_visits: u32, exploration: f64) -> f64 {
        match child {
            None => f64::INFINITY,
            Some(child) => {
                let visits = child.visits as f64;
                child.mean()
                    + exploration * (2.0 * (parent_visits as f64).ln() / visits).sqrt()
            }
        }
    }

    /// Index of the child with the highest UCT value, first one on ties
    fn best_child(&self, exploration: f64) -> Option<usize> {
        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for (i, child) in self.children.iter().enumerate() {
            let value = Node::uct(child, self.visits, exploration);
            if best.is_none() || value > best_value {
                best = Some(i);
                best_value = value;
            }
        }
        best
    }

    /// One selection, expansion, rollout and backup pass below this node.
    /// Returns the reward added along the path.
    fn iterate(&mut self, search: &mut Search<'_>) -> Result<f64> {
        let Some(index) = self.best_child(search.exploration) else {
            // Terminal: the turn is over, its score is the outcome
            let reward = search.reward(self.state.score());
            self.record(reward);
            return Ok(reward);
        };

        let reward = if let Some(child) = self.children[index].as_mut() {
            child.iterate(search)?
        } else {
            let card = self
                .candidates
                .get(index)
                .ok_or(JassError::IllegalTransition("child slot without a card"))?;
            let state = self.state.with_new_card_played_and_trick_collected(card)?;
            let candidates = playable_for(&state, search.own_id, search.hand)?;
            let mut child = Box::new(Node::new(state, candidates));
            let score = search.rollout(state)?;
            let reward = search.reward(score);
            child.record(reward);
            self.children[index] = Some(child);
            reward
        };
        self.record(reward);
        Ok(reward)
    }

    /// Visits and accumulated points of every expanded root child
    fn child_stats(&self) -> Vec<ChildStats> {
        self.candidates
            .iter()
            .zip(&self.children)
            .filter_map(|(card, child)| {
                child.as_ref().map(|child| ChildStats {
                    card,
                    visits: child.visits,
                    points: child.points,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct ChildStats {
    card: Card,
    visits: u32,
    points: f64,
}

impl ChildStats {
    #[inline]
    fn mean(&self) -> f64 {
        self.points / self.visits as f64
    }
}

/// Run one search tree and return its root statistics
fn search_tree(
    state: TurnState,
    own_id: PlayerId,
    hand: CardSet,
    candidates: CardSet,
    config: &MctsConfig,
    iterations: usize,
    rng: &mut StdRng,
) -> Result<Vec<ChildStats>> {
    let root = grow_tree(state, own_id, hand, candidates, config, iterations, rng)?;
    Ok(root.child_stats())
}

fn grow_tree(
    state: TurnState,
    own_id: PlayerId,
    hand: CardSet,
    candidates: CardSet,
    config: &MctsConfig,
    iterations: usize,
    rng: &mut StdRng,
) -> Result<Node> {
    let mut root = Node::new(state, candidates);
    let mut search = Search {
        own_id,
        hand,
        exploration: config.exploration,
        rng,
    };
    for _ in 0..iterations {
        root.iterate(&mut search)?;
    }
    Ok(root)
}

/// Root decision: highest mean reward, first one on ties
fn best_mean(stats: &[ChildStats]) -> Option<ChildStats> {
    let mut best: Option<ChildStats> = None;
    for child in stats {
        if best.map_or(true, |b| child.mean() > b.mean()) {
            best = Some(*child);
        }
    }
    best
}

/// Sum the statistics of several trees per card
fn merge_stats(trees: Vec<Vec<ChildStats>>) -> Vec<ChildStats> {
    let mut merged: Vec<ChildStats> = Vec::new();
    for stats in trees.into_iter().flatten() {
        match merged.iter_mut().find(|m| m.card == stats.card) {
            Some(m) => {
                m.visits += stats.visits;
                m.points += stats.points;
            }
            None => merged.push(stats),
        }
    }
    merged
}

/// Trump color from a hand alone.
///
/// Colors holding more than two cards fewer than the longest color are
/// ignored. A single remaining color is chosen; otherwise the color of the
/// highest card in trump order wins, the first color on ties.
pub fn choose_trump_heuristic(hand: CardSet) -> Color {
    let longest = Color::ALL
        .iter()
        .map(|&c| hand.subset_of_color(c).size())
        .max()
        .unwrap_or(0);
    let kept: Vec<Color> = Color::ALL
        .iter()
        .copied()
        .filter(|&c| {
            let size = hand.subset_of_color(c).size();
            size > 0 && size + 2 >= longest
        })
        .collect();
    if let [only] = kept.as_slice() {
        return *only;
    }

    let mut best: Option<Card> = None;
    for &color in &kept {
        for card in hand.subset_of_color(color) {
            if best.map_or(true, |b| card.rank().trump_ordinal() > b.rank().trump_ordinal()) {
                best = Some(card);
            }
        }
    }
    best.map_or(Color::Spade, Card::color)
}

/// Seat that picks cards by Monte-Carlo tree search
pub struct MctsPlayer {
    own_id: PlayerId,
    config: MctsConfig,
    rng: StdRng,
    last_iterations: usize,
}

impl MctsPlayer {
    pub fn new(own_id: PlayerId, config: MctsConfig) -> Result<Self> {
        config.validate()?;
        Ok(MctsPlayer {
            own_id,
            config,
            rng: StdRng::seed_from_u64(config.seed),
            last_iterations: 0,
        })
    }

    /// Single-worker player with the default exploration constant
    pub fn with_seed(own_id: PlayerId, seed: u64, iterations: usize) -> Result<Self> {
        MctsPlayer::new(
            own_id,
            MctsConfig {
                iterations,
                seed,
                ..MctsConfig::default()
            },
        )
    }

    pub fn own_id(&self) -> PlayerId {
        self.own_id
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Iterations spent on the most recent card decision
    pub fn last_iterations(&self) -> usize {
        self.last_iterations
    }

    fn run_trees(
        &mut self,
        state: TurnState,
        hand: CardSet,
        candidates: CardSet,
    ) -> Result<Vec<ChildStats>> {
        let workers = self.config.workers;
        if workers == 1 {
            let stats = search_tree(
                state,
                self.own_id,
                hand,
                candidates,
                &self.config,
                self.config.iterations,
                &mut self.rng,
            )?;
            self.last_iterations = self.config.iterations;
            return Ok(stats);
        }

        let per_worker = (self.config.iterations / workers).max(MINIMUM_ITERATIONS);
        let seeds: Vec<u64> = (0..workers).map(|_| self.rng.gen()).collect();
        let own_id = self.own_id;
        let config = self.config;
        let run = move |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            search_tree(state, own_id, hand, candidates, &config, per_worker, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let trees: Result<Vec<_>> = {
            use rayon::prelude::*;
            seeds.into_par_iter().map(run).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let trees: Result<Vec<_>> = seeds.into_iter().map(run).collect();

        self.last_iterations = per_worker * workers;
        Ok(merge_stats(trees?))
    }
}

impl Player for MctsPlayer {
    fn choose_trump(&mut self, hand: CardSet) -> Color {
        choose_trump_heuristic(hand)
    }

    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        self.last_iterations = 0;
        let candidates = state
            .trick()
            .playable_cards(state.unplayed_cards().intersection(hand));
        if candidates.size() <= 1 {
            return candidates
                .get(0)
                .ok_or(JassError::IllegalTransition("no playable card in hand"));
        }

        let start = Instant::now();
        let stats = self.run_trees(*state, hand, candidates)?;

        for child in &stats {
            trace!(
                card = %child.card,
                visits = child.visits,
                mean = child.mean(),
                "root child"
            );
        }
        let best = best_mean(&stats).ok_or(JassError::IllegalTransition("search expanded no card"))?;
        debug!(
            player = %self.own_id,
            card = %best.card,
            iterations = self.last_iterations,
            elapsed = ?start.elapsed(),
            "search finished"
        );
        Ok(best.card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hands::{parse_hand, Hands};

    const DEAL: &str = "6789.TJ.QK.A TJQKA.6.6.67 -.789QKA.789. ..TJA.89TJQK";

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(MctsConfig::default().validate().is_ok());
        assert!(MctsPlayer::with_seed(PlayerId::Player1, 0, MINIMUM_ITERATIONS).is_ok());
        assert!(matches!(
            MctsPlayer::with_seed(PlayerId::Player1, 0, MINIMUM_ITERATIONS - 1),
            Err(JassError::Config(_))
        ));
        let no_workers = MctsConfig {
            workers: 0,
            ..MctsConfig::default()
        };
        assert!(MctsPlayer::new(PlayerId::Player1, no_workers).is_err());
        let bad_exploration = MctsConfig {
            exploration: f64::NAN,
            ..MctsConfig::default()
        };
        assert!(MctsPlayer::new(PlayerId::Player1, bad_exploration).is_err());
    }

    #[test]
    fn test_trump_heuristic() {
        // One long color
        assert_eq!(choose_trump_heuristic(parse_hand("6789T.J.Q.A").unwrap()), Color::Spade);
        // Hearts and clubs are both long; the heart jack outranks the club ace
        assert_eq!(choose_trump_heuristic(parse_hand("6.789J..7TKA").unwrap()), Color::Heart);
        // Short colors are ignored even with high cards
        assert_eq!(choose_trump_heuristic(parse_hand("J.6789T..A").unwrap()), Color::Heart);
    }

    #[test]
    fn test_single_playable_card_skips_search() {
        // Spades led, only one spade in hand and no trump
        let mut player = MctsPlayer::with_seed(PlayerId::Player2, 5, 1_000).unwrap();
        let state = TurnState::initial(Color::Heart, Score::INITIAL, PlayerId::Player1)
            .with_new_card_played(card("S9"))
            .unwrap();
        let hand = parse_hand("A..6789.TJQK").unwrap();
        assert_eq!(player.card_to_play(&state, hand).unwrap(), card("SA"));
        assert_eq!(player.last_iterations(), 0);
    }

    #[test]
    fn test_search_plays_legal_card() {
        let hands = Hands::from_notation(DEAL).unwrap();
        let first = hands.first_player();
        let mut player = MctsPlayer::with_seed(first, 1, 200).unwrap();
        let state = TurnState::initial(Color::Diamond, Score::INITIAL, first);
        let c = player.card_to_play(&state, hands[first]).unwrap();
        assert!(hands[first].contains(c));
        assert_eq!(player.last_iterations(), 200);
    }

    #[test]
    fn test_search_is_reproducible() {
        let hands = Hands::from_notation(DEAL).unwrap();
        let state = TurnState::initial(Color::Spade, Score::INITIAL, PlayerId::Player1)
            .with_new_card_played(card("CA"))
            .unwrap();
        let pick = || {
            let mut p = MctsPlayer::with_seed(PlayerId::Player2, 42, 300).unwrap();
            p.card_to_play(&state, hands[PlayerId::Player2]).unwrap()
        };
        assert_eq!(pick(), pick());
    }

    #[test]
    fn test_workers_merge() {
        let hands = Hands::from_notation(DEAL).unwrap();
        let config = MctsConfig {
            iterations: 400,
            workers: 4,
            seed: 9,
            ..MctsConfig::default()
        };
        let mut player = MctsPlayer::new(PlayerId::Player1, config).unwrap();
        let state = TurnState::initial(Color::Heart, Score::INITIAL, PlayerId::Player1);
        let c = player.card_to_play(&state, hands[PlayerId::Player1]).unwrap();
        assert!(hands[PlayerId::Player1].contains(c));
        assert_eq!(player.last_iterations(), 400);
    }

    /// Deal with `seed` and play `plays` random legal cards
    fn played_out(seed: u64, plays: usize) -> (Hands, TurnState) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hands = Hands::deal(&mut rng);
        let mut state = TurnState::initial(Color::Club, Score::INITIAL, hands.first_player());
        for _ in 0..plays {
            let player = state.next_player().unwrap();
            let playable = state.trick().playable_cards(hands[player]);
            let c = playable.get(rng.gen_range(0..playable.size())).unwrap();
            hands = hands.with_card_played(player, c).unwrap();
            state = state.with_new_card_played_and_trick_collected(c).unwrap();
        }
        (hands, state)
    }

    fn grow(state: TurnState, own_id: PlayerId, hand: CardSet, iterations: usize) -> Node {
        let candidates = playable_for(&state, own_id, hand).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        grow_tree(state, own_id, hand, candidates, &MctsConfig::default(), iterations, &mut rng)
            .unwrap()
    }

    /// Visits of an inner node: its own expansion plus every pass below it
    fn check_visits(node: &Node, is_root: bool) {
        let below: u32 = node.children.iter().flatten().map(|c| c.visits).sum();
        if node.candidates.is_empty() {
            assert!(node.children.is_empty());
        } else if is_root {
            assert_eq!(node.visits, below);
        } else {
            assert_eq!(node.visits, below + 1);
        }
        for child in node.children.iter().flatten() {
            check_visits(child, false);
        }
    }

    #[test]
    fn test_every_root_card_expanded_first() {
        let hands = Hands::from_notation(DEAL).unwrap();
        let state = TurnState::initial(Color::Heart, Score::INITIAL, PlayerId::Player1);
        let hand = hands[PlayerId::Player1];
        let root = grow(state, PlayerId::Player1, hand, HAND_SIZE);
        assert_eq!(root.candidates, hand);
        assert_eq!(root.visits as usize, HAND_SIZE);
        for child in &root.children {
            let child = child.as_ref().unwrap();
            assert_eq!(child.visits, 1);
            assert!(child.children.iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_tree_visits_and_points() {
        let hands = Hands::from_notation(DEAL).unwrap();
        let state = TurnState::initial(Color::Heart, Score::INITIAL, PlayerId::Player1);
        let root = grow(state, PlayerId::Player1, hands[PlayerId::Player1], 300);
        assert_eq!(root.visits, 300);
        check_visits(&root, true);
        // Every root pass adds the same reward to the root and one child
        let below: f64 = root.children.iter().flatten().map(|c| c.points).sum();
        assert_eq!(root.points, below);
        assert!(root.mean() >= 0.0 && root.mean() <= 257.0);
    }

    #[test]
    fn test_reward_is_own_team_points() {
        for seed in 0..4 {
            // Last trick, two cards down: our card then one opponent card
            let (hands, state) = played_out(seed, 34);
            let own_id = state.next_player().unwrap();
            let hand = hands[own_id];
            let mine = hand.get(0).unwrap();
            let after = state.with_new_card_played_and_trick_collected(mine).unwrap();
            let theirs = after.unplayed_cards().get(0).unwrap();
            let end = after.with_new_card_played_and_trick_collected(theirs).unwrap();
            assert!(end.is_terminal());
            // Turn totals are odd, so the teams never share a score
            let own = end.score().turn_points(own_id.team()) as f64;
            let other = end.score().turn_points(own_id.team().other()) as f64;
            assert_ne!(own, other);

            let root = grow(state, own_id, hand, 12);
            assert_eq!(root.points, 12.0 * own);
            let child = root.children[0].as_ref().unwrap();
            assert_eq!(child.points, 12.0 * own);
            // The opponent's move is credited with our points too
            let grandchild = child.children[0].as_ref().unwrap();
            assert_eq!(grandchild.visits, 11);
            assert_eq!(grandchild.mean(), own);
        }
    }

    #[test]
    fn test_root_decision_by_mean() {
        let often = ChildStats {
            card: card("S6"),
            visits: 10,
            points: 500.0,
        };
        let rarely = ChildStats {
            card: card("HA"),
            visits: 2,
            points: 120.0,
        };
        assert_eq!(best_mean(&[often, rarely]).unwrap().card, card("HA"));
        let tie = ChildStats {
            card: card("DK"),
            ..rarely
        };
        assert_eq!(best_mean(&[rarely, tie]).unwrap().card, card("HA"));
        assert!(best_mean(&[]).is_none());
    }

    #[test]
    fn test_merge_stats() {
        let a = ChildStats {
            card: card("S6"),
            visits: 2,
            points: 30.0,
        };
        let b = ChildStats {
            card: card("H6"),
            visits: 1,
            points: 5.0,
        };
        let merged = merge_stats(vec![vec![a, b], vec![a]]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].visits, 4);
        assert_eq!(merged[0].points, 60.0);
        assert_eq!(merged[1].visits, 1);
    }
}
