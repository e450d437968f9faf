//! The seat capability consumed by a game driver, and the simple seats
//!
//! A driver asks a seat for two decisions, `choose_trump` and `card_to_play`,
//! and keeps it informed through one-way notifications that non-interactive
//! seats are free to ignore.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use super::cards::*;
use super::error::{JassError, Result};
use super::meld::MeldSet;
use super::score::Score;
use super::trick::Trick;
use super::turn::TurnState;
use super::types::*;

pub trait Player {
    /// Trump color for the coming turn, given the seat's hand
    fn choose_trump(&mut self, hand: CardSet) -> Color;

    /// Card to play next. Must be one of `state.trick().playable_cards(hand)`.
    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card>;

    fn set_players(&mut self, _own_id: PlayerId, _names: &[String; NUM_PLAYERS]) {}
    fn update_hand(&mut self, _hand: CardSet) {}
    fn set_trump(&mut self, _trump: Color) {}
    fn update_trick(&mut self, _trick: Trick) {}
    fn update_score(&mut self, _score: Score) {}
    fn update_melds(&mut self, _melds: &[(PlayerId, MeldSet)]) {}
    fn set_winning_team(&mut self, _team: TeamId) {}
    fn set_first_player(&mut self, _player: PlayerId) {}
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn choose_trump(&mut self, hand: CardSet) -> Color {
        (**self).choose_trump(hand)
    }
    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        (**self).card_to_play(state, hand)
    }
    fn set_players(&mut self, own_id: PlayerId, names: &[String; NUM_PLAYERS]) {
        (**self).set_players(own_id, names)
    }
    fn update_hand(&mut self, hand: CardSet) {
        (**self).update_hand(hand)
    }
    fn set_trump(&mut self, trump: Color) {
        (**self).set_trump(trump)
    }
    fn update_trick(&mut self, trick: Trick) {
        (**self).update_trick(trick)
    }
    fn update_score(&mut self, score: Score) {
        (**self).update_score(score)
    }
    fn update_melds(&mut self, melds: &[(PlayerId, MeldSet)]) {
        (**self).update_melds(melds)
    }
    fn set_winning_team(&mut self, team: TeamId) {
        (**self).set_winning_team(team)
    }
    fn set_first_player(&mut self, player: PlayerId) {
        (**self).set_first_player(player)
    }
}

/// First card of the playable subset of `hand`
fn first_playable(state: &TurnState, hand: CardSet) -> Result<Card> {
    state
        .trick()
        .playable_cards(hand)
        .get(0)
        .ok_or(JassError::IllegalTransition("no playable card in hand"))
}

// ============================================================================
// RandomPlayer
// ============================================================================

/// Plays a uniformly random legal card and picks a random trump
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        RandomPlayer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn choose_trump(&mut self, _hand: CardSet) -> Color {
        Color::ALL[self.rng.gen_range(0..NUM_COLORS)]
    }

    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        let playable = state.trick().playable_cards(hand);
        if playable.is_empty() {
            return Err(JassError::IllegalTransition("no playable card in hand"));
        }
        let index = self.rng.gen_range(0..playable.size());
        playable
            .get(index)
            .ok_or(JassError::IllegalTransition("no playable card in hand"))
    }
}

// ============================================================================
// PacedPlayer
// ============================================================================

/// Wraps a seat so that every decision takes at least `min_time`
pub struct PacedPlayer<P> {
    inner: P,
    min_time: Duration,
}

impl<P: Player> PacedPlayer<P> {
    pub fn new(inner: P, min_time: Duration) -> Self {
        PacedPlayer { inner, min_time }
    }

    /// Same as [`PacedPlayer::new`] with the minimum given in seconds
    pub fn from_secs_f64(inner: P, min_secs: f64) -> Result<Self> {
        if !min_secs.is_finite() || min_secs < 0.0 {
            return Err(JassError::Config(format!(
                "pacing time must be a non-negative number of seconds, got {min_secs}"
            )));
        }
        Ok(PacedPlayer::new(inner, Duration::from_secs_f64(min_secs)))
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn wait_from(&self, start: Instant) {
        if let Some(remaining) = self.min_time.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

impl<P: Player> Player for PacedPlayer<P> {
    fn choose_trump(&mut self, hand: CardSet) -> Color {
        let start = Instant::now();
        let trump = self.inner.choose_trump(hand);
        self.wait_from(start);
        trump
    }

    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        let start = Instant::now();
        let card = self.inner.card_to_play(state, hand)?;
        self.wait_from(start);
        Ok(card)
    }

    fn set_players(&mut self, own_id: PlayerId, names: &[String; NUM_PLAYERS]) {
        self.inner.set_players(own_id, names)
    }
    fn update_hand(&mut self, hand: CardSet) {
        self.inner.update_hand(hand)
    }
    fn set_trump(&mut self, trump: Color) {
        self.inner.set_trump(trump)
    }
    fn update_trick(&mut self, trick: Trick) {
        self.inner.update_trick(trick)
    }
    fn update_score(&mut self, score: Score) {
        self.inner.update_score(score)
    }
    fn update_melds(&mut self, melds: &[(PlayerId, MeldSet)]) {
        self.inner.update_melds(melds)
    }
    fn set_winning_team(&mut self, team: TeamId) {
        self.inner.set_winning_team(team)
    }
    fn set_first_player(&mut self, player: PlayerId) {
        self.inner.set_first_player(player)
    }
}

// ============================================================================
// LoggingPlayer
// ============================================================================

/// Wraps a seat and reports every call at info level
pub struct LoggingPlayer<P> {
    inner: P,
    label: String,
}

impl<P: Player> LoggingPlayer<P> {
    pub fn new(inner: P, label: impl Into<String>) -> Self {
        LoggingPlayer {
            inner,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Player> Player for LoggingPlayer<P> {
    fn choose_trump(&mut self, hand: CardSet) -> Color {
        let trump = self.inner.choose_trump(hand);
        info!(seat = %self.label, %trump, "chose trump");
        trump
    }

    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        let card = self.inner.card_to_play(state, hand)?;
        info!(seat = %self.label, %card, trick = %state.trick(), "played");
        Ok(card)
    }

    fn set_players(&mut self, own_id: PlayerId, names: &[String; NUM_PLAYERS]) {
        info!(seat = %self.label, %own_id, ?names, "players assigned");
        self.inner.set_players(own_id, names)
    }
    fn update_hand(&mut self, hand: CardSet) {
        info!(seat = %self.label, %hand, "hand");
        self.inner.update_hand(hand)
    }
    fn set_trump(&mut self, trump: Color) {
        info!(seat = %self.label, %trump, "trump set");
        self.inner.set_trump(trump)
    }
    fn update_trick(&mut self, trick: Trick) {
        info!(seat = %self.label, %trick, "trick");
        self.inner.update_trick(trick)
    }
    fn update_score(&mut self, score: Score) {
        info!(seat = %self.label, %score, "score");
        self.inner.update_score(score)
    }
    fn update_melds(&mut self, melds: &[(PlayerId, MeldSet)]) {
        for (player, set) in melds {
            info!(seat = %self.label, %player, melds = %set, "melds");
        }
        self.inner.update_melds(melds)
    }
    fn set_winning_team(&mut self, team: TeamId) {
        info!(seat = %self.label, %team, "winning team");
        self.inner.set_winning_team(team)
    }
    fn set_first_player(&mut self, player: PlayerId) {
        info!(seat = %self.label, %player, "first player");
        self.inner.set_first_player(player)
    }
}

// ============================================================================
// QueuedPlayer
// ============================================================================

/// Seat whose decisions arrive over single-slot channels from an
/// interaction surface holding the matching [`QueuedPlayerHandle`].
///
/// Both decisions block until a choice arrives; there is no timeout. A card
/// that is not playable is dropped and the seat keeps waiting. Once the
/// handle is gone the seat falls back to the first playable card, and to
/// the color of its first card for trump.
pub struct QueuedPlayer {
    cards: Receiver<Card>,
    trumps: Receiver<Color>,
}

/// Sending side of a [`QueuedPlayer`]
#[derive(Clone)]
pub struct QueuedPlayerHandle {
    cards: SyncSender<Card>,
    trumps: SyncSender<Color>,
}

impl QueuedPlayer {
    pub fn new() -> (QueuedPlayer, QueuedPlayerHandle) {
        let (card_tx, card_rx) = mpsc::sync_channel(1);
        let (trump_tx, trump_rx) = mpsc::sync_channel(1);
        (
            QueuedPlayer {
                cards: card_rx,
                trumps: trump_rx,
            },
            QueuedPlayerHandle {
                cards: card_tx,
                trumps: trump_tx,
            },
        )
    }
}

impl QueuedPlayerHandle {
    /// Submit a card, blocking while a previous one is still pending
    pub fn play(&self, card: Card) -> Result<()> {
        self.cards.send(card).map_err(|_| JassError::Disconnected)
    }

    /// Submit a trump choice, blocking while a previous one is still pending
    pub fn choose_trump(&self, trump: Color) -> Result<()> {
        self.trumps.send(trump).map_err(|_| JassError::Disconnected)
    }
}

impl Player for QueuedPlayer {
    fn choose_trump(&mut self, hand: CardSet) -> Color {
        match self.trumps.recv() {
            Ok(trump) => trump,
            Err(_) => {
                let fallback = hand.get(0).map_or(Color::Spade, Card::color);
                warn!(%fallback, "trump channel closed, using fallback");
                fallback
            }
        }
    }

    fn card_to_play(&mut self, state: &TurnState, hand: CardSet) -> Result<Card> {
        let playable = state.trick().playable_cards(hand);
        loop {
            match self.cards.recv() {
                Ok(card) if playable.contains(card) => return Ok(card),
                Ok(card) => warn!(%card, %playable, "rejected card that cannot be played"),
                Err(_) => {
                    let fallback = first_playable(state, hand)?;
                    warn!(%fallback, "card channel closed, using fallback");
                    return Ok(fallback);
                }
            }
        }
    }
}
