//! Jass Engine - rules and search player for the Swiss card game Jass
//!
//! The rule engine packs every piece of game state into machine words:
//! - `Card`: 6 bits, `CardSet`: one 64-bit mask
//! - `Trick`: 32 bits (four cards, index, leader, trump)
//! - `Score`: 64 bits (tricks, turn points and game points of both teams)
//!
//! `TurnState` combines the three words and advances one card at a time.
//! `MctsPlayer` chooses cards by Monte-Carlo tree search over turn states.
//!
//! # Example
//!
//! ```
//! use jass_engine::{Color, Hands, MctsPlayer, Player, Score, TurnState};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let hands = Hands::deal(&mut StdRng::seed_from_u64(1));
//! let first = hands.first_player();
//! let state = TurnState::initial(Color::Heart, Score::INITIAL, first);
//!
//! let mut player = MctsPlayer::with_seed(first, 7, 100).unwrap();
//! let card = player.card_to_play(&state, hands[first]).unwrap();
//! assert!(hands[first].contains(card));
//! ```

pub mod bits;
pub mod cards;
mod error;
mod hands;
mod mcts;
mod meld;
mod player;
mod score;
pub mod serial;
mod trick;
mod turn;
pub mod types;

pub use cards::{Card, CardSet};
pub use error::{JassError, Result};
pub use hands::{format_hand, parse_hand, Hands};
pub use mcts::{choose_trump_heuristic, get_rollout_count, MctsConfig, MctsPlayer};
pub use meld::{Meld, MeldSet};
pub use player::{LoggingPlayer, PacedPlayer, Player, QueuedPlayer, QueuedPlayerHandle, RandomPlayer};
pub use score::Score;
pub use trick::Trick;
pub use turn::TurnState;
pub use types::{Color, PlayerId, Rank, TeamId};
pub use types::{HAND_SIZE, MINIMUM_ITERATIONS, NUM_PLAYERS, TRICKS_PER_TURN, WINNING_POINTS};
