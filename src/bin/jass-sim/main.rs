//! jass-sim - plays complete Jass games between search and random seats
//!
//! Each game deals turns until a team reaches 1000 points. Seats listed in
//! `--mcts-seats` use the tree search player; the others play random legal
//! cards.
//!
//! Usage: jass-sim --games 10 --iterations 2000 --mcts-seats 1,3

use std::time::{Duration, Instant};

use clap::Parser;
use jass_engine::{
    get_rollout_count, Hands, JassError, LoggingPlayer, MctsConfig, MctsPlayer, MeldSet,
    PacedPlayer, Player, PlayerId, RandomPlayer, Score, TeamId, TurnState, NUM_PLAYERS,
    WINNING_POINTS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "jass-sim")]
#[command(about = "Simulate Jass games between search and random players")]
#[command(version)]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Search iterations per card for search seats
    #[arg(short, long, default_value = "10000")]
    iterations: usize,

    /// Independent search trees per decision
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Base seed; game n uses seed + n
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Seats (1-4) played by the search player, comma separated
    #[arg(long, value_delimiter = ',', default_value = "1,3")]
    mcts_seats: Vec<usize>,

    /// Minimum seconds per decision
    #[arg(long, default_value = "0")]
    pace: f64,

    /// Log every seat notification
    #[arg(long)]
    trace_seats: bool,

    /// Verbose output - search statistics
    #[arg(short, long)]
    verbose: bool,
}

fn build_players(args: &Args, game_seed: u64) -> Result<Vec<Box<dyn Player>>, JassError> {
    let mut players: Vec<Box<dyn Player>> = Vec::with_capacity(NUM_PLAYERS);
    for player in PlayerId::ALL {
        let seat_seed = game_seed.wrapping_mul(31).wrapping_add(player.index() as u64);
        let base: Box<dyn Player> = if args.mcts_seats.contains(&(player.index() + 1)) {
            let config = MctsConfig {
                iterations: args.iterations,
                workers: args.workers,
                seed: seat_seed,
                ..MctsConfig::default()
            };
            Box::new(MctsPlayer::new(player, config)?)
        } else {
            Box::new(RandomPlayer::new(seat_seed))
        };
        let paced: Box<dyn Player> = if args.pace > 0.0 {
            Box::new(PacedPlayer::from_secs_f64(base, args.pace)?)
        } else {
            base
        };
        let seat: Box<dyn Player> = if args.trace_seats {
            Box::new(LoggingPlayer::new(paced, player.to_string()))
        } else {
            paced
        };
        players.push(seat);
    }
    Ok(players)
}

fn is_game_over(score: Score) -> bool {
    TeamId::ALL
        .iter()
        .any(|&team| score.total_points(team) >= WINNING_POINTS)
}

/// Play one game to the winning score and return the final score
fn play_game(players: &mut [Box<dyn Player>], seed: u64) -> Result<Score, JassError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let names: [String; NUM_PLAYERS] = PlayerId::ALL.map(|p| p.to_string());
    for player in PlayerId::ALL {
        players[player.index()].set_players(player, &names);
    }

    let mut score = Score::INITIAL;
    let mut first_player: Option<PlayerId> = None;
    let mut turns = 0;
    loop {
        let mut hands = Hands::deal(&mut rng);
        let first = match first_player {
            None => hands.first_player(),
            Some(previous) => previous.next(),
        };
        first_player = Some(first);
        turns += 1;

        for player in PlayerId::ALL {
            let seat = &mut players[player.index()];
            seat.set_first_player(first);
            seat.update_hand(hands[player]);
        }
        let trump = players[first.index()].choose_trump(hands[first]);

        let melds: Vec<(PlayerId, MeldSet)> = PlayerId::ALL
            .iter()
            .map(|&p| (p, MeldSet::best_in(hands[p])))
            .collect();
        let mut state = TurnState::initial(trump, score, first);
        for (player, set) in &melds {
            state = state.with_melds(player.team(), set)?;
        }
        debug!(turn = turns, %first, %trump, score = %state.score(), "turn start");
        for seat in players.iter_mut() {
            seat.update_melds(&melds);
            seat.update_score(state.score());
            seat.set_trump(trump);
        }

        while !state.is_terminal() && !is_game_over(state.score()) {
            for seat in players.iter_mut() {
                seat.update_trick(state.trick());
            }
            while !state.trick().is_full() {
                let player = state.next_player()?;
                let card = players[player.index()].card_to_play(&state, hands[player])?;
                hands = hands.with_card_played(player, card)?;
                state = state.with_new_card_played(card)?;
                players[player.index()].update_hand(hands[player]);
                for seat in players.iter_mut() {
                    seat.update_trick(state.trick());
                }
            }
            state = state.with_trick_collected()?;
            for seat in players.iter_mut() {
                seat.update_score(state.score());
            }
        }

        if is_game_over(state.score()) {
            let final_score = state.score();
            let winner = final_score.leader().unwrap_or(TeamId::Team1);
            for seat in players.iter_mut() {
                seat.set_winning_team(winner);
                seat.update_score(final_score);
            }
            info!(turns, %winner, score = %final_score, "game over");
            return Ok(final_score);
        }
        score = state.score().next_turn()?;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        "debug"
    } else if args.trace_seats {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(seat) = args.mcts_seats.iter().find(|&&s| s == 0 || s > NUM_PLAYERS) {
        return Err(format!("seat {seat} is not in 1..={NUM_PLAYERS}").into());
    }

    let mut wins = [0u32; 2];
    let start = Instant::now();
    for game in 0..args.games {
        let game_seed = args.seed.wrapping_add(game as u64);
        let mut players = build_players(&args, game_seed)?;
        let game_start = Instant::now();
        let score = play_game(&mut players, game_seed)?;
        let winner = score.leader().unwrap_or(TeamId::Team1);
        wins[winner.index()] += 1;
        println!(
            "Game {:3}: {} wins {} - {} ({:.1}s)",
            game + 1,
            winner,
            score.total_points(TeamId::Team1),
            score.total_points(TeamId::Team2),
            game_start.elapsed().as_secs_f64()
        );
    }

    let elapsed = start.elapsed().max(Duration::from_millis(1));
    println!();
    println!("Team1 {} - {} Team2 over {} games", wins[0], wins[1], args.games);
    println!("{} rollouts in {:.2}s", get_rollout_count(), elapsed.as_secs_f64());
    Ok(())
}
