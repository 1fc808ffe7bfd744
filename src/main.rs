//! Play chess in the terminal against the minimax agent, against another person, or watch
//! two agents play each other.
//!
//! Usage: cargo run --release -- --mode human --level three
//!
//! Moves are typed as two squares, `e2 e4` or `e2e4`. `moves e2` lists where the piece on
//! e2 may go, `reset` starts over and `quit` leaves.

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, Result};
use log::warn;

use chess_ai::engine::{Level, MinimaxAgent, SearchOptions};
use chess_ai::game::{Game, MoveOutcome};
use chess_ai::types::{Color, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// You play white against the agent
    Human,
    /// Two people share the keyboard
    TwoPlayer,
    /// The agent plays both sides
    SelfPlay,
}

#[derive(Parser, Debug)]
#[command(name = "chess_ai")]
#[command(about = "Chess against a minimax agent")]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Human)]
    mode: Mode,

    /// Strength of the agent, the search depth in plies
    #[arg(short, long, value_enum, default_value_t = Level::Two)]
    level: Level,

    /// Seed for the agent's move shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Stop self-play after this many moves per side
    #[arg(long, default_value_t = 100)]
    max_moves: usize,
}

enum Command {
    Move(Square, Square),
    Targets(Square),
    Reset,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["quit"] | ["exit"] => Ok(Command::Quit),
        ["reset"] => Ok(Command::Reset),
        ["moves", square] => Ok(Command::Targets(square.parse()?)),
        [from, to] => Ok(Command::Move(from.parse()?, to.parse()?)),
        [squares] if squares.len() == 4 && squares.is_ascii() => {
            let (from, to) = squares.split_at(2);
            Ok(Command::Move(from.parse()?, to.parse()?))
        }
        _ => Err(eyre!("expected a move like `e2 e4`, `moves e2`, `reset` or `quit`")),
    }
}

fn report(game: &Game, outcome: &MoveOutcome) {
    if let Some(mv) = outcome.mv {
        println!("{} ({})", game.board().describe_move(&mv), mv.to_uci());
    }
    println!("{}", game.board().draw_board());
    if outcome.checkmate {
        if let Some(status) = game.result() {
            println!("Checkmate! {:?}", status);
        }
    } else if outcome.stalemate {
        println!("Draw.");
    } else if outcome.in_check {
        println!("Check.");
    }
}

fn new_game(seed: Option<u64>) -> Game {
    match seed {
        Some(seed) => Game::with_seed(seed),
        None => Game::new(),
    }
}

fn agent_options(level: Level, seed: Option<u64>) -> SearchOptions {
    let options = level.search_options();
    match seed {
        Some(seed) => options.with_seed(seed),
        None => options,
    }
}

/// Interactive game. In `Mode::Human` the agent answers every white move as black.
fn play_interactive(args: &Args) -> Result<()> {
    let mut game = new_game(args.seed);
    let mut agent = (args.mode == Mode::Human)
        .then(|| MinimaxAgent::new(Color::Black, agent_options(args.level, args.seed)));

    println!("{}", game.board().draw_board());
    let stdin = io::stdin();
    loop {
        let status = game.game_status();
        if game.is_over() {
            println!("Game over. Type `reset` to play again or `quit`.");
        } else {
            print!("{} to move > ", status.side_to_move.to_human());
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            Command::Quit => return Ok(()),
            Command::Reset => {
                game.reset_game();
                println!("{}", game.board().draw_board());
            }
            Command::Targets(square) => println!("{}", game.legal_moves_for(square)),
            Command::Move(from, to) => {
                let outcome = game.attempt_move(from, to);
                if !outcome.accepted {
                    println!("Illegal move.");
                    continue;
                }
                report(&game, &outcome);

                if let Some(agent) = agent.as_mut() {
                    if game.is_over() {
                        continue;
                    }
                    let mv = game.choose_move_with(agent)?;
                    let outcome = game.play_move(&mv);
                    report(&game, &outcome);
                }
            }
        }
    }
}

fn play_self(args: &Args) -> Result<()> {
    let mut game = new_game(args.seed);
    let mut white = MinimaxAgent::new(Color::White, agent_options(args.level, args.seed));
    // offset the seed so the two sides do not mirror each other's choices
    let mut black = MinimaxAgent::new(
        Color::Black,
        agent_options(args.level, args.seed.map(|seed| seed.wrapping_add(1))),
    );

    println!("{}", game.board().draw_board());
    for _ in 0..2 * args.max_moves {
        if game.is_over() {
            break;
        }
        let agent = match game.game_status().side_to_move {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        let mv = game.choose_move_with(agent)?;
        let outcome = game.play_move(&mv);
        if !outcome.accepted {
            return Err(eyre!("agent move {} was rejected", mv.to_uci()));
        }
        report(&game, &outcome);
    }
    if game.result().is_none() {
        warn!("no result after {} moves", args.max_moves);
    }
    println!("Result: {:?}", game.result());
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match args.mode {
        Mode::Human | Mode::TwoPlayer => play_interactive(&args),
        Mode::SelfPlay => play_self(&args),
    }
}
