//! Random self-play: both sides play random moves, games are saved as PGN

use chrono::Local;
use infinite_chess_core::selfplay::{play_random_game, SelfPlayStats, DEFAULT_MAX_PLIES};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let games: u32 = match args.next().map(|n| n.parse::<u32>()) {
        None => 1,
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            eprintln!("Usage: selfplay [games] [output-dir] [--show]");
            std::process::exit(1);
        }
    };
    let rest: Vec<String> = args.collect();
    let show = rest.iter().any(|a| a == "--show");
    let out_dir = rest
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/games"));

    let mut rng = rand::rng();
    let mut stats = SelfPlayStats::default();

    for round in 1..=games {
        println!("Game {}/{}", round, games);

        let game = match play_random_game(&mut rng, DEFAULT_MAX_PLIES) {
            Ok(game) => game,
            Err(e) => {
                eprintln!("Game {} aborted: {}", round, e);
                continue;
            }
        };

        for (ply, (san, record)) in game.moves.iter().zip(&game.records).enumerate() {
            println!("Move {}: {} plays {}", ply + 1, record.side, san);
        }
        if show {
            println!("\n{}\n", game.final_board);
        }
        println!("Total moves played: {}", game.ply_count());
        println!("{}", game.termination);

        match game.save_pgn(&out_dir, round, Local::now().naive_local()) {
            Ok(path) => println!("Game saved to: {}", path.display()),
            Err(e) => eprintln!("Failed to save PGN: {}", e),
        }
        println!();

        stats.record(&game);
    }

    println!("{}", stats);
}
