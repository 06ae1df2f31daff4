//! Terminal game against the move service

use infinite_chess_core::parser::replay_pgn_file;
use infinite_chess_core::{
    Config, GameSession, HistoryEntry, MoveService, MoveServiceClient, Square, TurnEvent,
};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let client = match MoveServiceClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    println!("Playing {} against {}", config.human_side, client.base_url());
    let mut session = GameSession::new(client, config.human_side);
    report(&session.new_game().await);
    show(&session);

    let stdin = io::stdin();
    prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut words = line.split_whitespace();

        match (words.next(), words.next()) {
            (None, _) => {}
            (Some("quit"), _) => break,
            (Some("new"), _) => {
                report(&session.new_game().await);
                show(&session);
            }
            (Some("retry"), _) => {
                session.check_health().await;
                if let Some(event) = session.request_pending().await {
                    report(&[event]);
                }
                show(&session);
            }
            (Some("replay"), Some(path)) => replay(path),
            (Some(word), _) => match Square::from_algebraic(word) {
                Some(square) => {
                    report(&session.activate(square).await);
                    show(&session);
                }
                None => println!("Commands: <square> | new | retry | replay <file.pgn> | quit"),
            },
        }
        prompt();
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn report(events: &[TurnEvent]) {
    for event in events {
        match event {
            TurnEvent::Ignored => println!("Not your turn"),
            TurnEvent::Selected { piece, destinations } => {
                let squares: Vec<String> = destinations.iter().map(Square::to_string).collect();
                println!("Selected {}: {}", piece, squares.join(" "));
            }
            TurnEvent::Cleared => println!("Selection cleared"),
            TurnEvent::Moved { record, origin } => println!(
                "{} {} {}-{} ({:?})",
                record.side, record.kind.as_str(), record.from, record.to, origin
            ),
            TurnEvent::Passed { side } => println!("{} passes", side),
        }
    }
}

fn show<S: MoveService>(session: &GameSession<S>) {
    let controller = session.controller();
    println!("\n{}\n", controller.board());

    let moves: Vec<String> = controller
        .history()
        .iter()
        .map(|entry| match entry {
            HistoryEntry::Move { record, .. } => format!("{}{}", record.from, record.to),
            HistoryEntry::Pass { .. } => "--".to_string(),
        })
        .collect();
    if !moves.is_empty() {
        println!("Moves: {}", moves.join(" "));
    }
    if let Some(error) = controller.last_error() {
        println!("Service: {} (type 'retry' once it is back)", error);
    }
    println!("{} to move", controller.side_to_move());
}

fn replay(path: &str) {
    match replay_pgn_file(path) {
        Ok(games) => {
            for game in &games {
                println!("{}", game.summary());
                println!("  {} moves replayed", game.moves.len());
                if let Some((ply, san)) = &game.stopped_at {
                    println!("  Stopped at ply {}: {}", ply + 1, san);
                }
                println!("\n{}\n", game.final_board);
            }
        }
        Err(e) => eprintln!("Failed to replay {}: {}", path, e),
    }
}
