use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use tracing::info;
use txtad_game::{GameConfig, Message, MessageBody, NEW_CONNECTION};

pub fn run(dir: &Path, user: Option<String>, max_rounds: usize) -> Result<(), String> {
    let config = GameConfig::default().with_max_drain_rounds(max_rounds);
    let mut game = super::load_game(dir, config)?;
    let user = user.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(game = game.name(), %user, "session started");

    println!("  {} {}", "Playing".bold(), game.name());
    println!("  Type 'quit' to exit.\n");

    show(&user, game.handle_event(&user, NEW_CONNECTION));

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            break;
        }

        show(&user, game.handle_event(&user, input));
        if game.user(&user).is_none() {
            println!("  {}", "You left the game.".dimmed());
            break;
        }
    }

    Ok(())
}

/// Print the lines addressed to `user`; a failed turn is reported and play
/// goes on.
fn show<E: std::fmt::Display>(user: &str, result: Result<Vec<Message>, E>) {
    match result {
        Ok(messages) => {
            for message in messages.iter().filter(|m| m.user == user) {
                match &message.body {
                    MessageBody::Text(text) => println!("{text}"),
                    MessageBody::Clear => println!("{}", "--- new game ---".dimmed()),
                }
            }
        }
        Err(e) => println!("{}", e.to_string().yellow()),
    }
}
