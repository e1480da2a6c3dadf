//! Chat command handler.
//!
//! Reads questions from stdin line by line. The transcript lives for the
//! duration of the process; `/history` replays it and `/quit` exits.

use super::{build_engine, warn_unlisted_country};
use clap::Args;
use pris_core::{config::AppConfig, AppError, AppResult};
use pris_engine::{ChatRole, Session};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive Q&A session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Country the conversation is about
    #[arg(long)]
    pub country: String,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let engine = build_engine(config)?;
        warn_unlisted_country(engine.catalog(), &self.country);

        let mut session = engine.new_session(self.country.as_str());
        tracing::debug!(session = %session.id, "Chat session started");

        println!(
            "Ask a question about nuclear power programs in {} (/history, /quit)",
            self.country
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let input = line.trim();

            match input {
                "" => continue,
                "/quit" | "/exit" => break,
                "/history" => {
                    print_history(&session);
                    continue;
                }
                _ => {}
            }

            match session.submit_chat(&engine, input).await {
                Ok(answer) => println!("\n{}\n", answer),
                Err(AppError::SynthesisFailure(reason)) => {
                    eprintln!("Answer could not be generated: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(turns = session.transcript.len(), "Chat session ended");
        Ok(())
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_history(session: &Session) {
    if session.transcript.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for turn in session.transcript.turns() {
        let label = match turn.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        };
        println!("{}: {}\n", label, turn.content);
    }
}
