// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `companio shell` command implementation.
//!
//! Launches an interactive session with a colored prompt and readline
//! history. Every turn retrieves relevant memories for the input and records
//! the turn as a new memory; retrieval failures never interrupt the session.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use companio_config::model::CompanioConfig;
use companio_core::error::CompanioError;
use companio_memory::{categorize, MemoryService};

/// User id recorded for memories created from the local shell.
const SHELL_USER: &str = "local";

/// Runs the interactive companion session.
///
/// Each input line is answered with the memories the engine retrieves for it,
/// then stored as a new memory under the classifier's category. When no
/// memory service is available the shell still runs, it just remembers
/// nothing.
pub async fn run_shell(
    config: &CompanioConfig,
    service: Option<MemoryService>,
) -> Result<(), CompanioError> {
    if let Some(service) = &service {
        service.init().await?;
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| CompanioError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", config.agent.name.bold().green());
    if service.is_none() {
        println!("{}", "(memory unavailable this session)".dimmed());
    }
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if let Some(service) = &service {
                    handle_turn(service, trimmed).await;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(CompanioError::Internal(format!("readline error: {e}")));
            }
        }
    }

    println!("{}", "Goodbye.".dimmed());
    Ok(())
}

/// Retrieve memories for the input, show them, and record the turn.
async fn handle_turn(service: &MemoryService, input: &str) {
    let memories = service.retrieve_memories(input).await;
    if memories.is_empty() {
        println!("{}", "No related memories yet.".dimmed());
    } else {
        println!("{}", "Related memories:".bold());
        for memory in &memories {
            println!("  {} {}", "-".dimmed(), memory);
        }
    }

    let category = categorize(input);
    match service.record_memory(SHELL_USER, input, category).await {
        Ok(Some(id)) => {
            println!("{}", format!("(remembered as {category}, {id})").dimmed());
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "failed to record memory");
            println!("{}", "(could not save that memory)".red());
        }
    }
}
