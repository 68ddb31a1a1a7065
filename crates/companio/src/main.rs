// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Companio - a memory-backed conversational companion.
//!
//! This is the binary entry point for the Companio shell.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use companio_config::model::CompanioConfig;
use companio_memory::{Bm25Embedder, MemoryService, OnnxEmbedder};
use companio_store::HttpVectorStore;

mod shell;

/// Companio - a memory-backed conversational companion.
#[derive(Parser, Debug)]
#[command(name = "companio", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (overrides the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive companion session.
    Shell,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            companio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match cli.command {
        Some(Commands::Shell) | None => {
            let service = build_memory_service(&config);
            if let Err(e) = shell::run_shell(&config, service).await {
                eprintln!("companio: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("companio: failed to render config: {e}");
                std::process::exit(1);
            }
        },
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<CompanioConfig, Vec<companio_config::ConfigError>> {
    match path {
        Some(path) => match companio_config::load_config_from_path(path) {
            Ok(config) => {
                companio_config::validate_config(&config)?;
                Ok(config)
            }
            Err(e) => Err(vec![companio_config::ConfigError::Parse(e.to_string())]),
        },
        None => companio_config::load_and_validate(),
    }
}

/// Initialize tracing with the configured level; `RUST_LOG` wins if set.
fn init_logging(config: &CompanioConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire up the memory service from the configuration.
///
/// A missing embedding model is not fatal: the shell runs without memory and
/// says so, matching the companion's degrade-and-continue posture.
fn build_memory_service(config: &CompanioConfig) -> Option<MemoryService> {
    if !config.memory.enabled {
        return None;
    }

    let onnx = match OnnxEmbedder::new(&config.embedding) {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            warn!(error = %e, "embedding model unavailable, continuing without memory");
            return None;
        }
    };
    let bm25 = match Bm25Embedder::new(&config.embedding) {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            warn!(error = %e, "sparse embedder unavailable, continuing without memory");
            return None;
        }
    };
    let store = match HttpVectorStore::new(&config.store) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "vector store client unavailable, continuing without memory");
            return None;
        }
    };

    Some(MemoryService::new(
        bm25,
        onnx.clone(),
        onnx,
        store,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn default_config_is_valid() {
        let config = companio_config::load_and_validate_str("").expect("defaults must validate");
        assert_eq!(config.agent.name, "Sunny");
    }
}
