// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects every violation instead of failing fast.

use thiserror::Error;

use crate::model::CompanioConfig;

/// A configuration error surfaced to the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config files or env vars could not be parsed into the model.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A parsed value violates a semantic constraint.
    #[error("invalid config: {message}")]
    Validation { message: String },
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CompanioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.agent.log_level.trim();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{level}` is not one of trace/debug/info/warn/error"
            ),
        });
    }

    let url = config.store.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.url must not be empty".to_string(),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("store.url `{url}` must start with http:// or https://"),
        });
    }

    if config.store.collection.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.collection must not be empty".to_string(),
        });
    }

    if config.store.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.embedding.dense_dimensions == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.dense_dimensions must be positive".to_string(),
        });
    }

    if config.embedding.max_sequence_length == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.max_sequence_length must be positive".to_string(),
        });
    }

    if config.embedding.bm25_k1 <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "embedding.bm25_k1 must be positive, got {}",
                config.embedding.bm25_k1
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.embedding.bm25_b) {
        errors.push(ConfigError::Validation {
            message: format!(
                "embedding.bm25_b must be within 0.0-1.0, got {}",
                config.embedding.bm25_b
            ),
        });
    }

    if config.embedding.bm25_avg_doc_len <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "embedding.bm25_avg_doc_len must be positive, got {}",
                config.embedding.bm25_avg_doc_len
            ),
        });
    }

    if config.memory.prefetch_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.prefetch_limit must be at least 1".to_string(),
        });
    }

    if config.memory.final_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.final_limit must be at least 1".to_string(),
        });
    }

    if config.memory.rrf_k <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!("memory.rrf_k must be positive, got {}", config.memory.rrf_k),
        });
    }

    let weights = [
        ("memory.sparse_weight", config.memory.sparse_weight),
        ("memory.dense_weight", config.memory.dense_weight),
        ("memory.late_weight", config.memory.late_weight),
    ];
    for (name, weight) in weights {
        if weight < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be non-negative, got {weight}"),
            });
        }
    }
    if weights.iter().all(|(_, w)| *w == 0.0) {
        errors.push(ConfigError::Validation {
            message: "at least one channel fusion weight must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
