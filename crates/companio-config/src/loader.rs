// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./companio.toml` > `~/.config/companio/companio.toml`
//! > `/etc/companio/companio.toml` with environment variable overrides via the
//! `COMPANIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CompanioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/companio/companio.toml` (system-wide)
/// 3. `~/.config/companio/companio.toml` (user XDG config)
/// 4. `./companio.toml` (local directory)
/// 5. `COMPANIO_*` environment variables
pub fn load_config() -> Result<CompanioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CompanioConfig::default()))
        .merge(Toml::file("/etc/companio/companio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("companio/companio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("companio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CompanioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CompanioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CompanioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CompanioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `COMPANIO_MEMORY_PREFETCH_LIMIT` must map
/// to `memory.prefetch_limit`, not `memory.prefetch.limit`.
fn env_provider() -> Env {
    Env::prefixed("COMPANIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: COMPANIO_STORE_URL -> "store_url" -> "store.url"
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("store_", "store.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("memory_", "memory.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "Sunny");
        assert_eq!(config.memory.final_limit, 5);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [store]
            url = "http://vector-db.internal:6333"
            collection = "elder_memories"

            [memory]
            final_limit = 3
            rrf_k = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.store.url, "http://vector-db.internal:6333");
        assert_eq!(config.store.collection, "elder_memories");
        assert_eq!(config.memory.final_limit, 3);
        assert!((config.memory.rrf_k - 10.0).abs() < f32::EPSILON);
        // Untouched sections keep their defaults.
        assert_eq!(config.embedding.dense_dimensions, 384);
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companio.toml");
        std::fs::write(&path, "[agent]\nname = \"Margaret\"\n").unwrap();
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.agent.name, "Margaret");
        assert_eq!(config.memory.prefetch_limit, 10);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = load_config_from_str(
            r#"
            [memory]
            finall_limit = 3
            "#,
        );
        assert!(result.is_err(), "typo'd key must not be silently dropped");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = load_config_from_str("[telemetry]\nenabled = true\n");
        assert!(result.is_err());
    }
}
