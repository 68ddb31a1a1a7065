// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Companio.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides via the `COMPANIO_` prefix.
//!
//! # Usage
//!
//! ```no_run
//! use companio_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Companion name: {}", config.agent.name);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CompanioConfig;
pub use validation::{validate_config, ConfigError};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `CompanioConfig` or the full list of errors.
pub fn load_and_validate() -> Result<CompanioConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(err.to_string())]),
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<CompanioConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(err.to_string())]),
    }
}

/// Print configuration errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    eprintln!("companio: configuration invalid:");
    for error in errors {
        eprintln!("  - {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_happy_path() {
        let config = load_and_validate_str(
            r#"
            [agent]
            name = "Companio"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.name, "Companio");
        assert_eq!(config.agent.log_level, "debug");
    }

    #[test]
    fn load_and_validate_str_surfaces_validation_errors() {
        let errors = load_and_validate_str(
            r#"
            [memory]
            rrf_k = -1.0
            "#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("rrf_k"));
    }
}
