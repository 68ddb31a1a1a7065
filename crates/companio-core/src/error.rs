// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Companio memory engine.

use thiserror::Error;

use crate::types::EmbeddingChannel;

/// The primary error type used across all Companio adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CompanioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// An embedding adapter could not process its input (model error, timeout).
    ///
    /// Fatal on the write path; on the query path the failing channel is
    /// dropped and retrieval continues over the remaining channels.
    #[error("embedding failure on {channel} channel: {message}")]
    Embedding {
        channel: EmbeddingChannel,
        message: String,
    },

    /// The vector store cannot be reached or rejected the request.
    ///
    /// Query path treats this as "no memories found"; write path propagates it.
    #[error("vector store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The target collection does not exist.
    ///
    /// Resolved by `ensure_collection` at startup; not expected during
    /// normal operation.
    #[error("collection not found: {collection}")]
    CollectionMissing { collection: String },

    /// The caller abandoned an in-flight operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CompanioError {
    /// Shorthand for an embedding failure on the given channel.
    pub fn embedding(channel: EmbeddingChannel, message: impl Into<String>) -> Self {
        Self::Embedding {
            channel,
            message: message.into(),
        }
    }

    /// Shorthand for a store failure without an underlying source error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn companio_error_has_all_variants() {
        let _config = CompanioError::Config("test".into());
        let _embedding = CompanioError::embedding(EmbeddingChannel::Dense, "model gone");
        let _store = CompanioError::StoreUnavailable {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _missing = CompanioError::CollectionMissing {
            collection: "memories".into(),
        };
        let _cancelled = CompanioError::Cancelled;
        let _internal = CompanioError::Internal("test".into());
    }

    #[test]
    fn embedding_error_names_channel() {
        let err = CompanioError::embedding(EmbeddingChannel::Sparse, "tokenizer failed");
        let rendered = err.to_string();
        assert!(rendered.contains("sparse"), "got: {rendered}");
        assert!(rendered.contains("tokenizer failed"));
    }
}
