// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model with serde defaults and strict field checking.

use serde::{Deserialize, Serialize};

/// Root configuration for Companio.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompanioConfig {
    /// Companion identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Vector store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Memory retrieval and fusion settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Companion identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the companion.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

/// Vector store connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the vector-indexing service.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Collection holding the memory records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            collection: default_collection(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Local embedding inference configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Directory containing `model.onnx` and `tokenizer.json`.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Output dimensionality of the dense (and per-token) vectors.
    #[serde(default = "default_dense_dimensions")]
    pub dense_dimensions: usize,

    /// Maximum tokens kept for the late-interaction channel.
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// BM25 term-frequency saturation parameter.
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,

    /// BM25 length-normalization parameter (0.0-1.0).
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,

    /// Assumed average document length in tokens for BM25 normalization.
    #[serde(default = "default_bm25_avg_doc_len")]
    pub bm25_avg_doc_len: f32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            dense_dimensions: default_dense_dimensions(),
            max_sequence_length: default_max_sequence_length(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
            bm25_avg_doc_len: default_bm25_avg_doc_len(),
        }
    }
}

/// Memory retrieval and fusion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, no memory operations occur.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Candidate limit per prefetch channel (pre-rerank).
    #[serde(default = "default_prefetch_limit")]
    pub prefetch_limit: usize,

    /// Number of fused memories returned to the caller.
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,

    /// RRF damping constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Fusion weight of the sparse (lexical) channel.
    #[serde(default = "default_channel_weight")]
    pub sparse_weight: f32,

    /// Fusion weight of the dense (semantic) channel.
    #[serde(default = "default_channel_weight")]
    pub dense_weight: f32,

    /// Fusion weight of the late-interaction (reranked) channel.
    #[serde(default = "default_channel_weight")]
    pub late_weight: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            prefetch_limit: default_prefetch_limit(),
            final_limit: default_final_limit(),
            rrf_k: default_rrf_k(),
            sparse_weight: default_channel_weight(),
            dense_weight: default_channel_weight(),
            late_weight: default_channel_weight(),
        }
    }
}

fn default_agent_name() -> String {
    "Sunny".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_url() -> String {
    "http://127.0.0.1:6333".to_string()
}

fn default_collection() -> String {
    "companio_memories".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_model_dir() -> String {
    "models/all-MiniLM-L6-v2".to_string()
}

fn default_dense_dimensions() -> usize {
    384
}

fn default_max_sequence_length() -> usize {
    256
}

fn default_bm25_k1() -> f32 {
    1.2
}

fn default_bm25_b() -> f32 {
    0.75
}

fn default_bm25_avg_doc_len() -> f32 {
    24.0
}

fn default_memory_enabled() -> bool {
    true
}

fn default_prefetch_limit() -> usize {
    10
}

fn default_final_limit() -> usize {
    5
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_channel_weight() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_retrieval_contract() {
        let config = CompanioConfig::default();
        assert_eq!(config.memory.prefetch_limit, 10);
        assert_eq!(config.memory.final_limit, 5);
        assert!((config.memory.rrf_k - 60.0).abs() < f32::EPSILON);
        assert!((config.memory.sparse_weight - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.embedding.dense_dimensions, 384);
    }

    #[test]
    fn default_store_targets_local_service() {
        let config = CompanioConfig::default();
        assert_eq!(config.store.url, "http://127.0.0.1:6333");
        assert_eq!(config.store.collection, "companio_memories");
    }
}
