// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BM25-style sparse embedding adapter.
//!
//! Terms are the tokenizer's vocabulary ids (no special tokens), weighted by
//! the BM25 term-frequency formula with a configured average document length.
//! The inverse-document-frequency factor lives in the store's scoring, not
//! here; the adapter only produces per-document term weights.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use companio_config::model::EmbeddingConfig;
use companio_core::error::CompanioError;
use companio_core::traits::adapter::Adapter;
use companio_core::traits::embedding::SparseEmbedder;
use companio_core::types::{AdapterType, EmbeddingChannel, HealthStatus, SparseVector};

/// Sparse lexical embedder using BM25 term-frequency weighting.
pub struct Bm25Embedder {
    tokenizer: tokenizers::Tokenizer,
    k1: f32,
    b: f32,
    avg_doc_len: f32,
}

impl Bm25Embedder {
    /// Creates a BM25 embedder sharing the dense model's tokenizer file.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, CompanioError> {
        let tokenizer_path = Path::new(&config.model_dir).join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            CompanioError::Internal(format!(
                "Failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        Ok(Self {
            tokenizer,
            k1: config.bm25_k1,
            b: config.bm25_b,
            avg_doc_len: config.bm25_avg_doc_len,
        })
    }
}

/// BM25 term-frequency weighting over `(term_id, tf)` counts.
///
/// `weight = tf * (k1 + 1) / (tf + k1 * (1 - b + b * doc_len / avg_doc_len))`.
/// Monotone in `tf` with saturation; longer documents weigh each term less.
pub fn bm25_weights(
    term_counts: &[(u32, f32)],
    doc_len: f32,
    k1: f32,
    b: f32,
    avg_doc_len: f32,
) -> SparseVector {
    let norm = k1 * (1.0 - b + b * doc_len / avg_doc_len.max(f32::EPSILON));
    let pairs = term_counts
        .iter()
        .map(|(id, tf)| (*id, tf * (k1 + 1.0) / (tf + norm)))
        .collect();
    SparseVector::from_pairs(pairs)
}

#[async_trait]
impl Adapter for Bm25Embedder {
    fn name(&self) -> &str {
        "bm25-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SparseEmbedder for Bm25Embedder {
    async fn embed(&self, text: &str) -> Result<SparseVector, CompanioError> {
        if text.trim().is_empty() {
            return Ok(SparseVector::default());
        }

        // No special tokens: [CLS]/[SEP] are not lexical terms.
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| {
                CompanioError::embedding(
                    EmbeddingChannel::Sparse,
                    format!("tokenization failed: {e}"),
                )
            })?;

        let ids = encoding.get_ids();
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for id in ids {
            *counts.entry(*id).or_insert(0.0) += 1.0;
        }

        let term_counts: Vec<(u32, f32)> = counts.into_iter().collect();
        Ok(bm25_weights(
            &term_counts,
            ids.len() as f32,
            self.k1,
            self.b,
            self.avg_doc_len,
        ))
    }
}
