// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter traits, one per representation family.
//!
//! All three adapters share the same contract: embedding an empty string
//! returns an empty/zero vector rather than an error, adapters hold no
//! per-call mutable state, and failures surface as
//! [`CompanioError::Embedding`] naming the channel.

use async_trait::async_trait;

use crate::error::CompanioError;
use crate::traits::adapter::Adapter;
use crate::types::SparseVector;

/// Produces fixed-dimension semantic vectors (cosine/dot comparable).
#[async_trait]
pub trait DenseEmbedder: Adapter {
    /// Embed a text into a single dense vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CompanioError>;

    /// Output dimensionality of this embedder.
    fn dimensions(&self) -> usize;
}

/// Produces sparse weighted term vectors (lexical/BM25-style matching).
#[async_trait]
pub trait SparseEmbedder: Adapter {
    /// Embed a text into a sparse term-weight vector.
    async fn embed(&self, text: &str) -> Result<SparseVector, CompanioError>;
}

/// Produces one vector per token, scored downstream via MaxSim aggregation.
#[async_trait]
pub trait LateInteractionEmbedder: Adapter {
    /// Embed a text into an ordered sequence of token vectors.
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, CompanioError>;

    /// Dimensionality of each token vector.
    fn dimensions(&self) -> usize;
}
