// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the embedding adapters, the vector store client,
//! and the retrieval fusion engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The three embedding representation families used for retrieval.
///
/// The declaration order is also the fixed fusion order: ranked lists are
/// always fused as `[sparse, dense, late_interaction]`, which makes RRF
/// tie-breaking deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingChannel {
    Sparse,
    Dense,
    LateInteraction,
}

impl EmbeddingChannel {
    /// All channels in fixed fusion order.
    pub const ALL: [EmbeddingChannel; 3] = [
        EmbeddingChannel::Sparse,
        EmbeddingChannel::Dense,
        EmbeddingChannel::LateInteraction,
    ];
}

/// Distance metric for a dense or multi-vector channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Dot,
}

/// A sparse weighted term vector (lexical / BM25-style representation).
///
/// Indices are term identifiers, sorted ascending; `values[i]` is the weight
/// of `indices[i]`. Most entries of the conceptual high-dimensional vector
/// are zero and therefore absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Build a sparse vector from unsorted `(index, weight)` pairs.
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);
        Self {
            indices: pairs.iter().map(|(idx, _)| *idx).collect(),
            values: pairs.iter().map(|(_, w)| *w).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Dot product over the shared indices (merge join; both sides sorted).
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// A query vector in one of the three channel shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryVector {
    Sparse(SparseVector),
    Dense(Vec<f32>),
    MultiVector(Vec<Vec<f32>>),
}

impl QueryVector {
    /// The channel this vector belongs to.
    pub fn channel(&self) -> EmbeddingChannel {
        match self {
            QueryVector::Sparse(_) => EmbeddingChannel::Sparse,
            QueryVector::Dense(_) => EmbeddingChannel::Dense,
            QueryVector::MultiVector(_) => EmbeddingChannel::LateInteraction,
        }
    }

    /// True when the vector carries no information (empty text was embedded).
    pub fn is_empty(&self) -> bool {
        match self {
            QueryVector::Sparse(v) => v.is_empty(),
            QueryVector::Dense(v) => v.is_empty() || v.iter().all(|x| *x == 0.0),
            QueryVector::MultiVector(v) => v.is_empty(),
        }
    }
}

/// All three embedding channels for one stored record.
///
/// The write path never persists a record with a missing channel; a record is
/// either fully embedded or not stored at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordVectors {
    pub dense: Vec<f32>,
    pub sparse: SparseVector,
    pub late_interaction: Vec<Vec<f32>>,
}

/// Schema for one named sub-vector of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorSpec {
    /// Fixed-dimension single vector compared with the given metric.
    Dense { size: usize, distance: Distance },
    /// Sparse weighted term vector (dot-product scored).
    Sparse,
    /// Per-token vector sequence scored by MaxSim aggregation.
    MultiVector { size: usize, distance: Distance },
}

/// Multi-vector collection schema: one named sub-vector per embedding channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub channels: Vec<(EmbeddingChannel, VectorSpec)>,
}

impl CollectionSchema {
    /// Look up the spec for a channel, if the schema declares it.
    pub fn spec(&self, channel: EmbeddingChannel) -> Option<&VectorSpec> {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, spec)| spec)
    }
}

/// A point submitted to the vector store: identity, all channel vectors, and
/// an opaque JSON payload, upserted atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: Uuid,
    pub vectors: RecordVectors,
    pub payload: serde_json::Value,
}

/// One ranked result returned by the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: Uuid,
    pub score: f32,
    pub payload: serde_json::Value,
}

/// One candidate-generation stage of a two-stage query.
#[derive(Debug, Clone)]
pub struct PrefetchQuery {
    pub query: QueryVector,
    pub limit: usize,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind the base trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Embedding,
    VectorStore,
}

/// Cosine similarity between two dense vectors.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// MaxSim late-interaction score: for each query token vector, the maximum
/// dot product against any document token vector, summed over query tokens.
pub fn max_sim(query: &[Vec<f32>], document: &[Vec<f32>]) -> f32 {
    query
        .iter()
        .map(|q| {
            document
                .iter()
                .map(|d| q.iter().zip(d.iter()).map(|(x, y)| x * y).sum::<f32>())
                .fold(f32::NEG_INFINITY, f32::max)
        })
        .filter(|s| s.is_finite())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_fusion_order_is_fixed() {
        assert_eq!(
            EmbeddingChannel::ALL,
            [
                EmbeddingChannel::Sparse,
                EmbeddingChannel::Dense,
                EmbeddingChannel::LateInteraction,
            ]
        );
        assert_eq!(EmbeddingChannel::LateInteraction.to_string(), "late_interaction");
    }

    #[test]
    fn sparse_from_pairs_sorts_indices() {
        let v = SparseVector::from_pairs(vec![(7, 0.5), (2, 1.0), (5, 0.25)]);
        assert_eq!(v.indices, vec![2, 5, 7]);
        assert_eq!(v.values, vec![1.0, 0.25, 0.5]);
    }

    #[test]
    fn sparse_dot_shared_indices_only() {
        let a = SparseVector::from_pairs(vec![(1, 2.0), (3, 1.0), (9, 4.0)]);
        let b = SparseVector::from_pairs(vec![(3, 3.0), (9, 0.5), (10, 7.0)]);
        // 1.0*3.0 + 4.0*0.5
        assert!((a.dot(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn sparse_dot_disjoint_is_zero() {
        let a = SparseVector::from_pairs(vec![(1, 2.0)]);
        let b = SparseVector::from_pairs(vec![(2, 3.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn cosine_similarity_identical() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn max_sim_picks_best_token_pairs() {
        let query = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let doc = vec![vec![0.9, 0.1], vec![0.2, 0.8]];
        // First query token matches doc token 0 (0.9), second matches doc token 1 (0.8).
        let score = max_sim(&query, &doc);
        assert!((score - 1.7).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn max_sim_empty_sides() {
        let tokens = vec![vec![1.0, 0.0]];
        assert_eq!(max_sim(&[], &tokens), 0.0);
        assert_eq!(max_sim(&tokens, &[]), 0.0);
    }

    #[test]
    fn query_vector_channel_mapping() {
        assert_eq!(
            QueryVector::Dense(vec![1.0]).channel(),
            EmbeddingChannel::Dense
        );
        assert_eq!(
            QueryVector::Sparse(SparseVector::default()).channel(),
            EmbeddingChannel::Sparse
        );
        assert_eq!(
            QueryVector::MultiVector(vec![]).channel(),
            EmbeddingChannel::LateInteraction
        );
    }

    #[test]
    fn empty_query_vectors_detected() {
        assert!(QueryVector::Sparse(SparseVector::default()).is_empty());
        assert!(QueryVector::Dense(vec![0.0; 4]).is_empty());
        assert!(QueryVector::MultiVector(vec![]).is_empty());
        assert!(!QueryVector::Dense(vec![0.1, 0.0]).is_empty());
    }

    #[test]
    fn collection_schema_lookup() {
        let schema = CollectionSchema {
            channels: vec![
                (EmbeddingChannel::Sparse, VectorSpec::Sparse),
                (
                    EmbeddingChannel::Dense,
                    VectorSpec::Dense {
                        size: 384,
                        distance: Distance::Cosine,
                    },
                ),
            ],
        };
        assert_eq!(schema.spec(EmbeddingChannel::Sparse), Some(&VectorSpec::Sparse));
        assert!(schema.spec(EmbeddingChannel::LateInteraction).is_none());
    }
}
