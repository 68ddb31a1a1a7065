// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retriever combining three retrieval channels via RRF fusion.
//!
//! The retriever embeds the query on the sparse, dense, and late-interaction
//! channels, gathers one ranked list per channel (two independent searches
//! plus a prefetch+rerank query), fuses the lists with weighted Reciprocal
//! Rank Fusion, and returns the top results by fused score.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use companio_config::model::MemoryConfig;
use companio_core::error::CompanioError;
use companio_core::traits::embedding::{DenseEmbedder, LateInteractionEmbedder, SparseEmbedder};
use companio_core::traits::store::VectorStore;
use companio_core::types::{EmbeddingChannel, PrefetchQuery, QueryVector, ScoredPoint};

use crate::types::{payload_text, ChannelHit, FusedMemory};

/// Hybrid retriever over the three embedding channels.
///
/// Query-path failures never abort the turn: a failing embedder drops its
/// channel, and a failing store call yields an empty list for that channel.
/// Only explicit cancellation surfaces as an error.
pub struct HybridRetriever {
    sparse: Arc<dyn SparseEmbedder>,
    dense: Arc<dyn DenseEmbedder>,
    late: Arc<dyn LateInteractionEmbedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
    config: MemoryConfig,
}

impl HybridRetriever {
    pub fn new(
        sparse: Arc<dyn SparseEmbedder>,
        dense: Arc<dyn DenseEmbedder>,
        late: Arc<dyn LateInteractionEmbedder>,
        store: Arc<dyn VectorStore>,
        collection: String,
        config: MemoryConfig,
    ) -> Self {
        Self {
            sparse,
            dense,
            late,
            store,
            collection,
            config,
        }
    }

    /// Retrieve relevant memories for a query using hybrid search.
    ///
    /// 1. Embeds the query on all three channels (failing channels dropped)
    /// 2. Gathers ranked lists in fixed channel order: sparse search, dense
    ///    search, prefetch+rerank query
    /// 3. Fuses the lists with weighted RRF
    /// 4. Returns the top `final_limit` fused memories
    pub async fn retrieve(&self, query: &str) -> Result<Vec<FusedMemory>, CompanioError> {
        let sparse_query = match self.sparse.embed(query).await {
            Ok(v) => Some(QueryVector::Sparse(v)).filter(|q| !q.is_empty()),
            Err(e) => {
                warn!(channel = %EmbeddingChannel::Sparse, error = %e, "query embedding failed, dropping channel");
                None
            }
        };
        let dense_query = match self.dense.embed(query).await {
            Ok(v) => Some(QueryVector::Dense(v)).filter(|q| !q.is_empty()),
            Err(e) => {
                warn!(channel = %EmbeddingChannel::Dense, error = %e, "query embedding failed, dropping channel");
                None
            }
        };
        let late_query = match self.late.embed(query).await {
            Ok(v) => Some(QueryVector::MultiVector(v)).filter(|q| !q.is_empty()),
            Err(e) => {
                warn!(channel = %EmbeddingChannel::LateInteraction, error = %e, "query embedding failed, dropping channel");
                None
            }
        };

        // Ranked lists in fixed channel order: sparse, dense, late-interaction.
        let mut lists: Vec<(f32, Vec<ChannelHit>)> = Vec::new();

        if let Some(q) = &sparse_query {
            lists.push((self.config.sparse_weight, self.channel_search(q).await));
        }
        if let Some(q) = &dense_query {
            lists.push((self.config.dense_weight, self.channel_search(q).await));
        }
        if let Some(rerank) = &late_query {
            let prefetch: Vec<PrefetchQuery> = [&sparse_query, &dense_query]
                .into_iter()
                .flatten()
                .map(|q| PrefetchQuery {
                    query: q.clone(),
                    limit: self.config.prefetch_limit,
                })
                .collect();
            lists.push((
                self.config.late_weight,
                self.reranked_query(&prefetch, rerank).await,
            ));
        }

        let fused = reciprocal_rank_fusion(&lists, self.config.rrf_k, self.config.final_limit);
        debug!(
            channels = lists.len(),
            results = fused.len(),
            "hybrid retrieval complete"
        );
        Ok(fused)
    }

    /// Like [`retrieve`](Self::retrieve) but abandons the work when the token
    /// fires. A cancelled retrieval returns no partial fusion.
    pub async fn retrieve_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FusedMemory>, CompanioError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(CompanioError::Cancelled),
            result = self.retrieve(query) => result,
        }
    }

    /// Single-channel search; store failure degrades to an empty list.
    async fn channel_search(&self, query: &QueryVector) -> Vec<ChannelHit> {
        match self
            .store
            .search(&self.collection, query, self.config.prefetch_limit)
            .await
        {
            Ok(points) => points.into_iter().map(channel_hit).collect(),
            Err(e) => {
                warn!(channel = %query.channel(), error = %e, "channel search failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Two-stage prefetch+rerank query; store failure degrades to empty.
    async fn reranked_query(
        &self,
        prefetch: &[PrefetchQuery],
        rerank: &QueryVector,
    ) -> Vec<ChannelHit> {
        match self
            .store
            .query(&self.collection, prefetch, rerank, self.config.final_limit)
            .await
        {
            Ok(points) => points.into_iter().map(channel_hit).collect(),
            Err(e) => {
                warn!(error = %e, "reranked query failed, treating as empty");
                Vec::new()
            }
        }
    }
}

fn channel_hit(point: ScoredPoint) -> ChannelHit {
    ChannelHit {
        id: point.id,
        text: payload_text(&point.payload),
        score: point.score,
    }
}

/// Weighted Reciprocal Rank Fusion over per-channel ranked lists.
///
/// Each list contributes `weight / (k + rank + 1)` for the id at 0-based
/// `rank`; contributions are summed per unique id across all lists. The
/// fused ranking is sorted by summed score descending; exact ties keep the
/// order in which ids were first seen across the fixed channel order, which
/// makes the output deterministic. The top `final_top_k` entries are kept.
/// Channel scores only determine the per-list ranking; fusion uses ranks.
pub fn reciprocal_rank_fusion(
    lists: &[(f32, Vec<ChannelHit>)],
    k: f32,
    final_top_k: usize,
) -> Vec<FusedMemory> {
    let mut first_seen: Vec<Uuid> = Vec::new();
    let mut fused: HashMap<Uuid, (f32, String)> = HashMap::new();

    for (weight, list) in lists {
        for (rank, hit) in list.iter().enumerate() {
            let contribution = weight / (k + rank as f32 + 1.0);
            match fused.entry(hit.id) {
                Entry::Occupied(mut entry) => entry.get_mut().0 += contribution,
                Entry::Vacant(entry) => {
                    entry.insert((contribution, hit.text.clone()));
                    first_seen.push(hit.id);
                }
            }
        }
    }

    let mut results: Vec<FusedMemory> = first_seen
        .into_iter()
        .filter_map(|id| {
            fused
                .remove(&id)
                .map(|(score, text)| FusedMemory { id, text, score })
        })
        .collect();

    // Stable sort: equal scores keep first-seen order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(final_top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: Uuid, text: &str) -> ChannelHit {
        ChannelHit {
            id,
            text: text.to_string(),
            score: 1.0,
        }
    }

    fn ids(results: &[FusedMemory]) -> Vec<Uuid> {
        results.iter().map(|m| m.id).collect()
    }

    #[test]
    fn rrf_reference_scenario_k60() {
        let (a, b, c, d) = (
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7(),
        );
        // Lists [A,B,C], [B,A,D], [A] in fixed channel order.
        let lists = vec![
            (1.0, vec![hit(a, "a"), hit(b, "b"), hit(c, "c")]),
            (1.0, vec![hit(b, "b"), hit(a, "a"), hit(d, "d")]),
            (1.0, vec![hit(a, "a")]),
        ];

        let fused = reciprocal_rank_fusion(&lists, 60.0, 10);

        assert_eq!(ids(&fused), vec![a, b, c, d]);

        // A: 1/61 + 1/62 + 1/61, B: 1/61 + 1/62, C and D: 1/63 each.
        assert!((fused[0].score - (2.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-6);
        assert!((fused[1].score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-6);
        assert!((fused[2].score - 1.0 / 63.0).abs() < 1e-6);
        assert!((fused[3].score - 1.0 / 63.0).abs() < 1e-6);
        // C and D tie exactly; C came first in the channel order.
        assert_eq!(fused[2].id, c);
    }

    #[test]
    fn rrf_is_deterministic() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let lists = vec![
            (1.0, vec![hit(a, "a"), hit(b, "b")]),
            (1.0, vec![hit(b, "b")]),
        ];
        let first = reciprocal_rank_fusion(&lists, 60.0, 10);
        let second = reciprocal_rank_fusion(&lists, 60.0, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn extra_appearance_raises_score() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let without = vec![(1.0, vec![hit(a, "a"), hit(b, "b")])];
        let with = vec![
            (1.0, vec![hit(a, "a"), hit(b, "b")]),
            (1.0, vec![hit(b, "b")]),
        ];

        let base = reciprocal_rank_fusion(&without, 60.0, 10);
        let boosted = reciprocal_rank_fusion(&with, 60.0, 10);

        let score = |results: &[FusedMemory], id: Uuid| {
            results.iter().find(|m| m.id == id).map(|m| m.score).unwrap()
        };
        assert!(score(&boosted, b) > score(&base, b));
        assert_eq!(ids(&boosted), vec![b, a]);
    }

    #[test]
    fn channel_weight_scales_contribution() {
        let a = Uuid::now_v7();
        let single = reciprocal_rank_fusion(&[(1.0, vec![hit(a, "a")])], 60.0, 10);
        let doubled = reciprocal_rank_fusion(&[(2.0, vec![hit(a, "a")])], 60.0, 10);
        assert!((doubled[0].score - 2.0 * single[0].score).abs() < 1e-6);
    }

    #[test]
    fn empty_lists_fuse_to_empty() {
        assert!(reciprocal_rank_fusion(&[], 60.0, 5).is_empty());
        let lists = vec![(1.0, Vec::new()), (1.0, Vec::new())];
        assert!(reciprocal_rank_fusion(&lists, 60.0, 5).is_empty());
    }

    #[test]
    fn truncation_returns_prefix_of_full_ranking() {
        let ids_in: Vec<Uuid> = (0..6).map(|_| Uuid::now_v7()).collect();
        let lists = vec![(
            1.0,
            ids_in.iter().map(|id| hit(*id, "m")).collect::<Vec<_>>(),
        )];

        let full = reciprocal_rank_fusion(&lists, 60.0, 10);
        let truncated = reciprocal_rank_fusion(&lists, 60.0, 3);
        assert_eq!(truncated.len(), 3);
        assert_eq!(truncated[..], full[..3]);
    }

    #[test]
    fn fused_results_carry_memory_text() {
        let a = Uuid::now_v7();
        let fused = reciprocal_rank_fusion(&[(1.0, vec![hit(a, "likes jazz")])], 60.0, 5);
        assert_eq!(fused[0].text, "likes jazz");
    }
}
