// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store trait: the narrow operation set the memory engine needs
//! from the external vector-indexing service.

use async_trait::async_trait;

use crate::error::CompanioError;
use crate::traits::adapter::Adapter;
use crate::types::{CollectionSchema, PointRecord, PrefetchQuery, QueryVector, ScoredPoint};

/// Client for a vector-indexing service with named multi-vector collections.
///
/// The engine never mutates stored records through this trait; it writes whole
/// points and reads ranked results. The store is assumed to serialize
/// conflicting writes to the same id internally.
#[async_trait]
pub trait VectorStore: Adapter {
    /// Create the collection with the given multi-vector schema if it does
    /// not exist yet.
    ///
    /// Idempotent and race-safe: losing a concurrent create race to another
    /// caller is success, not an error.
    async fn ensure_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), CompanioError>;

    /// Insert or replace the point by id.
    ///
    /// All channel vectors and the payload are submitted in one call, so the
    /// record is either fully visible to subsequent queries or not at all.
    async fn upsert(&self, collection: &str, point: PointRecord) -> Result<(), CompanioError>;

    /// Single-channel similarity search, ranked best-first.
    async fn search(
        &self,
        collection: &str,
        query: &QueryVector,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError>;

    /// Two-stage query: per-channel prefetch candidate generation, then a
    /// rerank of the candidate union with the given query vector, returning
    /// the top `final_limit` by rerank score.
    async fn query(
        &self,
        collection: &str,
        prefetch: &[PrefetchQuery],
        rerank: &QueryVector,
        final_limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError>;
}
