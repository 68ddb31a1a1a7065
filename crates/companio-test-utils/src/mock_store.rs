// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector store implementing the real scoring semantics: cosine for
//! dense, sparse dot product, and MaxSim for late-interaction multi-vectors.
//! Carries an availability switch so tests can simulate a store outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use companio_core::error::CompanioError;
use companio_core::traits::adapter::Adapter;
use companio_core::traits::store::VectorStore;
use companio_core::types::{
    cosine_similarity, max_sim, AdapterType, CollectionSchema, HealthStatus, PointRecord,
    PrefetchQuery, QueryVector, ScoredPoint,
};

struct StoredCollection {
    #[allow(dead_code)]
    schema: CollectionSchema,
    /// Points in insertion order; upserts replace in place.
    points: Vec<PointRecord>,
}

/// In-memory [`VectorStore`] with genuine per-channel scoring.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: Mutex<HashMap<String, StoredCollection>>,
    unavailable: AtomicBool,
    creates: AtomicUsize,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent store call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many times `ensure_collection` actually created a collection.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub async fn point_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map(|c| c.points.len())
            .unwrap_or(0)
    }

    pub async fn contains(&self, collection: &str, id: Uuid) -> bool {
        self.collections
            .lock()
            .await
            .get(collection)
            .is_some_and(|c| c.points.iter().any(|p| p.id == id))
    }

    fn check_available(&self) -> Result<(), CompanioError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CompanioError::store_unavailable("store marked unavailable"));
        }
        Ok(())
    }

    fn score(query: &QueryVector, point: &PointRecord) -> f32 {
        match query {
            QueryVector::Dense(q) => cosine_similarity(q, &point.vectors.dense),
            QueryVector::Sparse(q) => q.dot(&point.vectors.sparse),
            QueryVector::MultiVector(q) => max_sim(q, &point.vectors.late_interaction),
        }
    }

    /// Rank `points` by similarity to `query`, best first, ties keeping
    /// insertion order.
    fn rank<'a, I>(query: &QueryVector, points: I, limit: usize) -> Vec<ScoredPoint>
    where
        I: Iterator<Item = &'a PointRecord>,
    {
        let mut scored: Vec<ScoredPoint> = points
            .map(|p| ScoredPoint {
                id: p.id,
                score: Self::score(query, p),
                payload: p.payload.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }
}

#[async_trait]
impl Adapter for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in-memory-vector-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("store marked unavailable".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), CompanioError> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        if !collections.contains_key(name) {
            collections.insert(
                name.to_string(),
                StoredCollection {
                    schema: schema.clone(),
                    points: Vec::new(),
                },
            );
            self.creates.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, point: PointRecord) -> Result<(), CompanioError> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| CompanioError::CollectionMissing {
                collection: collection.to_string(),
            })?;
        match stored.points.iter_mut().find(|p| p.id == point.id) {
            Some(existing) => *existing = point,
            None => stored.points.push(point),
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &QueryVector,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError> {
        self.check_available()?;
        let collections = self.collections.lock().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| CompanioError::CollectionMissing {
                collection: collection.to_string(),
            })?;
        Ok(Self::rank(query, stored.points.iter(), limit))
    }

    async fn query(
        &self,
        collection: &str,
        prefetch: &[PrefetchQuery],
        rerank: &QueryVector,
        final_limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError> {
        self.check_available()?;
        let collections = self.collections.lock().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| CompanioError::CollectionMissing {
                collection: collection.to_string(),
            })?;

        // Candidate union across prefetch stages, first-seen order preserved.
        // No prefetch stages means the rerank scans the whole collection.
        let candidates: Vec<&PointRecord> = if prefetch.is_empty() {
            stored.points.iter().collect()
        } else {
            let mut ids: Vec<Uuid> = Vec::new();
            for stage in prefetch {
                for hit in Self::rank(&stage.query, stored.points.iter(), stage.limit) {
                    if !ids.contains(&hit.id) {
                        ids.push(hit.id);
                    }
                }
            }
            ids.iter()
                .filter_map(|id| stored.points.iter().find(|p| p.id == *id))
                .collect()
        };

        Ok(Self::rank(rerank, candidates.into_iter(), final_limit))
    }
}
