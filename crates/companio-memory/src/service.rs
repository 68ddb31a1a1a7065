// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory service facade.
//!
//! An explicit capability struct: it owns the adapter handles and the memory
//! configuration, is constructed once at startup, and is passed by reference.
//! There is no registry lookup and no process-global state.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use companio_config::model::CompanioConfig;
use companio_core::error::CompanioError;
use companio_core::traits::embedding::{DenseEmbedder, LateInteractionEmbedder, SparseEmbedder};
use companio_core::traits::store::VectorStore;
use companio_core::types::{
    CollectionSchema, Distance, EmbeddingChannel, HealthStatus, VectorSpec,
};

use crate::retriever::HybridRetriever;
use crate::writer::MemoryWriter;

/// The collection schema for memory records: one named sub-vector per
/// embedding channel, in fixed channel order.
pub fn memory_collection_schema(dimensions: usize) -> CollectionSchema {
    CollectionSchema {
        channels: vec![
            (EmbeddingChannel::Sparse, VectorSpec::Sparse),
            (
                EmbeddingChannel::Dense,
                VectorSpec::Dense {
                    size: dimensions,
                    distance: Distance::Cosine,
                },
            ),
            (
                EmbeddingChannel::LateInteraction,
                VectorSpec::MultiVector {
                    size: dimensions,
                    distance: Distance::Cosine,
                },
            ),
        ],
    }
}

/// Facade over the retrieval and write paths of the memory engine.
pub struct MemoryService {
    store: Arc<dyn VectorStore>,
    retriever: HybridRetriever,
    writer: MemoryWriter,
    collection: String,
    schema: CollectionSchema,
    enabled: bool,
}

impl MemoryService {
    pub fn new(
        sparse: Arc<dyn SparseEmbedder>,
        dense: Arc<dyn DenseEmbedder>,
        late: Arc<dyn LateInteractionEmbedder>,
        store: Arc<dyn VectorStore>,
        config: &CompanioConfig,
    ) -> Self {
        let collection = config.store.collection.clone();
        let schema = memory_collection_schema(dense.dimensions());
        let retriever = HybridRetriever::new(
            sparse.clone(),
            dense.clone(),
            late.clone(),
            store.clone(),
            collection.clone(),
            config.memory.clone(),
        );
        let writer = MemoryWriter::new(sparse, dense, late, store.clone(), collection.clone());
        Self {
            store,
            retriever,
            writer,
            collection,
            schema,
            enabled: config.memory.enabled,
        }
    }

    /// Prepare the store for use: verify it responds and create the memory
    /// collection if this is the first run. Safe to race with other starters.
    pub async fn init(&self) -> Result<(), CompanioError> {
        if !self.enabled {
            debug!("memory disabled, skipping store initialization");
            return Ok(());
        }
        match self.store.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                warn!(store = self.store.name(), reason, "vector store degraded");
            }
            HealthStatus::Unhealthy(reason) => {
                warn!(store = self.store.name(), reason, "vector store unhealthy");
            }
        }
        self.store
            .ensure_collection(&self.collection, &self.schema)
            .await?;
        debug!(collection = %self.collection, "memory collection ready");
        Ok(())
    }

    /// Direct access to the underlying retriever (for cancellable retrieval).
    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    /// Retrieve memory texts relevant to a query.
    ///
    /// Infallible inbound surface: any retrieval failure degrades to an
    /// empty list with a warning, and the caller's turn continues.
    pub async fn retrieve_memories(&self, query: &str) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        match self.retriever.retrieve(query).await {
            Ok(memories) => memories.into_iter().map(|m| m.text).collect(),
            Err(e) => {
                warn!(error = %e, "memory retrieval failed, continuing without memories");
                Vec::new()
            }
        }
    }

    /// Record one memory for a user, returning the new record's id.
    ///
    /// Write failures propagate: the caller decides whether the turn goes on
    /// without the memory being saved.
    pub async fn record_memory(
        &self,
        user_id: &str,
        text: &str,
        category: &str,
    ) -> Result<Option<Uuid>, CompanioError> {
        if !self.enabled {
            return Ok(None);
        }
        self.writer
            .store_memory(user_id, text, category)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_all_three_channels() {
        let schema = memory_collection_schema(384);
        assert_eq!(schema.channels.len(), 3);
        assert_eq!(
            schema.spec(EmbeddingChannel::Dense),
            Some(&VectorSpec::Dense {
                size: 384,
                distance: Distance::Cosine
            })
        );
        assert_eq!(schema.spec(EmbeddingChannel::Sparse), Some(&VectorSpec::Sparse));
        assert!(matches!(
            schema.spec(EmbeddingChannel::LateInteraction),
            Some(VectorSpec::MultiVector { size: 384, .. })
        ));
    }
}
