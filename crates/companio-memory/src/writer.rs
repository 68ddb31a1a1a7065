// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory write path.
//!
//! A write either produces one fully-embedded durable record or nothing: all
//! three channel embeddings must succeed before the single atomic upsert, and
//! any failure aborts the whole write.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use companio_core::error::CompanioError;
use companio_core::traits::embedding::{DenseEmbedder, LateInteractionEmbedder, SparseEmbedder};
use companio_core::traits::store::VectorStore;
use companio_core::types::{PointRecord, RecordVectors};

use crate::types::MemoryPayload;

/// Writes fully-embedded memory records to the vector store.
pub struct MemoryWriter {
    sparse: Arc<dyn SparseEmbedder>,
    dense: Arc<dyn DenseEmbedder>,
    late: Arc<dyn LateInteractionEmbedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl MemoryWriter {
    pub fn new(
        sparse: Arc<dyn SparseEmbedder>,
        dense: Arc<dyn DenseEmbedder>,
        late: Arc<dyn LateInteractionEmbedder>,
        store: Arc<dyn VectorStore>,
        collection: String,
    ) -> Self {
        Self {
            sparse,
            dense,
            late,
            store,
            collection,
        }
    }

    /// Store one memory, returning the id of the durable record.
    ///
    /// The id is a fresh UUID v7 and the timestamp is the current UTC time;
    /// callers assign the category once via the classifier and the record is
    /// never reclassified. Any embedding or store failure propagates and
    /// leaves no partial record behind.
    pub async fn store_memory(
        &self,
        user_id: &str,
        text: &str,
        category: &str,
    ) -> Result<Uuid, CompanioError> {
        let sparse = self.sparse.embed(text).await?;
        let dense = self.dense.embed(text).await?;
        let late_interaction = self.late.embed(text).await?;

        let id = Uuid::now_v7();
        let payload = MemoryPayload {
            memory_text: text.to_string(),
            category: category.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            user_id: user_id.to_string(),
        };

        let point = PointRecord {
            id,
            vectors: RecordVectors {
                dense,
                sparse,
                late_interaction,
            },
            payload: payload.to_value()?,
        };

        self.store.upsert(&self.collection, point).await?;
        debug!(%id, category, "memory stored");
        Ok(id)
    }
}
