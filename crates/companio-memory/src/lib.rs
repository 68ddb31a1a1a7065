// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid memory retrieval and fusion engine.
//!
//! Three embedding channels (dense semantic, sparse lexical, late-interaction
//! token-level) feed a two-stage vector store query pipeline; per-channel
//! ranked lists are merged with weighted Reciprocal Rank Fusion. The write
//! path stores fully-embedded records atomically, and [`MemoryService`] ties
//! both paths together behind one capability struct.

pub mod classifier;
pub mod embedder;
pub mod retriever;
pub mod service;
pub mod sparse;
pub mod types;
pub mod writer;

pub use classifier::categorize;
pub use embedder::OnnxEmbedder;
pub use retriever::{reciprocal_rank_fusion, HybridRetriever};
pub use service::{memory_collection_schema, MemoryService};
pub use sparse::Bm25Embedder;
pub use types::{ChannelHit, FusedMemory, MemoryPayload};
pub use writer::MemoryWriter;
