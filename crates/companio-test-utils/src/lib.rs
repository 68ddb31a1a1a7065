// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the Companio memory engine: deterministic hash-based
//! embedders with fault injection, and an in-memory vector store that scores
//! with the real per-channel similarity functions.

pub mod mock_embedder;
pub mod mock_store;

pub use mock_embedder::{MockDenseEmbedder, MockLateEmbedder, MockSparseEmbedder};
pub use mock_store::InMemoryVectorStore;
