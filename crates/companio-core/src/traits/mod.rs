// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Companio memory engine.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use adapter::Adapter;
pub use embedding::{DenseEmbedder, LateInteractionEmbedder, SparseEmbedder};
pub use store::VectorStore;
