// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Companio memory engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common vector/channel types used throughout the Companio workspace. The
//! embedding adapters, the vector store client, and the retrieval fusion
//! engine all build on the contracts defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CompanioError;
pub use types::{EmbeddingChannel, HealthStatus, SparseVector};

// Re-export all adapter traits at crate root.
pub use traits::{Adapter, DenseEmbedder, LateInteractionEmbedder, SparseEmbedder, VectorStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_channel_round_trips_through_strings() {
        use std::str::FromStr;

        for channel in EmbeddingChannel::ALL {
            let s = channel.to_string();
            let parsed = EmbeddingChannel::from_str(&s).expect("should parse back");
            assert_eq!(channel, parsed);
        }
    }

    #[test]
    fn embedding_channel_serialization() {
        let channel = EmbeddingChannel::LateInteraction;
        let json = serde_json::to_string(&channel).expect("should serialize");
        assert_eq!(json, "\"late_interaction\"");
        let parsed: EmbeddingChannel = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(channel, parsed);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Verifies that the adapter traits compile and are accessible through
        // the public API. If any module is missing, this test won't compile.
        fn _assert_adapter<T: Adapter>() {}
        fn _assert_dense<T: DenseEmbedder>() {}
        fn _assert_sparse<T: SparseEmbedder>() {}
        fn _assert_late<T: LateInteractionEmbedder>() {}
        fn _assert_store<T: VectorStore>() {}
    }
}
