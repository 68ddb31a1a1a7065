// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store client for Companio.
//!
//! Implements the `VectorStore` trait from `companio-core` over the external
//! vector-indexing service's JSON/REST surface: race-safe collection creation,
//! atomic multi-channel point upserts, single-channel search, and two-stage
//! prefetch+rerank queries.

pub mod client;
pub mod wire;

pub use client::HttpVectorStore;
