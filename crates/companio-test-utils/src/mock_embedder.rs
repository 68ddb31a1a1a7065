// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic mock embedding adapters for tests.
//!
//! All three mocks derive their vectors from a stable FNV-1a hash of the
//! whitespace-lowercased tokens, so identical texts always embed identically
//! and texts sharing words score as similar. Each mock carries a fault switch
//! for write-atomicity and channel-degradation tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use companio_core::error::CompanioError;
use companio_core::traits::adapter::Adapter;
use companio_core::traits::embedding::{DenseEmbedder, LateInteractionEmbedder, SparseEmbedder};
use companio_core::types::{AdapterType, EmbeddingChannel, HealthStatus, SparseVector};

/// Stable 64-bit FNV-1a hash (independent of std's hasher seeding).
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn l2_normalize(mut vec: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vec {
            *v /= norm;
        }
    }
    vec
}

/// Hash-bag dense embedder: each token increments one hashed dimension,
/// then the vector is L2-normalized.
pub struct MockDenseEmbedder {
    dimensions: usize,
    fail: AtomicBool,
}

impl MockDenseEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `embed` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Compute the deterministic vector without going through the trait.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let idx = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vec[idx] += 1.0;
        }
        l2_normalize(vec)
    }
}

impl Default for MockDenseEmbedder {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl Adapter for MockDenseEmbedder {
    fn name(&self) -> &str {
        "mock-dense-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("fault injected".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl DenseEmbedder for MockDenseEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CompanioError::embedding(
                EmbeddingChannel::Dense,
                "fault injected",
            ));
        }
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Hashed term-frequency sparse embedder.
pub struct MockSparseEmbedder {
    fail: AtomicBool,
}

/// Vocabulary size the mock hashes term ids into.
const MOCK_VOCABULARY: u64 = 30_000;

impl MockSparseEmbedder {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `embed` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockSparseEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockSparseEmbedder {
    fn name(&self) -> &str {
        "mock-sparse-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("fault injected".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl SparseEmbedder for MockSparseEmbedder {
    async fn embed(&self, text: &str) -> Result<SparseVector, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CompanioError::embedding(
                EmbeddingChannel::Sparse,
                "fault injected",
            ));
        }

        let mut counts: std::collections::BTreeMap<u32, f32> = Default::default();
        for token in tokens(text) {
            let idx = (fnv1a(token.as_bytes()) % MOCK_VOCABULARY) as u32;
            *counts.entry(idx).or_insert(0.0) += 1.0;
        }
        Ok(SparseVector::from_pairs(counts.into_iter().collect()))
    }
}

/// Per-token late-interaction embedder: one hashed basis vector per token.
pub struct MockLateEmbedder {
    dimensions: usize,
    fail: AtomicBool,
}

impl MockLateEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `embed` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockLateEmbedder {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl Adapter for MockLateEmbedder {
    fn name(&self) -> &str {
        "mock-late-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("fault injected".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl LateInteractionEmbedder for MockLateEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, CompanioError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CompanioError::embedding(
                EmbeddingChannel::LateInteraction,
                "fault injected",
            ));
        }

        let vectors = tokens(text)
            .iter()
            .map(|token| {
                let mut vec = vec![0.0f32; self.dimensions];
                let idx = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
                vec[idx] = 1.0;
                vec
            })
            .collect();
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
