// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by embedding adapters and the store client.

use async_trait::async_trait;

use crate::error::CompanioError;
use crate::types::{AdapterType, HealthStatus};

/// Base trait for all Companio adapters.
///
/// Provides identity and a health probe so the startup path can report
/// which collaborators are reachable before the first turn.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// The kind of adapter (embedding or vector store).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CompanioError>;
}
