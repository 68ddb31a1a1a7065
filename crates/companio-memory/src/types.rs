// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory record payload and the ephemeral retrieval result types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use companio_core::error::CompanioError;

/// Payload stored alongside a memory point's vectors.
///
/// `category` and `timestamp` are assigned once at write time and never
/// updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPayload {
    /// The natural-language memory content.
    pub memory_text: String,
    /// Category label assigned by the classifier at creation.
    pub category: String,
    /// UTC creation time, RFC 3339.
    pub timestamp: String,
    /// Originating user.
    pub user_id: String,
}

impl MemoryPayload {
    pub fn to_value(&self) -> Result<serde_json::Value, CompanioError> {
        serde_json::to_value(self)
            .map_err(|e| CompanioError::Internal(format!("payload serialization failed: {e}")))
    }
}

/// One pre-fusion hit from a single retrieval channel.
#[derive(Debug, Clone)]
pub struct ChannelHit {
    pub id: Uuid,
    pub text: String,
    pub score: f32,
}

/// One fused retrieval result, ordered descending by fusion score.
///
/// Constructed per query and discarded after the turn; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedMemory {
    pub id: Uuid,
    pub text: String,
    pub score: f32,
}

/// Pull the memory text out of a stored payload, tolerating older points
/// whose payload predates the current shape.
pub fn payload_text(payload: &serde_json::Value) -> String {
    payload
        .get("memory_text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_json() {
        let payload = MemoryPayload {
            memory_text: "loves gardening on Sundays".to_string(),
            category: "preference".to_string(),
            timestamp: "2026-08-25T10:00:00+00:00".to_string(),
            user_id: "rose".to_string(),
        };
        let value = payload.to_value().unwrap();
        assert_eq!(value["memory_text"], "loves gardening on Sundays");
        assert_eq!(payload_text(&value), "loves gardening on Sundays");
    }

    #[test]
    fn payload_text_tolerates_missing_field() {
        assert_eq!(payload_text(&serde_json::json!({})), "");
        assert_eq!(payload_text(&serde_json::Value::Null), "");
    }
}
