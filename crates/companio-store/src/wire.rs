// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON wire types for the vector-indexing service.
//!
//! The dialect is minimal by design: named sub-vectors per embedding channel,
//! point upserts carrying all channels plus a payload, and a query endpoint
//! that accepts optional per-channel prefetch stages before the final scoring
//! vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use companio_core::types::{
    CollectionSchema, Distance, EmbeddingChannel, PointRecord, QueryVector, ScoredPoint,
    VectorSpec,
};

/// `PUT /collections/{name}` request body.
#[derive(Debug, Serialize)]
pub struct CreateCollectionRequest {
    pub vectors: BTreeMap<String, NamedVectorSpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sparse_vectors: BTreeMap<String, SparseVectorSpec>,
}

/// Schema of one named dense or multi-vector channel.
#[derive(Debug, Serialize)]
pub struct NamedVectorSpec {
    pub size: usize,
    pub distance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multivector_config: Option<MultivectorConfig>,
}

/// Marks a named channel as MaxSim-aggregated token vectors.
#[derive(Debug, Serialize)]
pub struct MultivectorConfig {
    pub comparator: String,
}

/// Schema of a named sparse channel (no parameters needed).
#[derive(Debug, Serialize)]
pub struct SparseVectorSpec {}

impl CreateCollectionRequest {
    /// Translate the engine's collection schema into the wire shape.
    pub fn from_schema(schema: &CollectionSchema) -> Self {
        let mut vectors = BTreeMap::new();
        let mut sparse_vectors = BTreeMap::new();

        for (channel, spec) in &schema.channels {
            let name = channel.to_string();
            match spec {
                VectorSpec::Dense { size, distance } => {
                    vectors.insert(
                        name,
                        NamedVectorSpec {
                            size: *size,
                            distance: distance_name(*distance),
                            multivector_config: None,
                        },
                    );
                }
                VectorSpec::MultiVector { size, distance } => {
                    vectors.insert(
                        name,
                        NamedVectorSpec {
                            size: *size,
                            distance: distance_name(*distance),
                            multivector_config: Some(MultivectorConfig {
                                comparator: "max_sim".to_string(),
                            }),
                        },
                    );
                }
                VectorSpec::Sparse => {
                    sparse_vectors.insert(name, SparseVectorSpec {});
                }
            }
        }

        Self {
            vectors,
            sparse_vectors,
        }
    }
}

fn distance_name(distance: Distance) -> String {
    distance.to_string()
}

/// `PUT /collections/{name}/points` request body.
#[derive(Debug, Serialize)]
pub struct UpsertRequest {
    pub points: Vec<WirePoint>,
}

/// One point: id, all named channel vectors, and the opaque payload.
#[derive(Debug, Serialize)]
pub struct WirePoint {
    pub id: Uuid,
    pub vector: BTreeMap<String, serde_json::Value>,
    pub payload: serde_json::Value,
}

impl WirePoint {
    pub fn from_record(point: PointRecord) -> Result<Self, serde_json::Error> {
        let mut vector = BTreeMap::new();
        vector.insert(
            EmbeddingChannel::Dense.to_string(),
            serde_json::to_value(&point.vectors.dense)?,
        );
        vector.insert(
            EmbeddingChannel::Sparse.to_string(),
            serde_json::to_value(&point.vectors.sparse)?,
        );
        vector.insert(
            EmbeddingChannel::LateInteraction.to_string(),
            serde_json::to_value(&point.vectors.late_interaction)?,
        );
        Ok(Self {
            id: point.id,
            vector,
            payload: point.payload,
        })
    }
}

/// `POST /collections/{name}/points/query` request body.
#[derive(Debug, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<Vec<WirePrefetch>>,
    pub query: QueryVector,
    pub using: String,
    pub limit: usize,
    pub with_payload: bool,
}

/// One candidate-generation stage.
#[derive(Debug, Serialize)]
pub struct WirePrefetch {
    pub query: QueryVector,
    pub using: String,
    pub limit: usize,
}

/// `POST .../points/query` response body.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub result: QueryResultBody,
}

#[derive(Debug, Deserialize)]
pub struct QueryResultBody {
    pub points: Vec<WireScoredPoint>,
}

#[derive(Debug, Deserialize)]
pub struct WireScoredPoint {
    pub id: Uuid,
    pub score: f32,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl From<WireScoredPoint> for ScoredPoint {
    fn from(point: WireScoredPoint) -> Self {
        ScoredPoint {
            id: point.id,
            score: point.score,
            payload: point.payload,
        }
    }
}

/// Error body returned by the service (best-effort shape).
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: ErrorStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub error: String,
}
