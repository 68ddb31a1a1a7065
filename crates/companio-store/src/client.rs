// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the vector-indexing service.
//!
//! Provides [`HttpVectorStore`], the `VectorStore` implementation used in
//! production deployments. Network failures map to
//! [`CompanioError::StoreUnavailable`] with the source error preserved;
//! querying a missing collection maps to [`CompanioError::CollectionMissing`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use companio_config::model::StoreConfig;
use companio_core::error::CompanioError;
use companio_core::traits::adapter::Adapter;
use companio_core::traits::store::VectorStore;
use companio_core::types::{
    AdapterType, CollectionSchema, HealthStatus, PointRecord, PrefetchQuery, QueryVector,
    ScoredPoint,
};

use crate::wire::{
    CreateCollectionRequest, ErrorResponse, QueryRequest, QueryResponse, UpsertRequest,
    WirePoint, WirePrefetch,
};

/// HTTP implementation of the [`VectorStore`] trait.
#[derive(Debug, Clone)]
pub struct HttpVectorStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVectorStore {
    /// Creates a new store client from configuration.
    pub fn new(config: &StoreConfig) -> Result<Self, CompanioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CompanioError::StoreUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}", self.base_url)
    }

    /// Run a query request against the query endpoint and parse the ranked
    /// points out of the response.
    async fn run_query(
        &self,
        collection: &str,
        request: &QueryRequest,
    ) -> Result<Vec<ScoredPoint>, CompanioError> {
        let url = format!("{}/points/query", self.collection_url(collection));
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| CompanioError::StoreUnavailable {
                message: format!("query request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CompanioError::CollectionMissing {
                collection: collection.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompanioError::store_unavailable(format!(
                "query returned {status}: {body}"
            )));
        }

        let parsed: QueryResponse =
            response
                .json()
                .await
                .map_err(|e| CompanioError::StoreUnavailable {
                    message: format!("malformed query response: {e}"),
                    source: Some(Box::new(e)),
                })?;

        Ok(parsed.result.points.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Adapter for HttpVectorStore {
    fn name(&self) -> &str {
        "http-vector-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        let url = format!("{}/collections", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Degraded(format!(
                "collections endpoint returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("unreachable: {e}"))),
        }
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), CompanioError> {
        let url = self.collection_url(name);

        // Existence probe first; create only when absent.
        let probe = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CompanioError::StoreUnavailable {
                message: format!("collection probe failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if probe.status().is_success() {
            debug!(collection = name, "collection already exists");
            return Ok(());
        }
        if probe.status() != StatusCode::NOT_FOUND {
            let status = probe.status();
            let body = probe.text().await.unwrap_or_default();
            return Err(CompanioError::store_unavailable(format!(
                "collection probe returned {status}: {body}"
            )));
        }

        let request = CreateCollectionRequest::from_schema(schema);
        let response = self
            .client
            .put(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompanioError::StoreUnavailable {
                message: format!("collection create failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(collection = name, "collection created");
            return Ok(());
        }

        // Another caller may have won the create race between our probe and
        // our PUT. That is success, not an error.
        let body = response.text().await.unwrap_or_default();
        let already_exists = status == StatusCode::CONFLICT
            || serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.status.error.to_lowercase().contains("already exists"))
                .unwrap_or(false);
        if already_exists {
            debug!(collection = name, "lost create race, collection exists");
            return Ok(());
        }

        Err(CompanioError::store_unavailable(format!(
            "collection create returned {status}: {body}"
        )))
    }

    async fn upsert(&self, collection: &str, point: PointRecord) -> Result<(), CompanioError> {
        let wire_point = WirePoint::from_record(point)
            .map_err(|e| CompanioError::Internal(format!("point serialization failed: {e}")))?;
        let request = UpsertRequest {
            points: vec![wire_point],
        };

        let url = format!("{}/points?wait=true", self.collection_url(collection));
        let response = self
            .client
            .put(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompanioError::StoreUnavailable {
                message: format!("upsert request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CompanioError::CollectionMissing {
                collection: collection.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(collection, status = %status, "upsert rejected by store");
            return Err(CompanioError::store_unavailable(format!(
                "upsert returned {status}: {body}"
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &QueryVector,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError> {
        let request = QueryRequest {
            prefetch: None,
            query: query.clone(),
            using: query.channel().to_string(),
            limit,
            with_payload: true,
        };
        self.run_query(collection, &request).await
    }

    async fn query(
        &self,
        collection: &str,
        prefetch: &[PrefetchQuery],
        rerank: &QueryVector,
        final_limit: usize,
    ) -> Result<Vec<ScoredPoint>, CompanioError> {
        let stages: Vec<WirePrefetch> = prefetch
            .iter()
            .map(|stage| WirePrefetch {
                query: stage.query.clone(),
                using: stage.query.channel().to_string(),
                limit: stage.limit,
            })
            .collect();

        let request = QueryRequest {
            prefetch: (!stages.is_empty()).then_some(stages),
            query: rerank.clone(),
            using: rerank.channel().to_string(),
            limit: final_limit,
            with_payload: true,
        };
        self.run_query(collection, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companio_core::types::{Distance, EmbeddingChannel, RecordVectors, SparseVector, VectorSpec};
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> HttpVectorStore {
        let config = StoreConfig {
            url: server.uri(),
            collection: "companio_memories".to_string(),
            request_timeout_secs: 5,
        };
        HttpVectorStore::new(&config).unwrap()
    }

    fn schema() -> CollectionSchema {
        CollectionSchema {
            channels: vec![
                (EmbeddingChannel::Sparse, VectorSpec::Sparse),
                (
                    EmbeddingChannel::Dense,
                    VectorSpec::Dense {
                        size: 4,
                        distance: Distance::Cosine,
                    },
                ),
                (
                    EmbeddingChannel::LateInteraction,
                    VectorSpec::MultiVector {
                        size: 4,
                        distance: Distance::Cosine,
                    },
                ),
            ],
        }
    }

    fn point() -> PointRecord {
        PointRecord {
            id: Uuid::now_v7(),
            vectors: RecordVectors {
                dense: vec![0.1, 0.2, 0.3, 0.4],
                sparse: SparseVector::from_pairs(vec![(1, 1.0)]),
                late_interaction: vec![vec![0.1, 0.2, 0.3, 0.4]],
            },
            payload: serde_json::json!({"memory_text": "likes tea"}),
        }
    }

    #[tokio::test]
    async fn ensure_collection_skips_create_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/mem"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        // No PUT expected; wiremock would 404 and fail the call if issued.

        store_for(&server)
            .ensure_collection("mem", &schema())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ensure_collection_creates_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/mem"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/mem"))
            .and(body_partial_json(serde_json::json!({
                "vectors": {"dense": {"size": 4, "distance": "Cosine"}}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server)
            .ensure_collection("mem", &schema())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ensure_collection_tolerates_lost_create_race() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/mem"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/mem"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "status": {"error": "collection `mem` already exists"}
            })))
            .mount(&server)
            .await;

        store_for(&server)
            .ensure_collection("mem", &schema())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upsert_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/collections/mem/points"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server).upsert("mem", point()).await.unwrap();
    }

    #[tokio::test]
    async fn upsert_failure_is_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/collections/mem/points"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = store_for(&server).upsert("mem", point()).await.unwrap_err();
        assert!(matches!(err, CompanioError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn query_missing_collection_maps_to_collection_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/mem/points/query"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .search("mem", &QueryVector::Dense(vec![0.1]), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CompanioError::CollectionMissing { .. }));
    }

    #[tokio::test]
    async fn two_stage_query_sends_prefetch_and_parses_points() {
        let server = MockServer::start().await;
        let id = Uuid::now_v7();
        Mock::given(method("POST"))
            .and(path("/collections/mem/points/query"))
            .and(body_partial_json(serde_json::json!({
                "using": "late_interaction",
                "limit": 5,
                "prefetch": [
                    {"using": "sparse", "limit": 10},
                    {"using": "dense", "limit": 10}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"points": [
                    {"id": id, "score": 1.5, "payload": {"memory_text": "likes tea"}}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let prefetch = vec![
            PrefetchQuery {
                query: QueryVector::Sparse(SparseVector::from_pairs(vec![(1, 1.0)])),
                limit: 10,
            },
            PrefetchQuery {
                query: QueryVector::Dense(vec![0.1, 0.2]),
                limit: 10,
            },
        ];
        let results = store_for(&server)
            .query(
                "mem",
                &prefetch,
                &QueryVector::MultiVector(vec![vec![0.1, 0.2]]),
                5,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, id);
        assert_eq!(results[0].payload["memory_text"], "likes tea");
    }
}
