// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end memory flow tests over deterministic mock adapters and the
//! in-memory vector store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use companio_config::model::CompanioConfig;
use companio_core::error::CompanioError;
use companio_memory::{categorize, MemoryService};
use companio_test_utils::{
    InMemoryVectorStore, MockDenseEmbedder, MockLateEmbedder, MockSparseEmbedder,
};

struct Harness {
    service: MemoryService,
    sparse: Arc<MockSparseEmbedder>,
    dense: Arc<MockDenseEmbedder>,
    late: Arc<MockLateEmbedder>,
    store: Arc<InMemoryVectorStore>,
    collection: String,
}

fn harness() -> Harness {
    harness_with(CompanioConfig::default())
}

fn harness_with(config: CompanioConfig) -> Harness {
    let sparse = Arc::new(MockSparseEmbedder::new());
    let dense = Arc::new(MockDenseEmbedder::new(16));
    let late = Arc::new(MockLateEmbedder::new(16));
    let store = Arc::new(InMemoryVectorStore::new());
    let service = MemoryService::new(
        sparse.clone(),
        dense.clone(),
        late.clone(),
        store.clone(),
        &config,
    );
    Harness {
        service,
        sparse,
        dense,
        late,
        store,
        collection: config.store.collection,
    }
}

#[tokio::test]
async fn write_then_retrieve_round_trip() {
    let h = harness();
    h.service.init().await.unwrap();

    let text = "I love Earl Grey tea in the morning";
    let id = h
        .service
        .record_memory("rose", text, categorize(text))
        .await
        .unwrap()
        .expect("memory enabled");
    assert!(h.store.contains(&h.collection, id).await);

    let memories = h.service.retrieve_memories("what tea do I love").await;
    assert!(
        memories.iter().any(|m| m == text),
        "stored memory should be retrievable, got {memories:?}"
    );
}

#[tokio::test]
async fn retrieval_ranks_related_memory_first() {
    let h = harness();
    h.service.init().await.unwrap();

    let tea = "I love Earl Grey tea";
    let dog = "my dog is named Max";
    h.service
        .record_memory("rose", tea, categorize(tea))
        .await
        .unwrap();
    h.service
        .record_memory("rose", dog, categorize(dog))
        .await
        .unwrap();

    let memories = h.service.retrieve_memories("what is my dog named").await;
    assert_eq!(memories.first().map(String::as_str), Some(dog));
}

#[tokio::test]
async fn write_aborts_on_any_embedding_failure() {
    let h = harness();
    h.service.init().await.unwrap();

    h.late.set_failing(true);
    let err = h
        .service
        .record_memory("rose", "this must not persist", "chat_interaction")
        .await
        .unwrap_err();
    assert!(matches!(err, CompanioError::Embedding { .. }));
    assert_eq!(h.store.point_count(&h.collection).await, 0, "no partial record");

    h.late.set_failing(false);
    h.service
        .record_memory("rose", "this persists", "chat_interaction")
        .await
        .unwrap();
    assert_eq!(h.store.point_count(&h.collection).await, 1);
}

#[tokio::test]
async fn query_degrades_to_empty_when_store_is_down() {
    let h = harness();
    h.service.init().await.unwrap();
    h.service
        .record_memory("rose", "I enjoy crosswords", "preference")
        .await
        .unwrap();

    h.store.set_unavailable(true);
    let memories = h.service.retrieve_memories("crosswords").await;
    assert!(memories.is_empty(), "store outage is not an error on the query path");
}

#[tokio::test]
async fn write_fails_hard_when_store_is_down() {
    let h = harness();
    h.service.init().await.unwrap();

    h.store.set_unavailable(true);
    let err = h
        .service
        .record_memory("rose", "unreachable store", "chat_interaction")
        .await
        .unwrap_err();
    assert!(matches!(err, CompanioError::StoreUnavailable { .. }));
}

#[tokio::test]
async fn failing_channel_degrades_but_retrieval_continues() {
    let h = harness();
    h.service.init().await.unwrap();

    let text = "I love Earl Grey tea";
    h.service
        .record_memory("rose", text, categorize(text))
        .await
        .unwrap();

    // Dense channel down at query time: sparse and late still match.
    h.dense.set_failing(true);
    let memories = h.service.retrieve_memories("Earl Grey tea").await;
    assert!(memories.iter().any(|m| m == text));
}

#[tokio::test]
async fn all_channels_failing_yields_empty_not_error() {
    let h = harness();
    h.service.init().await.unwrap();
    h.service
        .record_memory("rose", "I enjoy gardening", "preference")
        .await
        .unwrap();

    h.sparse.set_failing(true);
    h.dense.set_failing(true);
    h.late.set_failing(true);
    let memories = h.service.retrieve_memories("gardening").await;
    assert!(memories.is_empty());
}

#[tokio::test]
async fn cancelled_retrieval_returns_cancelled() {
    let h = harness();
    h.service.init().await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = h
        .service
        .retriever()
        .retrieve_cancellable("anything", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, CompanioError::Cancelled));
}

#[tokio::test]
async fn concurrent_init_creates_collection_once() {
    let h = harness();
    let service = Arc::new(h.service);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.init().await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(h.store.create_count(), 1);
}

#[tokio::test]
async fn disabled_memory_is_inert() {
    let mut config = CompanioConfig::default();
    config.memory.enabled = false;
    let h = harness_with(config);

    h.service.init().await.unwrap();
    let id = h
        .service
        .record_memory("rose", "not saved", "chat_interaction")
        .await
        .unwrap();
    assert!(id.is_none());
    assert_eq!(h.store.create_count(), 0);
    assert!(h.service.retrieve_memories("anything").await.is_empty());
}
