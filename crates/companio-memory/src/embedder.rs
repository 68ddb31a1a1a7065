// SPDX-FileCopyrightText: 2026 Companio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX embedding adapter for local inference using all-MiniLM-L6-v2.
//!
//! One forward pass serves both vector channels: the dense output is
//! attention-masked mean pooling over the hidden states followed by L2
//! normalization, and the late-interaction output is the per-attended-token
//! hidden states, each L2-normalized, truncated to the configured maximum
//! sequence length.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use companio_config::model::EmbeddingConfig;
use companio_core::error::CompanioError;
use companio_core::traits::adapter::Adapter;
use companio_core::traits::embedding::{DenseEmbedder, LateInteractionEmbedder};
use companio_core::types::{AdapterType, EmbeddingChannel, HealthStatus};

/// Raw transformer output for one text.
struct Forward {
    /// Flat `[seq_len * hidden_size]` hidden states.
    hidden: Vec<f32>,
    attention_mask: Vec<i64>,
    seq_len: usize,
    hidden_size: usize,
}

/// ONNX-based embedding adapter serving the dense and late-interaction
/// channels from a single local model.
///
/// Loads `model.onnx` and `tokenizer.json` from the configured model
/// directory. All inference runs on CPU with a single thread.
pub struct OnnxEmbedder {
    /// ONNX Runtime session (not Send, wrapped in Mutex for safety).
    session: Mutex<Session>,
    /// HuggingFace tokenizer.
    tokenizer: tokenizers::Tokenizer,
    dimensions: usize,
    max_sequence_length: usize,
}

// Safety: Session is accessed through Mutex which provides synchronization.
// The tokenizer is thread-safe for encoding operations.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Creates a new ONNX embedder from model files on disk.
    ///
    /// Expects `model.onnx` and `tokenizer.json` inside `config.model_dir`.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, CompanioError> {
        let model_dir = Path::new(&config.model_dir);
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            CompanioError::Internal(format!(
                "Failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(|e| {
                CompanioError::Internal(format!("Failed to create ONNX session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| CompanioError::Internal(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| CompanioError::Internal(format!("Failed to set thread count: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                CompanioError::Internal(format!(
                    "Failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimensions: config.dense_dimensions,
            max_sequence_length: config.max_sequence_length,
        })
    }

    /// Tokenize and run the model once, returning the raw hidden states.
    fn forward(&self, text: &str) -> Result<Forward, String> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| format!("tokenization failed: {e}"))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> =
            encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let seq_len = input_ids.len();

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| format!("failed to create input_ids tensor: {e}"))?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| format!("failed to create attention_mask tensor: {e}"))?;
        let token_type_ids_array = Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| format!("failed to create token_type_ids tensor: {e}"))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("failed to lock ONNX session: {e}"))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(|e| format!("failed to create input_ids TensorRef: {e}"))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array)
            .map_err(|e| format!("failed to create attention_mask TensorRef: {e}"))?;
        let token_type_ids_tensor = TensorRef::from_array_view(&token_type_ids_array)
            .map_err(|e| format!("failed to create token_type_ids TensorRef: {e}"))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])
            .map_err(|e| format!("ONNX inference failed: {e}"))?;

        // Output shape [1, seq_len, hidden_size].
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| format!("failed to extract output tensor: {e}"))?;

        let hidden_size = shape[shape.len() - 1] as usize;

        Ok(Forward {
            hidden: data.to_vec(),
            attention_mask,
            seq_len,
            hidden_size,
        })
    }
}

/// Apply attention-masked mean pooling over token embeddings.
fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for i in 0..seq_len {
        if attention_mask[i] > 0 {
            for j in 0..hidden_size {
                sum[j] += embeddings[i * hidden_size + j];
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}

/// L2-normalize a vector.
fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

/// Extract the attended token vectors, L2-normalized, capped at `max_tokens`.
fn token_vectors(forward: &Forward, max_tokens: usize) -> Vec<Vec<f32>> {
    (0..forward.seq_len)
        .filter(|i| forward.attention_mask[*i] > 0)
        .take(max_tokens)
        .map(|i| {
            let start = i * forward.hidden_size;
            l2_normalize(&forward.hidden[start..start + forward.hidden_size])
        })
        .collect()
}

#[async_trait]
impl Adapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, CompanioError> {
        // Try to lock the session to verify it's alive
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Session lock poisoned: {e}"
            ))),
        }
    }
}

#[async_trait]
impl DenseEmbedder for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CompanioError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }
        let forward = self
            .forward(text)
            .map_err(|e| CompanioError::embedding(EmbeddingChannel::Dense, e))?;
        let pooled = mean_pool_with_attention(
            &forward.hidden,
            &forward.attention_mask,
            forward.seq_len,
            forward.hidden_size,
        );
        Ok(l2_normalize(&pooled))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl LateInteractionEmbedder for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, CompanioError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let forward = self
            .forward(text)
            .map_err(|e| CompanioError::embedding(EmbeddingChannel::LateInteraction, e))?;
        Ok(token_vectors(&forward, self.max_sequence_length))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
