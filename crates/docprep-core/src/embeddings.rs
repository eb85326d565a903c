//! Embedding generation for chunk files
//!
//! [`EmbeddingGenerator`] batches texts, retries failed batches with
//! exponential backoff, and reassembles results in input order. The remote
//! model sits behind [`EmbeddingBackend`]; [`OpenAiBackend`] talks to an
//! OpenAI-compatible `/embeddings` endpoint.

use crate::chunk_store::{
    embeddings_output_path, is_embeddings_file, load_chunks, write_chunks, StoredChunk,
};
use crate::files::list_files_with_extension;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// One embedding tagged with the position of its input in the batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexedEmbedding {
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// A remote embedding model.
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a batch of texts. Results may come back in any order; each
    /// carries the index of its input.
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<IndexedEmbedding>>;

    /// Get the name of this backend for logging
    fn name(&self) -> &str;
}

/// OpenAI-compatible embeddings endpoint.
pub struct OpenAiBackend {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<IndexedEmbedding>,
}

impl OpenAiBackend {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a custom base URL (for proxies or compatible servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variable OPENAI_API_KEY
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .context("OPENAI_API_KEY environment variable not set")?;
        Ok(Self::new(api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingBackend for OpenAiBackend {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<IndexedEmbedding>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let response = ureq::post(&format!("{}/embeddings", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("content-type", "application/json")
            .timeout(self.timeout)
            .send_json(&request)
            .context("Failed to call embeddings API")?;

        let response: EmbeddingResponse = response
            .into_json()
            .context("Failed to parse embeddings response")?;

        debug!("Embedded {} texts with {}", response.data.len(), self.model);
        Ok(response.data)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Batching and retry behavior
#[derive(Debug, Clone)]
pub struct EmbeddingOptions {
    /// Texts sent per request
    pub batch_size: usize,
    /// Attempts per batch before giving up
    pub retry_limit: usize,
    /// Base delay; attempt `n` waits `retry_delay * 2^n`
    pub retry_delay: Duration,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            batch_size: 20,
            retry_limit: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of embedding every chunk file in a directory. Failures do not
/// stop the batch.
#[derive(Debug, Default)]
pub struct EmbeddingReport {
    /// Output paths of the files that were embedded
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Chunk files in `dir` that still need embeddings: every `.json` file
/// except `*_with_embeddings.json` outputs.
pub fn pending_chunk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files_with_extension(dir, "json")?
        .into_iter()
        .filter(|path| !is_embeddings_file(path))
        .collect())
}

pub struct EmbeddingGenerator {
    backend: Box<dyn EmbeddingBackend>,
    options: EmbeddingOptions,
}

impl EmbeddingGenerator {
    pub fn new(backend: impl EmbeddingBackend + 'static) -> Self {
        Self::with_options(backend, EmbeddingOptions::default())
    }

    pub fn with_options(backend: impl EmbeddingBackend + 'static, options: EmbeddingOptions) -> Self {
        Self {
            backend: Box::new(backend),
            options,
        }
    }

    pub fn options(&self) -> &EmbeddingOptions {
        &self.options
    }

    /// Embedding for a single text. Blank text yields an empty vector.
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            warn!("Empty text provided for embedding generation");
            return Ok(vec![]);
        }

        let mut embeddings = self.embed_with_retry(&[text.to_string()])?;
        embeddings
            .pop()
            .context("Embedding backend returned no result")
    }

    /// Embeddings for every text, in input order.
    pub fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            warn!("Empty list provided for embedding generation");
            return Ok(vec![]);
        }

        let batch_size = self.options.batch_size.max(1);
        let total_batches = texts.len().div_ceil(batch_size);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
            info!(
                "Processing batch {}/{} ({} texts) with {}",
                batch_no + 1,
                total_batches,
                batch.len(),
                self.backend.name()
            );
            all_embeddings.extend(self.embed_with_retry(batch)?);
        }

        Ok(all_embeddings)
    }

    /// Attach an embedding to every chunk. Text and metadata are unchanged.
    pub fn embed_document_chunks(&self, mut chunks: Vec<StoredChunk>) -> Result<Vec<StoredChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.generate_embeddings(&texts)?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }
        Ok(chunks)
    }

    /// Load a chunk file, embed it, and save the result to `output` (or the
    /// `_with_embeddings` sibling of `input`). Returns the output path.
    pub fn process_chunks_file(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| embeddings_output_path(input));

        let chunks = load_chunks(input)?;
        let chunks = self.embed_document_chunks(chunks)?;
        write_chunks(&output, &chunks)?;

        Ok(output)
    }

    /// Run [`Self::process_chunks_file`] on every pending chunk file in
    /// `dir`, writing each output next to its input.
    pub fn process_chunks_directory(&self, dir: &Path) -> Result<EmbeddingReport> {
        let files = pending_chunk_files(dir)?;
        if files.is_empty() {
            warn!("No chunks files found in {}", dir.display());
        } else {
            info!("Found {} chunks files in {}", files.len(), dir.display());
        }

        let mut report = EmbeddingReport::default();
        for file in files {
            match self.process_chunks_file(&file, None) {
                Ok(output) => report.processed.push(output),
                Err(e) => {
                    warn!("Failed to embed {}: {:#}", file.display(), e);
                    report.failed.push((file, format!("{e:#}")));
                }
            }
        }

        info!(
            "Embedded {} of {} chunks files",
            report.processed.len(),
            report.processed.len() + report.failed.len()
        );
        Ok(report)
    }

    fn embed_with_retry(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let retry_limit = self.options.retry_limit.max(1);
        let mut attempt = 0;

        loop {
            let result = self
                .backend
                .embed_batch(batch)
                .and_then(|results| order_batch(results, batch.len()));

            match result {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {:#}", attempt + 1, retry_limit, e);
                    if attempt + 1 >= retry_limit {
                        return Err(e.context(format!(
                            "Failed to generate embeddings after {retry_limit} attempts"
                        )));
                    }

                    let wait = backoff_delay(self.options.retry_delay, attempt);
                    info!("Waiting {:?} before retrying", wait);
                    std::thread::sleep(wait);
                    attempt += 1;
                }
            }
        }
    }
}

/// Wait before retry number `attempt` (0-based): `base * 2^attempt`,
/// saturating instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: usize) -> Duration {
    let factor = u32::try_from(attempt)
        .ok()
        .and_then(|exp| 2u32.checked_pow(exp))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Sort batch results by index and check they cover every input exactly once.
fn order_batch(mut results: Vec<IndexedEmbedding>, expected: usize) -> Result<Vec<Vec<f32>>> {
    results.sort_by_key(|r| r.index);

    if results.len() != expected {
        bail!(
            "Embedding backend returned {} results for {} inputs",
            results.len(),
            expected
        );
    }
    if let Some((pos, r)) = results.iter().enumerate().find(|(pos, r)| r.index != *pos) {
        bail!("Embedding result at position {} has index {}", pos, r.index);
    }

    Ok(results.into_iter().map(|r| r.embedding).collect())
}
