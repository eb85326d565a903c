//! Configuration loading for docprep.
//!
//! Every field is optional; accessors fall back to the defaults below.
//! Secrets never live in the file: API keys come from the environment.

use crate::collection::{COLLECTION_ID_ENV, DEFAULT_COLLECTION_BASE_URL, DEFAULT_QUERY_MODEL};
use crate::embeddings::{EmbeddingOptions, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL};
use crate::pipeline::{ChunkMode, ProcessOptions};
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use text_chunker::{
    CharRatioEstimator, Chunker, MultilingualEstimator, TokenChunker, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS, DEFAULT_SEPARATOR,
};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub chunking: Option<ChunkingConfig>,
    pub embeddings: Option<EmbeddingsConfig>,
    pub collection: Option<CollectionConfig>,
    pub paths: Option<PathsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub separator: Option<String>,
    /// Measure chunks in estimated tokens instead of characters
    pub by_tokens: Option<bool>,
    pub max_tokens: Option<usize>,
    pub overlap_tokens: Option<usize>,
    pub estimator: Option<EstimatorKind>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EmbeddingsConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub batch_size: Option<usize>,
    pub retry_limit: Option<usize>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CollectionConfig {
    pub base_url: Option<String>,
    pub collection_id: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PathsConfig {
    pub output_dir: Option<PathBuf>,
    pub text_dir: Option<PathBuf>,
}

/// Token estimator selectable from config or the command line.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Four characters per token
    #[default]
    Chars,
    /// Script-aware estimate for CJK and Arabic text
    Multilingual,
}

impl FromStr for EstimatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chars" => Ok(EstimatorKind::Chars),
            "multilingual" => Ok(EstimatorKind::Multilingual),
            other => bail!("unknown estimator '{other}': expected 'chars' or 'multilingual'"),
        }
    }
}

/// Default directory for chunk files
pub const DEFAULT_OUTPUT_DIR: &str = "chunks";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl Config {
    fn chunking(&self) -> ChunkingConfig {
        self.chunking.clone().unwrap_or_default()
    }

    fn embeddings(&self) -> EmbeddingsConfig {
        self.embeddings.clone().unwrap_or_default()
    }

    fn collection(&self) -> CollectionConfig {
        self.collection.clone().unwrap_or_default()
    }

    pub fn by_tokens(&self) -> bool {
        self.chunking().by_tokens.unwrap_or(false)
    }

    /// Validated chunker for the configured mode.
    pub fn chunk_mode(&self) -> Result<ChunkMode> {
        let chunking = self.chunking();

        if chunking.by_tokens.unwrap_or(false) {
            let builder = TokenChunker::builder()
                .max_tokens(chunking.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS))
                .overlap_tokens(chunking.overlap_tokens.unwrap_or(DEFAULT_OVERLAP_TOKENS));
            let builder = match chunking.estimator.unwrap_or_default() {
                EstimatorKind::Chars => builder.estimator(CharRatioEstimator::default()),
                EstimatorKind::Multilingual => builder.estimator(MultilingualEstimator),
            };
            let chunker = builder.build().context("Invalid token chunking settings")?;
            return Ok(ChunkMode::Tokens(chunker));
        }

        let chunker = Chunker::builder()
            .chunk_size(chunking.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE))
            .chunk_overlap(chunking.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP))
            .separator(
                chunking
                    .separator
                    .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string()),
            )
            .build()
            .context("Invalid chunking settings")?;
        Ok(ChunkMode::Characters(chunker))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.paths
            .as_ref()
            .and_then(|p| p.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn text_dir(&self) -> Option<PathBuf> {
        self.paths.as_ref().and_then(|p| p.text_dir.clone())
    }

    pub fn process_options(&self) -> Result<ProcessOptions> {
        Ok(ProcessOptions {
            output_dir: self.output_dir(),
            text_dir: self.text_dir(),
            mode: self.chunk_mode()?,
        })
    }

    pub fn embedding_model(&self) -> String {
        self.embeddings()
            .model
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string())
    }

    pub fn embedding_base_url(&self) -> String {
        self.embeddings()
            .base_url
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embeddings().timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn embedding_options(&self) -> EmbeddingOptions {
        let embeddings = self.embeddings();
        let defaults = EmbeddingOptions::default();
        EmbeddingOptions {
            batch_size: embeddings.batch_size.unwrap_or(defaults.batch_size),
            retry_limit: embeddings.retry_limit.unwrap_or(defaults.retry_limit),
            retry_delay: embeddings
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }

    pub fn collection_base_url(&self) -> String {
        self.collection()
            .base_url
            .unwrap_or_else(|| DEFAULT_COLLECTION_BASE_URL.to_string())
    }

    /// Configured collection, or WETRO_COLLECTION_ID when the file has none.
    pub fn collection_id(&self) -> Option<String> {
        self.collection()
            .collection_id
            .or_else(|| std::env::var(COLLECTION_ID_ENV).ok())
    }

    pub fn query_model(&self) -> String {
        self.collection()
            .model
            .unwrap_or_else(|| DEFAULT_QUERY_MODEL.to_string())
    }

    pub fn collection_timeout(&self) -> Duration {
        Duration::from_secs(self.collection().timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "docprep").context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(config)
}
