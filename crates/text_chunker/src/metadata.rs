// src/metadata.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open string-keyed metadata attached to every chunk.
pub type Metadata = Map<String, Value>;

pub const CHUNK_INDEX_KEY: &str = "chunk_index";
pub const CHUNK_COUNT_KEY: &str = "chunk_count";
pub const CHUNK_SIZE_KEY: &str = "chunk_size";
pub const IS_FIRST_CHUNK_KEY: &str = "is_first_chunk";
pub const IS_LAST_CHUNK_KEY: &str = "is_last_chunk";

/// A span of a document's text plus its metadata.
///
/// Serializes as `{"text": ..., "metadata": {...}}`, the shape used by
/// persisted chunk files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    /// Zero-based position within the document's chunk sequence.
    pub fn index(&self) -> Option<usize> {
        self.metadata
            .get(CHUNK_INDEX_KEY)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
    }

    pub fn count(&self) -> Option<usize> {
        self.metadata
            .get(CHUNK_COUNT_KEY)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
    }

    pub fn is_first(&self) -> bool {
        self.flag(IS_FIRST_CHUNK_KEY)
    }

    pub fn is_last(&self) -> bool {
        self.flag(IS_LAST_CHUNK_KEY)
    }

    fn flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Turn split texts into chunk records.
///
/// Each chunk gets a copy of `base` followed by the positional keys, so
/// positional keys win over caller keys with the same name.
pub fn build_chunks(texts: Vec<String>, base: Option<&Metadata>) -> Vec<Chunk> {
    let count = texts.len();

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = base.cloned().unwrap_or_default();
            metadata.insert(CHUNK_INDEX_KEY.to_string(), Value::from(i));
            metadata.insert(CHUNK_COUNT_KEY.to_string(), Value::from(count));
            metadata.insert(
                CHUNK_SIZE_KEY.to_string(),
                Value::from(text.chars().count()),
            );
            metadata.insert(IS_FIRST_CHUNK_KEY.to_string(), Value::Bool(i == 0));
            metadata.insert(IS_LAST_CHUNK_KEY.to_string(), Value::Bool(i + 1 == count));
            Chunk { text, metadata }
        })
        .collect()
}
