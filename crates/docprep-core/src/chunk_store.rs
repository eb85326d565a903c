//! Chunk files on disk
//!
//! A chunk file is a pretty-printed JSON array of `{text, metadata}` objects,
//! with an `embedding` array added once the embedding stage has run.

use crate::files::ensure_directory_exists;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use text_chunker::{Chunk, Metadata};
use tracing::info;

/// Suffix added to a chunk file's stem for its embedded copy.
pub const EMBEDDINGS_SUFFIX: &str = "_with_embeddings";

/// Characters of chunk text shown in a sample preview.
pub const PREVIEW_CHARS: usize = 150;

/// Leading embedding values shown in a file summary.
pub const SHOWN_EMBEDDING_VALUES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl From<Chunk> for StoredChunk {
    fn from(chunk: Chunk) -> Self {
        Self {
            text: chunk.text,
            metadata: chunk.metadata,
            embedding: None,
        }
    }
}

/// Path of the chunk file for `document_id` inside `dir`.
pub fn chunks_path(dir: &Path, document_id: &str) -> PathBuf {
    dir.join(format!("{document_id}_chunks.json"))
}

/// Write `{document_id}_chunks.json` into `dir`, creating `dir` if needed.
pub fn save_chunks(dir: &Path, document_id: &str, chunks: &[StoredChunk]) -> Result<PathBuf> {
    ensure_directory_exists(dir)?;
    let path = chunks_path(dir, document_id);
    write_chunks(&path, chunks)?;
    Ok(path)
}

pub fn write_chunks(path: &Path, chunks: &[StoredChunk]) -> Result<()> {
    let json = serde_json::to_string_pretty(chunks).context("Failed to serialize chunks")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write chunks file: {}", path.display()))?;
    info!("Saved {} chunks to {}", chunks.len(), path.display());
    Ok(())
}

pub fn load_chunks(path: &Path) -> Result<Vec<StoredChunk>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunks file: {}", path.display()))?;
    let chunks: Vec<StoredChunk> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse chunks file: {}", path.display()))?;
    info!("Loaded {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

/// `dir/name.json` becomes `dir/name_with_embeddings.json`.
pub fn embeddings_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{EMBEDDINGS_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{EMBEDDINGS_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

/// Whether `path` names an already embedded chunk file.
pub fn is_embeddings_file(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().ends_with(EMBEDDINGS_SUFFIX))
        .unwrap_or(false)
}

/// A chunk shown in a file summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSample {
    pub index: usize,
    pub char_count: usize,
    pub preview: String,
    pub metadata: Metadata,
}

/// Overview of a chunk file's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFileInfo {
    pub chunk_count: usize,
    pub embedded_count: usize,
    /// Length of the first chunk's embedding, if it has one
    pub embedding_dimensions: Option<usize>,
    pub first_values: Vec<f32>,
    pub samples: Vec<ChunkSample>,
}

pub fn summarize_chunks(chunks: &[StoredChunk], sample_count: usize) -> ChunkFileInfo {
    let first_embedding = chunks.first().and_then(|c| c.embedding.as_ref());

    ChunkFileInfo {
        chunk_count: chunks.len(),
        embedded_count: chunks.iter().filter(|c| c.embedding.is_some()).count(),
        embedding_dimensions: first_embedding.map(Vec::len),
        first_values: first_embedding
            .map(|e| e.iter().take(SHOWN_EMBEDDING_VALUES).copied().collect())
            .unwrap_or_default(),
        samples: chunks
            .iter()
            .take(sample_count)
            .enumerate()
            .map(|(index, chunk)| ChunkSample {
                index,
                char_count: chunk.text.chars().count(),
                preview: preview_text(&chunk.text, PREVIEW_CHARS),
                metadata: chunk.metadata.clone(),
            })
            .collect(),
    }
}

/// Load a chunk file and summarize it.
pub fn chunk_file_info(path: &Path, sample_count: usize) -> Result<ChunkFileInfo> {
    let chunks = load_chunks(path)?;
    Ok(summarize_chunks(&chunks, sample_count))
}

/// First `max_chars` characters on a single line.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use text_chunker::create_document_chunks;

    fn sample_chunks() -> Vec<StoredChunk> {
        let base = json!({"document_id": "doc"}).as_object().cloned().unwrap();
        create_document_chunks("one\ntwo\nthree\nfour", Some(&base), 8, 0)
            .unwrap()
            .into_iter()
            .map(StoredChunk::from)
            .collect()
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("chunks");
        let chunks = sample_chunks();

        let path = save_chunks(&out, "doc", &chunks).unwrap();
        assert_eq!(path, out.join("doc_chunks.json"));
        assert_eq!(load_chunks(&path).unwrap(), chunks);
    }

    #[test]
    fn test_on_disk_shape() {
        let temp = TempDir::new().unwrap();
        let mut chunks = sample_chunks();
        chunks[0].embedding = Some(vec![0.5, -1.0]);

        let path = save_chunks(temp.path(), "doc", &chunks).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = raw.as_array().unwrap();

        assert_eq!(array[0]["embedding"], json!([0.5, -1.0]));
        assert!(array[1].get("embedding").is_none());
        assert_eq!(array[0]["metadata"]["document_id"], json!("doc"));
        assert_eq!(array[0]["metadata"]["chunk_index"], json!(0));
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_chunks(&path).is_err());
    }

    #[test]
    fn test_summarize_chunks() {
        let mut chunks = sample_chunks();
        chunks[0].embedding = Some(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);

        let info = summarize_chunks(&chunks, 2);
        assert_eq!(info.chunk_count, 3);
        assert_eq!(info.embedded_count, 1);
        assert_eq!(info.embedding_dimensions, Some(7));
        assert_eq!(info.first_values, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(info.samples.len(), 2);
        assert_eq!(info.samples[0].preview, "one two");
        assert_eq!(info.samples[1].char_count, 6);
        assert_eq!(info.samples[1].metadata["chunk_index"], json!(1));
    }

    #[test]
    fn test_summarize_without_embeddings() {
        let info = summarize_chunks(&sample_chunks(), 10);
        assert_eq!(info.embedding_dimensions, None);
        assert!(info.first_values.is_empty());
        assert_eq!(info.samples.len(), 3);

        let empty = summarize_chunks(&[], 2);
        assert_eq!(empty.chunk_count, 0);
        assert!(empty.samples.is_empty());
    }

    #[test]
    fn test_chunk_file_info_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = save_chunks(temp.path(), "doc", &sample_chunks()).unwrap();
        let info = chunk_file_info(&path, 1).unwrap();
        assert_eq!(info.chunk_count, 3);
        assert_eq!(info.samples.len(), 1);
    }

    #[test]
    fn test_preview_text() {
        let long = "a\n".repeat(200);
        let preview = preview_text(&long, PREVIEW_CHARS);
        assert_eq!(preview.chars().count(), 150);
        assert!(!preview.contains('\n'));
        assert_eq!(preview_text("héllo", 3), "hél");
    }

    #[test]
    fn test_is_embeddings_file() {
        assert!(is_embeddings_file(Path::new("out/doc_chunks_with_embeddings.json")));
        assert!(!is_embeddings_file(Path::new("out/doc_chunks.json")));
    }

    #[test]
    fn test_embeddings_output_path() {
        assert_eq!(
            embeddings_output_path(Path::new("/data/doc_chunks.json")),
            PathBuf::from("/data/doc_chunks_with_embeddings.json")
        );
        assert_eq!(
            embeddings_output_path(Path::new("chunks")),
            PathBuf::from("chunks_with_embeddings")
        );
    }
}
