//! Integration tests for docprep-core
//!
//! These tests run the preparation pipeline against a temporary directory:
//! - Chunk text files into chunk files
//! - Embed a chunk file with a local backend
//! - Keep going when one file in a directory fails

use anyhow::Result;
use docprep_core::{
    load_chunks, process_directory, process_text_file, ChunkMode, EmbeddingBackend,
    EmbeddingGenerator, EmbeddingOptions, IndexedEmbedding, ProcessOptions,
};
use serde_json::json;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use text_chunker::{Chunker, TokenChunker};

fn long_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {i}: the quarterly report discusses region {i} in detail."))
        .collect::<Vec<_>>()
        .join("\n")
}

fn options(output_dir: &std::path::Path, mode: ChunkMode) -> ProcessOptions {
    ProcessOptions {
        output_dir: output_dir.to_path_buf(),
        text_dir: None,
        mode,
    }
}

/// Embeds every text as `[chars, words]`.
struct CountingBackend;

impl EmbeddingBackend for CountingBackend {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<IndexedEmbedding>> {
        Ok(inputs
            .iter()
            .enumerate()
            .map(|(index, text)| IndexedEmbedding {
                index,
                embedding: vec![
                    text.chars().count() as f32,
                    text.split_whitespace().count() as f32,
                ],
            })
            .collect())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_process_text_file_character_mode() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("report.txt");
    let text = long_text(40);
    fs::write(&input, &text).unwrap();

    let chunker = Chunker::builder()
        .chunk_size(300)
        .chunk_overlap(80)
        .build()
        .unwrap();
    let out = temp.path().join("chunks");
    let summary = process_text_file(&input, &options(&out, ChunkMode::Characters(chunker))).unwrap();

    assert_eq!(summary.output, out.join("report_chunks.json"));
    assert_eq!(summary.char_count, text.chars().count());

    let chunks = load_chunks(&summary.output).unwrap();
    assert_eq!(chunks.len(), summary.chunk_count);
    assert!(chunks.len() > 1);

    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.text.chars().count() <= 300);
        assert!(chunk.embedding.is_none());
        assert_eq!(chunk.metadata["document_id"], json!("report"));
        assert_eq!(chunk.metadata["source"], json!("extracted_text"));
        assert_eq!(chunk.metadata["filename"], json!("report.txt"));
        assert_eq!(chunk.metadata["chunk_index"], json!(i));
        assert_eq!(chunk.metadata["chunk_count"], json!(chunks.len()));
    }
    assert_eq!(chunks[0].metadata["is_first_chunk"], json!(true));
    assert_eq!(chunks[chunks.len() - 1].metadata["is_last_chunk"], json!(true));
}

#[test]
fn test_process_text_file_token_mode() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.txt");
    let text = (0..20)
        .map(|i| format!("Paragraph {i} explains one step of the process."))
        .collect::<Vec<_>>()
        .join("\n\n");
    fs::write(&input, &text).unwrap();

    let chunker = TokenChunker::builder()
        .max_tokens(40)
        .overlap_tokens(10)
        .build()
        .unwrap();
    let summary = process_text_file(
        &input,
        &options(temp.path(), ChunkMode::Tokens(chunker)),
    )
    .unwrap();

    let chunks = load_chunks(&summary.output).unwrap();
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // default estimator: four characters per token
        assert!(chunk.text.chars().count() / 4 <= 40);
    }
}

#[test]
fn test_embed_chunk_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("doc.txt");
    fs::write(&input, long_text(30)).unwrap();

    let chunker = Chunker::builder()
        .chunk_size(250)
        .chunk_overlap(50)
        .build()
        .unwrap();
    let summary = process_text_file(&input, &options(temp.path(), ChunkMode::Characters(chunker)))
        .unwrap();

    let generator = EmbeddingGenerator::with_options(
        CountingBackend,
        EmbeddingOptions {
            batch_size: 4,
            retry_limit: 1,
            retry_delay: Duration::ZERO,
        },
    );
    let output = generator.process_chunks_file(&summary.output, None).unwrap();
    assert_eq!(output, temp.path().join("doc_chunks_with_embeddings.json"));

    let original = load_chunks(&summary.output).unwrap();
    let embedded = load_chunks(&output).unwrap();
    assert_eq!(original.len(), embedded.len());

    for (before, after) in original.iter().zip(&embedded) {
        assert_eq!(before.text, after.text);
        assert_eq!(before.metadata, after.metadata);
        let embedding = after.embedding.as_ref().unwrap();
        assert_eq!(embedding[0], after.text.chars().count() as f32);
    }
}

#[test]
fn test_process_directory_continues_past_failures() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("a.txt"), long_text(5)).unwrap();
    fs::write(docs.join("b.TXT"), long_text(50)).unwrap();
    fs::write(docs.join("broken.pdf"), "this is not a pdf").unwrap();
    fs::write(docs.join("ignored.md"), "# not processed").unwrap();

    let out = temp.path().join("out");
    let report = process_directory(&docs, &options(&out, ChunkMode::default())).unwrap();

    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("broken.pdf"));

    assert!(out.join("a_chunks.json").exists());
    assert!(out.join("b_chunks.json").exists());
    assert!(!out.join("broken_chunks.json").exists());
}
