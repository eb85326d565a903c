//! End-to-end preparation: source file → text → chunks → chunk file.

use crate::chunk_store::{save_chunks, StoredChunk};
use crate::document::{extract_text_from_pdf, save_text_to_file};
use crate::files::{document_id_for, list_files_with_extension, output_path_for};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use text_chunker::{Chunk, Chunker, Metadata, TokenChunker};
use tracing::{info, warn};

/// `source` metadata value for chunks of a plain text file.
pub const SOURCE_EXTRACTED_TEXT: &str = "extracted_text";
/// `source` metadata value for chunks of a PDF.
pub const SOURCE_PDF: &str = "pdf";

/// Which budget chunks are measured against.
pub enum ChunkMode {
    Characters(Chunker),
    Tokens(TokenChunker),
}

impl ChunkMode {
    pub fn create_document_chunks(&self, text: &str, metadata: Option<&Metadata>) -> Vec<Chunk> {
        match self {
            ChunkMode::Characters(chunker) => chunker.create_document_chunks(text, metadata),
            ChunkMode::Tokens(chunker) => chunker.create_document_chunks(text, metadata),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ChunkMode::Characters(c) => {
                format!("characters (size {}, overlap {})", c.chunk_size(), c.chunk_overlap())
            }
            ChunkMode::Tokens(c) => {
                format!("tokens (max {}, overlap {})", c.max_tokens(), c.overlap_tokens())
            }
        }
    }
}

impl Default for ChunkMode {
    fn default() -> Self {
        ChunkMode::Characters(Chunker::default())
    }
}

pub struct ProcessOptions {
    /// Where `{document_id}_chunks.json` files are written
    pub output_dir: PathBuf,
    /// When set, text extracted from PDFs is also saved here as `.txt`
    pub text_dir: Option<PathBuf>,
    pub mode: ChunkMode,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("chunks"),
            text_dir: None,
            mode: ChunkMode::default(),
        }
    }
}

/// Result of preparing one document.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub chunk_count: usize,
    pub char_count: usize,
}

/// Outcome of a directory run. Failures do not stop the batch.
#[derive(Debug, Default)]
pub struct DirectoryReport {
    pub processed: Vec<ProcessSummary>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Chunk an already extracted text file.
pub fn process_text_file(path: &Path, options: &ProcessOptions) -> Result<ProcessSummary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read text file: {}", path.display()))?;
    chunk_and_save(path, &text, SOURCE_EXTRACTED_TEXT, options)
}

/// Extract a PDF and chunk its text.
pub fn process_pdf(path: &Path, options: &ProcessOptions) -> Result<ProcessSummary> {
    let text = extract_text_from_pdf(path)?;

    if let Some(text_dir) = &options.text_dir {
        let text_path = output_path_for(path, Some(text_dir), Some("txt"))?;
        save_text_to_file(&text, &text_path)?;
    }

    chunk_and_save(path, &text, SOURCE_PDF, options)
}

/// Run [`process_pdf`] or [`process_text_file`] depending on the extension.
pub fn process_document(path: &Path, options: &ProcessOptions) -> Result<ProcessSummary> {
    if crate::document::is_pdf(path) {
        process_pdf(path, options)
    } else {
        process_text_file(path, options)
    }
}

/// Process every `.pdf` and `.txt` file directly inside `dir`.
pub fn process_directory(dir: &Path, options: &ProcessOptions) -> Result<DirectoryReport> {
    let mut files = list_files_with_extension(dir, "pdf")?;
    files.extend(list_files_with_extension(dir, "txt")?);
    files.sort();

    info!("Processing {} files in {}", files.len(), dir.display());

    let mut report = DirectoryReport::default();
    for file in files {
        match process_document(&file, options) {
            Ok(summary) => report.processed.push(summary),
            Err(e) => {
                warn!("Failed to process {}: {:#}", file.display(), e);
                report.failed.push((file, format!("{e:#}")));
            }
        }
    }

    Ok(report)
}

/// Base metadata copied into every chunk of a document.
pub fn document_metadata(document_id: &str, source: &str, filename: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("document_id".into(), Value::String(document_id.into()));
    metadata.insert("source".into(), Value::String(source.into()));
    metadata.insert("filename".into(), Value::String(filename.into()));
    metadata
}

fn chunk_and_save(
    path: &Path,
    text: &str,
    source: &str,
    options: &ProcessOptions,
) -> Result<ProcessSummary> {
    let document_id = document_id_for(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata = document_metadata(&document_id, source, &filename);

    let chunks: Vec<StoredChunk> = options
        .mode
        .create_document_chunks(text, Some(&metadata))
        .into_iter()
        .map(StoredChunk::from)
        .collect();

    if chunks.is_empty() {
        warn!("No text to chunk in {}", path.display());
    }

    let output = save_chunks(&options.output_dir, &document_id, &chunks)?;
    info!(
        "Created {} chunks from {} using {}",
        chunks.len(),
        path.display(),
        options.mode.describe()
    );

    Ok(ProcessSummary {
        source: path.to_path_buf(),
        output,
        chunk_count: chunks.len(),
        char_count: text.chars().count(),
    })
}
