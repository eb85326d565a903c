//! docprep-core: document preparation for retrieval
//!
//! Extracts text from PDFs, splits it with [`text_chunker`], stores chunk
//! files as JSON, attaches embeddings from a remote model, and talks to the
//! hosted document index used for question answering.

pub mod chunk_store;
pub mod collection;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod files;
pub mod pipeline;

pub use chunk_store::{
    chunk_file_info, chunks_path, embeddings_output_path, is_embeddings_file, load_chunks,
    save_chunks, summarize_chunks, write_chunks, ChunkFileInfo, ChunkSample, StoredChunk,
};
pub use collection::{response_text, CollectionClient};
pub use config::{default_config_path, load_config, Config, EstimatorKind};
pub use document::{extract_text_from_pdf, pdf_page_count, read_document_text, save_text_to_file};
pub use embeddings::{
    backoff_delay, pending_chunk_files, EmbeddingBackend, EmbeddingGenerator, EmbeddingOptions,
    EmbeddingReport, IndexedEmbedding, OpenAiBackend,
};
pub use files::{
    document_id_for, ensure_directory_exists, list_files_with_extension, output_path_for,
};
pub use pipeline::{
    process_directory, process_document, process_pdf, process_text_file, ChunkMode,
    DirectoryReport, ProcessOptions, ProcessSummary,
};
