// src/lib.rs
//! # Text Chunker
//!
//! Splits extracted document text into overlapping, size-bounded chunks for
//! embedding and retrieval.
//!
//! ## Features
//!
//! - **Character mode**: greedy packing of separator-delimited segments under a
//!   character budget, with whole-segment overlap between chunks
//! - **Token mode**: paragraph/sentence packing under an estimated token budget,
//!   falling back to word and grapheme splits for oversized units
//! - **Pluggable estimators**: any [`TokenEstimator`] (or plain closure)
//! - **Chunk metadata**: positional keys merged into caller metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use text_chunker::Chunker;
//!
//! let chunker = Chunker::default();
//! let chunks = chunker.create_document_chunks("Some extracted text.", None);
//!
//! assert_eq!(chunks.len(), 1);
//! assert!(chunks[0].is_first() && chunks[0].is_last());
//! ```
//!
//! ## Advanced Usage
//!
//! ```rust
//! use text_chunker::{MultilingualEstimator, TokenChunker};
//!
//! let chunker = TokenChunker::builder()
//!     .max_tokens(200)
//!     .overlap_tokens(20)
//!     .estimator(MultilingualEstimator)
//!     .build()
//!     .unwrap();
//!
//! let chunks = chunker.split("First paragraph.\n\nSecond paragraph.");
//! assert_eq!(chunks.len(), 1);
//! ```

pub mod chunker;
pub mod error;
pub mod metadata;
pub mod overlap;
pub mod segmentation;
pub mod token_counter;

pub use chunker::{CharacterSplitter, TokenSplitter};
pub use error::{ChunkError, Result};
pub use metadata::{build_chunks, Chunk, Metadata};
pub use token_counter::{CharRatioEstimator, MultilingualEstimator, TokenEstimator};

/// Default character budget per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default characters repeated between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default segment separator for character mode.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Default token budget per chunk.
pub const DEFAULT_MAX_TOKENS: usize = 500;

/// Default token overlap between consecutive chunks.
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// Segments delimited by `separator` are never cut. Joining the chunks with
/// each chunk's overlap prefix removed gives back `text` exactly.
///
/// ```rust
/// let chunks = text_chunker::split_into_chunks("A\nB\nC\nD", 3, 1, "\n").unwrap();
/// assert_eq!(chunks, vec!["A\nB", "\nC", "\nD"]);
/// ```
pub fn split_into_chunks(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separator: &str,
) -> Result<Vec<String>> {
    Ok(CharacterSplitter::new(chunk_size, chunk_overlap, separator)?.split(text))
}

/// Character-mode chunks with metadata, split on newlines.
///
/// `metadata` is copied into every chunk; the positional keys
/// (`chunk_index`, `chunk_count`, `chunk_size`, `is_first_chunk`,
/// `is_last_chunk`) are added on top.
pub fn create_document_chunks(
    text: &str,
    metadata: Option<&Metadata>,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>> {
    let texts = split_into_chunks(text, chunk_size, chunk_overlap, DEFAULT_SEPARATOR)?;
    Ok(build_chunks(texts, metadata))
}

/// Split `text` into chunks of at most `max_tokens` estimated tokens.
pub fn chunk_by_tokens(
    text: &str,
    max_tokens: usize,
    overlap_tokens: usize,
    estimator: &dyn TokenEstimator,
) -> Result<Vec<String>> {
    Ok(TokenSplitter::new(max_tokens, overlap_tokens, estimator)?.split(text))
}

/// Character-mode chunker with a validated configuration.
///
/// # Example
///
/// ```rust
/// use text_chunker::Chunker;
///
/// let chunker = Chunker::builder()
///     .chunk_size(500)
///     .chunk_overlap(50)
///     .separator("\n")
///     .build()
///     .unwrap();
/// let chunks = chunker.split("line one\nline two");
/// assert_eq!(chunks, vec!["line one\nline two"]);
/// ```
#[derive(Debug, Clone)]
pub struct Chunker {
    splitter: CharacterSplitter,
}

impl Chunker {
    pub fn builder() -> ChunkerBuilder {
        ChunkerBuilder::new()
    }

    pub fn chunk_size(&self) -> usize {
        self.splitter.chunk_size()
    }

    pub fn chunk_overlap(&self) -> usize {
        self.splitter.chunk_overlap()
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.splitter.split(text)
    }

    pub fn create_document_chunks(&self, text: &str, metadata: Option<&Metadata>) -> Vec<Chunk> {
        build_chunks(self.split(text), metadata)
    }
}

impl Default for Chunker {
    /// chunk_size 1000, chunk_overlap 200, separator `"\n"`.
    fn default() -> Self {
        Self {
            splitter: CharacterSplitter::from_parts(
                DEFAULT_CHUNK_SIZE,
                DEFAULT_CHUNK_OVERLAP,
                DEFAULT_SEPARATOR.to_string(),
            ),
        }
    }
}

/// Builder for configuring a [`Chunker`].
pub struct ChunkerBuilder {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl ChunkerBuilder {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Maximum characters per chunk.
    ///
    /// Default: 1000
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Characters of trailing context repeated at the start of the next
    /// chunk. Must be smaller than the chunk size.
    ///
    /// Default: 200
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    /// Default: `"\n"`
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn build(self) -> Result<Chunker> {
        Ok(Chunker {
            splitter: CharacterSplitter::new(self.chunk_size, self.chunk_overlap, self.separator)?,
        })
    }
}

impl Default for ChunkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Token-mode chunker owning its estimator.
pub struct TokenChunker {
    max_tokens: usize,
    overlap_tokens: usize,
    estimator: Box<dyn TokenEstimator>,
}

impl TokenChunker {
    pub fn builder() -> TokenChunkerBuilder {
        TokenChunkerBuilder::new()
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn overlap_tokens(&self) -> usize {
        self.overlap_tokens
    }

    pub fn estimate(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        TokenSplitter::from_parts(self.max_tokens, self.overlap_tokens, self.estimator.as_ref())
            .split(text)
    }

    pub fn create_document_chunks(&self, text: &str, metadata: Option<&Metadata>) -> Vec<Chunk> {
        build_chunks(self.split(text), metadata)
    }
}

impl Default for TokenChunker {
    /// max_tokens 500, overlap_tokens 100, four characters per token.
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            estimator: Box::new(CharRatioEstimator::default()),
        }
    }
}

/// Builder for configuring a [`TokenChunker`].
pub struct TokenChunkerBuilder {
    max_tokens: usize,
    overlap_tokens: usize,
    estimator: Box<dyn TokenEstimator>,
}

impl TokenChunkerBuilder {
    pub fn new() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            estimator: Box::new(CharRatioEstimator::default()),
        }
    }

    /// Default: 500
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Token budget for the overlap between segment-level chunks, and the
    /// number of trailing words carried over when a long segment is split
    /// word by word.
    ///
    /// Default: 100
    pub fn overlap_tokens(mut self, overlap: usize) -> Self {
        self.overlap_tokens = overlap;
        self
    }

    /// Default: [`CharRatioEstimator`] with four characters per token.
    pub fn estimator(mut self, estimator: impl TokenEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    pub fn build(self) -> Result<TokenChunker> {
        error::check_token_config(self.max_tokens, self.overlap_tokens)?;
        Ok(TokenChunker {
            max_tokens: self.max_tokens,
            overlap_tokens: self.overlap_tokens,
            estimator: self.estimator,
        })
    }
}

impl Default for TokenChunkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_chunks_short_text() {
        let metadata = json!({"id": "doc1"}).as_object().cloned().unwrap();
        let chunks = create_document_chunks("short text", Some(&metadata), 1000, 200).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(
            serde_json::Value::Object(chunks[0].metadata.clone()),
            json!({
                "id": "doc1",
                "chunk_index": 0,
                "chunk_count": 1,
                "chunk_size": 10,
                "is_first_chunk": true,
                "is_last_chunk": true
            })
        );
    }

    #[test]
    fn test_document_chunks_without_metadata() {
        let chunks = create_document_chunks("", None, 1000, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_builder_rejects_bad_overlap() {
        let err = Chunker::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(err, Err(ChunkError::OverlapTooLarge { .. })));

        let err = TokenChunker::builder().max_tokens(0).build();
        assert!(matches!(err, Err(ChunkError::InvalidMaxTokens)));
    }

    #[test]
    fn test_defaults() {
        let chunker = Chunker::default();
        assert_eq!(chunker.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(chunker.chunk_overlap(), DEFAULT_CHUNK_OVERLAP);

        let chunker = TokenChunker::default();
        assert_eq!(chunker.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(chunker.overlap_tokens(), DEFAULT_OVERLAP_TOKENS);
        assert_eq!(chunker.estimate("abcdefgh"), 2);
    }

    #[test]
    fn test_token_chunker_with_closure() {
        let chunker = TokenChunker::builder()
            .max_tokens(2)
            .overlap_tokens(0)
            .estimator(|text: &str| text.split_whitespace().count())
            .build()
            .unwrap();
        let chunks = chunker.create_document_chunks("a b c d", None);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "a b");
        assert_eq!(chunks[1].text, "c d");
        assert_eq!(chunks[1].count(), Some(2));
    }

    #[test]
    fn test_free_function_matches_builder() {
        let text: String = (0..50).map(|i| format!("row {i}\n")).collect();
        let chunker = Chunker::builder().chunk_size(40).chunk_overlap(10).build().unwrap();
        assert_eq!(
            chunker.split(&text),
            split_into_chunks(&text, 40, 10, "\n").unwrap()
        );
    }
}
