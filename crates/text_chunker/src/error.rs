// src/error.rs

use thiserror::Error;

/// Configuration errors raised before any text is split.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("max tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("overlap ({overlap}) must be smaller than the chunk limit ({limit})")]
    OverlapTooLarge { overlap: usize, limit: usize },

    #[error("separator must not be empty")]
    EmptySeparator,
}

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Validate character-mode parameters.
pub(crate) fn check_character_config(
    chunk_size: usize,
    chunk_overlap: usize,
    separator: &str,
) -> Result<()> {
    if chunk_size == 0 {
        return Err(ChunkError::InvalidChunkSize);
    }
    if chunk_overlap >= chunk_size {
        return Err(ChunkError::OverlapTooLarge {
            overlap: chunk_overlap,
            limit: chunk_size,
        });
    }
    if separator.is_empty() {
        return Err(ChunkError::EmptySeparator);
    }
    Ok(())
}

/// Validate token-mode parameters.
pub(crate) fn check_token_config(max_tokens: usize, overlap_tokens: usize) -> Result<()> {
    if max_tokens == 0 {
        return Err(ChunkError::InvalidMaxTokens);
    }
    if overlap_tokens >= max_tokens {
        return Err(ChunkError::OverlapTooLarge {
            overlap: overlap_tokens,
            limit: max_tokens,
        });
    }
    Ok(())
}
