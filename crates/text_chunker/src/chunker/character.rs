// src/chunker/character.rs

use crate::error::{check_character_config, Result};
use crate::overlap::{char_len, shrink_to_fit, OverlapStrategy};

/// A finalized chunk plus the number of leading characters it repeats from
/// the chunk before it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitPiece {
    pub text: String,
    pub overlap_chars: usize,
}

/// Separator-based splitter with a character budget.
///
/// Segments between separators are atomic: they are never cut, so a single
/// segment longer than `chunk_size` becomes a chunk on its own.
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl CharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separator: impl Into<String>) -> Result<Self> {
        let separator = separator.into();
        check_character_config(chunk_size, chunk_overlap, &separator)?;
        Ok(Self::from_parts(chunk_size, chunk_overlap, separator))
    }

    /// Caller has already validated the parameters.
    pub(crate) fn from_parts(chunk_size: usize, chunk_overlap: usize, separator: String) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separator,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_pieces(text)
            .into_iter()
            .map(|piece| piece.text)
            .collect()
    }

    pub(crate) fn split_pieces(&self, text: &str) -> Vec<SplitPiece> {
        if text.is_empty() {
            return vec![];
        }
        if text.chars().count() <= self.chunk_size {
            return vec![SplitPiece {
                text: text.to_string(),
                overlap_chars: 0,
            }];
        }

        let overlap = OverlapStrategy::new(self.chunk_overlap);
        let mut pieces = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;
        // leading entries of `current` copied from the previous chunk
        let mut seeded = 0;

        for split in text.split(self.separator.as_str()) {
            let segment = if current.is_empty() {
                split.to_string()
            } else {
                format!("{}{}", self.separator, split)
            };
            let segment_len = segment.chars().count();

            if current_len + segment_len > self.chunk_size && current_len > 0 {
                pieces.push(SplitPiece {
                    text: current.concat(),
                    overlap_chars: char_len(&current[..seeded]),
                });

                let mut seed = overlap.trailing(&current, char_len);
                shrink_to_fit(&mut seed, |rest| {
                    char_len(rest) + segment_len <= self.chunk_size
                });

                current_len = char_len(&seed);
                seeded = seed.len();
                current = seed;
            }

            current.push(segment);
            current_len += segment_len;
        }

        if current_len > 0 {
            pieces.push(SplitPiece {
                text: current.concat(),
                overlap_chars: char_len(&current[..seeded]),
            });
        }

        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;

    fn reconstruct(pieces: &[SplitPiece]) -> String {
        pieces
            .iter()
            .map(|p| p.text.chars().skip(p.overlap_chars).collect::<String>())
            .collect()
    }

    #[test]
    fn test_short_text_not_split() {
        let splitter = CharacterSplitter::new(100, 10, "\n").unwrap();
        assert_eq!(splitter.split("Hello\nworld"), vec!["Hello\nworld"]);
    }

    #[test]
    fn test_empty_text() {
        let splitter = CharacterSplitter::new(100, 10, "\n").unwrap();
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn test_single_letters() {
        let splitter = CharacterSplitter::new(3, 1, "\n").unwrap();
        let chunks = splitter.split("A\nB\nC\nD");
        assert_eq!(chunks, vec!["A\nB", "\nC", "\nD"]);
    }

    #[test]
    fn test_overlap_repeats_trailing_segment() {
        let splitter = CharacterSplitter::new(8, 3, "\n").unwrap();
        let chunks = splitter.split("aaaa\nbb\ncc\ndd");
        assert_eq!(chunks, vec!["aaaa\nbb", "\nbb\ncc", "\ncc\ndd"]);
    }

    #[test]
    fn test_overlap_dropped_when_it_would_overflow() {
        // "\nbb" fits the overlap budget but not next to "\ncccccc"
        let splitter = CharacterSplitter::new(8, 3, "\n").unwrap();
        let chunks = splitter.split("aaaa\nbb\ncccccc");
        assert_eq!(chunks, vec!["aaaa\nbb", "\ncccccc"]);
    }

    #[test]
    fn test_oversized_segment_kept_whole() {
        let long = "x".repeat(25);
        let text = format!("ab\n{long}\ncd");
        let splitter = CharacterSplitter::new(10, 2, "\n").unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks, vec!["ab".to_string(), format!("\n{long}"), "\ncd".to_string()]);
    }

    #[test]
    fn test_leading_separator_never_yields_empty_chunk() {
        let text = format!("\n{}", "y".repeat(30));
        let splitter = CharacterSplitter::new(10, 0, "\n").unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks, vec![text.clone()]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_reconstruction() {
        let text: String = (0..60)
            .map(|i| format!("line {i} {}", "w".repeat(i % 7)))
            .collect::<Vec<_>>()
            .join("\n");
        let splitter = CharacterSplitter::new(50, 20, "\n").unwrap();
        let pieces = splitter.split_pieces(&text);

        assert!(pieces.len() > 1);
        assert_eq!(reconstruct(&pieces), text);
        for piece in &pieces {
            assert!(piece.text.chars().count() <= 50);
        }
    }

    #[test]
    fn test_custom_separator() {
        let splitter = CharacterSplitter::new(12, 0, ". ").unwrap();
        let chunks = splitter.split("One. Two. Three. Four. Five");
        assert_eq!(chunks.concat(), "One. Two. Three. Four. Five");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
    }

    #[test]
    fn test_multibyte_lengths() {
        let text = "éé\nüü\nöö\nää";
        let splitter = CharacterSplitter::new(5, 0, "\n").unwrap();
        let chunks = splitter.split(text);
        assert_eq!(chunks, vec!["éé\nüü", "\nöö", "\nää"]);
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            CharacterSplitter::new(0, 0, "\n").unwrap_err(),
            ChunkError::InvalidChunkSize
        );
        assert!(CharacterSplitter::new(5, 5, "\n").is_err());
        assert_eq!(
            CharacterSplitter::new(5, 1, "").unwrap_err(),
            ChunkError::EmptySeparator
        );
    }
}
