// src/chunker/token.rs

use crate::error::{check_token_config, Result};
use crate::overlap::{shrink_to_fit, OverlapStrategy};
use crate::segmentation::boundaries::{split_graphemes, split_units};
use crate::token_counter::TokenEstimator;

/// Paragraph/sentence splitter with a token budget.
///
/// Units inside a chunk are joined with single spaces, so chunk text is a
/// normalized rendition of the source rather than an exact substring.
pub struct TokenSplitter<'e> {
    max_tokens: usize,
    overlap_tokens: usize,
    estimator: &'e dyn TokenEstimator,
}

impl<'e> TokenSplitter<'e> {
    pub fn new(
        max_tokens: usize,
        overlap_tokens: usize,
        estimator: &'e dyn TokenEstimator,
    ) -> Result<Self> {
        check_token_config(max_tokens, overlap_tokens)?;
        Ok(Self::from_parts(max_tokens, overlap_tokens, estimator))
    }

    /// Caller has already validated the parameters.
    pub(crate) fn from_parts(
        max_tokens: usize,
        overlap_tokens: usize,
        estimator: &'e dyn TokenEstimator,
    ) -> Self {
        Self {
            max_tokens,
            overlap_tokens,
            estimator,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![];
        }
        if self.estimator.estimate(text) <= self.max_tokens {
            return vec![text.to_string()];
        }

        let mut packer = Packer {
            splitter: self,
            overlap: OverlapStrategy::new(self.overlap_tokens),
            chunks: Vec::new(),
            current: Vec::new(),
        };

        for segment in split_units(text) {
            packer.push_segment(segment);
        }

        packer.finish()
    }
}

struct Packer<'s, 'e> {
    splitter: &'s TokenSplitter<'e>,
    overlap: OverlapStrategy,
    chunks: Vec<String>,
    current: Vec<String>,
}

impl Packer<'_, '_> {
    fn estimate(&self, text: &str) -> usize {
        self.splitter.estimator.estimate(text)
    }

    fn tokens(&self, units: &[String]) -> usize {
        self.estimate(&units.join(" "))
    }

    fn fits_with(&self, units: &[String], next: &str) -> bool {
        let candidate = if units.is_empty() {
            next.to_string()
        } else {
            format!("{} {}", units.join(" "), next)
        };
        self.estimate(&candidate) <= self.splitter.max_tokens
    }

    fn push_segment(&mut self, segment: &str) {
        if self.estimate(segment) > self.splitter.max_tokens {
            self.push_oversized(segment);
            return;
        }

        if !self.current.is_empty() && !self.fits_with(&self.current, segment) {
            let mut seed = self.overlap.trailing(&self.current, |units| self.tokens(units));
            shrink_to_fit(&mut seed, |rest| self.fits_with(rest, segment));
            self.roll_over(seed);
        }

        self.current.push(segment.to_string());
    }

    /// Flush what is pending, then pack the segment word by word. Words
    /// left over after the last full sub-chunk stay pending.
    fn push_oversized(&mut self, segment: &str) {
        if !self.current.is_empty() {
            self.roll_over(Vec::new());
        }

        for word in segment.split_whitespace() {
            if self.estimate(word) > self.splitter.max_tokens {
                let max_tokens = self.splitter.max_tokens;
                let estimator = self.splitter.estimator;
                for piece in split_graphemes(word, |p| estimator.estimate(p) <= max_tokens) {
                    self.push_word(&piece);
                }
            } else {
                self.push_word(word);
            }
        }
    }

    fn push_word(&mut self, word: &str) {
        if !self.current.is_empty() && !self.fits_with(&self.current, word) {
            let mut seed = self.overlap.trailing_count(&self.current);
            shrink_to_fit(&mut seed, |rest| self.fits_with(rest, word));
            self.roll_over(seed);
        }
        self.current.push(word.to_string());
    }

    fn roll_over(&mut self, seed: Vec<String>) {
        let finished = std::mem::replace(&mut self.current, seed);
        self.chunks.push(finished.join(" "));
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            let last = std::mem::take(&mut self.current);
            self.chunks.push(last.join(" "));
        }
        self.chunks
    }
}
