// src/token_counter.rs

/// Estimates how many tokens a downstream model will see for a piece of text.
///
/// Estimates are heuristics, not exact tokenization. Any closure
/// `Fn(&str) -> usize` can be used as an estimator.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

impl<F> TokenEstimator for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn estimate(&self, text: &str) -> usize {
        self(text)
    }
}

/// Fixed characters-per-token ratio. The default (4) is the usual rough
/// approximation for English text.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    /// Panics if `chars_per_token` is zero.
    pub fn new(chars_per_token: usize) -> Self {
        assert!(chars_per_token > 0, "chars_per_token must be positive");
        Self { chars_per_token }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        // byte length equals char count for ASCII
        let chars = if text.is_ascii() {
            text.len()
        } else {
            text.chars().count()
        };
        chars / self.chars_per_token
    }
}

/// Script-aware estimator for multilingual text.
/// Supports: English, CJK (Chinese/Japanese/Korean), Arabic, and other languages
#[derive(Debug, Clone, Copy, Default)]
pub struct MultilingualEstimator;

impl TokenEstimator for MultilingualEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        if text.is_ascii() {
            return text.len() / 4;
        }

        let mut char_count = 0;
        let mut cjk_count = 0;
        let mut arabic_count = 0;

        for c in text.chars() {
            char_count += 1;
            if is_cjk_char(c) {
                cjk_count += 1;
            } else if is_arabic_char(c) {
                arabic_count += 1;
            }
        }

        if cjk_count > 0 {
            // CJK chars ~2 chars/token, others ~4 chars/token
            let non_cjk = char_count - cjk_count;
            (cjk_count / 2) + (non_cjk / 4)
        } else if arabic_count > char_count / 2 {
            char_count / 5
        } else {
            char_count / 4
        }
    }
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code) // CJK Unified Ideographs
        || (0x3040..=0x309F).contains(&code) // Hiragana
        || (0x30A0..=0x30FF).contains(&code) // Katakana
        || (0xAC00..=0xD7AF).contains(&code) // Hangul
}

#[inline]
fn is_arabic_char(c: char) -> bool {
    let code = c as u32;
    (0x0600..=0x06FF).contains(&code)
        || (0x0750..=0x077F).contains(&code)
        || (0x08A0..=0x08FF).contains(&code)
        || (0xFB50..=0xFDFF).contains(&code)
        || (0xFE70..=0xFEFF).contains(&code)
}
