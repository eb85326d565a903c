// src/segmentation/boundaries.rs

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Fewer paragraphs than this and the text is split into sentences instead.
pub const MIN_PARAGRAPHS: usize = 3;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"));

/// Split on blank lines. Paragraphs are trimmed and blank ones dropped.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split after `.`, `!` or `?` followed by whitespace. The punctuation stays
/// with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        // punctuation is a single ASCII byte
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Paragraphs when there are enough of them, sentences otherwise.
pub fn split_units(text: &str) -> Vec<&str> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.len() < MIN_PARAGRAPHS {
        split_sentences(text)
    } else {
        paragraphs
    }
}

/// Split a single word into grapheme-aligned pieces that each satisfy `fits`.
///
/// A piece always holds at least one grapheme, so a predicate that rejects
/// every grapheme still makes progress.
pub fn split_graphemes<F>(word: &str, fits: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut pieces = Vec::new();
    let mut current = String::new();

    for grapheme in word.graphemes(true) {
        if !current.is_empty() {
            let mut candidate = current.clone();
            candidate.push_str(grapheme);
            if !fits(&candidate) {
                pieces.push(std::mem::take(&mut current));
            }
        }
        current.push_str(grapheme);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
