// src/segmentation/mod.rs

pub mod boundaries;

pub use boundaries::{split_paragraphs, split_sentences, split_units};
