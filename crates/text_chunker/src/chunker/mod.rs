// src/chunker/mod.rs

pub mod character;
pub mod token;

pub use character::CharacterSplitter;
pub use token::TokenSplitter;
