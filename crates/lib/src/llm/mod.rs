//! Provider clients.
//!
//! Gemini REST client: single-turn generateContent and model listing.

mod gemini;

pub use gemini::{GeminiClient, GeminiError, GeminiModel};
