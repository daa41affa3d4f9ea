//! Contract analysis engine.
//!
//! Turns extracted contract text into clauses with categories, legal terms,
//! plain-language rewrites and readability scores. Classification and
//! simplification sit behind traits so hosted models can replace the
//! built-in rules.

pub mod classify;
pub mod error;
#[cfg(feature = "hosted")]
pub mod hosted;
pub mod pipeline;
pub mod preprocess;
pub mod readability;
pub mod simplify;
pub mod terms;

pub use classify::{ClauseClassifier, KeywordClassifier};
pub use error::EngineError;
pub use pipeline::{Analysis, Pipeline};
pub use simplify::{PlainLanguageSimplifier, Simplifier};
pub use terms::{extract_legal_terms, GlossaryEntry, GLOSSARY};

/// Hugging Face inference API, used when only a token is configured
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
