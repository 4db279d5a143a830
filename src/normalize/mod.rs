//! # Response Normalization
//!
//! Turns the free-form text a language model returns into a structured
//! value. Models asked for "a dictionary" answer with strict JSON, with a
//! Python dict literal, with prose around either, or with output truncated
//! by the token limit before the closing brackets. The normalizer works in
//! stages:
//!
//! 1. strict JSON parse of the whole reply
//! 2. extraction of the `{ ... }` span (no span: the reply is handed back
//!    unchanged as [`Normalized::Unparsed`])
//! 3. closing of brackets left open by truncation
//! 4. strict JSON parse of the repaired span, then a permissive
//!    literal-structure parse
//!
//! Only when both parses of stage 4 fail does it report a
//! [`NormalizeError`].

mod literal;
mod repair;

use serde_json::Value;
use thiserror::Error;

pub use literal::{LiteralError, MAX_DEPTH, parse_literal};
pub use repair::{close_unbalanced, extract_span};

/// Outcome of a normalization attempt that did not hit malformed content.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The reply contained a structure that parsed.
    Parsed(Value),
    /// The reply contained no `{` at all; this is the reply itself.
    Unparsed(String),
}

#[derive(Debug, Error)]
#[error("model output could not be normalized: {source}")]
pub struct NormalizeError {
    /// The reply as received, kept for diagnostics.
    pub raw: String,
    #[source]
    pub source: LiteralError,
}

pub fn normalize(raw: &str) -> Result<Normalized, NormalizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(Normalized::Parsed(value));
    }

    let Some(span) = extract_span(raw) else {
        return Ok(Normalized::Unparsed(raw.to_string()));
    };

    let repaired = close_unbalanced(span);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        return Ok(Normalized::Parsed(value));
    }

    parse_literal(&repaired)
        .map(Normalized::Parsed)
        .map_err(|source| NormalizeError {
            raw: raw.to_string(),
            source,
        })
}
