//! Free-form answer evaluation for the Quizzard trivia engine.
//!
//! Human-typed trivia answers come with typos, truncations, and partial
//! phrasings. A single exact-match rule rejects far too many fair answers,
//! so this crate layers increasingly permissive strategies, each gated so
//! that trivially short or unrelated input can never sneak through:
//!
//! 1. **Normalization** ([`normalize`]): lowercase, strip everything outside
//!    `[a-z0-9\s]`, collapse whitespace, trim. Normalized submissions
//!    shorter than two characters are rejected outright.
//! 2. **Exact match** on normalized text.
//! 3. **Single-token containment**: a lone submission token of length ≥ 3
//!    that appears as a whole token of the canonical answer.
//! 4. **Bounded edit distance** ([`levenshtein`]): accepted within a
//!    length-scaled threshold, only when both sides are at least three
//!    characters long.
//! 5. **Token overlap**: a multi-token submission sharing at least two
//!    tokens with the canonical answer.
//!
//! # Modules
//!
//! - [`normalize`]: text canonicalization and tokenization helpers
//! - [`distance`]: Levenshtein distance and its acceptance threshold
//! - [`accept`]: the layered acceptance rules
//!
//! # Examples
//!
//! ```
//! use quizzard_evaluator::is_acceptable_answer;
//!
//! assert!(is_acceptable_answer("Mississipi!", "mississippi")); // typo and punctuation
//! assert!(is_acceptable_answer("einstien", "einstein")); // transposed typo
//! assert!(!is_acceptable_answer("x", "xylophone")); // too short to judge
//! ```
//!
//! Evaluation is pure: no side effects, no panics, and unparseable input
//! simply evaluates to `false`.

pub use self::{accept::*, distance::*, normalize::*};

pub mod accept;
pub mod distance;
pub mod normalize;
