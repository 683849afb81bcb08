//! Article Content Processing
//!
//! Turns raw plain-text Wikipedia extracts into bounded excerpts that are
//! safe to place in a model prompt.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wikiresearch::content::normalizer;
//!
//! let excerpt = normalizer::normalize(&article, 3000);
//! assert!(excerpt.text.chars().count() <= 3000);
//! ```

/// Cleanup and sentence-aware truncation of article text.
pub mod normalizer;

pub use normalizer::{clean_text, normalize, normalize_with_outcome, truncate_text};
