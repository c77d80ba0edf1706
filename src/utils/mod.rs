//! Utility modules for identification
//!
//! - Text: query normalisation and case-insensitive containment
//! - Vernacular: display names for result lists

pub mod text;
pub mod vernacular;

// Re-export commonly used functions
pub use text::{contains_folded, fold, is_blank, normalize_query};
pub use vernacular::get_display_name;
