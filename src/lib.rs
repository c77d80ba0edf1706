//! Plant Identifier
//!
//! Guided plant identification: answer one question per trait (leaf
//! structure, habitat, economic value, ...) and the catalog narrows to the
//! plants matching every answer. Free-text search and multi-select filters
//! refine the result.
//!
//! Layout:
//! - `catalog`: plant records and the validated, read-only catalog
//! - `steps`: question sequences
//! - `state`: selection, filter and session state
//! - `match_engine`: pure matching over the catalog
//! - `session`: step controller driving a single session
//! - `config`: when matching runs and how empty queries behave

pub mod catalog;
pub mod config;
pub mod error;
pub mod match_engine;
pub mod search_index;
pub mod session;
pub mod state;
pub mod steps;
pub mod utils;

// Re-export commonly used types
pub use catalog::{Catalog, FieldValues, HeightRange, PlantRecord};
pub use config::{EmptyQuery, SearchPolicy, SessionConfig};
pub use error::{CatalogError, IdentifyError, SequenceError};
pub use match_engine::{match_indices, match_plants, MatchOutcome};
pub use search_index::{SearchIndex, SearchIndexStats};
pub use session::{CurrentStep, IdentificationSession};
pub use state::{AdvancedFilterState, FilterCategory, Phase, SelectionState, SessionState, TraitField};
pub use steps::{basic_steps, dicot_rule_steps, expanded_steps, QuestionSequence, QuestionStep, StepOption};
