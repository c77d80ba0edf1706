//! Free-text Search Index
//!
//! Lower-cases every searchable text once, when the catalog is built, so a
//! query only folds itself. Searchable fields per plant:
//! - Name and scientific name
//! - Characteristics
//! - Unique features
//!
//! Matching is plain case-insensitive substring containment, ORed across
//! fields. No tokenizing, no typo tolerance.

use crate::catalog::PlantRecord;
use crate::utils::fold;

/// Pre-folded search texts, one entry per catalog record
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    /// haystacks[i] holds every searchable text of record i, lower-cased
    haystacks: Vec<Vec<String>>,
}

impl SearchIndex {
    /// Build the index in catalog order
    pub fn build(records: &[PlantRecord]) -> Self {
        let haystacks = records
            .iter()
            .map(|plant| {
                let mut texts = Vec::with_capacity(
                    2 + plant.characteristics.len() + plant.unique_features().len(),
                );
                texts.push(fold(&plant.name));
                texts.push(fold(&plant.scientific_name));
                texts.extend(plant.characteristics.iter().map(|c| fold(c)));
                texts.extend(plant.unique_features().iter().map(|u| fold(u)));
                texts
            })
            .collect();

        Self { haystacks }
    }

    /// Whether record `index` contains an already-folded query
    ///
    /// Out-of-range indices never match.
    pub fn matches(&self, index: usize, query_folded: &str) -> bool {
        self.haystacks
            .get(index)
            .is_some_and(|texts| texts.iter().any(|t| t.contains(query_folded)))
    }

    /// Get index statistics
    pub fn stats(&self) -> SearchIndexStats {
        SearchIndexStats {
            plant_count: self.haystacks.len(),
            text_count: self.haystacks.iter().map(|t| t.len()).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchIndexStats {
    pub plant_count: usize,
    pub text_count: usize,
}
