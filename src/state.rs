//! Session state model
//!
//! Everything a session accumulates lives in [`SessionState`]: the current
//! phase, the per-trait answers, the advanced filters and the query text.
//! The record is serializable so a session can be snapshotted and replayed.
//!
//! The mutators here only change state. They never run the match engine;
//! that is the session controller's job.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentifyError;

/// Record field a trait key can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraitField {
    /// Single-valued, required
    Name,
    ScientificName,
    LeafType,
    /// Set, required
    Habitat,
    BloomColor,
    FruitColor,
    EconomicValue,
    /// Single-valued, optional
    ConservationStatus,
    /// Free-text descriptions, matched by substring
    Characteristics,
    /// Descriptive lists, matched by membership like any other set
    UniqueFeatures,
    MedicinalProperties,
    EcologicalRole,
    /// Single-valued, optional
    Image,
}

impl TraitField {
    pub const ALL: [TraitField; 13] = [
        TraitField::Name,
        TraitField::ScientificName,
        TraitField::LeafType,
        TraitField::Habitat,
        TraitField::BloomColor,
        TraitField::FruitColor,
        TraitField::EconomicValue,
        TraitField::ConservationStatus,
        TraitField::Characteristics,
        TraitField::UniqueFeatures,
        TraitField::MedicinalProperties,
        TraitField::EcologicalRole,
        TraitField::Image,
    ];

    /// Catalog field name
    pub fn key(&self) -> &'static str {
        match self {
            TraitField::Name => "name",
            TraitField::ScientificName => "scientificName",
            TraitField::LeafType => "leafType",
            TraitField::Habitat => "habitat",
            TraitField::BloomColor => "bloomColor",
            TraitField::FruitColor => "fruitColor",
            TraitField::EconomicValue => "economicValue",
            TraitField::ConservationStatus => "conservationStatus",
            TraitField::Characteristics => "characteristics",
            TraitField::UniqueFeatures => "uniqueFeatures",
            TraitField::MedicinalProperties => "medicinalProperties",
            TraitField::EcologicalRole => "ecologicalRole",
            TraitField::Image => "image",
        }
    }

    /// Resolve a step trait key to a record field
    ///
    /// A key may carry a qualifier after the first dot so several steps can
    /// address one field ("characteristics.seed", "characteristics.leaf").
    /// Returns `None` for keys that name no field. `height` is a numeric
    /// range with no string value to compare, so it is not addressable.
    pub fn from_trait_key(trait_key: &str) -> Option<Self> {
        let field = trait_key.split('.').next().unwrap_or(trait_key).trim();
        Self::ALL.into_iter().find(|f| f.key() == field)
    }

    /// Whether the field holds exactly one value per record
    pub fn is_single_valued(&self) -> bool {
        matches!(
            self,
            TraitField::Name
                | TraitField::ScientificName
                | TraitField::LeafType
                | TraitField::ConservationStatus
                | TraitField::Image
        )
    }
}

impl fmt::Display for TraitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Category of the multi-select advanced filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterCategory {
    EconomicValue,
    ConservationStatus,
    BloomColor,
    FruitColor,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 4] = [
        FilterCategory::EconomicValue,
        FilterCategory::ConservationStatus,
        FilterCategory::BloomColor,
        FilterCategory::FruitColor,
    ];

    /// Record field the category filters on
    pub fn field(&self) -> TraitField {
        match self {
            FilterCategory::EconomicValue => TraitField::EconomicValue,
            FilterCategory::ConservationStatus => TraitField::ConservationStatus,
            FilterCategory::BloomColor => TraitField::BloomColor,
            FilterCategory::FruitColor => TraitField::FruitColor,
        }
    }

    pub fn key(&self) -> &'static str {
        self.field().key()
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterCategory {
    type Err = IdentifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| IdentifyError::UnknownFilterCategory(s.to_string()))
    }
}

/// Answers given so far: trait key -> chosen value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    values: FxHashMap<String, String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier one for the same key
    pub fn select(&mut self, trait_key: &str, value: &str) {
        self.values.insert(trait_key.to_string(), value.to_string());
    }

    pub fn get(&self, trait_key: &str) -> Option<&str> {
        self.values.get(trait_key).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SelectionState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Multi-select filters: category -> accepted values
///
/// A category whose accepted set becomes empty is dropped, so toggling a
/// value twice gives back an equal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvancedFilterState {
    accepted: BTreeMap<FilterCategory, BTreeSet<String>>,
}

impl AdvancedFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `value` in the category. Returns true if the value
    /// is now accepted.
    pub fn toggle(&mut self, category: FilterCategory, value: &str) -> bool {
        let set = self.accepted.entry(category).or_default();
        let now_active = if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        };
        if set.is_empty() {
            self.accepted.remove(&category);
        }
        now_active
    }

    /// Accepted values of a category; `None` when the category is inactive
    pub fn accepted(&self, category: FilterCategory) -> Option<&BTreeSet<String>> {
        self.accepted.get(&category).filter(|set| !set.is_empty())
    }

    pub fn is_active(&self, category: FilterCategory, value: &str) -> bool {
        self.accepted(category).is_some_and(|set| set.contains(value))
    }

    /// Active categories with their accepted values
    pub fn iter(&self) -> impl Iterator<Item = (FilterCategory, &BTreeSet<String>)> {
        self.accepted
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(c, set)| (*c, set))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
    }
}

/// Where the step controller is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "index", rename_all = "snake_case")]
pub enum Phase {
    /// Asking the step at this 0-based index
    Asking(usize),
    /// Every step answered
    Results,
}

impl Phase {
    pub fn is_results(&self) -> bool {
        matches!(self, Phase::Results)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Asking(0)
    }
}

/// Serializable bundle of one session's mutable state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    pub selection: SelectionState,
    pub filters: AdvancedFilterState,
    pub query: String,
}

impl SessionState {
    /// Back to `Asking(0)` with nothing selected
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
