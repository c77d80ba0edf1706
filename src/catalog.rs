//! Catalog Loading and Management
//!
//! The catalog is an ordered, read-only table of plant records supplied by
//! the caller. It is validated once at construction; after that the match
//! engine only reads it.
//!
//! JSON layout: an array of records with camelCase field names
//! (`scientificName`, `leafType`, `bloomColor`, ...).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CatalogError;
use crate::search_index::SearchIndex;
use crate::state::TraitField;
use crate::utils::is_blank;

/// Height range of a plant, e.g. 10-40 meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub name: String,
    pub scientific_name: String,

    /// Free-text trait descriptions (search and characteristic rules)
    pub characteristics: Vec<String>,

    /// "Tunggal", "Majemuk", "Menjari", "Menyirip"
    pub leaf_type: String,

    /// Habitat zones the plant occupies
    pub habitat: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bloom_color: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fruit_color: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<HeightRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economic_value: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<String>,

    // Descriptive; no advanced filter covers these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicinal_properties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecological_role: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_features: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Values a record holds for one trait field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValues<'a> {
    /// Exactly one value (names, leaf type, conservation status, image)
    Single(&'a str),
    /// A set of values (habitat, colors, economic value, descriptive lists)
    Set(&'a [String]),
    /// Free-text descriptions, compared by substring
    Text(&'a [String]),
}

impl<'a> FieldValues<'a> {
    /// Iterate the raw values
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        let (single, many): (Option<&'a str>, &'a [String]) = match *self {
            FieldValues::Single(v) => (Some(v), &[]),
            FieldValues::Set(vs) | FieldValues::Text(vs) => (None, vs),
        };
        single.into_iter().chain(many.iter().map(|s| s.as_str()))
    }
}

impl PlantRecord {
    /// Values held for a trait field, `None` when the field is absent
    ///
    /// An optional set that is present but empty counts as absent.
    pub fn field_values(&self, field: TraitField) -> Option<FieldValues<'_>> {
        fn set(values: &[String]) -> Option<FieldValues<'_>> {
            if values.is_empty() {
                None
            } else {
                Some(FieldValues::Set(values))
            }
        }

        fn single(value: Option<&str>) -> Option<FieldValues<'_>> {
            value.filter(|s| !is_blank(s)).map(FieldValues::Single)
        }

        match field {
            TraitField::Name => Some(FieldValues::Single(&self.name)),
            TraitField::ScientificName => Some(FieldValues::Single(&self.scientific_name)),
            TraitField::LeafType => Some(FieldValues::Single(&self.leaf_type)),
            TraitField::Habitat => set(&self.habitat),
            TraitField::BloomColor => self.bloom_color.as_deref().and_then(set),
            TraitField::FruitColor => self.fruit_color.as_deref().and_then(set),
            TraitField::EconomicValue => self.economic_value.as_deref().and_then(set),
            TraitField::ConservationStatus => single(self.conservation_status.as_deref()),
            TraitField::Characteristics => Some(FieldValues::Text(&self.characteristics)),
            TraitField::UniqueFeatures => self.unique_features.as_deref().and_then(set),
            TraitField::MedicinalProperties => self.medicinal_properties.as_deref().and_then(set),
            TraitField::EcologicalRole => self.ecological_role.as_deref().and_then(set),
            TraitField::Image => single(self.image.as_deref()),
        }
    }

    /// Unique features, empty when absent
    pub fn unique_features(&self) -> &[String] {
        self.unique_features.as_deref().unwrap_or(&[])
    }

    /// "Name (Scientific name)" for result lists
    pub fn display_name(&self) -> String {
        crate::utils::get_display_name(&self.name, &self.scientific_name)
    }

    /// Check the required-field invariant
    fn validate(&self, index: usize) -> std::result::Result<(), CatalogError> {
        let missing = |field: &'static str| -> std::result::Result<(), CatalogError> {
            Err(CatalogError::MissingField { index, field })
        };

        if is_blank(&self.name) {
            return missing("name");
        }
        if is_blank(&self.scientific_name) {
            return missing("scientificName");
        }
        if is_blank(&self.leaf_type) {
            return missing("leafType");
        }
        if self.habitat.iter().all(|h| is_blank(h)) {
            return missing("habitat");
        }
        if let Some(height) = &self.height {
            if height.min > height.max {
                return Err(CatalogError::InvalidHeight {
                    index,
                    name: self.name.clone(),
                    min: height.min,
                    max: height.max,
                });
            }
        }
        Ok(())
    }
}

/// Validated, immutable, ordered plant table
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<PlantRecord>,
    index: SearchIndex,
}

impl Catalog {
    /// Build a catalog, rejecting records that lack required fields
    pub fn from_records(records: Vec<PlantRecord>) -> std::result::Result<Self, CatalogError> {
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }
        let index = SearchIndex::build(&records);
        Ok(Self { records, index })
    }

    /// Parse a JSON array of plant records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<PlantRecord> =
            serde_json::from_str(json).with_context(|| "Failed to parse catalog JSON")?;
        Ok(Self::from_records(records)?)
    }

    /// Load catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;

        let catalog = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid catalog: {:?}", path))?;

        let stats = catalog.index.stats();
        tracing::info!(
            "Loaded catalog from {:?} ({} plants, {} searchable texts)",
            path,
            stats.plant_count,
            stats.text_count
        );
        Ok(catalog)
    }

    pub fn records(&self) -> &[PlantRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&PlantRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlantRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a PlantRecord;
    type IntoIter = std::slice::Iter<'a, PlantRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
