//! Question sequences for the guided flow
//!
//! A step asks about one trait key and offers a closed set of values.
//! Three built-in sequences ship with the crate:
//! - `basic_steps`: leaf structure, habitat
//! - `expanded_steps`: basic + economic value, conservation status
//! - `dicot_rule_steps`: seed, leaf and habitat rules matched against the
//!   free-text characteristics of each plant

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Index;
use std::path::Path;

use crate::error::SequenceError;
use crate::utils::is_blank;

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub label: String,
    /// Written into the selection under the step's trait key
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StepOption {
    pub fn new(label: &str, value: &str, description: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        }
    }
}

/// One page of the guided flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub trait_key: String,
    pub options: Vec<StepOption>,
}

impl QuestionStep {
    pub fn new(title: &str, description: &str, trait_key: &str, options: Vec<StepOption>) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            trait_key: trait_key.to_string(),
            options,
        }
    }

    /// Option carrying `value`, if this step offers it
    pub fn option(&self, value: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn offers(&self, value: &str) -> bool {
        self.option(value).is_some()
    }
}

/// Validated, non-empty, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionSequence {
    steps: Vec<QuestionStep>,
}

impl QuestionSequence {
    pub fn new(steps: Vec<QuestionStep>) -> std::result::Result<Self, SequenceError> {
        if steps.is_empty() {
            return Err(SequenceError::Empty);
        }

        for (step, s) in steps.iter().enumerate() {
            if is_blank(&s.trait_key) {
                return Err(SequenceError::MissingTraitKey { step });
            }
            if s.options.is_empty() {
                return Err(SequenceError::NoOptions {
                    step,
                    trait_key: s.trait_key.clone(),
                });
            }

            // Options are mutually exclusive: values must be distinct
            let mut seen = FxHashSet::default();
            for option in &s.options {
                if is_blank(&option.value) {
                    return Err(SequenceError::EmptyValue {
                        step,
                        trait_key: s.trait_key.clone(),
                    });
                }
                if !seen.insert(option.value.as_str()) {
                    return Err(SequenceError::DuplicateValue {
                        step,
                        trait_key: s.trait_key.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        Ok(Self { steps })
    }

    /// Load a sequence from a JSON array of steps
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read question sequence: {:?}", path))?;

        let steps: Vec<QuestionStep> = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse question sequence JSON")?;

        let sequence = Self::new(steps)
            .with_context(|| format!("Invalid question sequence: {:?}", path))?;

        tracing::info!("Loaded {} question steps from {:?}", sequence.len(), path);
        Ok(sequence)
    }

    pub fn get(&self, index: usize) -> Option<&QuestionStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: construction rejects empty sequences
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionStep> {
        self.steps.iter()
    }
}

impl<'de> Deserialize<'de> for QuestionSequence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let steps = Vec::<QuestionStep>::deserialize(deserializer)?;
        Self::new(steps).map_err(serde::de::Error::custom)
    }
}

impl Index<usize> for QuestionSequence {
    type Output = QuestionStep;

    fn index(&self, index: usize) -> &QuestionStep {
        &self.steps[index]
    }
}

fn leaf_structure_step() -> QuestionStep {
    QuestionStep::new(
        "Struktur Daun",
        "Identifikasi struktur dan bentuk daun tanaman",
        "leafType",
        vec![
            StepOption::new("Daun Tunggal", "Tunggal", "Daun dengan helai tunggal tidak terbagi"),
            StepOption::new("Daun Majemuk", "Majemuk", "Daun terdiri dari beberapa helai pada satu tangkai"),
            StepOption::new("Daun Menjari", "Menjari", "Daun dengan struktur menyerupai jari"),
            StepOption::new("Daun Menyirip", "Menyirip", "Daun dengan struktur menyirip seperti daun pakis"),
        ],
    )
}

fn habitat_step() -> QuestionStep {
    QuestionStep::new(
        "Habitat Utama",
        "Tentukan zona ekologi utama tempat tanaman biasa hidup",
        "habitat",
        vec![
            StepOption::new("Kawasan Tropis", "Tropis", "Habitat dengan curah hujan tinggi dan suhu konstan"),
            StepOption::new("Kawasan Subtropis", "Subtropis", "Wilayah transisi antara tropis dan iklim sedang"),
            StepOption::new("Iklim Sedang", "Iklim Sedang", "Kawasan dengan empat musim yang jelas"),
            StepOption::new("Zona Gunung", "Gunung", "Habitat di ketinggian dengan kondisi khusus"),
            StepOption::new("Kawasan Pantai", "Pantai", "Lingkungan dekat dengan garis pantai"),
        ],
    )
}

/// Leaf structure and habitat
pub fn basic_steps() -> QuestionSequence {
    QuestionSequence {
        steps: vec![leaf_structure_step(), habitat_step()],
    }
}

/// Basic steps followed by economic value and conservation status
pub fn expanded_steps() -> QuestionSequence {
    let mut steps = basic_steps().steps;
    steps.push(QuestionStep::new(
        "Nilai Ekonomi",
        "Pilih kategori nilai ekonomi tanaman",
        "economicValue",
        vec![
            StepOption::new("Pangan", "Pangan", "Tanaman yang dapat dikonsumsi atau digunakan sebagai bahan pangan"),
            StepOption::new("Industri", "Industri", "Tanaman dengan nilai industri tinggi"),
            StepOption::new("Obat-obatan", "Obat", "Tanaman dengan manfaat medis atau farmasi"),
        ],
    ));
    steps.push(QuestionStep::new(
        "Status Konservasi",
        "Pilih status konservasi tanaman",
        "conservationStatus",
        vec![
            StepOption::new("Tidak Terancam", "Tidak Terancam", "Populasi tanaman stabil"),
            StepOption::new("Terancam", "Terancam", "Populasi tanaman berisiko"),
            StepOption::new("Dilindungi", "Dilindungi", "Tanaman dalam program perlindungan"),
        ],
    ));
    QuestionSequence { steps }
}

/// Dicot rule flow: each answer must appear in some characteristic
///
/// The "Lainnya" options use values no characteristic contains, so picking
/// one narrows to an empty result.
pub fn dicot_rule_steps() -> QuestionSequence {
    QuestionSequence {
        steps: vec![
            QuestionStep::new(
                "Tipe Biji Saat Berkecambah",
                "",
                "characteristics.seed",
                vec![
                    StepOption::new("Dua keping terpisah", "dua keping biji terpisah", ""),
                    StepOption::new("Lainnya", "keping tunggal", ""),
                ],
            ),
            QuestionStep::new(
                "Struktur Daun",
                "",
                "characteristics.leaf",
                vec![
                    StepOption::new("Daun Tunggal", "daun tunggal", ""),
                    StepOption::new("Daun Majemuk", "daun majemuk", ""),
                    StepOption::new("Daun Menyirip", "daun menyirip", ""),
                ],
            ),
            QuestionStep::new(
                "Habitat Utama",
                "",
                "characteristics.habitat",
                vec![
                    StepOption::new("Tropis", "tropis", ""),
                    StepOption::new("Subtropis", "subtropis", ""),
                    StepOption::new("Iklim Sedang", "iklim sedang", ""),
                ],
            ),
        ],
    }
}
