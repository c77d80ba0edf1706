// Match Engine
//
// Purpose: decide which catalog entries satisfy the accumulated answers,
// the advanced filters and the query text.
// Pure: same inputs, same output; catalog order preserved; inputs untouched.
//
// Three predicates, ANDed per record:
//   1. structural  - every (trait key, value) answer
//   2. filters     - every active advanced-filter category (OR within one)
//   3. free text   - query is a substring of a searchable text

use crate::catalog::{Catalog, FieldValues, PlantRecord};
use crate::state::{AdvancedFilterState, SelectionState, TraitField};
use crate::utils::{contains_folded, fold, normalize_query};

/// Result of an evaluation
///
/// Keeps "not evaluated yet" apart from "evaluated, nothing matched".
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    /// The match engine has not run for the current inputs
    NotRun,
    /// Evaluated; no plant qualifies
    Empty,
    /// Evaluated; qualifying plants in catalog order
    Found(Vec<&'a PlantRecord>),
}

impl<'a> MatchOutcome<'a> {
    /// Wrap evaluated matches, mapping an empty list to `Empty`
    pub fn from_matches(matches: Vec<&'a PlantRecord>) -> Self {
        if matches.is_empty() {
            MatchOutcome::Empty
        } else {
            MatchOutcome::Found(matches)
        }
    }

    pub fn is_evaluated(&self) -> bool {
        !matches!(self, MatchOutcome::NotRun)
    }

    /// Matches, empty for `NotRun` and `Empty`
    pub fn records(&self) -> &[&'a PlantRecord] {
        match self {
            MatchOutcome::Found(records) => records,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Plant names in result order
    pub fn names(&self) -> Vec<&'a str> {
        self.records().iter().map(|p| p.name.as_str()).collect()
    }
}

/// How a predicate treats a record that lacks the field it asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbsentField {
    Satisfies,
    Fails,
}

// The one place deciding missing-data semantics.
// Answers never exclude a plant for data it does not record; an active
// advanced filter requires the plant to record a matching value.
const STRUCTURAL_ABSENT: AbsentField = AbsentField::Satisfies;
const FILTER_ABSENT: AbsentField = AbsentField::Fails;

fn check_field<F>(record: &PlantRecord, field: TraitField, absent: AbsentField, test: F) -> bool
where
    F: FnOnce(FieldValues<'_>) -> bool,
{
    match record.field_values(field) {
        Some(values) => test(values),
        None => absent == AbsentField::Satisfies,
    }
}

/// Whether held values satisfy one answer
///
/// Single value: exact equality. Set: membership. Free text: some entry
/// contains the answer, ignoring case.
fn satisfies_answer(values: FieldValues<'_>, wanted: &str) -> bool {
    match values {
        FieldValues::Single(v) => v == wanted,
        FieldValues::Set(vs) => vs.iter().any(|v| v == wanted),
        FieldValues::Text(texts) => {
            let needle = fold(wanted);
            texts.iter().any(|t| contains_folded(t, &needle))
        }
    }
}

/// Structural match: every answer is satisfied
///
/// Keys that name no record field are always satisfied. An empty selection
/// matches every record.
pub fn structural_match(record: &PlantRecord, selection: &SelectionState) -> bool {
    selection.iter().all(|(trait_key, value)| {
        match TraitField::from_trait_key(trait_key) {
            Some(field) => {
                check_field(record, field, STRUCTURAL_ABSENT, |values| satisfies_answer(values, value))
            }
            None => true,
        }
    })
}

/// Advanced-filter match: every active category accepts one of the record's values
pub fn filter_match(record: &PlantRecord, filters: &AdvancedFilterState) -> bool {
    filters.iter().all(|(category, accepted)| {
        check_field(record, category.field(), FILTER_ABSENT, |values| {
            values.iter().any(|v| accepted.contains(v))
        })
    })
}

/// Indices of qualifying records, in catalog order
pub fn match_indices(
    catalog: &Catalog,
    selection: &SelectionState,
    filters: &AdvancedFilterState,
    query: &str,
) -> Vec<usize> {
    let query_folded = normalize_query(query);
    let index = catalog.search_index();

    let matched: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, record)| structural_match(record, selection))
        .filter(|(_, record)| filter_match(record, filters))
        .filter(|(i, _)| match &query_folded {
            Some(q) => index.matches(*i, q),
            None => true,
        })
        .map(|(i, _)| i)
        .collect();

    tracing::debug!(
        "Match evaluated: {} of {} plants ({} answers, filters active: {}, query: {:?})",
        matched.len(),
        catalog.len(),
        selection.len(),
        !filters.is_empty(),
        query_folded
    );

    matched
}

/// Qualifying records, in catalog order
pub fn match_plants<'a>(
    catalog: &'a Catalog,
    selection: &SelectionState,
    filters: &AdvancedFilterState,
    query: &str,
) -> Vec<&'a PlantRecord> {
    match_indices(catalog, selection, filters, query)
        .into_iter()
        .filter_map(|i| catalog.get(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{dicot_catalog, plant};
    use crate::state::FilterCategory;

    fn names(records: &[&PlantRecord]) -> Vec<String> {
        records.iter().map(|p| p.name.clone()).collect()
    }

    fn select(pairs: &[(&str, &str)]) -> SelectionState {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_vacuous_match_returns_catalog() {
        let catalog = dicot_catalog();
        let result = match_plants(&catalog, &SelectionState::new(), &AdvancedFilterState::new(), "");
        assert_eq!(names(&result), vec!["Mangga", "Karet", "Tomat", "Cabai"]);
    }

    #[test]
    fn test_single_valued_exact_equality() {
        let catalog = dicot_catalog();
        let none = AdvancedFilterState::new();

        let result = match_plants(&catalog, &select(&[("leafType", "Tunggal")]), &none, "");
        assert_eq!(names(&result), vec!["Mangga", "Cabai"]);

        // exact, not case-folded
        let result = match_plants(&catalog, &select(&[("leafType", "tunggal")]), &none, "");
        assert!(result.is_empty());
    }

    #[test]
    fn test_multi_valued_membership() {
        let catalog = dicot_catalog();
        let none = AdvancedFilterState::new();

        let result = match_plants(&catalog, &select(&[("habitat", "Subtropis")]), &none, "");
        assert_eq!(names(&result), vec!["Mangga", "Cabai"]);

        let result = match_plants(
            &catalog,
            &select(&[("habitat", "Tropis"), ("fruitColor", "Merah")]),
            &none,
            "",
        );
        // Karet records no fruit color, so the answer does not exclude it
        assert_eq!(names(&result), vec!["Karet", "Tomat", "Cabai"]);
    }

    #[test]
    fn test_name_fields_match_exactly() {
        let catalog = dicot_catalog();
        let none = AdvancedFilterState::new();

        let result = match_plants(&catalog, &select(&[("scientificName", "Hevea brasiliensis")]), &none, "");
        assert_eq!(names(&result), vec!["Karet"]);

        let result = match_plants(&catalog, &select(&[("name", "Karet")]), &none, "");
        assert_eq!(names(&result), vec!["Karet"]);

        // exact, not substring or case-folded
        assert!(match_plants(&catalog, &select(&[("name", "karet")]), &none, "").is_empty());
        assert!(match_plants(&catalog, &select(&[("scientificName", "Hevea")]), &none, "").is_empty());
    }

    #[test]
    fn test_descriptive_lists_match_by_membership() {
        let catalog = dicot_catalog();
        let none = AdvancedFilterState::new();

        let result = match_plants(&catalog, &select(&[("uniqueFeatures", "Getah putih")]), &none, "");
        // Cabai records no unique features, so the answer does not exclude it
        assert_eq!(names(&result), vec!["Karet", "Cabai"]);

        // Nobody records these, so nothing is excluded
        let result = match_plants(
            &catalog,
            &select(&[("medicinalProperties", "Antioksidan"), ("ecologicalRole", "Peneduh")]),
            &none,
            "",
        );
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_image_is_single_valued() {
        let mut records = vec![
            plant("Mangga", "Mangifera indica", "Tunggal", &["Tropis"]),
            plant("Karet", "Hevea brasiliensis", "Majemuk", &["Tropis"]),
        ];
        records[0].image = Some("/images/mangga.jpg".to_string());
        records[1].image = Some("/images/karet.jpg".to_string());
        let catalog = Catalog::from_records(records).unwrap();

        let result = match_plants(
            &catalog,
            &select(&[("image", "/images/karet.jpg")]),
            &AdvancedFilterState::new(),
            "",
        );
        assert_eq!(names(&result), vec!["Karet"]);
    }

    #[test]
    fn test_unknown_trait_key_is_satisfied() {
        let catalog = dicot_catalog();
        let result = match_plants(
            &catalog,
            &select(&[("barkTexture", "Kasar"), ("height", "10")]),
            &AdvancedFilterState::new(),
            "",
        );
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_characteristic_rules() {
        let catalog = dicot_catalog();
        let none = AdvancedFilterState::new();

        let result = match_plants(
            &catalog,
            &select(&[("characteristics.leaf", "DAUN TUNGGAL")]),
            &none,
            "",
        );
        assert_eq!(names(&result), vec!["Mangga"]);

        let result = match_plants(
            &catalog,
            &select(&[("characteristics.leaf", "bergerigi"), ("characteristics.root", "akar tunggang")]),
            &none,
            "",
        );
        assert_eq!(names(&result), vec!["Cabai"]);
    }

    #[test]
    fn test_filter_or_within_and_across_categories() {
        let catalog = dicot_catalog();
        let selection = SelectionState::new();

        let mut filters = AdvancedFilterState::new();
        filters.toggle(FilterCategory::EconomicValue, "Industri");
        filters.toggle(FilterCategory::EconomicValue, "Obat");
        let result = match_plants(&catalog, &selection, &filters, "");
        assert_eq!(names(&result), vec!["Karet", "Tomat"]);

        filters.toggle(FilterCategory::BloomColor, "Kuning");
        let result = match_plants(&catalog, &selection, &filters, "");
        assert_eq!(names(&result), vec!["Tomat"]);
    }

    #[test]
    fn test_filter_excludes_absent_field() {
        let catalog = dicot_catalog();
        let selection = SelectionState::new();
        let mut filters = AdvancedFilterState::new();

        filters.toggle(FilterCategory::ConservationStatus, "Tidak Terancam");
        let result = match_plants(&catalog, &selection, &filters, "");
        assert_eq!(names(&result), vec!["Mangga", "Cabai"]);

        // Cabai's economic value list is empty, which counts as absent
        filters.toggle(FilterCategory::EconomicValue, "Pangan");
        let result = match_plants(&catalog, &selection, &filters, "");
        assert_eq!(names(&result), vec!["Mangga"]);
    }

    #[test]
    fn test_free_text_fields_and_case() {
        let catalog = dicot_catalog();
        let selection = SelectionState::new();
        let filters = AdvancedFilterState::new();

        let upper = match_plants(&catalog, &selection, &filters, "MANGGA");
        let lower = match_plants(&catalog, &selection, &filters, "mangga");
        assert_eq!(upper, lower);
        assert_eq!(names(&upper), vec!["Mangga"]);

        assert_eq!(names(&match_plants(&catalog, &selection, &filters, "solanum")), vec!["Tomat"]);
        assert_eq!(names(&match_plants(&catalog, &selection, &filters, "getah")), vec!["Karet"]);
        assert_eq!(names(&match_plants(&catalog, &selection, &filters, "aroma")), vec!["Mangga"]);
        assert_eq!(match_plants(&catalog, &selection, &filters, "").len(), 4);
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        let records = vec![
            {
                let mut p = plant("Sirih", "Piper betle", "Tunggal", &["Tropis"]);
                p.characteristics = vec!["Daun tunggal".to_string()];
                p
            },
            {
                let mut p = plant("Pakis", "Diplazium esculentum", "Majemuk", &["Tropis"]);
                p.characteristics = vec!["Daun tunggal muda menggulung".to_string()];
                p
            },
        ];
        let catalog = Catalog::from_records(records).unwrap();
        let selection = SelectionState::new();
        let filters = AdvancedFilterState::new();

        // "Daun tunggal" has nothing after "tunggal"
        assert_eq!(names(&match_plants(&catalog, &selection, &filters, "tunggal ")), vec!["Pakis"]);
        assert_eq!(
            names(&match_plants(&catalog, &selection, &filters, "tunggal")),
            vec!["Sirih", "Pakis"]
        );

        // Only the empty string is unconstrained; a lone space is a real query
        assert_eq!(
            names(&match_plants(&catalog, &selection, &filters, " ")),
            vec!["Sirih", "Pakis"]
        );
        assert!(match_plants(&catalog, &selection, &filters, "  ").is_empty());
    }

    #[test]
    fn test_all_predicates_combined() {
        let catalog = dicot_catalog();
        let mut filters = AdvancedFilterState::new();
        filters.toggle(FilterCategory::FruitColor, "Merah");

        let result = match_plants(&catalog, &select(&[("habitat", "Tropis")]), &filters, "daun");
        // Karet has no fruit color recorded, so the active filter drops it
        assert_eq!(names(&result), vec!["Tomat", "Cabai"]);
    }

    #[test]
    fn test_monotonic_narrowing() {
        let catalog = dicot_catalog();
        let filters = AdvancedFilterState::new();
        let answers = [
            ("habitat", "Tropis"),
            ("leafType", "Tunggal"),
            ("bloomColor", "Putih"),
            ("economicValue", "Pangan"),
            ("conservationStatus", "Tidak Terancam"),
        ];

        let mut selection = SelectionState::new();
        let mut previous = catalog.len();
        for (key, value) in answers {
            selection.select(key, value);
            let count = match_indices(&catalog, &selection, &filters, "").len();
            assert!(count <= previous, "{} increased matches {} -> {}", key, previous, count);
            previous = count;
        }
        assert_eq!(previous, 2);
    }

    #[test]
    fn test_order_preserved_and_no_duplicates() {
        let records = vec![
            plant("C", "C c", "Tunggal", &["Tropis"]),
            plant("A", "A a", "Majemuk", &["Tropis"]),
            plant("B", "B b", "Tunggal", &["Tropis", "Pantai"]),
        ];
        let catalog = Catalog::from_records(records).unwrap();
        let indices = match_indices(
            &catalog,
            &select(&[("habitat", "Tropis")]),
            &AdvancedFilterState::new(),
            "",
        );
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_outcome_tri_state() {
        let catalog = dicot_catalog();
        assert!(!MatchOutcome::NotRun.is_evaluated());
        assert_eq!(MatchOutcome::from_matches(Vec::new()), MatchOutcome::Empty);
        assert!(MatchOutcome::Empty.is_evaluated());

        let found = MatchOutcome::from_matches(catalog.iter().take(2).collect());
        assert_eq!(found.names(), vec!["Mangga", "Karet"]);
        assert_eq!(found.len(), 2);
        assert!(MatchOutcome::NotRun.records().is_empty());
    }
}
