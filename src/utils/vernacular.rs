//! Display name handling
//!
//! Catalog records carry a local (Indonesian) name and a scientific name.
//! Result lists show "Local Name (Scientific name)", falling back to the
//! scientific name alone when the local name is blank.

/// Get formatted display name for a plant
pub fn get_display_name(name: &str, scientific_name: &str) -> String {
    let name = name.trim();
    let scientific_name = scientific_name.trim();

    match (name.is_empty(), scientific_name.is_empty()) {
        (false, false) if !name.eq_ignore_ascii_case(scientific_name) => {
            format!("{} ({})", name, scientific_name)
        }
        (false, _) => name.to_string(),
        (true, _) => scientific_name.to_string(),
    }
}
