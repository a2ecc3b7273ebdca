//! Free-text region resolution.
//!
//! Sub-division labels are multi-word ("Konkan & Goa", "Madhya Maharashtra")
//! and rarely equal what a user types, so matching is substring containment on
//! normalized text. When the whole query matches nothing, each whitespace token
//! is tried on its own and the matches are accumulated.

use tracing::debug;

use super::normalize::normalize;
use super::storage::Dataset;

/// Raw region labels matched by `query`, in first-seen order without duplicates.
///
/// An empty query matches every region.
pub fn resolve(query: &str, dataset: &Dataset) -> Vec<String> {
    let query = normalize(query);

    let mut matches = matching_regions(&query, dataset);

    if matches.is_empty() {
        for token in query.split_whitespace() {
            for region in matching_regions(token, dataset) {
                if !matches.contains(&region) {
                    matches.push(region);
                }
            }
        }
    }

    debug!(query = %query, ?matches, "resolved region query");
    matches
}

/// Distinct raw labels whose normalized form contains `needle`
fn matching_regions(needle: &str, dataset: &Dataset) -> Vec<String> {
    dataset
        .regions()
        .iter()
        .filter(|r| r.normalized.contains(needle))
        .map(|r| r.raw.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testdata::sample_dataset;

    #[test]
    fn test_every_region_resolves_to_itself() {
        let dataset = sample_dataset();
        for name in dataset.region_names() {
            let matches = resolve(&normalize(name), &dataset);
            assert!(
                matches.iter().any(|m| m == name),
                "{name:?} not in {matches:?}"
            );
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let dataset = sample_dataset();
        let all: Vec<String> = dataset.region_names().map(String::from).collect();
        assert_eq!(resolve("", &dataset), all);
        assert_eq!(resolve("   ", &dataset), all);
    }

    #[test]
    fn test_state_name_matches_subdivision() {
        let dataset = sample_dataset();
        assert_eq!(resolve("Maharashtra", &dataset), vec!["Madhya Maharashtra"]);
        assert_eq!(resolve("gujarat", &dataset), vec!["Gujarat Region"]);
    }

    #[test]
    fn test_ampersand_and_word_are_equivalent() {
        let dataset = sample_dataset();
        assert_eq!(resolve("Saurashtra and Kutch", &dataset), vec!["Saurashtra & Kutch"]);
        assert_eq!(resolve("konkan & goa", &dataset), vec!["Konkan & Goa"]);
    }

    #[test]
    fn test_overlapping_labels_are_kept_distinct() {
        let dataset = sample_dataset();
        assert_eq!(resolve("Goa", &dataset), vec!["Konkan & Goa", "Goa"]);
    }

    #[test]
    fn test_token_fallback_accumulates_in_order() {
        let dataset = sample_dataset();
        assert_eq!(
            resolve("Madhya Marathwada", &dataset),
            vec!["Madhya Maharashtra", "Marathwada"]
        );
        // "vidarbha" matches nothing, "marathwada" still does
        assert_eq!(resolve("vidarbha marathwada", &dataset), vec!["Marathwada"]);
    }

    #[test]
    fn test_token_fallback_deduplicates() {
        let dataset = sample_dataset();
        // both tokens hit "Konkan & Goa"; "goa" also hits "Goa"
        assert_eq!(
            resolve("konkan xyz goa", &dataset),
            vec!["Konkan & Goa", "Goa"]
        );
    }

    #[test]
    fn test_unknown_region() {
        let dataset = sample_dataset();
        assert!(resolve("Atlantis", &dataset).is_empty());
    }
}
