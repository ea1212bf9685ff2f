//! Property tests: range queries and pagination agree with a brute-force
//! linear scan over the sorted values.

use proptest::prelude::*;

use star_core::{Attribute, CatalogAssociation, CatalogNames, CatalogTag, Entry, Star};
use star_db::MemoryStore;
use star_search::{IndexRegistry, RangeSummary};

const PAGE: usize = 4;

fn hip_names(count: usize) -> CatalogNames {
    CatalogNames::from_associations((1..=count as u64).map(|id| CatalogAssociation {
        star_id: id,
        catalog_tag: CatalogTag::Hip,
        identifier: id.to_string(),
    }))
}

/// Sorted entries exactly as the index should store them.
fn reference_entries(values: &[f64]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Entry::new(format!("HIP {}", i + 1), v))
        .collect();
    entries.sort_by(|a, b| a.value.total_cmp(&b.value));
    entries
}

/// First position >= minimum and last position <= maximum, if they form a run.
fn reference_run(entries: &[Entry], minimum: f64, maximum: f64) -> Option<(usize, usize)> {
    let low = entries.iter().position(|e| e.value >= minimum)?;
    let high = entries.iter().rposition(|e| e.value <= maximum)?;
    (low <= high).then_some((low, high))
}

/// Small value pool so duplicate runs are common.
fn values_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u8..8).prop_map(|v| v as f64 * 0.5), 0..30)
}

fn key_strategy() -> impl Strategy<Value = f64> {
    (-2i8..10).prop_map(|v| v as f64 * 0.5)
}

proptest! {
    #[test]
    fn range_query_matches_linear_scan(
        values in values_strategy(),
        minimum in key_strategy(),
        maximum in key_strategy(),
    ) {
        let stars: Vec<Star> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Star::new(i as u64 + 1, v, 0.0, 0.0))
            .collect();
        let registry = IndexRegistry::new(MemoryStore::shared());
        let index = registry
            .get_or_create("p", Attribute::Distance, Some(&stars[..]), &hip_names(values.len()))
            .unwrap();

        let expected = reference_entries(&values);
        for (i, entry) in expected.iter().enumerate() {
            prop_assert_eq!(&index.entry_at(i).unwrap(), entry);
        }

        let summary = index.range_query(minimum, maximum).unwrap();
        match reference_run(&expected, minimum, maximum) {
            Some((low, high)) => {
                prop_assert_eq!(
                    summary,
                    RangeSummary::Match {
                        minimum: expected[low].clone(),
                        maximum: expected[high].clone(),
                        sum: high - low + 1,
                    }
                );
            }
            None => {
                prop_assert_eq!(summary, RangeSummary::NoMatch);
                prop_assert_eq!(index.last_range().unwrap(), None);
            }
        }
    }

    #[test]
    fn pages_match_linear_slices(
        values in values_strategy(),
        minimum in key_strategy(),
        maximum in key_strategy(),
        page in 1usize..10,
        descending in any::<bool>(),
    ) {
        let stars: Vec<Star> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Star::new(i as u64 + 1, v, 0.0, 0.0))
            .collect();
        let registry = IndexRegistry::with_page_size(MemoryStore::shared(), PAGE);
        let index = registry
            .get_or_create("p", Attribute::Distance, Some(&stars[..]), &hip_names(values.len()))
            .unwrap();
        index.range_query(minimum, maximum).unwrap();

        let expected = reference_entries(&values);
        let mut run: Vec<Entry> = match reference_run(&expected, minimum, maximum) {
            Some((low, high)) => expected[low..=high].to_vec(),
            None => Vec::new(),
        };
        if descending {
            run.reverse();
        }
        let want: Vec<Entry> = run.into_iter().skip((page - 1) * PAGE).take(PAGE).collect();

        prop_assert_eq!(index.list_page(page, descending).unwrap(), want);
    }
}
