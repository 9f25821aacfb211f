//! Frequency counts per categorical field.

use std::collections::HashMap;

use road_safety_accident_models::{CategoricalField, UNKNOWN_CATEGORY};
use road_safety_analytics_models::{CategoryCount, Derivation, SortPolicy};
use road_safety_records::RecordView;

use crate::{AnalyticsError, derive};

/// Counts the records of `view` per distinct value of `field`.
///
/// Missing values are counted under [`UNKNOWN_CATEGORY`], so the counts
/// always sum to `view.len()`. An empty view yields an empty table.
#[must_use]
pub fn categorical_counts(
    view: &RecordView<'_>,
    field: CategoricalField,
    policy: SortPolicy,
) -> Derivation<Vec<CategoryCount>> {
    derive(view, field.as_ref(), &[field.column()], |view| {
        if view.is_empty() {
            log::debug!("{field}: {}", AnalyticsError::EmptyInput);
            return Vec::new();
        }

        let mut counts = count_in_first_seen_order(view, field);
        match policy {
            // `sort_by` is stable, so equal counts keep first-seen order.
            SortPolicy::Ranked => counts.sort_by(|a, b| b.count.cmp(&a.count)),
            SortPolicy::Ordinal => counts.sort_by(|a, b| {
                ordinal_key(field, &a.category).cmp(&ordinal_key(field, &b.category))
            }),
        }
        counts
    })
}

fn count_in_first_seen_order(view: &RecordView<'_>, field: CategoricalField) -> Vec<CategoryCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for record in view.iter() {
        let value = field.value(record).unwrap_or(UNKNOWN_CATEGORY);
        if let Some(&position) = positions.get(value) {
            counts[position].count += 1;
        } else {
            positions.insert(value, counts.len());
            counts.push(CategoryCount {
                category: value.to_owned(),
                count: 1,
            });
        }
    }

    counts
}

/// Sort key for [`SortPolicy::Ordinal`]: declared rank first, undeclared
/// values after in lexicographic order, `unknown` last.
fn ordinal_key(field: CategoricalField, category: &str) -> (bool, bool, usize, &str) {
    let rank = field.declared_rank(category);
    (
        category == UNKNOWN_CATEGORY,
        rank.is_none(),
        rank.unwrap_or(0),
        category,
    )
}
