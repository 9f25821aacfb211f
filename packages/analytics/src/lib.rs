#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derivation engine for the accident dashboard.
//!
//! Each public derivation takes a [`RecordView`] and returns an immutable
//! table wrapped in a [`Derivation`]. Derivations never depend on each
//! other's output and never mutate the records, so they can run in any
//! order or in parallel (see [`dashboard::build_parallel`]).
//!
//! Failures are local: a malformed `horario` or `data_inversa` excludes one
//! record from the tables that need that field, and a column missing from the
//! loaded schema marks only the derivations that need it as unavailable.

pub mod cache;
pub mod categorical;
pub mod crosstab;
pub mod dashboard;
pub mod heatmap;
pub mod palette;
pub mod risk;
pub mod segments;
pub mod temporal;
pub mod totals;

use road_safety_accident_models::AccidentField;
use road_safety_analytics_models::{Derivation, MalformedTally};
use road_safety_records::RecordView;
use thiserror::Error;

pub use cache::DashboardCache;
pub use categorical::categorical_counts;
pub use crosstab::period_severity_matrix;
pub use heatmap::{hour_month_heatmap, parse_month};
pub use palette::category_color;
pub use risk::rank_risk_groups;
pub use segments::segment_rollup;
pub use temporal::{parse_hour, period_distribution, period_of};
pub use totals::casualty_totals;

/// Conditions a derivation can run into.
///
/// None of these escape a derivation as an `Err`: empty input degrades to
/// empty tables, malformed fields are tallied, and missing columns become
/// [`Derivation::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// The filtered view has no rows.
    #[error("No records in the selected view")]
    EmptyInput,

    /// A single record's field cannot be parsed.
    #[error("Malformed {field} value '{value}'")]
    MalformedField {
        /// Column holding the bad value.
        field: AccidentField,
        /// The raw value.
        value: String,
    },

    /// Columns the derivation needs are absent from the dataset.
    #[error("Missing required columns: {}", join_columns(columns))]
    MissingColumn {
        /// The absent columns.
        columns: Vec<AccidentField>,
    },
}

fn join_columns(columns: &[AccidentField]) -> String {
    columns
        .iter()
        .map(|column| column.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Runs `build` if the view's schema has every `required` column.
fn derive<'a, T>(
    view: &RecordView<'a>,
    name: &str,
    required: &[AccidentField],
    build: impl FnOnce(&RecordView<'a>) -> T,
) -> Derivation<T> {
    let missing = view.schema().missing(required);
    if missing.is_empty() {
        return Derivation::Available(build(view));
    }

    log::info!(
        "{name} unavailable: {}",
        AnalyticsError::MissingColumn {
            columns: missing.clone()
        }
    );
    Derivation::Unavailable { missing }
}

/// Records one excluded row in `tally`, counting every field that failed.
fn tally_exclusion<'e>(
    tally: &mut MalformedTally,
    errors: impl IntoIterator<Item = &'e AnalyticsError>,
) {
    tally.excluded += 1;
    for error in errors {
        log::trace!("Excluding record: {error}");
        if let AnalyticsError::MalformedField { field, .. } = error {
            match field {
                AccidentField::Horario => tally.horario += 1,
                AccidentField::DataInversa => tally.data_inversa += 1,
                _ => {}
            }
        }
    }
}
