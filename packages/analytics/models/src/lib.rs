#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived table types for the accident dashboard.
//!
//! Every derivation of the analytics engine returns one of these immutable,
//! serializable tables wrapped in a [`Derivation`], which records whether the
//! derivation could run against the loaded schema at all.

use road_safety_accident_models::{AccidentField, CategoricalField, Km, Period};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of hour rows in a [`HourMonthHeatmap`].
pub const HOURS_PER_DAY: usize = 24;

/// Number of month columns in a [`HourMonthHeatmap`].
pub const MONTHS_PER_YEAR: usize = 12;

/// Outcome of one derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Derivation<T> {
    /// The derivation ran; the table may still be empty.
    Available(T),
    /// The derivation needs columns the loaded table does not have.
    Unavailable {
        /// Required columns absent from the schema.
        missing: Vec<AccidentField>,
    },
}

impl<T> Derivation<T> {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Returns the table if the derivation ran.
    #[must_use]
    pub const fn available(&self) -> Option<&T> {
        match self {
            Self::Available(table) => Some(table),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Order in which a categorical breakdown is emitted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortPolicy {
    /// Ascending by the field's declared order (weekdays Sunday first),
    /// then lexicographically, with `unknown` last.
    Ordinal,
    /// Descending by count; ties keep first-encountered order.
    Ranked,
}

/// Count of records sharing one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category value, or `unknown` for missing cells.
    pub category: String,
    /// Number of records.
    pub count: u64,
}

/// Records excluded from an hour- or date-dependent table.
///
/// A record with both a bad hour and a bad date is excluded once but counted
/// under both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedTally {
    /// Records left out of the table.
    pub excluded: u64,
    /// Records whose `horario` could not be parsed into an hour.
    pub horario: u64,
    /// Records whose `data_inversa` could not be parsed into a date.
    pub data_inversa: u64,
}

impl MalformedTally {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.excluded == 0
    }
}

/// Accidents in one time-of-day period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCount {
    pub period: Period,
    pub count: u64,
}

/// Accident counts for all four periods, in period order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDistribution {
    pub periods: Vec<PeriodCount>,
    pub malformed: MalformedTally,
}

/// One period row of a [`PeriodSeverityMatrix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSeverityRow {
    pub period: Period,
    /// One cell per entry of [`PeriodSeverityMatrix::severities`].
    pub counts: Vec<u64>,
}

/// Period x severity cross-tabulation.
///
/// Rows always cover every [`Period`] in order and columns cover every
/// severity observed in the view; absent combinations are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSeverityMatrix {
    /// Column labels.
    pub severities: Vec<String>,
    pub rows: Vec<PeriodSeverityRow>,
    pub malformed: MalformedTally,
}

impl PeriodSeverityMatrix {
    /// Returns the count for one cell, zero if either key is unknown.
    #[must_use]
    pub fn cell(&self, period: Period, severity: &str) -> u64 {
        let Some(column) = self.severities.iter().position(|s| s == severity) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|row| row.period == period)
            .and_then(|row| row.counts.get(column).copied())
            .unwrap_or(0)
    }

    /// Sum of each period row.
    #[must_use]
    pub fn row_totals(&self) -> Vec<PeriodCount> {
        self.rows
            .iter()
            .map(|row| PeriodCount {
                period: row.period,
                count: row.counts.iter().sum(),
            })
            .collect()
    }

    /// Sum of each severity column, in column order.
    #[must_use]
    pub fn column_totals(&self) -> Vec<CategoryCount> {
        self.severities
            .iter()
            .enumerate()
            .map(|(column, severity)| CategoryCount {
                category: severity.clone(),
                count: self
                    .rows
                    .iter()
                    .filter_map(|row| row.counts.get(column))
                    .sum(),
            })
            .collect()
    }

    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.rows.iter().flat_map(|row| row.counts.iter()).sum()
    }
}

/// Risk statistics for one (`fase_dia`, `condicao_metereologica`,
/// `tipo_pista`) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskGroup {
    pub fase_dia: String,
    pub condicao_metereologica: String,
    pub tipo_pista: String,
    /// Records in the group, always at least one.
    pub count: u64,
    pub mortos_sum: u64,
    pub feridos_sum: u64,
    /// `(3 * mortos_sum + feridos_sum) / count`
    pub risk_index: f64,
}

/// Hour x month accident density.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourMonthHeatmap {
    /// `counts[hour][month - 1]`
    pub counts: [[u64; MONTHS_PER_YEAR]; HOURS_PER_DAY],
    pub malformed: MalformedTally,
}

impl HourMonthHeatmap {
    /// Returns the count for `hour` (0-23) and `month` (1-12), zero when
    /// out of range.
    #[must_use]
    pub fn cell(&self, hour: usize, month: usize) -> u64 {
        month
            .checked_sub(1)
            .and_then(|m| self.counts.get(hour).and_then(|row| row.get(m)))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

impl Default for HourMonthHeatmap {
    fn default() -> Self {
        Self {
            counts: [[0; MONTHS_PER_YEAR]; HOURS_PER_DAY],
            malformed: MalformedTally::default(),
        }
    }
}

/// Casualty sums for one kilometer marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRollup {
    pub km: Km,
    /// Accidents recorded at this marker.
    pub accidents: u64,
    pub mortos: u64,
    pub feridos_leves: u64,
    pub feridos_graves: u64,
    pub ilesos: u64,
}

/// Per-kilometer rollup, ascending by `km`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRollupTable {
    pub segments: Vec<SegmentRollup>,
    /// Records without a usable `km` value.
    pub unlocated: u64,
}

/// Overall casualty totals for a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasualtyTotals {
    pub mortos: u64,
    pub feridos: u64,
    pub ilesos: u64,
}

/// A categorical frequency table together with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalBreakdown {
    pub field: CategoricalField,
    pub policy: SortPolicy,
    pub counts: Derivation<Vec<CategoryCount>>,
}

/// Every derived table for one dataset version and UF selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Fingerprint of the record set the tables were derived from.
    pub dataset_version: String,
    /// Selected UF, `None` for the whole dataset.
    pub uf: Option<String>,
    /// Records in the filtered view.
    pub row_count: u64,
    /// Categorical frequency tables, in dashboard order.
    pub breakdowns: Vec<CategoricalBreakdown>,
    pub periods: Derivation<PeriodDistribution>,
    pub period_severity: Derivation<PeriodSeverityMatrix>,
    pub risk_ranking: Derivation<Vec<RiskGroup>>,
    pub heatmap: Derivation<HourMonthHeatmap>,
    pub segments: Derivation<SegmentRollupTable>,
    pub casualties: Derivation<CasualtyTotals>,
}

impl Dashboard {
    /// Returns the breakdown for `field`, if the dashboard includes one.
    #[must_use]
    pub fn breakdown(&self, field: CategoricalField) -> Option<&CategoricalBreakdown> {
        self.breakdowns.iter().find(|b| b.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PeriodSeverityMatrix {
        PeriodSeverityMatrix {
            severities: vec!["Com Vítimas Fatais".to_string(), "Sem Vítimas".to_string()],
            rows: vec![
                PeriodSeverityRow {
                    period: Period::Madrugada,
                    counts: vec![1, 0],
                },
                PeriodSeverityRow {
                    period: Period::Manha,
                    counts: vec![0, 3],
                },
                PeriodSeverityRow {
                    period: Period::Tarde,
                    counts: vec![2, 1],
                },
                PeriodSeverityRow {
                    period: Period::Noite,
                    counts: vec![0, 0],
                },
            ],
            malformed: MalformedTally::default(),
        }
    }

    #[test]
    fn matrix_totals_agree() {
        let m = matrix();
        assert_eq!(m.cell(Period::Tarde, "Com Vítimas Fatais"), 2);
        assert_eq!(m.cell(Period::Noite, "Sem Vítimas"), 0);
        assert_eq!(m.cell(Period::Manha, "Com Vítimas Feridas"), 0);
        assert_eq!(
            m.row_totals().iter().map(|r| r.count).collect::<Vec<_>>(),
            vec![1, 3, 3, 0]
        );
        assert_eq!(
            m.column_totals(),
            vec![
                CategoryCount {
                    category: "Com Vítimas Fatais".to_string(),
                    count: 3,
                },
                CategoryCount {
                    category: "Sem Vítimas".to_string(),
                    count: 4,
                },
            ]
        );
        assert_eq!(m.grand_total(), 7);
    }

    #[test]
    fn heatmap_cells_are_one_based_by_month() {
        let mut heatmap = HourMonthHeatmap::default();
        heatmap.counts[6][0] = 4;
        assert_eq!(heatmap.cell(6, 1), 4);
        assert_eq!(heatmap.cell(6, 0), 0);
        assert_eq!(heatmap.cell(24, 1), 0);
        assert_eq!(heatmap.total(), 4);
    }

    #[test]
    fn unavailable_derivations_serialize_missing_columns() {
        let derivation: Derivation<CasualtyTotals> = Derivation::Unavailable {
            missing: vec![AccidentField::Ilesos],
        };
        let json = serde_json::to_value(&derivation).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["data"]["missing"][0], "ilesos");
        assert!(derivation.available().is_none());
    }

    #[test]
    fn sort_policy_parses_from_name() {
        assert_eq!("ranked".parse::<SortPolicy>().unwrap(), SortPolicy::Ranked);
        assert_eq!(SortPolicy::Ordinal.to_string(), "ordinal");
    }
}
