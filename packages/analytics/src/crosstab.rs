//! Period x severity cross-tabulation.

use std::collections::{BTreeSet, HashMap};

use road_safety_accident_models::{AccidentField, AccidentRecord, Period, UNKNOWN_CATEGORY};
use road_safety_analytics_models::{
    Derivation, MalformedTally, PeriodSeverityMatrix, PeriodSeverityRow,
};
use road_safety_records::RecordView;

use crate::temporal::period_of;
use crate::{derive, tally_exclusion};

/// Builds the period x `classificacao_acidente` matrix for `view`.
///
/// Columns are every severity observed in the view, sorted ascending with
/// `unknown` last, including severities whose only records had a malformed
/// `horario` (their cells stay zero). Those records are tallied instead of
/// counted.
#[must_use]
pub fn period_severity_matrix(view: &RecordView<'_>) -> Derivation<PeriodSeverityMatrix> {
    derive(
        view,
        "period x severity matrix",
        &[AccidentField::Horario, AccidentField::ClassificacaoAcidente],
        |view| {
            let severity_of = |record: &AccidentRecord| {
                record
                    .classificacao_acidente
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned())
            };

            let observed: BTreeSet<String> = view.iter().map(severity_of).collect();
            let (mut severities, unknown): (Vec<String>, Vec<String>) = observed
                .into_iter()
                .partition(|severity| severity != UNKNOWN_CATEGORY);
            severities.extend(unknown);

            let columns: HashMap<&str, usize> = severities
                .iter()
                .enumerate()
                .map(|(i, severity)| (severity.as_str(), i))
                .collect();

            let mut rows: Vec<PeriodSeverityRow> = Period::all()
                .iter()
                .map(|&period| PeriodSeverityRow {
                    period,
                    counts: vec![0; severities.len()],
                })
                .collect();
            let mut malformed = MalformedTally::default();

            for record in view.iter() {
                match period_of(&record.horario) {
                    Ok(period) => {
                        let severity = record
                            .classificacao_acidente
                            .as_deref()
                            .unwrap_or(UNKNOWN_CATEGORY);
                        if let Some(&column) = columns.get(severity) {
                            rows[period.index()].counts[column] += 1;
                        }
                    }
                    Err(e) => tally_exclusion(&mut malformed, [&e]),
                }
            }

            if !malformed.is_clean() {
                log::debug!(
                    "period x severity matrix: {} records with malformed horario",
                    malformed.excluded
                );
            }

            PeriodSeverityMatrix {
                severities,
                rows,
                malformed,
            }
        },
    )
}
