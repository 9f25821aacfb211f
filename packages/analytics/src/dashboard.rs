//! Assembles every derivation for one view into a [`Dashboard`].

use rayon::prelude::*;
use road_safety_accident_models::CategoricalField;
use road_safety_analytics_models::{CategoricalBreakdown, Dashboard, SortPolicy};
use road_safety_records::RecordView;

use crate::{
    casualty_totals, categorical_counts, hour_month_heatmap, period_distribution,
    period_severity_matrix, rank_risk_groups, segment_rollup,
};

/// Categorical tables shown on the dashboard, in display order.
pub const DASHBOARD_BREAKDOWNS: &[(CategoricalField, SortPolicy)] = &[
    (CategoricalField::DiaSemana, SortPolicy::Ordinal),
    (CategoricalField::TipoAcidente, SortPolicy::Ranked),
    (CategoricalField::CausaAcidente, SortPolicy::Ranked),
    (CategoricalField::CondicaoMetereologica, SortPolicy::Ranked),
    (CategoricalField::ClassificacaoAcidente, SortPolicy::Ranked),
    (CategoricalField::Municipio, SortPolicy::Ranked),
    (CategoricalField::Br, SortPolicy::Ranked),
];

/// Computes a single categorical breakdown.
#[must_use]
pub fn breakdown(
    view: &RecordView<'_>,
    field: CategoricalField,
    policy: SortPolicy,
) -> CategoricalBreakdown {
    CategoricalBreakdown {
        field,
        policy,
        counts: categorical_counts(view, field, policy),
    }
}

/// Runs every derivation over `view` on the current thread.
#[must_use]
pub fn build(view: &RecordView<'_>) -> Dashboard {
    log::debug!("Building dashboard for {} records", view.len());

    Dashboard {
        dataset_version: view.version().to_string(),
        uf: view.uf().map(str::to_owned),
        row_count: view.len() as u64,
        breakdowns: DASHBOARD_BREAKDOWNS
            .iter()
            .map(|&(field, policy)| breakdown(view, field, policy))
            .collect(),
        periods: period_distribution(view),
        period_severity: period_severity_matrix(view),
        risk_ranking: rank_risk_groups(view),
        heatmap: hour_month_heatmap(view),
        segments: segment_rollup(view),
        casualties: casualty_totals(view),
    }
}

/// Runs every derivation over `view` on the rayon thread pool.
///
/// Produces exactly the same dashboard as [`build`].
#[must_use]
pub fn build_parallel(view: &RecordView<'_>) -> Dashboard {
    log::debug!("Building dashboard for {} records in parallel", view.len());

    let (((breakdowns, periods), (period_severity, risk_ranking)), ((heatmap, segments), casualties)) =
        rayon::join(
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || {
                                DASHBOARD_BREAKDOWNS
                                    .par_iter()
                                    .map(|&(field, policy)| breakdown(view, field, policy))
                                    .collect::<Vec<_>>()
                            },
                            || period_distribution(view),
                        )
                    },
                    || rayon::join(|| period_severity_matrix(view), || rank_risk_groups(view)),
                )
            },
            || {
                rayon::join(
                    || rayon::join(|| hour_month_heatmap(view), || segment_rollup(view)),
                    || casualty_totals(view),
                )
            },
        );

    Dashboard {
        dataset_version: view.version().to_string(),
        uf: view.uf().map(str::to_owned),
        row_count: view.len() as u64,
        breakdowns,
        periods,
        period_severity,
        risk_ranking,
        heatmap,
        segments,
        casualties,
    }
}
