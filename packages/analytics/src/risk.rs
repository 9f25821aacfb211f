//! Multi-factor risk ranking.

use std::collections::BTreeMap;

use road_safety_accident_models::{AccidentField, UNKNOWN_CATEGORY};
use road_safety_analytics_models::{Derivation, RiskGroup};
use road_safety_records::RecordView;

use crate::derive;

/// Weight of one fatality relative to one injury in the risk index.
pub const FATALITY_WEIGHT: u64 = 3;

/// Number of groups kept by [`rank_risk_groups`].
pub const TOP_GROUPS: usize = 10;

const REQUIRED: &[AccidentField] = &[
    AccidentField::FaseDia,
    AccidentField::CondicaoMetereologica,
    AccidentField::TipoPista,
    AccidentField::Mortos,
    AccidentField::Feridos,
];

/// Ranks (`fase_dia`, `condicao_metereologica`, `tipo_pista`) groups by
/// `(3 * mortos_sum + feridos_sum) / count`.
///
/// Returns at most [`TOP_GROUPS`] groups, highest index first. Groups with
/// equal indices are ordered lexicographically by their triple.
#[must_use]
pub fn rank_risk_groups(view: &RecordView<'_>) -> Derivation<Vec<RiskGroup>> {
    derive(view, "risk ranking", REQUIRED, |view| {
        #[allow(clippy::items_after_statements)]
        #[derive(Default)]
        struct GroupAccum {
            count: u64,
            mortos: u64,
            feridos: u64,
        }

        let mut groups: BTreeMap<(&str, &str, &str), GroupAccum> = BTreeMap::new();
        for record in view.iter() {
            let key = (
                record.fase_dia.as_deref().unwrap_or(UNKNOWN_CATEGORY),
                record
                    .condicao_metereologica
                    .as_deref()
                    .unwrap_or(UNKNOWN_CATEGORY),
                record.tipo_pista.as_deref().unwrap_or(UNKNOWN_CATEGORY),
            );
            let entry = groups.entry(key).or_default();
            entry.count += 1;
            entry.mortos += u64::from(record.mortos);
            entry.feridos += u64::from(record.feridos);
        }

        // BTreeMap iteration is already in triple order, so a stable sort
        // on the index alone leaves ties lexicographic.
        let mut ranked: Vec<RiskGroup> = groups
            .into_iter()
            .map(|((fase_dia, condicao, pista), acc)| RiskGroup {
                fase_dia: fase_dia.to_owned(),
                condicao_metereologica: condicao.to_owned(),
                tipo_pista: pista.to_owned(),
                count: acc.count,
                mortos_sum: acc.mortos,
                feridos_sum: acc.feridos,
                risk_index: risk_index(acc.mortos, acc.feridos, acc.count),
            })
            .collect();
        ranked.sort_by(|a, b| b.risk_index.total_cmp(&a.risk_index));
        ranked.truncate(TOP_GROUPS);

        log::debug!("risk ranking: kept {} groups", ranked.len());
        ranked
    })
}

#[allow(clippy::cast_precision_loss)]
fn risk_index(mortos: u64, feridos: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (FATALITY_WEIGHT * mortos + feridos) as f64 / count as f64
}
