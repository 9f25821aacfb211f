//! Overall casualty totals.

use road_safety_accident_models::AccidentField;
use road_safety_analytics_models::{CasualtyTotals, Derivation};
use road_safety_records::RecordView;

use crate::derive;

/// Sums `mortos`, `feridos` and `ilesos` over `view`.
#[must_use]
pub fn casualty_totals(view: &RecordView<'_>) -> Derivation<CasualtyTotals> {
    derive(
        view,
        "casualty totals",
        &[
            AccidentField::Mortos,
            AccidentField::Feridos,
            AccidentField::Ilesos,
        ],
        |view| {
            view.iter()
                .fold(CasualtyTotals::default(), |totals, record| CasualtyTotals {
                    mortos: totals.mortos + u64::from(record.mortos),
                    feridos: totals.feridos + u64::from(record.feridos),
                    ilesos: totals.ilesos + u64::from(record.ilesos),
                })
        },
    )
}
