//! Per-kilometer injury rollup.

use std::collections::BTreeMap;

use road_safety_accident_models::{AccidentField, Km};
use road_safety_analytics_models::{Derivation, SegmentRollup, SegmentRollupTable};
use road_safety_records::RecordView;

use crate::derive;

const REQUIRED: &[AccidentField] = &[
    AccidentField::Km,
    AccidentField::Mortos,
    AccidentField::FeridosLeves,
    AccidentField::FeridosGraves,
    AccidentField::Ilesos,
];

/// Sums casualty counts per `km` marker, ascending by `km`.
///
/// Records without a `km` are not part of any segment and are counted in
/// [`SegmentRollupTable::unlocated`].
#[must_use]
pub fn segment_rollup(view: &RecordView<'_>) -> Derivation<SegmentRollupTable> {
    derive(view, "segment rollup", REQUIRED, |view| {
        let mut by_km: BTreeMap<Km, SegmentRollup> = BTreeMap::new();
        let mut unlocated = 0_u64;

        for record in view.iter() {
            let Some(km) = record.km else {
                unlocated += 1;
                continue;
            };

            let segment = by_km.entry(km).or_insert_with(|| SegmentRollup {
                km,
                accidents: 0,
                mortos: 0,
                feridos_leves: 0,
                feridos_graves: 0,
                ilesos: 0,
            });
            segment.accidents += 1;
            segment.mortos += u64::from(record.mortos);
            segment.feridos_leves += u64::from(record.feridos_leves);
            segment.feridos_graves += u64::from(record.feridos_graves);
            segment.ilesos += u64::from(record.ilesos);
        }

        if unlocated > 0 {
            log::debug!("segment rollup: {unlocated} records without km");
        }

        SegmentRollupTable {
            segments: by_km.into_values().collect(),
            unlocated,
        }
    })
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::AccidentRecord;
    use road_safety_records::{RecordSet, Schema};

    use super::*;

    fn accident(id: u32, km: Option<f64>, casualties: [u32; 4]) -> AccidentRecord {
        let [mortos, feridos_leves, feridos_graves, ilesos] = casualties;
        AccidentRecord {
            id: id.to_string(),
            uf: "SP".to_string(),
            km: km.and_then(Km::new),
            mortos,
            feridos_leves,
            feridos_graves,
            ilesos,
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn sums_per_km_in_ascending_order() {
        let set = RecordSet::from_records(vec![
            accident(1, Some(230.0), [0, 0, 1, 0]),
            accident(2, Some(12.5), [0, 1, 0, 2]),
            accident(3, Some(7.0), [2, 1, 0, 1]),
            accident(4, Some(12.5), [1, 0, 1, 0]),
        ]);
        let table = segment_rollup(&set.filter_uf(None));
        let table = table.available().unwrap();

        let kms: Vec<f64> = table.segments.iter().map(|s| s.km.value()).collect();
        assert_eq!(kms, vec![7.0, 12.5, 230.0]);

        let marker = &table.segments[1];
        assert_eq!(marker.accidents, 2);
        assert_eq!(marker.mortos, 1);
        assert_eq!(marker.feridos_leves, 1);
        assert_eq!(marker.feridos_graves, 1);
        assert_eq!(marker.ilesos, 2);
        assert_eq!(table.unlocated, 0);
    }

    #[test]
    fn records_without_km_are_unlocated() {
        let set = RecordSet::from_records(vec![
            accident(1, None, [1, 1, 1, 1]),
            accident(2, Some(1.0), [0, 0, 0, 1]),
        ]);
        let table = segment_rollup(&set.filter_uf(None));
        let table = table.available().unwrap();
        assert_eq!(table.segments.len(), 1);
        assert_eq!(table.unlocated, 1);
    }

    #[test]
    fn empty_view_has_no_segments() {
        let set = RecordSet::from_records(Vec::new());
        assert_eq!(
            segment_rollup(&set.filter_uf(None)),
            Derivation::Available(SegmentRollupTable::default())
        );
    }

    #[test]
    fn unavailable_without_km_column() {
        let set = RecordSet::new(
            vec![accident(1, Some(1.0), [0, 0, 0, 1])],
            Schema::full().without(AccidentField::Km),
        );
        assert!(!segment_rollup(&set.filter_uf(None)).is_available());
    }
}
