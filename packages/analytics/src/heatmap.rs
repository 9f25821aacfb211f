//! Hour x month accident density.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use road_safety_accident_models::AccidentField;
use road_safety_analytics_models::{Derivation, HourMonthHeatmap};
use road_safety_records::RecordView;

use crate::temporal::parse_hour;
use crate::{AnalyticsError, derive, tally_exclusion};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Extracts the month (1-12) from a `data_inversa` value.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and ISO date-times.
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedField`] if the value is not a valid
/// calendar date in any accepted format.
pub fn parse_month(data_inversa: &str) -> Result<u32, AnalyticsError> {
    let s = data_inversa.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .map(|dt| dt.date())
        });

    date.map(|d| d.month())
        .ok_or_else(|| AnalyticsError::MalformedField {
            field: AccidentField::DataInversa,
            value: data_inversa.to_owned(),
        })
}

/// Builds the 24 x 12 hour/month count matrix for `view`.
///
/// A record with a bad `horario`, a bad `data_inversa`, or both is left out
/// once, so the matrix total is `view.len() - malformed.excluded`.
#[must_use]
pub fn hour_month_heatmap(view: &RecordView<'_>) -> Derivation<HourMonthHeatmap> {
    derive(
        view,
        "hour x month heatmap",
        &[AccidentField::Horario, AccidentField::DataInversa],
        |view| {
            let mut heatmap = HourMonthHeatmap::default();

            for record in view.iter() {
                match (parse_hour(&record.horario), parse_month(&record.data_inversa)) {
                    (Ok(hour), Ok(month)) => {
                        // parse_month only yields 1..=12.
                        heatmap.counts[usize::from(hour)][(month - 1) as usize] += 1;
                    }
                    (hour, month) => {
                        tally_exclusion(
                            &mut heatmap.malformed,
                            hour.err().iter().chain(month.err().iter()),
                        );
                    }
                }
            }

            if !heatmap.malformed.is_clean() {
                log::debug!(
                    "hour x month heatmap: excluded {} records ({} bad horario, {} bad data_inversa)",
                    heatmap.malformed.excluded,
                    heatmap.malformed.horario,
                    heatmap.malformed.data_inversa,
                );
            }

            heatmap
        },
    )
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::AccidentRecord;
    use road_safety_records::{RecordSet, Schema};

    use super::*;

    fn accident(id: u32, horario: &str, data_inversa: &str) -> AccidentRecord {
        AccidentRecord {
            id: id.to_string(),
            uf: "SP".to_string(),
            horario: horario.to_string(),
            data_inversa: data_inversa.to_string(),
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn parses_months_from_supported_formats() {
        assert_eq!(parse_month("2024-01-05").unwrap(), 1);
        assert_eq!(parse_month("20/03/2024").unwrap(), 3);
        assert_eq!(parse_month("2024-12-31T23:00:00").unwrap(), 12);
        assert_eq!(parse_month(" 2024-07-04 ").unwrap(), 7);
    }

    #[test]
    fn rejects_invalid_dates() {
        for bad in ["", "not-a-date", "2024-13-01", "2024-02-30", "31/31/2024"] {
            assert!(
                matches!(
                    parse_month(bad),
                    Err(AnalyticsError::MalformedField {
                        field: AccidentField::DataInversa,
                        ..
                    })
                ),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn counts_land_in_hour_and_month_cells() {
        let set = RecordSet::from_records(vec![
            accident(1, "06:00:00", "2024-01-05"),
            accident(2, "06:59:00", "2023-01-20"),
            accident(3, "23:15:00", "2024-12-01"),
        ]);
        let heatmap = hour_month_heatmap(&set.filter_uf(None));
        let heatmap = heatmap.available().unwrap();

        assert_eq!(heatmap.cell(6, 1), 2);
        assert_eq!(heatmap.cell(23, 12), 1);
        assert_eq!(heatmap.cell(0, 1), 0);
        assert_eq!(heatmap.total(), 3);
        assert!(heatmap.malformed.is_clean());
    }

    #[test]
    fn total_excludes_each_bad_row_once() {
        let set = RecordSet::from_records(vec![
            accident(1, "10:00:00", "2024-05-01"),
            accident(2, "25:00:00", "2024-05-01"),
            accident(3, "10:00:00", "not-a-date"),
            accident(4, "xx", "also-bad"),
        ]);
        let view = set.filter_uf(None);
        let heatmap = hour_month_heatmap(&view);
        let heatmap = heatmap.available().unwrap();

        assert_eq!(heatmap.malformed.excluded, 3);
        assert_eq!(heatmap.malformed.horario, 2);
        assert_eq!(heatmap.malformed.data_inversa, 2);
        assert_eq!(
            heatmap.total(),
            view.len() as u64 - heatmap.malformed.excluded
        );
        assert_eq!(heatmap.cell(10, 5), 1);
    }

    #[test]
    fn empty_view_is_all_zero() {
        let set = RecordSet::from_records(Vec::new());
        let heatmap = hour_month_heatmap(&set.filter_uf(None));
        assert_eq!(heatmap, Derivation::Available(HourMonthHeatmap::default()));
    }

    #[test]
    fn unavailable_without_dates() {
        let set = RecordSet::new(
            vec![accident(1, "10:00:00", "2024-05-01")],
            Schema::full().without(AccidentField::DataInversa),
        );
        assert_eq!(
            hour_month_heatmap(&set.filter_uf(None)),
            Derivation::Unavailable {
                missing: vec![AccidentField::DataInversa]
            }
        );
    }
}
