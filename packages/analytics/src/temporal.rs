//! Hour extraction and time-of-day period classification.

use road_safety_accident_models::{AccidentField, Period};
use road_safety_analytics_models::{
    Derivation, MalformedTally, PeriodCount, PeriodDistribution,
};
use road_safety_records::RecordView;

use crate::{AnalyticsError, derive, tally_exclusion};

/// Extracts the hour from a `horario` value such as `"06:00:00"`.
///
/// The hour is the one- or two-digit component before the first `:` and
/// must lie in `[0, 23]`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedField`] if the leading component is
/// not a number or is 24 or greater.
pub fn parse_hour(horario: &str) -> Result<u8, AnalyticsError> {
    let malformed = || AnalyticsError::MalformedField {
        field: AccidentField::Horario,
        value: horario.to_owned(),
    };

    let lead = horario.trim().split(':').next().unwrap_or_default();
    if lead.is_empty() || lead.len() > 2 || !lead.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let hour = lead.parse::<u8>().map_err(|_| malformed())?;
    if hour >= 24 {
        return Err(malformed());
    }
    Ok(hour)
}

/// Classifies a `horario` value into its [`Period`].
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedField`] if the hour cannot be parsed.
pub fn period_of(horario: &str) -> Result<Period, AnalyticsError> {
    let hour = parse_hour(horario)?;
    Period::from_hour(hour).ok_or_else(|| AnalyticsError::MalformedField {
        field: AccidentField::Horario,
        value: horario.to_owned(),
    })
}

/// Counts accidents per time-of-day period.
///
/// All four periods are always present. Records with a malformed `horario`
/// are excluded and tallied.
#[must_use]
pub fn period_distribution(view: &RecordView<'_>) -> Derivation<PeriodDistribution> {
    derive(view, "period distribution", &[AccidentField::Horario], |view| {
        let mut counts = [0_u64; 4];
        let mut malformed = MalformedTally::default();

        for record in view.iter() {
            match period_of(&record.horario) {
                Ok(period) => counts[period.index()] += 1,
                Err(e) => tally_exclusion(&mut malformed, [&e]),
            }
        }

        if !malformed.is_clean() {
            log::debug!(
                "period distribution: {} records with malformed horario",
                malformed.excluded
            );
        }

        PeriodDistribution {
            periods: Period::all()
                .iter()
                .map(|&period| PeriodCount {
                    period,
                    count: counts[period.index()],
                })
                .collect(),
            malformed,
        }
    })
}

#[cfg(test)]
mod tests {
    use road_safety_records::{RecordSet, Schema};

    use super::*;
    use crate::test_support::record;

    #[test]
    fn parses_hours() {
        assert_eq!(parse_hour("06:00:00").unwrap(), 6);
        assert_eq!(parse_hour("23:59:59").unwrap(), 23);
        assert_eq!(parse_hour("7:30").unwrap(), 7);
        assert_eq!(parse_hour(" 00:10:00 ").unwrap(), 0);
    }

    #[test]
    fn rejects_malformed_hours() {
        for bad in ["24:00:00", "25:10:00", "", "ab:00:00", "-1:00", "123:00", "1a:00"] {
            assert!(
                matches!(
                    parse_hour(bad),
                    Err(AnalyticsError::MalformedField {
                        field: AccidentField::Horario,
                        ..
                    })
                ),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn six_oclock_is_morning() {
        assert_eq!(period_of("06:00:00").unwrap(), Period::Manha);
        assert_eq!(period_of("05:59:59").unwrap(), Period::Madrugada);
        assert_eq!(period_of("12:00:00").unwrap(), Period::Tarde);
        assert_eq!(period_of("18:00:00").unwrap(), Period::Noite);
    }

    #[test]
    fn hour_sequence_maps_to_periods() {
        let periods: Vec<Period> = ["05", "06", "11", "12", "17", "18", "23", "00"]
            .iter()
            .map(|h| period_of(&format!("{h}:00:00")).unwrap())
            .collect();
        assert_eq!(
            periods,
            vec![
                Period::Madrugada,
                Period::Manha,
                Period::Manha,
                Period::Tarde,
                Period::Tarde,
                Period::Noite,
                Period::Noite,
                Period::Madrugada,
            ]
        );
    }

    #[test]
    fn distribution_tallies_malformed_rows() {
        let set = RecordSet::from_records(vec![
            record(1, "06:00:00"),
            record(2, "07:15:00"),
            record(3, "19:00:00"),
            record(4, "24:00:00"),
            record(5, "noon"),
        ]);
        let distribution = period_distribution(&set.filter_uf(None));
        let distribution = distribution.available().unwrap();

        let counts: Vec<u64> = distribution.periods.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 2, 0, 1]);
        assert_eq!(distribution.malformed.excluded, 2);
        assert_eq!(distribution.malformed.horario, 2);
        assert_eq!(distribution.malformed.data_inversa, 0);
    }

    #[test]
    fn empty_view_is_zero_filled() {
        let set = RecordSet::from_records(Vec::new());
        let distribution = period_distribution(&set.filter_uf(None));
        let distribution = distribution.available().unwrap();
        assert_eq!(distribution.periods.len(), 4);
        assert!(distribution.periods.iter().all(|p| p.count == 0));
    }

    #[test]
    fn unavailable_without_horario() {
        let set = RecordSet::new(
            vec![record(1, "06:00:00")],
            Schema::full().without(AccidentField::Horario),
        );
        assert!(!period_distribution(&set.filter_uf(None)).is_available());
    }
}
