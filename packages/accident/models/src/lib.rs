#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident record types, source column names and time-of-day periods.
//!
//! This crate defines the canonical row shape shared by the loader and the
//! derivation engine. Every column of the federal highway police accident
//! export maps to one [`AccidentField`], and every loaded row becomes one
//! immutable [`AccidentRecord`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label used for a categorical value that is missing from a row.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// A column of the accident table.
///
/// The string form is the exact column header used by the source export.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccidentField {
    /// Unique accident identifier
    Id,
    /// Two-letter federal unit (state) code
    Uf,
    /// Day-of-week label
    DiaSemana,
    /// Time of day, `HH:MM:SS`
    Horario,
    /// Calendar date
    DataInversa,
    /// Accident type (collision, run-off-road, ...)
    TipoAcidente,
    /// Probable cause
    CausaAcidente,
    /// Weather condition
    CondicaoMetereologica,
    /// Phase of the day (daylight, dusk, night, ...)
    FaseDia,
    /// Road type (single, double, multiple lanes)
    TipoPista,
    /// Severity classification
    ClassificacaoAcidente,
    /// Federal highway number
    Br,
    /// Kilometer marker on the highway
    Km,
    /// Municipality
    Municipio,
    /// Responsible police station
    Delegacia,
    /// Vehicles involved
    Veiculos,
    /// Fatalities
    Mortos,
    /// Injured people (light and severe)
    Feridos,
    /// Lightly injured people
    FeridosLeves,
    /// Severely injured people
    FeridosGraves,
    /// Unharmed people
    Ilesos,
}

impl AccidentField {
    /// Returns all variants of this enum, in source column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Id,
            Self::Uf,
            Self::DiaSemana,
            Self::Horario,
            Self::DataInversa,
            Self::TipoAcidente,
            Self::CausaAcidente,
            Self::CondicaoMetereologica,
            Self::FaseDia,
            Self::TipoPista,
            Self::ClassificacaoAcidente,
            Self::Br,
            Self::Km,
            Self::Municipio,
            Self::Delegacia,
            Self::Veiculos,
            Self::Mortos,
            Self::Feridos,
            Self::FeridosLeves,
            Self::FeridosGraves,
            Self::Ilesos,
        ]
    }

    /// Whether this column holds a non-negative integer count.
    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(
            self,
            Self::Veiculos
                | Self::Mortos
                | Self::Feridos
                | Self::FeridosLeves
                | Self::FeridosGraves
                | Self::Ilesos
        )
    }
}

/// A field that the categorical aggregator can count values of.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoricalField {
    Uf,
    DiaSemana,
    TipoAcidente,
    CausaAcidente,
    CondicaoMetereologica,
    FaseDia,
    TipoPista,
    ClassificacaoAcidente,
    Br,
    Municipio,
    Delegacia,
}

impl CategoricalField {
    /// Returns the source column backing this field.
    #[must_use]
    pub const fn column(self) -> AccidentField {
        match self {
            Self::Uf => AccidentField::Uf,
            Self::DiaSemana => AccidentField::DiaSemana,
            Self::TipoAcidente => AccidentField::TipoAcidente,
            Self::CausaAcidente => AccidentField::CausaAcidente,
            Self::CondicaoMetereologica => AccidentField::CondicaoMetereologica,
            Self::FaseDia => AccidentField::FaseDia,
            Self::TipoPista => AccidentField::TipoPista,
            Self::ClassificacaoAcidente => AccidentField::ClassificacaoAcidente,
            Self::Br => AccidentField::Br,
            Self::Municipio => AccidentField::Municipio,
            Self::Delegacia => AccidentField::Delegacia,
        }
    }

    /// Returns this field's value on `record`, or `None` when missing.
    #[must_use]
    pub fn value(self, record: &AccidentRecord) -> Option<&str> {
        match self {
            Self::Uf => Some(record.uf.as_str()),
            Self::DiaSemana => record.dia_semana.as_deref(),
            Self::TipoAcidente => record.tipo_acidente.as_deref(),
            Self::CausaAcidente => record.causa_acidente.as_deref(),
            Self::CondicaoMetereologica => record.condicao_metereologica.as_deref(),
            Self::FaseDia => record.fase_dia.as_deref(),
            Self::TipoPista => record.tipo_pista.as_deref(),
            Self::ClassificacaoAcidente => record.classificacao_acidente.as_deref(),
            Self::Br => record.br.as_deref(),
            Self::Municipio => record.municipio.as_deref(),
            Self::Delegacia => record.delegacia.as_deref(),
        }
    }

    /// Returns the declared position of `value` within this field's natural
    /// order, if the field has one.
    ///
    /// Only `dia_semana` declares an order (Sunday first). All other fields
    /// return `None` and fall back to lexicographic order.
    #[must_use]
    pub fn declared_rank(self, value: &str) -> Option<usize> {
        match self {
            Self::DiaSemana => Weekday::from_label(value).map(Weekday::rank),
            _ => None,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Uf,
            Self::DiaSemana,
            Self::TipoAcidente,
            Self::CausaAcidente,
            Self::CondicaoMetereologica,
            Self::FaseDia,
            Self::TipoPista,
            Self::ClassificacaoAcidente,
            Self::Br,
            Self::Municipio,
            Self::Delegacia,
        ]
    }
}

/// Time-of-day period an accident hour falls into.
///
/// Variants are declared in display order, which is also the row order of
/// every period-indexed table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Period {
    /// Hours `[0, 6)`
    Madrugada,
    /// Hours `[6, 12)`
    #[serde(rename = "Manhã")]
    #[strum(serialize = "Manhã")]
    Manha,
    /// Hours `[12, 18)`
    Tarde,
    /// Hours `[18, 24)`
    Noite,
}

impl Period {
    /// Classifies an hour of the day using right-open intervals.
    ///
    /// Returns `None` for hours of 24 and above.
    #[must_use]
    pub const fn from_hour(hour: u8) -> Option<Self> {
        match hour {
            0..6 => Some(Self::Madrugada),
            6..12 => Some(Self::Manha),
            12..18 => Some(Self::Tarde),
            18..24 => Some(Self::Noite),
            _ => None,
        }
    }

    /// Position of this period in [`Period::all`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Madrugada, Self::Manha, Self::Tarde, Self::Noite]
    }
}

/// Day of the week, in the declared Sunday-first order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Weekday {
    Domingo,
    SegundaFeira,
    #[serde(rename = "terça-feira")]
    #[strum(serialize = "terça-feira")]
    TercaFeira,
    QuartaFeira,
    QuintaFeira,
    SextaFeira,
    #[serde(rename = "sábado")]
    #[strum(serialize = "sábado")]
    Sabado,
}

impl Weekday {
    /// Parses a `dia_semana` label.
    ///
    /// Matching ignores case, accents and the `-feira` suffix, so
    /// `"Terça-feira"`, `"terca"` and `"TERÇA FEIRA"` are all Tuesday.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let folded: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' | 'à' | 'â' | 'ã' => 'a',
                'ç' => 'c',
                '_' => '-',
                other => other,
            })
            .collect();
        let stem = folded
            .strip_suffix("-feira")
            .or_else(|| folded.strip_suffix(" feira"))
            .unwrap_or(&folded);

        match stem {
            "domingo" => Some(Self::Domingo),
            "segunda" => Some(Self::SegundaFeira),
            "terca" => Some(Self::TercaFeira),
            "quarta" => Some(Self::QuartaFeira),
            "quinta" => Some(Self::QuintaFeira),
            "sexta" => Some(Self::SextaFeira),
            "sabado" => Some(Self::Sabado),
            _ => None,
        }
    }

    /// Zero-based position in the week, Sunday first.
    #[must_use]
    pub const fn rank(self) -> usize {
        self as usize
    }
}

/// Kilometer marker of a road segment.
///
/// Always finite. Ordered and hashed by value so that it can key grouped
/// tables; `-0.0` is stored as `0.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Km(f64);

impl Km {
    /// Creates a marker, rejecting NaN and infinities.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value + 0.0))
    }

    /// Returns the marker as a float.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Km {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Km {}

impl PartialOrd for Km {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Km {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Km {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl std::fmt::Display for Km {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the accident table.
///
/// Categorical columns are optional: a missing or empty cell is `None`.
/// `horario` and `data_inversa` are kept as raw text and parsed by each
/// derivation that needs them, so one malformed value never prevents the
/// row from loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Opaque identifier, unique across the dataset.
    pub id: String,
    /// Two-letter federal unit code.
    pub uf: String,
    /// Day-of-week label as written in the source.
    pub dia_semana: Option<String>,
    /// Raw time of day (`HH:MM:SS`).
    pub horario: String,
    /// Raw calendar date.
    pub data_inversa: String,
    pub tipo_acidente: Option<String>,
    pub causa_acidente: Option<String>,
    pub condicao_metereologica: Option<String>,
    pub fase_dia: Option<String>,
    pub tipo_pista: Option<String>,
    pub classificacao_acidente: Option<String>,
    pub br: Option<String>,
    pub km: Option<Km>,
    pub municipio: Option<String>,
    pub delegacia: Option<String>,
    pub veiculos: u32,
    pub mortos: u32,
    pub feridos: u32,
    pub feridos_leves: u32,
    pub feridos_graves: u32,
    pub ilesos: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_boundaries_are_right_open() {
        let hours = [5, 6, 11, 12, 17, 18, 23, 0];
        let periods: Vec<Period> = hours
            .iter()
            .map(|&h| Period::from_hour(h).unwrap())
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
        assert_eq!(Period::from_hour(24), None);
    }

    #[test]
    fn period_labels_are_portuguese() {
        assert_eq!(Period::Manha.to_string(), "Manhã");
        assert_eq!("Manhã".parse::<Period>().unwrap(), Period::Manha);
        assert_eq!(Period::Noite.index(), 3);
    }

    #[test]
    fn weekday_labels_parse_loosely() {
        assert_eq!(Weekday::from_label("domingo"), Some(Weekday::Domingo));
        assert_eq!(
            Weekday::from_label("Terça-feira"),
            Some(Weekday::TercaFeira)
        );
        assert_eq!(Weekday::from_label("terca"), Some(Weekday::TercaFeira));
        assert_eq!(Weekday::from_label("SÁBADO"), Some(Weekday::Sabado));
        assert_eq!(Weekday::from_label("feriado"), None);
        assert_eq!(Weekday::SegundaFeira.to_string(), "segunda-feira");
    }

    #[test]
    fn field_names_match_source_headers() {
        assert_eq!(
            AccidentField::CondicaoMetereologica.to_string(),
            "condicao_metereologica"
        );
        assert_eq!(
            "feridos_graves".parse::<AccidentField>().unwrap(),
            AccidentField::FeridosGraves
        );
        for field in CategoricalField::all() {
            assert_eq!(field.as_ref(), field.column().as_ref());
        }
    }

    #[test]
    fn count_columns() {
        let counts: Vec<AccidentField> = AccidentField::all()
            .iter()
            .copied()
            .filter(|f| f.is_count())
            .collect();
        assert_eq!(
            counts,
            vec![
                AccidentField::Veiculos,
                AccidentField::Mortos,
                AccidentField::Feridos,
                AccidentField::FeridosLeves,
                AccidentField::FeridosGraves,
                AccidentField::Ilesos,
            ]
        );
    }

    #[test]
    fn km_orders_by_value() {
        let mut kms = vec![
            Km::new(12.5).unwrap(),
            Km::new(-0.0).unwrap(),
            Km::new(3.0).unwrap(),
        ];
        kms.sort();
        let values: Vec<f64> = kms.iter().map(|k| k.value()).collect();
        assert_eq!(values, vec![0.0, 3.0, 12.5]);
        assert_eq!(Km::new(0.0), Km::new(-0.0));
        assert!(Km::new(f64::NAN).is_none());
    }
}
