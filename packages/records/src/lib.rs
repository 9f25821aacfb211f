#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory accident record set and UF filter views.
//!
//! A [`RecordSet`] is built once per load and is read-only afterwards.
//! Selecting a UF produces a borrowed [`RecordView`]; the derivation engine
//! only ever reads from views, so any number of derivations can share one
//! record set across threads without locking.

pub mod loader;
pub mod parsing;

use std::collections::{BTreeSet, HashSet};

use road_safety_accident_models::{AccidentField, AccidentRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

pub use loader::{load_csv, read_csv};

/// Errors that can occur while loading a record set.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the record set cannot be built without is absent.
    #[error("Required column '{column}' is missing from the header row")]
    MissingHeader {
        /// The absent column.
        column: AccidentField,
    },
}

/// Canonical form of a UF selection: trimmed and upper-cased.
#[must_use]
pub fn normalize_uf(uf: &str) -> String {
    uf.trim().to_ascii_uppercase()
}

/// Set of columns present in a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: BTreeSet<AccidentField>,
}

impl Schema {
    /// A schema with every known column present.
    #[must_use]
    pub fn full() -> Self {
        Self::from_columns(AccidentField::all().iter().copied())
    }

    /// Builds a schema from the columns found in a header row.
    #[must_use]
    pub fn from_columns(columns: impl IntoIterator<Item = AccidentField>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// Returns a copy of this schema without `column`.
    #[must_use]
    pub fn without(&self, column: AccidentField) -> Self {
        let mut columns = self.columns.clone();
        columns.remove(&column);
        Self { columns }
    }

    #[must_use]
    pub fn contains(&self, column: AccidentField) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the subset of `required` that is not present, in the order
    /// given.
    #[must_use]
    pub fn missing(&self, required: &[AccidentField]) -> Vec<AccidentField> {
        required
            .iter()
            .copied()
            .filter(|column| !self.contains(*column))
            .collect()
    }

    /// Iterates over the present columns in source order.
    pub fn columns(&self) -> impl Iterator<Item = AccidentField> + '_ {
        self.columns.iter().copied()
    }
}

/// Content fingerprint of a loaded record set.
///
/// Two record sets with the same rows (in the same order) and the same
/// schema share a version; any reload with different content gets a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetVersion(String);

impl DatasetVersion {
    fn fingerprint(records: &[AccidentRecord], schema: &Schema) -> Self {
        let mut hasher = Sha256::new();
        for column in schema.columns() {
            hasher.update(column.as_ref().as_bytes());
            hasher.update([0x1f_u8]);
        }
        for record in records {
            hasher.update([0x1e_u8]);
            hash_record(&mut hasher, record);
        }
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Feeds every field of `record` to `hasher` in declaration order.
///
/// Optional fields are prefixed with a presence byte so `None` and an empty
/// value never collide.
fn hash_record(hasher: &mut Sha256, record: &AccidentRecord) {
    let mut text = |value: &str| {
        hasher.update(value.as_bytes());
        hasher.update([0x1f_u8]);
    };
    text(&record.id);
    text(&record.uf);
    text(&record.horario);
    text(&record.data_inversa);

    for value in [
        &record.dia_semana,
        &record.tipo_acidente,
        &record.causa_acidente,
        &record.condicao_metereologica,
        &record.fase_dia,
        &record.tipo_pista,
        &record.classificacao_acidente,
        &record.br,
        &record.municipio,
        &record.delegacia,
    ] {
        match value {
            Some(value) => {
                hasher.update([1_u8]);
                hasher.update(value.as_bytes());
            }
            None => hasher.update([0_u8]),
        }
        hasher.update([0x1f_u8]);
    }

    match record.km {
        Some(km) => {
            hasher.update([1_u8]);
            hasher.update(km.value().to_bits().to_le_bytes());
        }
        None => hasher.update([0_u8]),
    }

    for count in [
        record.veiculos,
        record.mortos,
        record.feridos,
        record.feridos_leves,
        record.feridos_graves,
        record.ilesos,
    ] {
        hasher.update(count.to_le_bytes());
    }
}

impl std::fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full, immutable table of accidents for one load.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<AccidentRecord>,
    schema: Schema,
    version: DatasetVersion,
}

impl RecordSet {
    /// Builds a record set from loaded rows.
    ///
    /// Identifiers must be unique across the dataset: a row whose `id` was
    /// already seen is dropped (the first occurrence wins) and logged.
    #[must_use]
    pub fn new(records: Vec<AccidentRecord>, schema: Schema) -> Self {
        let total = records.len();
        let mut seen = HashSet::with_capacity(total);
        let records: Vec<AccidentRecord> = records
            .into_iter()
            .filter(|record| {
                let fresh = seen.insert(record.id.clone());
                if !fresh {
                    log::warn!("Dropping duplicate accident id '{}'", record.id);
                }
                fresh
            })
            .collect();

        if records.len() < total {
            log::warn!(
                "{} of {total} records dropped as duplicates",
                total - records.len()
            );
        }

        let version = DatasetVersion::fingerprint(&records, &schema);
        log::debug!("Record set {version}: {} records", records.len());

        Self {
            records,
            schema,
            version,
        }
    }

    /// Builds a record set whose schema contains every column.
    #[must_use]
    pub fn from_records(records: Vec<AccidentRecord>) -> Self {
        Self::new(records, Schema::full())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn version(&self) -> &DatasetVersion {
        &self.version
    }

    /// Distinct UF codes in the order they first appear.
    #[must_use]
    pub fn ufs(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|record| seen.insert(record.uf.as_str()))
            .map(|record| record.uf.clone())
            .collect()
    }

    /// Returns a view of the records in `uf`, or of every record when `uf`
    /// is `None`.
    ///
    /// Matching trims whitespace and ignores ASCII case.
    #[must_use]
    pub fn filter_uf(&self, uf: Option<&str>) -> RecordView<'_> {
        let wanted = uf.map(normalize_uf);
        let rows = self
            .records
            .iter()
            .filter(|record| {
                wanted
                    .as_deref()
                    .is_none_or(|w| record.uf.trim().eq_ignore_ascii_case(w))
            })
            .collect();

        RecordView {
            rows,
            schema: &self.schema,
            version: &self.version,
            uf: wanted,
        }
    }
}

/// A borrowed, filtered selection of a [`RecordSet`].
#[derive(Debug, Clone)]
pub struct RecordView<'a> {
    rows: Vec<&'a AccidentRecord>,
    schema: &'a Schema,
    version: &'a DatasetVersion,
    uf: Option<String>,
}

impl<'a> RecordView<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the selected rows in load order.
    pub fn iter(&self) -> impl Iterator<Item = &'a AccidentRecord> + '_ {
        self.rows.iter().copied()
    }

    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Version of the record set this view was taken from.
    #[must_use]
    pub const fn version(&self) -> &'a DatasetVersion {
        self.version
    }

    /// The normalized UF this view selects, or `None` for all rows.
    #[must_use]
    pub fn uf(&self) -> Option<&str> {
        self.uf.as_deref()
    }
}
