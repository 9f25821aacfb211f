//! CSV loader for accident exports.
//!
//! Reads a comma-delimited, quote-aware UTF-8 file whose first row holds the
//! column headers. Unknown columns (`latitude`, `uop`, ...) are ignored.
//! Rows that cannot be mapped onto the header (wrong column count) are
//! dropped here and logged. A count cell that is not a non-negative integer
//! is logged and read as zero; the rest of its row is kept.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use road_safety_accident_models::{AccidentField, AccidentRecord};

use crate::parsing::{normalize_cell, parse_count, parse_km};
use crate::{RecordSet, RecordsError, Schema};

/// Loads a record set from a CSV file on disk.
///
/// # Errors
///
/// Returns [`RecordsError`] if the file cannot be read, the header row is
/// unreadable, or the `uf` column is missing.
pub fn load_csv(path: &Path) -> Result<RecordSet, RecordsError> {
    log::info!("Loading accidents from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Loads a record set from any CSV byte stream.
///
/// # Errors
///
/// Returns [`RecordsError`] on I/O failure, an unreadable header row, or a
/// missing `uf` column.
pub fn read_csv<R: Read>(input: R) -> Result<RecordSet, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let columns: BTreeMap<AccidentField, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.parse::<AccidentField>().ok().map(|field| (field, i)))
        .collect();
    let schema = Schema::from_columns(columns.keys().copied());

    if !schema.contains(AccidentField::Uf) {
        return Err(RecordsError::MissingHeader {
            column: AccidentField::Uf,
        });
    }

    let mut records = Vec::new();
    let mut dropped: u64 = 0;
    let mut zeroed: u64 = 0;

    for (index, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Dropping unreadable row {}: {e}", index + 1);
                dropped += 1;
                continue;
            }
        };
        let line = row.position().map_or(index as u64 + 2, csv::Position::line);

        if row.len() != headers.len() {
            log::warn!(
                "Dropping line {line}: expected {} columns, found {}",
                headers.len(),
                row.len()
            );
            dropped += 1;
            continue;
        }

        let cell = |field: AccidentField| {
            columns
                .get(&field)
                .and_then(|&i| row.get(i))
                .unwrap_or("")
        };

        for &field in AccidentField::all().iter().filter(|f| f.is_count()) {
            if let Err(e) = parse_count(field, cell(field)) {
                log::warn!("Line {line}: {e}, read as 0");
                zeroed += 1;
            }
        }

        records.push(build_record(cell, index));
    }

    log::info!(
        "Read {} accident rows ({dropped} dropped, {zeroed} count cells read as 0, {} columns recognized)",
        records.len(),
        columns.len()
    );

    Ok(RecordSet::new(records, schema))
}

/// Maps one header-aligned row onto an [`AccidentRecord`].
///
/// Unparseable count cells become zero.
fn build_record<'r>(cell: impl Fn(AccidentField) -> &'r str, index: usize) -> AccidentRecord {
    let text = |field| normalize_cell(cell(field));
    let count = |field| parse_count(field, cell(field)).unwrap_or_default();

    AccidentRecord {
        id: text(AccidentField::Id).unwrap_or_else(|| format!("row-{}", index + 1)),
        uf: text(AccidentField::Uf)
            .map(|uf| uf.to_ascii_uppercase())
            .unwrap_or_default(),
        dia_semana: text(AccidentField::DiaSemana),
        horario: cell(AccidentField::Horario).trim().to_owned(),
        data_inversa: cell(AccidentField::DataInversa).trim().to_owned(),
        tipo_acidente: text(AccidentField::TipoAcidente),
        causa_acidente: text(AccidentField::CausaAcidente),
        condicao_metereologica: text(AccidentField::CondicaoMetereologica),
        fase_dia: text(AccidentField::FaseDia),
        tipo_pista: text(AccidentField::TipoPista),
        classificacao_acidente: text(AccidentField::ClassificacaoAcidente),
        br: text(AccidentField::Br),
        km: parse_km(cell(AccidentField::Km)),
        municipio: text(AccidentField::Municipio),
        delegacia: text(AccidentField::Delegacia),
        veiculos: count(AccidentField::Veiculos),
        mortos: count(AccidentField::Mortos),
        feridos: count(AccidentField::Feridos),
        feridos_leves: count(AccidentField::FeridosLeves),
        feridos_graves: count(AccidentField::FeridosGraves),
        ilesos: count(AccidentField::Ilesos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../fixtures/accidents.csv");

    #[test]
    fn loads_fixture_and_drops_bad_rows() {
        let set = read_csv(FIXTURE.as_bytes()).unwrap();
        // 10 data rows: one short row and one duplicate id are dropped.
        assert_eq!(set.len(), 8);
        assert_eq!(set.ufs(), vec!["SP", "RJ", "MG"]);
        assert!(set.records().iter().all(|r| r.id != "1008"));
        assert_eq!(
            set.records()
                .iter()
                .filter(|r| r.id == "1001")
                .map(|r| r.mortos + r.ilesos)
                .collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn parses_typed_fields() {
        let set = read_csv(FIXTURE.as_bytes()).unwrap();
        let first = &set.records()[0];
        assert_eq!(first.horario, "06:00:00");
        assert_eq!(first.dia_semana.as_deref(), Some("sexta-feira"));
        assert!((first.km.unwrap().value() - 12.5).abs() < f64::EPSILON);
        assert_eq!(first.veiculos, 2);

        let quoted = set.records().iter().find(|r| r.id == "1007").unwrap();
        assert_eq!(
            quoted.causa_acidente.as_deref(),
            Some("Falta de atenção à condução, celular")
        );

        let mg = set.records().iter().find(|r| r.uf == "MG").unwrap();
        assert!(mg.km.is_none());
        assert!(mg.tipo_pista.is_none());
    }

    #[test]
    fn schema_reflects_header() {
        let set = read_csv(FIXTURE.as_bytes()).unwrap();
        assert!(set.schema().contains(AccidentField::FeridosGraves));
        assert!(set.schema().contains(AccidentField::Delegacia));

        let csv = "uf,horario,mortos\nSP,10:00:00,1\n";
        let set = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            set.schema().columns().collect::<Vec<_>>(),
            vec![
                AccidentField::Uf,
                AccidentField::Horario,
                AccidentField::Mortos
            ]
        );
        assert_eq!(set.records()[0].id, "row-1");
    }

    #[test]
    fn keeps_rows_with_invalid_counts() {
        let csv = "id,uf,tipo_acidente,veiculos,mortos\n\
                   1,SP,Tombamento,2,1\n\
                   2,SP,Colisão,2.0,x\n\
                   3,RJ,Tombamento,1,0\n";
        let set = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.ufs(), vec!["SP", "RJ"]);

        let kept = set.records().iter().find(|r| r.id == "2").unwrap();
        assert_eq!(kept.tipo_acidente.as_deref(), Some("Colisão"));
        assert_eq!((kept.veiculos, kept.mortos), (0, 0));
        assert_eq!(set.records()[0].mortos, 1);
    }

    #[test]
    fn requires_uf_column() {
        let csv = "id,horario\n1,10:00:00\n";
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(RecordsError::MissingHeader {
                column: AccidentField::Uf
            })
        ));
    }
}
