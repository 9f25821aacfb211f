//! Cell-level parsing for accident table columns.
//!
//! The export mixes Brazilian number formatting (`"12,5"`) with plain
//! integers, and marks missing values either with an empty cell or with the
//! literal `(null)`.

use road_safety_accident_models::{AccidentField, Km};

/// A single cell that cannot be interpreted for its column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A count column holds something other than a non-negative integer.
    #[error("invalid count in column {column}: '{value}'")]
    InvalidCount {
        /// Column the value was read from.
        column: AccidentField,
        /// The raw cell text.
        value: String,
    },
}

/// Trims a raw cell and maps empty and `(null)` cells to `None`.
#[must_use]
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("(null)") {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Parses a non-negative count. Missing cells count as zero.
///
/// # Errors
///
/// Returns [`FieldError::InvalidCount`] if the cell is present but is not a
/// non-negative integer.
pub fn parse_count(column: AccidentField, raw: &str) -> Result<u32, FieldError> {
    let Some(cell) = normalize_cell(raw) else {
        return Ok(0);
    };
    cell.parse::<u32>().map_err(|_| FieldError::InvalidCount {
        column,
        value: cell,
    })
}

/// Parses a kilometer marker, accepting either `.` or `,` as the decimal
/// separator. Returns `None` if missing or unparseable.
#[must_use]
pub fn parse_km(raw: &str) -> Option<Km> {
    let cell = normalize_cell(raw)?;
    let value = cell.replace(',', ".").parse::<f64>().ok()?;
    Km::new(value)
}
