//! Plain-text rendering of derived tables.

use std::fmt::Write as _;

use road_safety_accident_models::AccidentField;
use road_safety_analytics::category_color;
use road_safety_analytics_models::{CategoricalBreakdown, Derivation};

/// One-line notice for a derivation that could not run.
#[must_use]
pub fn unavailable(missing: &[AccidentField]) -> String {
    let columns: Vec<&str> = missing.iter().map(|column| column.as_ref()).collect();
    format!("unavailable (columns not present: {})", columns.join(", "))
}

/// Renders a breakdown as an aligned `category  count` table.
#[must_use]
pub fn breakdown(breakdown: &CategoricalBreakdown, colors: bool) -> String {
    let mut out = format!("{} ({})\n", breakdown.field, breakdown.policy);

    let counts = match &breakdown.counts {
        Derivation::Available(counts) => counts,
        Derivation::Unavailable { missing } => {
            out.push_str(&unavailable(missing));
            out.push('\n');
            return out;
        }
    };

    if counts.is_empty() {
        out.push_str("no records\n");
        return out;
    }

    let width = counts
        .iter()
        .map(|c| c.category.chars().count())
        .max()
        .unwrap_or(0);

    for count in counts {
        let pad = width - count.category.chars().count();
        write!(out, "{}{}  {:>8}", count.category, " ".repeat(pad), count.count).unwrap();
        if colors {
            write!(out, "  {}", category_color(&count.category)).unwrap();
        }
        writeln!(out).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::CategoricalField;
    use road_safety_analytics_models::{CategoryCount, SortPolicy};

    use super::*;

    fn table(counts: Derivation<Vec<CategoryCount>>) -> CategoricalBreakdown {
        CategoricalBreakdown {
            field: CategoricalField::CondicaoMetereologica,
            policy: SortPolicy::Ranked,
            counts,
        }
    }

    #[test]
    fn aligns_counts() {
        let text = breakdown(
            &table(Derivation::Available(vec![
                CategoryCount {
                    category: "Céu Claro".to_string(),
                    count: 12,
                },
                CategoryCount {
                    category: "Chuva".to_string(),
                    count: 3,
                },
            ])),
            false,
        );
        assert_eq!(
            text,
            "condicao_metereologica (ranked)\nCéu Claro        12\nChuva             3\n"
        );
    }

    #[test]
    fn appends_colors_on_request() {
        let text = breakdown(
            &table(Derivation::Available(vec![CategoryCount {
                category: "Chuva".to_string(),
                count: 1,
            }])),
            true,
        );
        assert!(text.trim_end().ends_with(&category_color("Chuva")));
    }

    #[test]
    fn reports_unavailable_columns() {
        let text = breakdown(
            &table(Derivation::Unavailable {
                missing: vec![AccidentField::CondicaoMetereologica],
            }),
            false,
        );
        assert!(text.ends_with("unavailable (columns not present: condicao_metereologica)\n"));
    }
}
