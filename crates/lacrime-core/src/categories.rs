//! Canonical crime categories and the allow-list filter.

use polars::prelude::*;

use crate::error::Result;
use crate::schema::CRIME_DESCRIPTION;

pub const CANONICAL_CATEGORIES: [&str; 4] = ["ADW", "Battery", "Theft", "Vandalism"];

/// Exact-cell substitutions from the noisy all-caps source labels. Applied to
/// every string column, matching the table-wide replace of the source
/// analysis, so a status cell reading "BATTERY" would be rewritten too.
const CATEGORY_REPLACEMENTS: &[(&str, &str)] = &[
    ("ASSAULT WITH DEADLY WEAPON", "ADW"),
    ("BATTERY", "Battery"),
    ("THEFT", "Theft"),
    ("VANDALISM", "Vandalism"),
];

/// Rewrites matching cells to the canonical labels, then keeps only rows whose
/// crime description is one of the four categories under investigation.
///
/// This is a hard allow-list with no fuzzy matching: an unrecognized spelling
/// of a wanted category (e.g. "THEFT FROM VEHICLE") is silently excluded.
pub fn canonicalize_and_filter(normalized: &DataFrame) -> Result<DataFrame> {
    let mut df = normalized.clone();

    let string_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::String)
        .map(|column| column.name().to_string())
        .collect();

    for name in string_columns {
        let rewritten: Vec<Option<String>> = df
            .column(&name)?
            .str()?
            .iter()
            .map(|value| value.map(|v| canonical_label(v).to_string()))
            .collect();
        df.with_column(Series::new(name.as_str().into(), rewritten))?;
    }

    let keep: Vec<bool> = df
        .column(CRIME_DESCRIPTION)?
        .str()?
        .iter()
        .map(|value| matches!(value, Some(v) if CANONICAL_CATEGORIES.contains(&v)))
        .collect();
    let mask = BooleanChunked::from_slice("".into(), &keep);
    Ok(df.filter(&mask)?)
}

fn canonical_label(value: &str) -> &str {
    CATEGORY_REPLACEMENTS
        .iter()
        .find(|(raw, _)| *raw == value)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::STATUS_DESCRIPTION;

    fn frame(descriptions: &[&str], statuses: &[&str]) -> DataFrame {
        df!(
            CRIME_DESCRIPTION => descriptions,
            STATUS_DESCRIPTION => statuses,
        )
        .unwrap()
    }

    #[test]
    fn survivors_are_always_canonical() {
        let input = frame(
            &["BATTERY", "THEFT", "ROBBERY", "VANDALISM", "ASSAULT WITH DEADLY WEAPON"],
            &["Invest Cont"; 5],
        );
        let filtered = canonicalize_and_filter(&input).unwrap();
        assert_eq!(filtered.height(), 4);
        let categories = filtered.column(CRIME_DESCRIPTION).unwrap();
        for value in categories.str().unwrap().iter().flatten() {
            assert!(CANONICAL_CATEGORIES.contains(&value), "unexpected {value}");
        }
    }

    #[test]
    fn substitution_is_table_wide() {
        // A status cell that happens to equal a raw label gets rewritten, a
        // faithful reproduction of the source's blanket replace.
        let input = frame(&["BATTERY"], &["VANDALISM"]);
        let filtered = canonicalize_and_filter(&input).unwrap();
        let status = filtered.column(STATUS_DESCRIPTION).unwrap();
        assert_eq!(status.str().unwrap().get(0), Some("Vandalism"));
    }

    #[test]
    fn unrecognized_spellings_of_wanted_categories_are_lost() {
        // Documented limitation: the exact-match map drops variants that a
        // human would still call theft. The loss is total for those rows.
        let input = frame(
            &["THEFT", "THEFT FROM VEHICLE", "GRAND THEFT AUTO", "ATTEMPTED THEFT"],
            &["Invest Cont"; 4],
        );
        let filtered = canonicalize_and_filter(&input).unwrap();
        assert_eq!(filtered.height(), 1);
        assert_eq!(input.height() - filtered.height(), 3);
    }

    #[test]
    fn null_categories_are_excluded() {
        let input = df!(
            CRIME_DESCRIPTION => [Some("BATTERY"), None],
            STATUS_DESCRIPTION => [Some("Invest Cont"), Some("Invest Cont")],
        )
        .unwrap();
        let filtered = canonicalize_and_filter(&input).unwrap();
        assert_eq!(filtered.height(), 1);
    }
}
