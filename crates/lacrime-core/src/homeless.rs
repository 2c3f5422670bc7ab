//! Homelessness-survey slice: the Los Angeles Total Homeless counts.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

pub const MEASURES: &str = "Measures";
pub const COC_NAME: &str = "CoC Name";
pub const STATE: &str = "State";
pub const YEAR: &str = "Year";

const TOTAL_HOMELESS: &str = "Total Homeless";
const LOS_ANGELES_COC: &str = "Los Angeles City & County CoC";
const CALIFORNIA: &str = "CA";
const YEARS: [&str; 5] = ["1/1/2012", "1/1/2013", "1/1/2014", "1/1/2015", "1/1/2016"];

/// Selects the Total Homeless / Los Angeles City & County CoC / CA rows for
/// the survey years 2012-2016 and strips thousands separators.
///
/// The comma strip is applied to every string column, not just the count,
/// reproducing the table-wide replace of the source analysis. Any text field
/// containing a comma is corrupted by this; a regression test pins the
/// behavior down. The count column stays textual.
pub fn homeless_counts(raw: &DataFrame) -> Result<DataFrame> {
    for column in [MEASURES, COC_NAME, STATE, YEAR] {
        if raw.column(column).is_err() {
            return Err(PipelineError::SchemaDrift {
                column: column.to_string(),
            });
        }
    }

    let measures = raw.column(MEASURES)?.str()?;
    let coc = raw.column(COC_NAME)?.str()?;
    let state = raw.column(STATE)?.str()?;
    let year = raw.column(YEAR)?.str()?;

    let keep: Vec<bool> = (0..raw.height())
        .map(|idx| {
            measures.get(idx) == Some(TOTAL_HOMELESS)
                && coc.get(idx) == Some(LOS_ANGELES_COC)
                && state.get(idx) == Some(CALIFORNIA)
                && matches!(year.get(idx), Some(y) if YEARS.contains(&y))
        })
        .collect();
    let mask = BooleanChunked::from_slice("".into(), &keep);
    let mut slice = raw.filter(&mask)?;

    let string_columns: Vec<String> = slice
        .get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::String)
        .map(|column| column.name().to_string())
        .collect();
    for name in string_columns {
        let stripped: Vec<Option<String>> = slice
            .column(&name)?
            .str()?
            .iter()
            .map(|value| value.map(|v| v.replace(',', "")))
            .collect();
        slice.with_column(Series::new(name.as_str().into(), stripped))?;
    }

    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey_frame() -> DataFrame {
        df!(
            YEAR => ["1/1/2011", "1/1/2012", "1/1/2014", "1/1/2016", "1/1/2017", "1/1/2014"],
            STATE => ["CA", "CA", "CA", "CA", "CA", "NY"],
            COC_NAME => [
                LOS_ANGELES_COC,
                LOS_ANGELES_COC,
                LOS_ANGELES_COC,
                LOS_ANGELES_COC,
                LOS_ANGELES_COC,
                "New York City CoC",
            ],
            MEASURES => [TOTAL_HOMELESS; 6],
            "Count" => ["38,700", "35,524", "34,393", "43,854", "55,188", "64,060"],
            "Source" => ["HUD, PIT"; 6],
        )
        .unwrap()
    }

    #[test]
    fn keeps_only_the_la_slice_for_2012_through_2016() {
        let slice = homeless_counts(&survey_frame()).unwrap();
        assert_eq!(slice.height(), 3);
        let years = slice.column(YEAR).unwrap().str().unwrap();
        let seen: Vec<&str> = years.iter().flatten().collect();
        assert_eq!(seen, vec!["1/1/2012", "1/1/2014", "1/1/2016"]);
    }

    #[test]
    fn strips_commas_from_the_count_column() {
        let slice = homeless_counts(&survey_frame()).unwrap();
        let counts = slice.column("Count").unwrap().str().unwrap();
        assert_eq!(counts.get(0), Some("35524"));
        assert_eq!(counts.get(1), Some("34393"));
    }

    #[test]
    fn blanket_replace_corrupts_unrelated_text_fields() {
        // Known latent bug carried over intentionally: the comma strip is
        // table-wide, so a text field containing a comma loses it too.
        let slice = homeless_counts(&survey_frame()).unwrap();
        let source = slice.column("Source").unwrap().str().unwrap();
        assert_eq!(source.get(0), Some("HUD PIT"));
    }

    #[test]
    fn wrong_measure_rows_are_excluded() {
        let mut frame = survey_frame();
        frame
            .with_column(Series::new(
                MEASURES.into(),
                ["Sheltered Homeless"; 6],
            ))
            .unwrap();
        let slice = homeless_counts(&frame).unwrap();
        assert_eq!(slice.height(), 0);
    }

    #[test]
    fn missing_survey_column_is_schema_drift() {
        let mut frame = survey_frame();
        let _ = frame.drop_in_place(MEASURES).unwrap();
        let err = homeless_counts(&frame).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaDrift { .. }));
    }
}
