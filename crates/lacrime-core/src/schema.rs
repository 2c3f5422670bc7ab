//! Column normalization: canonical names and typed date coercion.

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::warn;

use crate::error::{PipelineError, Result};

/// Source dot-separated headers mapped to the canonical human-readable names.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("Date.Rptd", DATE_REPORTED),
    ("DR.NO", CASE_NUMBER),
    ("DATE.OCC", DATE_OCCURRED),
    ("TIME.OCC", TIME_OCCURRED),
    ("AREA", AREA),
    ("AREA.NAME", AREA_NAME),
    ("Crm.Cd", CRIME_CODE),
    ("CrmCd.Desc", CRIME_DESCRIPTION),
    ("Status.Desc", STATUS_DESCRIPTION),
];

pub const DATE_REPORTED: &str = "Date Reported";
pub const CASE_NUMBER: &str = "Case Number";
pub const DATE_OCCURRED: &str = "Date Occurred";
pub const TIME_OCCURRED: &str = "Time Occurred";
pub const AREA: &str = "Area";
pub const AREA_NAME: &str = "Area Name";
pub const CRIME_CODE: &str = "Crime Code";
pub const CRIME_DESCRIPTION: &str = "Crime Description";
pub const STATUS_DESCRIPTION: &str = "Status Description";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

const DATE_COLUMNS: &[&str] = &[DATE_REPORTED, DATE_OCCURRED];

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

/// Renames the raw incident columns and coerces both date columns to the
/// polars `Date` dtype. The raw frame is left untouched; a missing source
/// column is fatal schema drift. Rows whose date text does not parse are
/// dropped and the drop count logged.
pub fn normalize(raw: &DataFrame) -> Result<DataFrame> {
    let mut df = raw.clone();
    for (source, canonical) in COLUMN_RENAMES {
        if df.column(source).is_err() {
            return Err(PipelineError::SchemaDrift {
                column: (*source).to_string(),
            });
        }
        df.rename(source, (*canonical).into())?;
    }
    for name in DATE_COLUMNS {
        df = coerce_date_column(df, name)?;
    }
    Ok(df)
}

fn coerce_date_column(df: DataFrame, name: &str) -> Result<DataFrame> {
    let mut days: Vec<Option<i32>> = Vec::with_capacity(df.height());
    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    {
        let values = df.column(name)?.str()?;
        for value in values.iter() {
            match value.and_then(parse_date) {
                Some(date) => {
                    days.push(Some((date - epoch()).num_days() as i32));
                    keep.push(true);
                }
                None => {
                    days.push(None);
                    keep.push(false);
                }
            }
        }
    }

    let mut df = df;
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    df.with_column(series)?;

    let dropped = keep.iter().filter(|kept| !**kept).count();
    if dropped > 0 {
        warn!(column = name, dropped, "dropping rows with unparseable dates");
        let mask = BooleanChunked::from_slice("".into(), &keep);
        df = df.filter(&mask)?;
    }
    Ok(df)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    static FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%m/%d/%Y", "%Y-%m-%d"];
    let trimmed = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub(crate) fn date_from_days(days: i32) -> NaiveDate {
    epoch() + chrono::Duration::days(days as i64)
}
