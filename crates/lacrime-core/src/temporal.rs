//! Calendar-derived feature extraction for the filtered incident data.

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use tracing::warn;

use crate::config::{PipelineConfig, TimeBucketPolicy};
use crate::error::Result;
use crate::holidays::is_california_holiday;
use crate::schema::{date_from_days, DATE_OCCURRED, LATITUDE, LONGITUDE, TIME_OCCURRED};

pub const YEAR_OF_CRIME: &str = "Year of Crime";
pub const MONTH_OF_CRIME: &str = "Month of Crime";
pub const DAY_OF_CRIME: &str = "Day of Crime";
pub const WEEKDAY_OF_CRIME: &str = "Weekday of Crime";
pub const HOLIDAY: &str = "Holiday";
pub const TIME_BLOCK: &str = "Time Block";

/// Labels for the six four-hour occurrence-time blocks.
pub const TIME_BLOCK_LABELS: [&str; 6] = [
    "0000-0359",
    "0400-0759",
    "0800-1159",
    "1200-1559",
    "1600-1959",
    "2000-2359",
];

const TIME_BLOCK_WIDTH: i64 = 400;

/// Enriches the filtered incidents with calendar features and rounded
/// coordinates. Rows with a missing or unparseable latitude or longitude are
/// dropped before derivation; everything else is additive, the input columns
/// are preserved.
pub fn extract_temporal_features(filtered: &DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let df = drop_rows_without_coordinates(filtered)?;
    let height = df.height();

    let mut latitudes: Vec<f64> = Vec::with_capacity(height);
    let mut longitudes: Vec<f64> = Vec::with_capacity(height);
    {
        let lat = df.column(LATITUDE)?.cast(&DataType::Float64)?;
        let lng = df.column(LONGITUDE)?.cast(&DataType::Float64)?;
        let lat = lat.f64()?;
        let lng = lng.f64()?;
        for idx in 0..height {
            latitudes.push(round_to(lat.get(idx).unwrap_or(f64::NAN), config.latlng_decimals));
            longitudes.push(round_to(lng.get(idx).unwrap_or(f64::NAN), config.latlng_decimals));
        }
    }

    let mut years: Vec<i32> = Vec::with_capacity(height);
    let mut months: Vec<i32> = Vec::with_capacity(height);
    let mut days: Vec<i32> = Vec::with_capacity(height);
    let mut weekdays: Vec<i32> = Vec::with_capacity(height);
    let mut holiday_flags: Vec<bool> = Vec::with_capacity(height);
    let mut block_labels: Vec<Option<&'static str>> = Vec::with_capacity(height);
    let mut truncated_hours: Vec<Option<i64>> = Vec::with_capacity(height);
    let mut out_of_range_times = 0usize;
    {
        let dates = df.column(DATE_OCCURRED)?.date()?;
        let times = df.column(TIME_OCCURRED)?.cast(&DataType::Int64)?;
        let times = times.i64()?;
        for idx in 0..height {
            // The normalizer guarantees the occurrence date parsed.
            let date = date_from_days(dates.get(idx).unwrap_or(0));
            years.push(date.year());
            months.push(date.month() as i32);
            days.push(date.day() as i32);
            weekdays.push(weekday_number(date) as i32);
            holiday_flags.push(holiday_or_weekend(date));

            let time = times.get(idx).unwrap_or(-1);
            let label = time_block_label(time);
            if label.is_none() {
                out_of_range_times += 1;
            }
            block_labels.push(label);
            truncated_hours.push(hour_truncated(time));
        }
    }

    if out_of_range_times > 0 {
        warn!(
            rows = out_of_range_times,
            "occurrence times outside [0, 2400) left with a null time block"
        );
    }

    let time_block = match config.time_buckets {
        TimeBucketPolicy::FourHourBlocks => Series::new(TIME_BLOCK.into(), block_labels),
        TimeBucketPolicy::HourTruncated => Series::new(TIME_BLOCK.into(), truncated_hours),
    };

    let mut enriched = df;
    enriched.with_column(Series::new(LATITUDE.into(), latitudes))?;
    enriched.with_column(Series::new(LONGITUDE.into(), longitudes))?;
    enriched.with_column(Series::new(YEAR_OF_CRIME.into(), years))?;
    enriched.with_column(Series::new(MONTH_OF_CRIME.into(), months))?;
    enriched.with_column(Series::new(DAY_OF_CRIME.into(), days))?;
    enriched.with_column(Series::new(WEEKDAY_OF_CRIME.into(), weekdays))?;
    enriched.with_column(Series::new(HOLIDAY.into(), holiday_flags))?;
    enriched.with_column(time_block)?;
    Ok(enriched)
}

fn drop_rows_without_coordinates(df: &DataFrame) -> Result<DataFrame> {
    let lat = df.column(LATITUDE)?.cast(&DataType::Float64)?;
    let lng = df.column(LONGITUDE)?.cast(&DataType::Float64)?;
    let lat = lat.f64()?;
    let lng = lng.f64()?;

    let keep: Vec<bool> = (0..df.height())
        .map(|idx| {
            lat.get(idx).is_some_and(f64::is_finite) && lng.get(idx).is_some_and(f64::is_finite)
        })
        .collect();

    let dropped = keep.iter().filter(|kept| !**kept).count();
    if dropped > 0 {
        warn!(rows = dropped, "dropping rows with missing coordinates");
    }
    let mask = BooleanChunked::from_slice("".into(), &keep);
    Ok(df.filter(&mask)?)
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Monday = 0 ... Sunday = 6.
pub fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// True when the date is a California public holiday or falls on a weekend.
/// The conflation is deliberate and inherited from the source analysis.
pub fn holiday_or_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || is_california_holiday(date)
}

/// The four-hour block containing an HHMM-encoded occurrence time, or `None`
/// when the time lies outside [0, 2400).
pub fn time_block_label(time: i64) -> Option<&'static str> {
    if (0..2400).contains(&time) {
        Some(TIME_BLOCK_LABELS[(time / TIME_BLOCK_WIDTH) as usize])
    } else {
        None
    }
}

/// The hour-truncated integer bucket (1430 -> 1400), `None` outside [0, 2400).
pub fn hour_truncated(time: i64) -> Option<i64> {
    if (0..2400).contains(&time) {
        Some(time / 100 * 100)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CRIME_DESCRIPTION;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn time_blocks_partition_the_day() {
        // Every representable time in [0, 2400) lands in exactly one block.
        for time in 0..2400i64 {
            let label = time_block_label(time).expect("time should have a block");
            let index = TIME_BLOCK_LABELS
                .iter()
                .position(|candidate| *candidate == label)
                .unwrap();
            assert_eq!(index as i64, time / 400);
        }
        assert_eq!(time_block_label(0), Some("0000-0359"));
        assert_eq!(time_block_label(399), Some("0000-0359"));
        assert_eq!(time_block_label(400), Some("0400-0759"));
        assert_eq!(time_block_label(2359), Some("2000-2359"));
        assert_eq!(time_block_label(2400), None);
        assert_eq!(time_block_label(-1), None);
    }

    #[test]
    fn hour_truncation_policy() {
        assert_eq!(hour_truncated(1430), Some(1400));
        assert_eq!(hour_truncated(59), Some(0));
        assert_eq!(hour_truncated(2400), None);
    }

    #[test]
    fn weekday_numbers_run_monday_to_sunday() {
        assert_eq!(weekday_number(date(2013, 1, 7)), 0); // Monday
        assert_eq!(weekday_number(date(2013, 1, 5)), 5); // Saturday
        assert_eq!(weekday_number(date(2013, 1, 6)), 6); // Sunday
    }

    #[test]
    fn weekends_count_as_holidays() {
        assert!(holiday_or_weekend(date(2013, 1, 5))); // a plain Saturday
        assert!(holiday_or_weekend(date(2015, 12, 25))); // Christmas, a Friday
        assert!(!holiday_or_weekend(date(2013, 1, 8))); // a plain Tuesday
    }

    fn filtered_frame() -> DataFrame {
        let mut df = df!(
            CRIME_DESCRIPTION => ["Battery", "Theft", "Vandalism"],
            TIME_OCCURRED => [1430i64, 30, 2360],
            LATITUDE => [34.05221, 34.05219, f64::NAN],
            LONGITUDE => [-118.24371, -118.24369, -118.3],
        )
        .unwrap();
        let occurred = Series::new(DATE_OCCURRED.into(), [16794i32, 15710, 15710])
            .cast(&DataType::Date)
            .unwrap();
        df.with_column(occurred).unwrap();
        df
    }

    #[test]
    fn derives_calendar_columns_and_rounds_coordinates() {
        let enriched =
            extract_temporal_features(&filtered_frame(), &PipelineConfig::default()).unwrap();
        // The NaN latitude row is gone.
        assert_eq!(enriched.height(), 2);

        let lat = enriched.column(LATITUDE).unwrap().f64().unwrap();
        assert!((lat.get(0).unwrap() - 34.0522).abs() < 1e-9);
        assert!((lat.get(1).unwrap() - 34.0522).abs() < 1e-9);

        // 16794 days after the epoch is 2015-12-25, a Friday and a holiday.
        let years = enriched.column(YEAR_OF_CRIME).unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(2015));
        let weekdays = enriched.column(WEEKDAY_OF_CRIME).unwrap().i32().unwrap();
        assert_eq!(weekdays.get(0), Some(4));
        let holiday = enriched.column(HOLIDAY).unwrap().bool().unwrap();
        assert_eq!(holiday.get(0), Some(true));

        let blocks = enriched.column(TIME_BLOCK).unwrap().str().unwrap();
        assert_eq!(blocks.get(0), Some("1200-1559"));
        assert_eq!(blocks.get(1), Some("0000-0359"));
    }

    #[test]
    fn hour_truncated_policy_produces_integer_buckets() {
        let config = PipelineConfig {
            time_buckets: TimeBucketPolicy::HourTruncated,
            ..PipelineConfig::default()
        };
        let enriched = extract_temporal_features(&filtered_frame(), &config).unwrap();
        let blocks = enriched.column(TIME_BLOCK).unwrap().i64().unwrap();
        assert_eq!(blocks.get(0), Some(1400));
        assert_eq!(blocks.get(1), Some(0));
    }

    #[test]
    fn original_columns_are_preserved() {
        let input = filtered_frame();
        let enriched = extract_temporal_features(&input, &PipelineConfig::default()).unwrap();
        for column in input.get_column_names() {
            assert!(enriched.column(column).is_ok(), "lost column {column}");
        }
    }
}
