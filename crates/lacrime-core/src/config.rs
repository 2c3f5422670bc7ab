use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// How occurrence times are discretized into sub-day buckets.
///
/// The two policies match the two revisions of the source analysis: six
/// labeled four-hour blocks, or the occurrence time truncated to the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBucketPolicy {
    FourHourBlocks,
    HourTruncated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub crime_data_path: PathBuf,
    pub homeless_data_path: PathBuf,
    /// Decimal places latitude/longitude are rounded to before grouping.
    pub latlng_decimals: u32,
    pub time_buckets: TimeBucketPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crime_data_path: PathBuf::from("data/crime/2012_2016_CrimeRate.csv"),
            homeless_data_path: PathBuf::from("data/crime/2007-2016-Homelessness-USA.csv"),
            latlng_decimals: 4,
            time_buckets: TimeBucketPolicy::FourHourBlocks,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
