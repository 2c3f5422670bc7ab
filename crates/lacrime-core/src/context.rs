// crates/lacrime-core/src/context.rs
//
// The pipeline context replaces the module-level globals of the source
// analysis (loaded flag, raw and cleaned frames) with an owned value whose
// state transitions are explicit.

use polars::prelude::DataFrame;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::weights::CoordinateWeight;
use crate::{categories, homeless, loader, schema, temporal, weights};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    /// A reload was requested; the in-memory frames no longer count as fresh.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    AlreadyLoaded,
}

pub struct PipelineContext {
    config: PipelineConfig,
    state: LoadState,
    raw_crime: Option<DataFrame>,
    raw_homeless: Option<DataFrame>,
    enriched: Option<DataFrame>,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: LoadState::Unloaded,
            raw_crime: None,
            raw_homeless: None,
            enriched: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Reads both source files. Calling this when data is already loaded is a
    /// reported no-op, never an error; `reload()` forces a re-read.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        if self.state == LoadState::Loaded {
            info!("data files already loaded; call reload() to re-read them");
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        info!(
            crime = %self.config.crime_data_path.display(),
            homeless = %self.config.homeless_data_path.display(),
            "loading data files"
        );
        // Read both files before touching any state: a failed load leaves
        // nothing partially loaded behind.
        let raw_crime = loader::read_csv(&self.config.crime_data_path)?;
        let raw_homeless = loader::read_csv(&self.config.homeless_data_path)?;
        self.raw_crime = Some(raw_crime);
        self.raw_homeless = Some(raw_homeless);
        self.state = LoadState::Loaded;
        Ok(LoadOutcome::Loaded)
    }

    /// Re-reads both source files and, if a cleaned dataset existed, re-runs
    /// the full cleaning pipeline so derived data never outlives the raw data
    /// it came from.
    pub fn reload(&mut self) -> Result<()> {
        self.state = LoadState::Stale;
        let had_enriched = self.enriched.take().is_some();
        self.load()?;
        if had_enriched {
            self.clean()?;
        }
        Ok(())
    }

    /// Runs the cleaning pipeline: normalize columns, canonicalize and filter
    /// categories, extract temporal features. Loads the source files first if
    /// needed. The enriched frame fully replaces any previous one.
    pub fn clean(&mut self) -> Result<&DataFrame> {
        self.load()?;
        let raw = self
            .raw_crime
            .as_ref()
            .ok_or_else(|| PipelineError::Processing("crime data not loaded".to_string()))?;
        let normalized = schema::normalize(raw)?;
        let filtered = categories::canonicalize_and_filter(&normalized)?;
        let enriched = temporal::extract_temporal_features(&filtered, &self.config)?;
        info!(rows = enriched.height(), "cleaning pipeline complete");
        Ok(self.enriched.insert(enriched))
    }

    pub fn enriched(&self) -> Option<&DataFrame> {
        self.enriched.as_ref()
    }

    /// The Los Angeles Total Homeless slice; requires `load()` first.
    pub fn homeless_counts(&self) -> Result<DataFrame> {
        let raw = self.raw_homeless.as_ref().ok_or_else(|| {
            PipelineError::Processing("homelessness data not loaded; call load() first".to_string())
        })?;
        homeless::homeless_counts(raw)
    }

    /// Coordinate weights over the cleaned dataset; computed on demand and
    /// never cached. Requires `clean()` first.
    pub fn coordinate_weights(&self, category: &str) -> Result<Vec<CoordinateWeight>> {
        let enriched = self.enriched.as_ref().ok_or_else(|| {
            PipelineError::Processing("no cleaned dataset; call clean() first".to_string())
        })?;
        weights::coordinate_weights(enriched, category)
    }
}
