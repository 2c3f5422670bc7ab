use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::Result;

/// Reads one delimited source file into an eager DataFrame.
///
/// Schema inference is left to polars; downstream stages coerce the columns
/// they care about and treat anything missing as fatal schema drift. A file
/// that cannot be opened or parsed aborts the pipeline with no partial state.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}
