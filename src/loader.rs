use std::{fs::File, io, io::BufReader, path::Path};

use chrono::NaiveDate;

use crate::{AnalysisConfig, AnalysisError, NullCounts, Observation, Result, Series};

/// Cell spellings treated as a missing value
const MISSING_MARKERS: &[&str] = &["", "nan", "na", "n/a", "null", "none"];

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_MARKERS.iter().any(|m| cell.eq_ignore_ascii_case(m))
}

/// Parses a year cell, accepting integral floats such as `1749.0`
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    let year = match cell.parse::<i32>() {
        Ok(year) => year,
        Err(_) => {
            let v = cell.parse::<f64>().ok()?;
            if !v.is_finite() || v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
                return None;
            }
            v as i32
        }
    };
    // the year must map onto the date index
    NaiveDate::from_ymd_opt(year, 1, 1).map(|_| year)
}

/// Parses a value cell; `Ok(None)` for a missing marker or a non-finite number
fn parse_value(cell: &str) -> std::result::Result<Option<f64>, ()> {
    if is_missing(cell) {
        return Ok(None);
    }
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(()),
    }
}

/// Loads a series from a CSV file
///
/// # Arguments
///
/// * `path` - Path of the CSV file, first row is the header
/// * `config` - Column names to read
///
/// # Returns
///
/// * `Result<Series>` - The chronologically sorted series
pub fn load_csv(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<Series> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening source");
    let file = File::open(path)?;
    load_reader(BufReader::new(file), config)
}

/// Loads a series from any CSV byte stream
///
/// Every column of the source is audited for missing cells, not only the two
/// analysed ones. The year column must be integral in every row; the value
/// column may be missing (`""`, `NaN`, `NA`, `null`, ...) but not malformed.
///
/// # Arguments
///
/// * `reader` - The CSV stream, first row is the header
/// * `config` - Column names to read
///
/// # Returns
///
/// * `Result<Series>` - `MissingColumn`, `EmptySource`, `Parse` or `DuplicateYear` on bad input
pub fn load_reader<R: io::Read>(reader: R, config: &AnalysisConfig) -> Result<Series> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let position = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    };
    let year_idx = position(&config.year_column)?;
    let value_idx = position(&config.value_column)?;

    let mut missing = vec![0usize; columns.len()];
    let mut observations = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        for (col, count) in missing.iter_mut().enumerate() {
            if record.get(col).is_none_or(is_missing) {
                *count += 1;
            }
        }

        let year_cell = record.get(year_idx).unwrap_or_default();
        let year = parse_year(year_cell).ok_or_else(|| AnalysisError::Parse {
            row,
            column: config.year_column.clone(),
            value: year_cell.to_string(),
            expected: "an integer year",
        })?;

        let value_cell = record.get(value_idx).unwrap_or_default();
        let value = parse_value(value_cell).map_err(|()| AnalysisError::Parse {
            row,
            column: config.value_column.clone(),
            value: value_cell.to_string(),
            expected: "a number",
        })?;

        observations.push(Observation::new(year, value));
    }

    if observations.is_empty() {
        return Err(AnalysisError::EmptySource);
    }

    let mut null_counts = NullCounts::new();
    for (name, count) in columns.iter().zip(&missing) {
        null_counts.add(name, *count);
    }

    let series = Series::with_null_counts(observations, null_counts)?;
    tracing::info!(
        rows = series.len(),
        missing = series.null_counts().total(),
        first = series.observations().first().map(|o| o.year),
        last = series.observations().last().map(|o| o.year),
        "loaded series"
    );
    Ok(series)
}
