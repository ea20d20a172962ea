use ahash::RandomState;
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::{Serialize, Serializer};

use crate::{AnalysisError, Result, YearWindow};

/// One year of activity, the value may be missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    /// Calendar year
    pub year: i32,
    /// Activity value, `None` when the source cell was missing
    pub value: Option<f64>,
}

impl Observation {
    /// Creates a new observation
    pub const fn new(year: i32, value: Option<f64>) -> Self {
        Self { year, value }
    }

    /// Returns the date index of the observation, January 1st of its year
    ///
    /// # Returns
    ///
    /// * `Option<NaiveDate>` - `None` if the year is outside the calendar range
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, 1, 1)
    }
}

/// Missing value count per source column, in source column order
///
/// Serializes as a map whose keys follow the source column order, so the
/// same source always gives the same JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCounts {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize, RandomState>,
}

impl NullCounts {
    /// Creates an empty set of counts
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::with_hasher(RandomState::default()),
        }
    }

    /// Adds `n` missing cells to `column`, registering the column if unseen
    pub fn add(&mut self, column: &str, n: usize) {
        let entry = self
            .index
            .get(column)
            .and_then(|&i| self.entries.get_mut(i));
        match entry {
            Some((_, count)) => *count += n,
            None => {
                self.index.insert(column.to_string(), self.entries.len());
                self.entries.push((column.to_string(), n));
            }
        }
    }

    /// Returns the count for `column`, `None` if the column is unknown
    pub fn get(&self, column: &str) -> Option<usize> {
        self.index
            .get(column)
            .and_then(|&i| self.entries.get(i))
            .map(|(_, count)| *count)
    }

    /// Iterates `(column, count)` in source column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), *n))
    }

    /// Total number of missing cells
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl Serialize for NullCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Default for NullCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Year indexed series, strictly increasing, without duplicate years
///
/// Holds the full frame (missing values included). The null filtered numeric
/// projection used by the statistics stages is derived on demand with
/// [`Series::non_null_values`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    observations: Vec<Observation>,
    null_counts: NullCounts,
}

impl Series {
    /// Builds a series from unordered observations
    ///
    /// Observations are sorted by year. Null counts are recorded under the
    /// column names `year` and `value`.
    ///
    /// # Arguments
    ///
    /// * `observations` - The observations, in any order
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `DuplicateYear` if two observations share a year
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        let mut null_counts = NullCounts::new();
        null_counts.add("year", 0);
        null_counts.add(
            "value",
            observations.iter().filter(|o| o.value.is_none()).count(),
        );
        Self::with_null_counts(observations, null_counts)
    }

    /// Builds a series from unordered observations and precomputed null counts
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `DuplicateYear` if two observations share a year
    pub fn with_null_counts(
        mut observations: Vec<Observation>,
        null_counts: NullCounts,
    ) -> Result<Self> {
        observations.sort_by_key(|o| o.year);
        if let Some(dup) = observations.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(AnalysisError::DuplicateYear(dup[0].year));
        }
        Ok(Self {
            observations,
            null_counts,
        })
    }

    /// Builds a series from `(year, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, Option<f64>)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(year, value)| Observation::new(year, value))
                .collect(),
        )
    }

    /// Number of observations, missing values included
    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if the series has no observations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in chronological order
    #[inline]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Missing value counts of the source columns
    #[inline]
    pub fn null_counts(&self) -> &NullCounts {
        &self.null_counts
    }

    /// Years in chronological order
    pub fn years(&self) -> Vec<i32> {
        self.observations.iter().map(|o| o.year).collect()
    }

    /// Raw value column, missing values included
    pub fn values(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Null filtered numeric projection in chronological order
    pub fn non_null_values(&self) -> Vec<f64> {
        self.observations.iter().filter_map(|o| o.value).collect()
    }

    /// Chronological `(year, value)` pairs, missing values included
    pub fn pairs(&self) -> impl Iterator<Item = (i32, Option<f64>)> + '_ {
        self.observations.iter().map(|o| (o.year, o.value))
    }

    /// Looks up the observation of `year`
    pub fn get(&self, year: i32) -> Option<&Observation> {
        self.observations
            .binary_search_by_key(&year, |o| o.year)
            .ok()
            .map(|i| &self.observations[i])
    }

    /// Returns the sub-series whose years fall in the inclusive `window`
    ///
    /// Null counts of the sub-series cover the `year` and `value` columns
    /// of the selected rows only.
    pub fn window(&self, window: YearWindow) -> Series {
        let start = self.observations.partition_point(|o| o.year < window.start);
        let end = self.observations.partition_point(|o| o.year <= window.end);
        let observations = if start < end {
            self.observations[start..end].to_vec()
        } else {
            Vec::new()
        };
        let mut null_counts = NullCounts::new();
        null_counts.add("year", 0);
        null_counts.add(
            "value",
            observations.iter().filter(|o| o.value.is_none()).count(),
        );
        Series {
            observations,
            null_counts,
        }
    }
}
