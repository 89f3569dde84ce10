//! Core domain types: the vaccination record and where records are stored.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaxError};

/// Output columns, in file order.
pub const CSV_COLUMNS: [&str; 7] = [
    "location",
    "date",
    "total_vaccinations",
    "people_vaccinated",
    "people_fully_vaccinated",
    "vaccine",
    "source_url",
];

// ---------------------------------------------------------------------------
// VaccinationRecord
// ---------------------------------------------------------------------------

/// One row of a location's vaccination time series.
///
/// Field order is the CSV column order (see [`CSV_COLUMNS`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub location: String,
    pub date: NaiveDate,
    pub total_vaccinations: u64,
    pub people_vaccinated: u64,
    pub people_fully_vaccinated: u64,
    /// Comma-separated vaccine brand names.
    pub vaccine: String,
    pub source_url: String,
}

// ---------------------------------------------------------------------------
// PartialRecord
// ---------------------------------------------------------------------------

/// A record under construction.
///
/// Extraction fills the counts it can find on the page; enrichment steps
/// fill the rest. [`PartialRecord::into_record`] checks nothing is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub total_vaccinations: Option<u64>,
    pub people_vaccinated: Option<u64>,
    pub people_fully_vaccinated: Option<u64>,
    pub vaccine: Option<String>,
    pub source_url: Option<String>,
}

impl PartialRecord {
    /// Start from the two dose counts most sources publish.
    pub fn with_doses(people_vaccinated: u64, people_fully_vaccinated: u64) -> Self {
        Self {
            people_vaccinated: Some(people_vaccinated),
            people_fully_vaccinated: Some(people_fully_vaccinated),
            ..Self::default()
        }
    }

    /// Finish the record. Fails with the name of the first missing field.
    pub fn into_record(self) -> Result<VaccinationRecord> {
        fn require<T>(value: Option<T>, field: &str) -> Result<T> {
            value.ok_or_else(|| VaxError::validation(format!("record is missing `{field}`")))
        }

        Ok(VaccinationRecord {
            location: require(self.location, "location")?,
            date: require(self.date, "date")?,
            total_vaccinations: require(self.total_vaccinations, "total_vaccinations")?,
            people_vaccinated: require(self.people_vaccinated, "people_vaccinated")?,
            people_fully_vaccinated: require(
                self.people_fully_vaccinated,
                "people_fully_vaccinated",
            )?,
            vaccine: require(self.vaccine, "vaccine")?,
            source_url: require(self.source_url, "source_url")?,
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetPaths
// ---------------------------------------------------------------------------

/// Locations of the dataset files a scraper writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Directory holding one `<location>.csv` per location.
    pub automated_dir: PathBuf,
}

impl DatasetPaths {
    pub fn new(automated_dir: impl AsRef<Path>) -> Self {
        Self {
            automated_dir: automated_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the time series file for `location`.
    pub fn location_file(&self, location: &str) -> PathBuf {
        self.automated_dir.join(format!("{location}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PartialRecord {
        PartialRecord {
            location: Some("Saint Lucia".into()),
            date: NaiveDate::from_ymd_opt(2021, 3, 15),
            total_vaccinations: Some(1500),
            people_vaccinated: Some(1200),
            people_fully_vaccinated: Some(300),
            vaccine: Some("Oxford/AstraZeneca".into()),
            source_url: Some("https://www.covid19response.lc/".into()),
        }
    }

    #[test]
    fn complete_partial_becomes_record() {
        let record = complete().into_record().expect("complete record");
        assert_eq!(record.location, "Saint Lucia");
        assert_eq!(record.total_vaccinations, 1500);
        assert_eq!(record.date.to_string(), "2021-03-15");
    }

    #[test]
    fn missing_field_is_named() {
        let mut partial = complete();
        partial.vaccine = None;
        let err = partial.into_record().unwrap_err();
        assert!(err.to_string().contains("`vaccine`"));
    }

    #[test]
    fn with_doses_leaves_metadata_empty() {
        let partial = PartialRecord::with_doses(10, 4);
        assert_eq!(partial.people_vaccinated, Some(10));
        assert_eq!(partial.people_fully_vaccinated, Some(4));
        assert!(partial.total_vaccinations.is_none());
        assert!(partial.location.is_none());
    }

    #[test]
    fn location_file_uses_location_name() {
        let paths = DatasetPaths::new("/data/automated");
        assert_eq!(
            paths.location_file("Saint Lucia"),
            PathBuf::from("/data/automated/Saint Lucia.csv")
        );
    }
}
