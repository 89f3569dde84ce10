//! Per-location CSV time series and the increment operation.
//!
//! Every location has one file, `<automated_dir>/<location>.csv`, with one
//! row per date. [`increment`] is the only writer: it validates a record,
//! merges it into the series and rewrites the file atomically.
//!
//! **Merge rules:**
//! - rows dated on or after the new record's date are dropped
//! - the new record is appended and the series is sorted by date

mod validate;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use vaxscrape_shared::{DatasetPaths, Result, VaccinationRecord, VaxError};

/// What [`increment`] did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementAction {
    /// The date was new to the series.
    Appended,
    /// A row for the same date existed and was overwritten.
    Replaced,
}

/// Result of a successful [`increment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementOutcome {
    pub action: IncrementAction,
    /// File that was written.
    pub path: PathBuf,
    /// Number of rows in the series after the write.
    pub rows: usize,
}

/// Append `record` to its location's time series.
#[instrument(skip_all, fields(location = %record.location, date = %record.date))]
pub fn increment(paths: &DatasetPaths, record: &VaccinationRecord) -> Result<IncrementOutcome> {
    validate::check_record(record, Utc::now().date_naive())?;

    let path = paths.location_file(&record.location);
    let existing = if path.exists() {
        read_series(&path)?
    } else {
        debug!(?path, "no existing series, starting a new one");
        Vec::new()
    };

    let (mut series, action) = merge(existing, record);
    series.sort_by_key(|r| r.date);

    write_series(&path, &series)?;

    info!(
        ?action,
        rows = series.len(),
        total_vaccinations = record.total_vaccinations,
        "series updated"
    );

    Ok(IncrementOutcome {
        action,
        path,
        rows: series.len(),
    })
}

/// Read a location's series from `path`.
///
/// A row that does not parse fails the read with its line number, so the
/// file can be repaired by hand.
pub fn read_series(path: &Path) -> Result<Vec<VaccinationRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| VaxError::Storage(format!("open {}: {e}", path.display())))?;

    let mut series = Vec::new();
    for (index, row) in reader.deserialize::<VaccinationRecord>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let row = row.map_err(|e| {
            VaxError::Storage(format!("read {} line {line}: {e}", path.display()))
        })?;
        series.push(row);
    }
    Ok(series)
}

fn merge(
    existing: Vec<VaccinationRecord>,
    record: &VaccinationRecord,
) -> (Vec<VaccinationRecord>, IncrementAction) {
    let mut action = IncrementAction::Appended;
    let mut later = 0usize;

    let mut series: Vec<VaccinationRecord> = existing
        .into_iter()
        .filter(|row| {
            if row.date == record.date {
                action = IncrementAction::Replaced;
                false
            } else if row.date > record.date {
                later += 1;
                false
            } else {
                true
            }
        })
        .collect();

    if later > 0 {
        warn!(dropped = later, "dropped rows dated after the new record");
    }

    series.push(record.clone());
    (series, action)
}

fn write_series(path: &Path, series: &[VaccinationRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| VaxError::io(parent, e))?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = write_csv(&tmp, series)
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| VaxError::io(path, e)));
    if written.is_err() && tmp.exists() {
        if let Err(e) = std::fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "failed to remove temp file");
        }
    }
    written
}

fn write_csv(path: &Path, series: &[VaccinationRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| VaxError::Storage(format!("create {}: {e}", path.display())))?;
    for row in series {
        writer
            .serialize(row)
            .map_err(|e| VaxError::Storage(format!("write {}: {e}", path.display())))?;
    }
    writer.flush().map_err(|e| VaxError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    /// Fresh dataset directory under the system temp dir.
    fn test_paths() -> DatasetPaths {
        DatasetPaths::new(std::env::temp_dir().join(format!("vax_storage_{}", Uuid::now_v7())))
    }

    fn record(date: &str, total: u64, first: u64, second: u64) -> VaccinationRecord {
        VaccinationRecord {
            location: "Saint Lucia".into(),
            date: date.parse::<NaiveDate>().unwrap(),
            total_vaccinations: total,
            people_vaccinated: first,
            people_fully_vaccinated: second,
            vaccine: "Oxford/AstraZeneca".into(),
            source_url: "https://www.covid19response.lc/".into(),
        }
    }

    #[test]
    fn first_increment_creates_file_with_header() {
        let paths = test_paths();
        let outcome = increment(&paths, &record("2021-03-01", 100, 80, 20)).unwrap();

        assert_eq!(outcome.action, IncrementAction::Appended);
        assert_eq!(outcome.rows, 1);

        let content = std::fs::read_to_string(&outcome.path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some(vaxscrape_shared::CSV_COLUMNS.join(",").as_str())
        );
        assert_eq!(
            lines.next(),
            Some("Saint Lucia,2021-03-01,100,80,20,Oxford/AstraZeneca,https://www.covid19response.lc/")
        );

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn new_dates_append_in_order() {
        let paths = test_paths();
        increment(&paths, &record("2021-03-01", 100, 80, 20)).unwrap();
        let outcome = increment(&paths, &record("2021-03-02", 150, 110, 40)).unwrap();

        assert_eq!(outcome.action, IncrementAction::Appended);
        let series = read_series(&outcome.path).unwrap();
        let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2021-03-01", "2021-03-02"]);

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn same_date_replaces_row() {
        let paths = test_paths();
        increment(&paths, &record("2021-03-01", 100, 80, 20)).unwrap();
        let outcome = increment(&paths, &record("2021-03-01", 120, 90, 30)).unwrap();

        assert_eq!(outcome.action, IncrementAction::Replaced);
        let series = read_series(&outcome.path).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].total_vaccinations, 120);

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn rows_after_new_date_are_dropped() {
        let paths = test_paths();
        increment(&paths, &record("2021-03-01", 100, 80, 20)).unwrap();
        increment(&paths, &record("2021-03-05", 300, 200, 100)).unwrap();
        let outcome = increment(&paths, &record("2021-03-03", 200, 150, 50)).unwrap();

        let series = read_series(&outcome.path).unwrap();
        let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2021-03-01", "2021-03-03"]);
        assert_eq!(outcome.rows, 2);

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn invalid_record_writes_nothing() {
        let paths = test_paths();
        let mut bad = record("2021-03-01", 100, 80, 20);
        bad.source_url = "covid19response.lc".into();
        let err = increment(&paths, &bad).unwrap_err();

        assert!(matches!(err, VaxError::Validation { .. }));
        assert!(!paths.location_file("Saint Lucia").exists());
    }

    #[test]
    fn out_of_order_counts_are_written() {
        let paths = test_paths();
        let outcome = increment(&paths, &record("2021-03-01", 150, 50, 100)).unwrap();

        let series = read_series(&outcome.path).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].people_vaccinated, 50);
        assert_eq!(series[0].people_fully_vaccinated, 100);

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let paths = test_paths();
        // A directory where the series file should be makes the rename fail.
        let target = paths.location_file("Saint Lucia");
        std::fs::create_dir_all(&target).unwrap();

        let err = write_series(&target, &[record("2021-03-01", 100, 80, 20)]).unwrap_err();
        assert!(matches!(err, VaxError::Io { .. }));

        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn future_record_is_rejected() {
        let paths = test_paths();
        let err = increment(&paths, &record("2999-01-01", 100, 80, 20)).unwrap_err();
        assert!(err.to_string().contains("in the future"));
    }

    #[test]
    fn corrupt_series_is_storage_error() {
        let paths = test_paths();
        let path = paths.location_file("Saint Lucia");
        std::fs::create_dir_all(&paths.automated_dir).unwrap();
        std::fs::write(
            &path,
            "location,date,total_vaccinations,people_vaccinated,people_fully_vaccinated,vaccine,source_url\n\
             Saint Lucia,yesterday,1,1,1,x,https://x.lc/\n",
        )
        .unwrap();

        let err = increment(&paths, &record("2021-03-01", 100, 80, 20)).unwrap_err();
        assert!(matches!(err, VaxError::Storage(_)));

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }

    #[test]
    fn blank_count_names_the_line() {
        let paths = test_paths();
        let path = paths.location_file("Saint Lucia");
        std::fs::create_dir_all(&paths.automated_dir).unwrap();
        let header = vaxscrape_shared::CSV_COLUMNS.join(",");
        std::fs::write(
            &path,
            format!(
                "{header}\n\
                 Saint Lucia,2021-03-01,100,80,20,Oxford/AstraZeneca,https://x.lc/\n\
                 Saint Lucia,2021-03-02,,90,25,Oxford/AstraZeneca,https://x.lc/\n"
            ),
        )
        .unwrap();

        let err = read_series(&path).unwrap_err();
        assert!(matches!(err, VaxError::Storage(_)));
        assert!(err.to_string().contains("line 3"), "{err}");

        // History is left as it was for repair.
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(increment(&paths, &record("2021-03-03", 150, 110, 40)).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

        let _ = std::fs::remove_dir_all(&paths.automated_dir);
    }
}
