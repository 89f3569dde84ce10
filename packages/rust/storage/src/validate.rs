//! Sanity checks applied to a record before it is written.

use chrono::NaiveDate;
use tracing::warn;
use url::Url;

use vaxscrape_shared::{Result, VaccinationRecord, VaxError};

/// Reject records that cannot be written as a series row.
///
/// `today` is the UTC date of the run; records may be dated at most one day
/// ahead of it, since local dates east of UTC run ahead. Counts out of the
/// usual order are logged but still written, as sources publish them.
pub(crate) fn check_record(record: &VaccinationRecord, today: NaiveDate) -> Result<()> {
    if record.location.trim().is_empty() {
        return Err(VaxError::validation("location is empty"));
    }
    if record.vaccine.trim().is_empty() {
        return Err(VaxError::validation(format!(
            "{}: vaccine list is empty",
            record.location
        )));
    }
    Url::parse(&record.source_url).map_err(|e| {
        VaxError::validation(format!(
            "{}: source_url '{}' is not a URL: {e}",
            record.location, record.source_url
        ))
    })?;

    let latest = today.succ_opt().unwrap_or(today);
    if record.date > latest {
        return Err(VaxError::validation(format!(
            "{}: date {} is in the future",
            record.location, record.date
        )));
    }

    if record.people_vaccinated > record.total_vaccinations {
        warn!(
            location = %record.location,
            people_vaccinated = record.people_vaccinated,
            total_vaccinations = record.total_vaccinations,
            "people_vaccinated exceeds total_vaccinations"
        );
    }
    if record.people_fully_vaccinated > record.people_vaccinated {
        warn!(
            location = %record.location,
            people_fully_vaccinated = record.people_fully_vaccinated,
            people_vaccinated = record.people_vaccinated,
            "people_fully_vaccinated exceeds people_vaccinated"
        );
    }

    Ok(())
}
