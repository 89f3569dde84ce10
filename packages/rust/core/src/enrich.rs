//! Standard enrichment steps for [`Pipeline`](crate::pipeline::Pipeline).
//!
//! Each function returns a step that fills one field of a
//! [`PartialRecord`], overwriting any value already there.

use chrono::{DateTime, Utc};

use vaxscrape_shared::{PartialRecord, Result, VaxError, localdate_at};

/// `total_vaccinations = people_vaccinated + people_fully_vaccinated`,
/// unless the source already reported a total.
pub fn derive_total() -> impl Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync {
    |mut record: PartialRecord| {
        if record.total_vaccinations.is_some() {
            return Ok(record);
        }

        let (Some(first), Some(second)) =
            (record.people_vaccinated, record.people_fully_vaccinated)
        else {
            return Err(VaxError::validation(
                "cannot derive total_vaccinations without both dose counts",
            ));
        };

        let total = first
            .checked_add(second)
            .ok_or_else(|| VaxError::validation("total_vaccinations overflows"))?;
        record.total_vaccinations = Some(total);
        Ok(record)
    }
}

/// Date in timezone `tz` at `now` (see [`localdate_at`]).
pub fn local_date(
    tz: &'static str,
    now: DateTime<Utc>,
    hour_limit: Option<u32>,
) -> impl Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync {
    move |mut record: PartialRecord| {
        record.date = Some(localdate_at(tz, now, hour_limit)?);
        Ok(record)
    }
}

pub fn location(
    name: &str,
) -> impl Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync + use<> {
    let name = name.to_string();
    move |mut record: PartialRecord| {
        record.location = Some(name.clone());
        Ok(record)
    }
}

pub fn vaccine(
    list: &str,
) -> impl Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync + use<> {
    let list = list.to_string();
    move |mut record: PartialRecord| {
        record.vaccine = Some(list.clone());
        Ok(record)
    }
}

pub fn source_url(
    url: &str,
) -> impl Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync + use<> {
    let url = url.to_string();
    move |mut record: PartialRecord| {
        record.source_url = Some(url.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn derive_total_sums_doses() {
        let record = derive_total()(PartialRecord::with_doses(1234, 567)).unwrap();
        assert_eq!(record.total_vaccinations, Some(1801));
    }

    #[test]
    fn derive_total_keeps_reported_total() {
        let mut partial = PartialRecord::with_doses(10, 5);
        partial.total_vaccinations = Some(20);
        let record = derive_total()(partial).unwrap();
        assert_eq!(record.total_vaccinations, Some(20));
    }

    #[test]
    fn derive_total_needs_both_counts() {
        let partial = PartialRecord {
            people_vaccinated: Some(10),
            ..PartialRecord::default()
        };
        assert!(matches!(
            derive_total()(partial),
            Err(VaxError::Validation { .. })
        ));
    }

    #[test]
    fn derive_total_overflow() {
        let partial = PartialRecord::with_doses(u64::MAX, 1);
        assert!(derive_total()(partial).is_err());
    }

    #[test]
    fn local_date_uses_zone() {
        let now = Utc.with_ymd_and_hms(2021, 3, 1, 22, 30, 0).unwrap();
        let record = local_date("Asia/Amman", now, None)(PartialRecord::default()).unwrap();
        assert_eq!(record.date.unwrap().to_string(), "2021-03-02");

        let err = local_date("Nowhere/Land", now, None)(PartialRecord::default()).unwrap_err();
        assert!(matches!(err, VaxError::Config { .. }));
    }

    #[test]
    fn metadata_steps_overwrite() {
        let mut partial = PartialRecord::default();
        partial.location = Some("old".into());

        let record = location("Jordan")(partial).unwrap();
        let record = vaccine("Sputnik V")(record).unwrap();
        let record = source_url("https://corona.moh.gov.jo/ar")(record).unwrap();

        assert_eq!(record.location.as_deref(), Some("Jordan"));
        assert_eq!(record.vaccine.as_deref(), Some("Sputnik V"));
        assert_eq!(
            record.source_url.as_deref(),
            Some("https://corona.moh.gov.jo/ar")
        );
    }
}
