//! Subject metadata: identifiers, synthesized recording dates and channel
//! names.

use crate::error::{MockError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::SystemTime;

/// Format of the `date` field of a [`SubjectRecord`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zero-padded subject identifier, e.g. `S0001` for index 1.
pub fn subject_id(index: usize) -> String {
    format!("S{:04}", index)
}

/// Channel names `Ch1` through `Ch{n_channels}`.
///
/// Build this once per run and hand clones of the `Rc` to each record.
pub fn channel_names(n_channels: usize) -> Rc<[String]> {
    (1..=n_channels).map(|i| format!("Ch{}", i)).collect()
}

/// Random date and time in `year`-`month`, during working hours.
///
/// The day is drawn from 1 to 28 when not given so that every month is valid.
/// The hour is drawn from 8 to 17 inclusive, minute and second from 0 to 59.
pub fn random_datetime_using<R: Rng + ?Sized>(
    year: i32,
    month: u32,
    day: Option<u32>,
    rng: &mut R,
) -> Result<NaiveDateTime> {
    let day = day.unwrap_or_else(|| rng.gen_range(1..=28));
    let hour = rng.gen_range(8..=17);
    let minute = rng.gen_range(0..=59);
    let second = rng.gen_range(0..=59);
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| MockError::invalid(format!("no such date {:04}-{:02}-{:02}", year, month, day)))
}

/// Inclusive range of years and months from which recording dates are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    years: (i32, i32),
    months: (u32, u32),
    day: Option<u32>,
}
impl DateRange {
    /// Dates in `years.0..=years.1` and `months.0..=months.1`, optionally on a
    /// fixed day of the month.
    pub fn new(years: (i32, i32), months: (u32, u32), day: Option<u32>) -> Result<Self> {
        // Four digit years keep the date string at `YYYY-MM-DD HH:MM:SS`.
        if years.0 < 0 || years.1 > 9999 {
            return Err(MockError::invalid(format!(
                "year range {}..={} is not within 0..=9999",
                years.0, years.1
            )));
        }
        if years.0 > years.1 {
            return Err(MockError::invalid(format!(
                "year range {}..={} is empty",
                years.0, years.1
            )));
        }
        if months.0 < 1 || months.1 > 12 || months.0 > months.1 {
            return Err(MockError::invalid(format!(
                "month range {}..={} is not within 1..=12",
                months.0, months.1
            )));
        }
        if let Some(day) = day {
            if !(1..=31).contains(&day) {
                return Err(MockError::invalid(format!("day {} is not within 1..=31", day)));
            }
            // A fixed day must exist in every month the range can draw.
            for year in years.0..=years.1 {
                for month in months.0..=months.1 {
                    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
                        return Err(MockError::invalid(format!(
                            "day {} does not exist in {:04}-{:02}",
                            day, year, month
                        )));
                    }
                }
            }
        }
        Ok(Self { years, months, day })
    }

    /// A single year and month.
    pub fn fixed(year: i32, month: u32) -> Result<Self> {
        Self::new((year, year), (month, month), None)
    }

    /// Draw a year and month from the range, then a date within them.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveDateTime> {
        let year = rng.gen_range(self.years.0..=self.years.1);
        let month = rng.gen_range(self.months.0..=self.months.1);
        random_datetime_using(year, month, self.day, rng)
    }
}
impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dates in years {}..={}, months {}..={}",
            self.years.0, self.years.1, self.months.0, self.months.1
        )?;
        if let Some(day) = self.day {
            write!(f, ", day {}", day)?;
        }
        Ok(())
    }
}

/// Metadata saved alongside each subject's signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Subject identifier, see [`subject_id()`]
    pub id: String,
    /// Recording date formatted as `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    /// Channel names, shared between subjects of a run
    pub ch_names: Rc<[String]>,
}
impl SubjectRecord {
    /// Record for subject `id` recorded at `date`.
    pub fn build(id: impl Into<String>, date: NaiveDateTime, ch_names: Rc<[String]>) -> Self {
        Self {
            id: id.into(),
            date: date.format(DATE_FORMAT).to_string(),
            ch_names,
        }
    }

    /// Record with a random date in `year`-`month` (see
    /// [`random_datetime_using()`]).
    pub fn random_using<R: Rng + ?Sized>(
        id: impl Into<String>,
        year: i32,
        month: u32,
        day: Option<u32>,
        ch_names: Rc<[String]>,
        rng: &mut R,
    ) -> Result<Self> {
        let date = random_datetime_using(year, month, day, rng)?;
        Ok(Self::build(id, date, ch_names))
    }

    /// Parse the `date` field back into a date and time.
    pub fn datetime(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            MockError::invalid(format!("subject {} has bad date {:?}: {}", self.id, self.date, e))
        })
    }

    /// The recording date as an absolute time, reading the naive date as UTC.
    pub fn timestamp(&self) -> Result<SystemTime> {
        Ok(SystemTime::from(self.datetime()?.and_utc()))
    }
}
