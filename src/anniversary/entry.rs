use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use crate::{audio::catalog::DEFAULT_SOUND_ID, progress::HORIZON_YEARS};

use super::AnniversaryDraft;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("Anniversary name must not be empty")]
    EmptyName,

    #[error("Date {0} is not after today")]
    DateNotInFuture(NaiveDate),

    #[error("Date {0} is more than 100 years ahead")]
    DateBeyondRange(NaiveDate),

    #[error("Offset of {months} months and {days} days is out of range")]
    OffsetOutOfRange { months: u32, days: u32 },

    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("Birth date {0} is after today")]
    BirthDateInFuture(NaiveDate),
}

/// How the user picked the target: a calendar date, or an offset from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEntry {
    Date(NaiveDate),
    Offset { months: u32, days: u32 },
}

impl TargetEntry {
    pub fn resolve<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> Result<DateTime<Utc>, EntryError> {
        let local_now = now.with_timezone(tz).naive_local();

        match *self {
            TargetEntry::Date(date) => {
                let today = local_now.date();
                if date <= today {
                    return Err(EntryError::DateNotInFuture(date));
                }
                if date.year() > today.year() + HORIZON_YEARS {
                    return Err(EntryError::DateBeyondRange(date));
                }

                to_utc(tz, date.and_time(NaiveTime::MIN))
            }
            TargetEntry::Offset { months, days } => {
                let target = add_months_overflowing(local_now.date(), months)
                    .and_then(|date| date.checked_add_days(Days::new(days.into())))
                    .ok_or(EntryError::OffsetOutOfRange { months, days })?;

                to_utc(tz, target.and_time(local_now.time()))
            }
        }
    }
}

/// A birth date as typed, with the time of day defaulting to noon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthEntry {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl BirthEntry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }

    /// Local wall time in `tz`. Dates after today in that zone are refused.
    pub fn resolve<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> Result<DateTime<Utc>, EntryError> {
        let today = now.with_timezone(tz).date_naive();
        if self.date > today {
            return Err(EntryError::BirthDateInFuture(self.date));
        }

        to_utc(tz, self.date.and_time(self.time))
    }
}

/// Calendar month addition that keeps the day number and lets it spill into
/// the following month, so 31 January plus one month is 3 March (2 March in
/// leap years).
fn add_months_overflowing(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(months))?
        .checked_add_days(Days::new(u64::from(date.day() - 1)))
}

fn to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, EntryError> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(EntryError::NonexistentLocalTime(local))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnniversaryForm {
    pub name: String,
    pub entry: TargetEntry,
    pub alarm_enabled: bool,
    pub alarm_sound_id: Option<String>,
}

impl AnniversaryForm {
    pub fn new(name: impl Into<String>, entry: TargetEntry) -> Self {
        Self {
            name: name.into(),
            entry,
            alarm_enabled: false,
            alarm_sound_id: Some(DEFAULT_SOUND_ID.to_owned()),
        }
    }

    pub fn with_alarm(mut self, sound_id: Option<String>) -> Self {
        self.alarm_enabled = true;
        if sound_id.is_some() {
            self.alarm_sound_id = sound_id;
        }
        self
    }

    pub fn into_draft<Tz: TimeZone>(
        self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<AnniversaryDraft, EntryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EntryError::EmptyName);
        }

        let target = self.entry.resolve(now, tz)?;

        Ok(AnniversaryDraft {
            name: name.to_owned(),
            target,
            alarm_enabled: self.alarm_enabled,
            alarm_sound_id: self.alarm_sound_id,
        })
    }
}
