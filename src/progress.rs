//! Life-progress arithmetic over a fixed 100-year horizon.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::units::TimeUnit;

pub const HORIZON_YEARS: i32 = 100;

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = MS_PER_SECOND * 60.0;
const MS_PER_HOUR: f64 = MS_PER_MINUTE * 60.0;
const MS_PER_DAY: f64 = MS_PER_HOUR * 24.0;
const MS_PER_MONTH: f64 = MS_PER_DAY * 30.44;
const MS_PER_YEAR: f64 = MS_PER_DAY * 365.25;

pub fn unit_length_ms(unit: TimeUnit) -> f64 {
    match unit {
        TimeUnit::Years => MS_PER_YEAR,
        TimeUnit::Months => MS_PER_MONTH,
        TimeUnit::Days => MS_PER_DAY,
        TimeUnit::Hours => MS_PER_HOUR,
        TimeUnit::Minutes => MS_PER_MINUTE,
        TimeUnit::Seconds => MS_PER_SECOND,
    }
}

/// The birth instant plus 100 calendar years.
///
/// A 29 February birth whose target year is not a leap year rolls over to
/// 1 March at the same time of day.
pub fn horizon_of(birth: DateTime<Utc>) -> DateTime<Utc> {
    let target_year = birth.year() + HORIZON_YEARS;

    birth
        .with_year(target_year)
        .or_else(|| {
            NaiveDate::from_ymd_opt(target_year, 3, 1)
                .map(|date| date.and_time(birth.time()).and_utc())
        })
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeProgress {
    /// Share of the whole span still remaining, in percent, clamped to [0, 100].
    pub percentage: f64,
    pub years_remaining: f64,
    pub months_remaining: f64,
    pub days_remaining: f64,
    pub hours_remaining: f64,
    pub minutes_remaining: f64,
    pub seconds_remaining: f64,
}

impl LifeProgress {
    pub fn remaining(&self, unit: TimeUnit) -> f64 {
        match unit {
            TimeUnit::Years => self.years_remaining,
            TimeUnit::Months => self.months_remaining,
            TimeUnit::Days => self.days_remaining,
            TimeUnit::Hours => self.hours_remaining,
            TimeUnit::Minutes => self.minutes_remaining,
            TimeUnit::Seconds => self.seconds_remaining,
        }
    }

    pub fn elapsed_percentage(&self) -> f64 {
        100.0 - self.percentage
    }
}

/// `None` until a birth instant is configured. Per-unit values are not
/// clamped and turn negative once the horizon has passed.
pub fn compute_progress(birth: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<LifeProgress> {
    let birth = birth?;
    let horizon = horizon_of(birth);

    let remaining_ms = (horizon - now).num_milliseconds() as f64;
    let total_ms = (horizon - birth).num_milliseconds() as f64;

    let percentage = if total_ms > 0.0 {
        (remaining_ms / total_ms * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let per_unit = |unit| remaining_ms / unit_length_ms(unit);

    Some(LifeProgress {
        percentage,
        years_remaining: per_unit(TimeUnit::Years),
        months_remaining: per_unit(TimeUnit::Months),
        days_remaining: per_unit(TimeUnit::Days),
        hours_remaining: per_unit(TimeUnit::Hours),
        minutes_remaining: per_unit(TimeUnit::Minutes),
        seconds_remaining: per_unit(TimeUnit::Seconds),
    })
}

/// Renders a countdown value as a grouped integer part and the unit's
/// fractional digits, e.g. `18,262.4123456`.
pub fn format_countdown(value: f64, unit: TimeUnit) -> String {
    let rounded = format!("{:.*}", unit.decimal_precision(), value.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let sign = if value < 0.0 && rounded.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };

    format!("{}{}.{}", sign, group_thousands(integer), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
