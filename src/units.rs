use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 6] = [
        TimeUnit::Years,
        TimeUnit::Months,
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
    ];

    pub fn index(self) -> usize {
        match self {
            TimeUnit::Years => 0,
            TimeUnit::Months => 1,
            TimeUnit::Days => 2,
            TimeUnit::Hours => 3,
            TimeUnit::Minutes => 4,
            TimeUnit::Seconds => 5,
        }
    }

    pub fn next(self) -> Option<TimeUnit> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<TimeUnit> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Fractional digits shown after the integer part of the countdown.
    pub fn decimal_precision(self) -> usize {
        match self {
            TimeUnit::Minutes | TimeUnit::Seconds => 3,
            _ => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Years => "years",
            TimeUnit::Months => "months",
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown time unit `{0}`")]
pub struct UnknownTimeUnit(pub String);

impl FromStr for TimeUnit {
    type Err = UnknownTimeUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTimeUnit(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Forward,
    Backward,
}

/// Tracks the displayed unit and the direction of the last transition.
#[derive(Debug, Clone)]
pub struct UnitNavigator {
    current: TimeUnit,
    direction: SlideDirection,
    swipe_threshold: f64,
    swipe_start: Option<f64>,
}

impl UnitNavigator {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            current: TimeUnit::Days,
            direction: SlideDirection::Forward,
            swipe_threshold,
            swipe_start: None,
        }
    }

    pub fn current(&self) -> TimeUnit {
        self.current
    }

    pub fn direction(&self) -> SlideDirection {
        self.direction
    }

    /// Returns `false` when `unit` is already active.
    pub fn change_unit(&mut self, unit: TimeUnit) -> bool {
        if unit == self.current {
            return false;
        }

        self.direction = if unit.index() > self.current.index() {
            SlideDirection::Forward
        } else {
            SlideDirection::Backward
        };
        self.current = unit;
        true
    }

    /// Moves one unit in `direction`, stopping at either end of the list.
    pub fn page(&mut self, direction: SlideDirection) -> bool {
        let target = match direction {
            SlideDirection::Forward => self.current.next(),
            SlideDirection::Backward => self.current.previous(),
        };

        match target {
            Some(unit) => self.change_unit(unit),
            None => false,
        }
    }

    pub fn begin_swipe(&mut self, x: f64) {
        self.swipe_start = Some(x);
    }

    /// Right-to-left motion pages forward, left-to-right pages backward.
    /// Motions not longer than the threshold are ignored.
    pub fn end_swipe(&mut self, x: f64) -> bool {
        let Some(start) = self.swipe_start.take() else {
            return false;
        };

        let distance = start - x;
        if distance.abs() <= self.swipe_threshold {
            return false;
        }

        if distance > 0.0 {
            self.page(SlideDirection::Forward)
        } else {
            self.page(SlideDirection::Backward)
        }
    }
}
