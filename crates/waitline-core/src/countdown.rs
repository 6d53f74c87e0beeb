//! Launch countdown.
//!
//! The product launches on December 1. The target is always the next
//! December 1 strictly in the future; once the moment passes, every unit
//! clamps to zero rather than going negative (a stale page shows zeros,
//! not `-1`).

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Launch month/day, fixed.
const LAUNCH_MONTH: u32 = 12;
const LAUNCH_DAY: u32 = 1;

/// Midnight on December 1 of `year`, UTC.
fn launch_instant(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, LAUNCH_MONTH, LAUNCH_DAY, 0, 0, 0)
        .single()
        // Dec 1 00:00 UTC is unambiguous in every year.
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The next launch date strictly after `now`. On or after this year's
/// December 1, the target rolls to next year.
pub fn next_launch_date(now: DateTime<Utc>) -> DateTime<Utc> {
    let this_year = launch_instant(now.year());
    if now < this_year {
        this_year
    } else {
        launch_instant(now.year() + 1)
    }
}

/// Remaining time split into display units. All zero once the target has
/// passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Time remaining from `now` until `target`, clamped at zero.
    pub fn until(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let diff = target.signed_duration_since(now);
        let total_seconds = diff.num_seconds();
        if total_seconds <= 0 {
            return Self::zero();
        }

        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
        }
    }

    pub fn zero() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    pub fn is_elapsed(self) -> bool {
        self == Self::zero()
    }
}

impl std::fmt::Display for Countdown {
    /// Two-digit zero-padded units; days widen past two digits as needed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
