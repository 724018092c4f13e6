//! Excel 1900 date system.
//!
//! Serial 1 is 1900-01-01. Serial 60 is the non-existent 1900-02-29 that
//! Excel keeps for Lotus compatibility, so serials below 61 count from
//! 1899-12-31 and all later ones from 1899-12-30. The fractional part is the
//! time of day, resolved to the millisecond.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

pub(crate) const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// First serial that counts from the 1899-12-30 base.
const FIRST_SERIAL_AFTER_LEAP_BUG: f64 = 61.0;

fn base_before_leap_bug() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 31)
}

fn base_after_leap_bug() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert an Excel serial number to a calendar date and time.
///
/// Returns `None` for negative or non-finite serials.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole_days = serial.floor();
    let millis = ((serial - whole_days) * MILLIS_PER_DAY + 0.5) as i64;
    let base = if whole_days < FIRST_SERIAL_AFTER_LEAP_BUG {
        base_before_leap_bug()?
    } else {
        base_after_leap_bug()?
    };

    let date = base.checked_add_signed(Duration::days(whole_days as i64))?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a calendar date and time to an Excel serial number.
///
/// Returns `None` for dates before 1900-01-01, which the 1900 date system
/// cannot represent.
pub fn datetime_to_serial(dt: NaiveDateTime) -> Option<f64> {
    if dt.year() < 1900 {
        return None;
    }

    let days = (dt.date() - base_before_leap_bug()?).num_days() as f64;
    let time = dt.time();
    let millis = f64::from(time.num_seconds_from_midnight()) * 1000.0
        + f64::from(time.nanosecond() / 1_000_000);
    let mut serial = days + millis / MILLIS_PER_DAY;
    if serial >= 60.0 {
        serial += 1.0;
    }
    Some(serial)
}
