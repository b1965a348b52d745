use hifitime::{Epoch, TimeScale, Unit};

use crate::constants::DecimalYear;
use crate::igrf_errors::IgrfError;

/// Build the calendar date `year-month-day` (midnight UTC) as a [`hifitime::Epoch`].
///
/// Arguments
/// ---------
/// * `year`, `month`, `day`: gregorian calendar date
///
/// Return
/// ------
/// * the epoch at 00:00:00 UTC, or [`IgrfError::InvalidDate`] if the date does not exist
pub fn calendar_date(year: i32, month: u8, day: u8) -> Result<Epoch, IgrfError> {
    Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0)
        .map_err(|e| IgrfError::InvalidDate(format!("{year:04}-{month:02}-{day:02}: {e}")))
}

/// Convert the calendar date of an epoch into a decimal year.
///
/// Only the calendar day matters: the time of day is dropped and the year
/// fraction is `(day_of_year - 1) / days_in_year`, so January 1st maps onto the
/// integer year and leap years are divided into 366 days.
///
/// Argument
/// --------
/// * `date`: any epoch, its UTC calendar date is used
///
/// Return
/// ------
/// * the decimal year, e.g. `2015.5863` for 2015-08-03
pub fn decimal_year(date: &Epoch) -> DecimalYear {
    let (year, month, day, _, _, _, _) = date.to_gregorian_utc();

    // TAI midnights keep whole-day differences free of leap seconds
    let year_start = Epoch::from_gregorian_at_midnight(year, 1, 1, TimeScale::TAI);
    let next_year_start = Epoch::from_gregorian_at_midnight(year + 1, 1, 1, TimeScale::TAI);
    let day_start = Epoch::from_gregorian_at_midnight(year, month, day, TimeScale::TAI);

    let days_in_year = (next_year_start - year_start).to_unit(Unit::Day).round();
    let elapsed_days = (day_start - year_start).to_unit(Unit::Day).round();

    year as f64 + elapsed_days / days_in_year
}
