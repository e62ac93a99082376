use chrono::{NaiveDate, NaiveTime};

use crate::error::LeaveError;
use crate::model::quantity::Quantity;

/// Fixed length of a working day used to convert hourly spans into
/// day-equivalents. Balances are kept commensurable across hourly and
/// full-day requests through this constant.
pub const WORKING_HOURS_PER_DAY: u32 = 8;

/// The calendar (or clock) span of a request, as the conversion engine and
/// the validator see it.
#[derive(Debug, Clone, Copy)]
pub struct LeavePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Same-day clock span for hourly requests.
    pub hourly: Option<(NaiveTime, NaiveTime)>,
}

/// Converts a request period into a day-equivalent quantity.
///
/// Pure and deterministic: identical inputs always yield the same centiday
/// value, because the persisted `requested_quantity` is later compared
/// against a freshly read balance.
///
/// Full-day requests count calendar days end-inclusive: 2025-03-01 to
/// 2025-03-03 is 3 days. Hourly requests are rounded half-up to centihours
/// first, then divided by the 8-hour working day and rounded half-up to
/// centidays: 09:00-12:30 is 3.5 hours, 0.44 days.
pub fn to_day_equivalent(period: &LeavePeriod) -> Result<Quantity, LeaveError> {
    if period.end_date < period.start_date {
        return Err(LeaveError::Validation(
            "end_date cannot be before start_date".into(),
        ));
    }

    match period.hourly {
        None => {
            let days = (period.end_date - period.start_date).num_days() + 1;
            Quantity::from_whole_days_checked(days as u64).ok_or_else(|| {
                LeaveError::Validation("leave span is too long to be requested".into())
            })
        }
        Some((start_time, end_time)) => {
            if period.start_date != period.end_date {
                return Err(LeaveError::Validation(
                    "hourly leave must start and end on the same day".into(),
                ));
            }
            if end_time <= start_time {
                return Err(LeaveError::Validation(
                    "end_time must be after start_time".into(),
                ));
            }
            let minutes = (end_time - start_time).num_minutes() as u64;
            // minutes -> hours, half-up to 2 decimals
            let centihours = (minutes * 100 + 30) / 60;
            if centihours < 100 {
                return Err(LeaveError::Validation(
                    "hourly leave must span at least one hour".into(),
                ));
            }
            // hours -> days, half-up to 2 decimals
            let centidays = (centihours + u64::from(WORKING_HOURS_PER_DAY) / 2)
                / u64::from(WORKING_HOURS_PER_DAY);
            Ok(Quantity::from_centidays(centidays as u32))
        }
    }
}
