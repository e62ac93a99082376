use chrono::{Months, NaiveDate};

use crate::error::LeaveError;

/// Minimum employment duration before leave may be requested.
pub const MIN_TENURE_MONTHS: u32 = 3;

/// True iff the employee was hired at least [`MIN_TENURE_MONTHS`] before
/// `at`. A missing hire date passes the gate; legacy records predate the
/// field and have always been allowed to request leave.
pub fn is_eligible(hire_date: Option<NaiveDate>, at: NaiveDate) -> bool {
    let Some(hired) = hire_date else {
        return true;
    };
    match at.checked_sub_months(Months::new(MIN_TENURE_MONTHS)) {
        Some(cutoff) => hired <= cutoff,
        // `at` is too close to the calendar origin to subtract from; nobody
        // can have the required tenure.
        None => false,
    }
}

/// Gate form of [`is_eligible`] with the distinct error kind the UI needs
/// for its "employed 3+ months" message.
pub fn check(hire_date: Option<NaiveDate>, at: NaiveDate) -> Result<(), LeaveError> {
    if is_eligible(hire_date, at) {
        Ok(())
    } else {
        Err(LeaveError::TenureNotMet {
            min_months: MIN_TENURE_MONTHS,
        })
    }
}
