use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::LeaveError;
use crate::leave::conversion::{self, LeavePeriod};
use crate::leave::{ledger, tenure};
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};
use crate::store::HrStore;

pub const MIN_REASON_LEN: usize = 10;

/// Raw submission payload before any gate has run.
#[derive(Debug, Clone)]
pub struct LeaveInput {
    pub category: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub is_hourly: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl LeaveInput {
    /// Structural checks only; produces the period the conversion engine
    /// consumes.
    fn period(&self) -> Result<LeavePeriod, LeaveError> {
        if self.reason.trim().len() < MIN_REASON_LEN {
            return Err(LeaveError::Validation(format!(
                "reason must be at least {MIN_REASON_LEN} characters"
            )));
        }
        let hourly = match (self.is_hourly, self.start_time, self.end_time) {
            (true, Some(start), Some(end)) => Some((start, end)),
            (true, _, _) => {
                return Err(LeaveError::Validation(
                    "start_time and end_time are required for hourly leave".into(),
                ));
            }
            (false, None, None) => None,
            (false, _, _) => {
                return Err(LeaveError::Validation(
                    "start_time/end_time are only allowed on hourly leave".into(),
                ));
            }
        };
        Ok(LeavePeriod {
            start_date: self.start_date,
            end_date: self.end_date,
            hourly,
        })
    }
}

/// Validation pipeline in contract order: structural checks, tenure gate,
/// conversion, balance sufficiency. Short-circuits with the most specific
/// error kind; on success returns the staged `Pending` request, which the
/// caller persists. No balance is reserved here: the ledger commit happens
/// at approval (two-phase by design, see the lifecycle module).
pub fn validate_and_stage(
    store: &HrStore,
    employee_id: u64,
    input: &LeaveInput,
    now: DateTime<Utc>,
) -> Result<LeaveRequest, LeaveError> {
    let period = input.period()?;

    let employee = store
        .employee(employee_id)
        .ok_or(LeaveError::NotFound("employee"))?;
    tenure::check(employee.hire_date, now.date_naive())?;

    let quantity = conversion::to_day_equivalent(&period)?;
    ledger::check_sufficient(store, employee_id, input.category, quantity)?;

    Ok(LeaveRequest {
        id: Uuid::new_v4(),
        employee_id,
        category: input.category,
        start_date: input.start_date,
        end_date: input.end_date,
        is_hourly: input.is_hourly,
        start_time: input.start_time,
        end_time: input.end_time,
        reason: input.reason.trim().to_owned(),
        status: LeaveStatus::Pending,
        requested_quantity: quantity,
        approver_id: None,
        decision_at: None,
        decision_notes: None,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeRecord;
    use crate::model::quantity::Quantity;
    use std::collections::HashMap;

    fn store() -> HrStore {
        let store = HrStore::new();
        store.upsert_employee(EmployeeRecord {
            id: 1,
            full_name: "Asha Rahman".into(),
            hire_date: Some("2024-01-01".parse().unwrap()),
            balances: HashMap::from([
                (LeaveCategory::Annual, Quantity::from_whole_days(5)),
                (LeaveCategory::Sick, Quantity::from_whole_days(1)),
            ]),
        });
        store
    }

    fn now() -> DateTime<Utc> {
        "2025-06-01T09:00:00Z".parse().unwrap()
    }

    fn input() -> LeaveInput {
        LeaveInput {
            category: LeaveCategory::Annual,
            start_date: "2025-06-10".parse().unwrap(),
            end_date: "2025-06-12".parse().unwrap(),
            reason: "attending a family wedding".into(),
            is_hourly: false,
            start_time: None,
            end_time: None,
        }
    }

    #[test]
    fn stages_a_pending_request() {
        let store = store();
        let request = validate_and_stage(&store, 1, &input(), now()).unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(request.requested_quantity, Quantity::from_whole_days(3));
        // check-only at submission: balance untouched
        assert_eq!(
            store.employee(1).unwrap().balances[&LeaveCategory::Annual],
            Quantity::from_whole_days(5)
        );
    }

    #[test]
    fn short_reason_rejected() {
        let store = store();
        let mut bad = input();
        bad.reason = "because".into();
        let err = validate_and_stage(&store, 1, &bad, now()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn hourly_without_times_rejected() {
        let store = store();
        let mut bad = input();
        bad.is_hourly = true;
        let err = validate_and_stage(&store, 1, &bad, now()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn times_on_full_day_request_rejected() {
        let store = store();
        let mut bad = input();
        bad.start_time = Some("09:00:00".parse().unwrap());
        bad.end_time = Some("12:00:00".parse().unwrap());
        let err = validate_and_stage(&store, 1, &bad, now()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn unknown_employee_is_not_found() {
        let store = store();
        let err = validate_and_stage(&store, 99, &input(), now()).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn tenure_gate_runs_before_balance_check() {
        let store = store();
        store.upsert_employee(EmployeeRecord {
            id: 2,
            full_name: "New Hire".into(),
            hire_date: Some("2025-05-01".parse().unwrap()),
            // no balances at all: tenure must still be the error reported
            balances: HashMap::new(),
        });
        let err = validate_and_stage(&store, 2, &input(), now()).unwrap_err();
        assert_eq!(err.code(), "TENURE_NOT_MET");
    }

    #[test]
    fn insufficient_balance_carries_quantities() {
        let store = store();
        let mut sick = input();
        sick.category = LeaveCategory::Sick;
        sick.start_date = "2025-06-10".parse().unwrap();
        sick.end_date = "2025-06-11".parse().unwrap();
        let err = validate_and_stage(&store, 1, &sick, now()).unwrap_err();
        assert_eq!(
            err,
            LeaveError::InsufficientBalance {
                requested: Quantity::from_whole_days(2),
                available: Quantity::from_whole_days(1),
            }
        );
    }
}
