use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::LeaveError;
use crate::leave::conversion::{self, LeavePeriod};
use crate::leave::ledger;
use crate::leave::validate::{self, LeaveInput};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::notify::Notifier;
use crate::store::HrStore;

/// Who is performing a transition, as established by the auth collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: u64,
    pub employee_id: Option<u64>,
    pub role: Role,
}

impl Actor {
    fn can_manage(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr)
    }

    fn owns(&self, request: &LeaveRequest) -> bool {
        self.employee_id == Some(request.employee_id)
    }
}

/// The request lifecycle state machine.
///
/// `Pending` is the only non-terminal status; one step reaches `Approved`,
/// `Rejected` or `Cancelled` and nothing leaves a terminal status. Balance is
/// checked at submission but committed only at approval, so two pending
/// requests may together ask for more than is available — the first approval
/// wins and the second fails its re-check. That two-phase split is the
/// documented behavior, not an accident.
///
/// Transitions hold the request entry while they touch the ledger, so a
/// request cannot be approved twice and a restore is applied exactly once.
pub struct LeaveLifecycle {
    store: Arc<HrStore>,
    notifier: Arc<dyn Notifier>,
}

impl LeaveLifecycle {
    pub fn new(store: Arc<HrStore>, notifier: Arc<dyn Notifier>) -> Self {
        LeaveLifecycle { store, notifier }
    }

    pub fn store(&self) -> &HrStore {
        &self.store
    }

    /// Runs the validation pipeline and persists the request as `Pending`.
    /// Nothing is persisted on failure and no balance is deducted on success.
    pub fn submit(
        &self,
        employee_id: u64,
        input: &LeaveInput,
    ) -> Result<LeaveRequest, LeaveError> {
        let staged = validate::validate_and_stage(&self.store, employee_id, input, Utc::now())?;
        self.store.insert_request(staged.clone());
        tracing::info!(
            request_id = %staged.id,
            employee_id,
            category = %staged.category,
            quantity = %staged.requested_quantity,
            "leave request submitted"
        );
        Ok(staged)
    }

    /// Re-checks sufficiency and commits the deduction. The re-check matters:
    /// other approvals may have drained the balance since submission, and the
    /// commit is conditional, so a race loser fails with
    /// `INSUFFICIENT_BALANCE` instead of overdrawing.
    pub fn approve(
        &self,
        request_id: Uuid,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        if !actor.can_manage() {
            return Err(LeaveError::NotAuthorized("only HR or admin may approve leave"));
        }
        let updated = self
            .store
            .with_request_mut(request_id, |request| {
                if request.status.is_terminal() {
                    return Err(LeaveError::InvalidStateTransition {
                        from: request.status,
                        action: "approve",
                    });
                }
                ledger::commit(
                    &self.store,
                    request.employee_id,
                    request.category,
                    request.requested_quantity,
                )?;
                request.status = LeaveStatus::Approved;
                request.approver_id = Some(actor.user_id);
                request.decision_at = Some(Utc::now());
                request.decision_notes = notes;
                Ok(request.clone())
            })
            .ok_or(LeaveError::NotFound("leave request"))??;

        self.notifier.leave_decided(&updated);
        Ok(updated)
    }

    /// Rejection has no ledger effect: nothing was committed at submission.
    pub fn reject(
        &self,
        request_id: Uuid,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        if !actor.can_manage() {
            return Err(LeaveError::NotAuthorized("only HR or admin may reject leave"));
        }
        let updated = self
            .store
            .with_request_mut(request_id, |request| {
                if request.status.is_terminal() {
                    return Err(LeaveError::InvalidStateTransition {
                        from: request.status,
                        action: "reject",
                    });
                }
                request.status = LeaveStatus::Rejected;
                request.approver_id = Some(actor.user_id);
                request.decision_at = Some(Utc::now());
                request.decision_notes = notes;
                Ok(request.clone())
            })
            .ok_or(LeaveError::NotFound("leave request"))??;

        self.notifier.leave_decided(&updated);
        Ok(updated)
    }

    /// The requester (or HR/admin) withdraws a request. Cancelling a pending
    /// request has no ledger effect; cancelling an approved one restores the
    /// committed quantity, exactly once. Cancelling a rejected or already
    /// cancelled request is an `INVALID_STATE_TRANSITION`.
    pub fn cancel(&self, request_id: Uuid, actor: &Actor) -> Result<LeaveRequest, LeaveError> {
        let updated = self
            .store
            .with_request_mut(request_id, |request| {
                if !actor.owns(request) && !actor.can_manage() {
                    return Err(LeaveError::NotAuthorized(
                        "only the requester or HR/admin may cancel this request",
                    ));
                }
                match request.status {
                    LeaveStatus::Pending => {}
                    LeaveStatus::Approved => {
                        ledger::restore(
                            &self.store,
                            request.employee_id,
                            request.category,
                            request.requested_quantity,
                        )?;
                    }
                    from @ (LeaveStatus::Rejected | LeaveStatus::Cancelled) => {
                        return Err(LeaveError::InvalidStateTransition {
                            from,
                            action: "cancel",
                        });
                    }
                }
                request.status = LeaveStatus::Cancelled;
                Ok(request.clone())
            })
            .ok_or(LeaveError::NotFound("leave request"))??;

        self.notifier.leave_decided(&updated);
        Ok(updated)
    }

    /// Changes the period of a still-pending request. The quantity is
    /// recomputed and re-checked against the balance; on any failure the
    /// original period stays intact. For hourly requests new clock times may
    /// be supplied, otherwise the existing ones are kept.
    pub fn edit_period(
        &self,
        request_id: Uuid,
        actor: &Actor,
        new_start: NaiveDate,
        new_end: NaiveDate,
        new_times: Option<(NaiveTime, NaiveTime)>,
    ) -> Result<LeaveRequest, LeaveError> {
        self.store
            .with_request_mut(request_id, |request| {
                if !actor.owns(request) && !actor.can_manage() {
                    return Err(LeaveError::NotAuthorized(
                        "only the requester or HR/admin may edit this request",
                    ));
                }
                if request.status.is_terminal() {
                    return Err(LeaveError::InvalidStateTransition {
                        from: request.status,
                        action: "edit",
                    });
                }
                let hourly = if request.is_hourly {
                    new_times.or_else(|| request.start_time.zip(request.end_time))
                } else if new_times.is_some() {
                    return Err(LeaveError::Validation(
                        "start_time/end_time are only allowed on hourly leave".into(),
                    ));
                } else {
                    None
                };
                let quantity = conversion::to_day_equivalent(&LeavePeriod {
                    start_date: new_start,
                    end_date: new_end,
                    hourly,
                })?;
                ledger::check_sufficient(
                    &self.store,
                    request.employee_id,
                    request.category,
                    quantity,
                )?;

                request.start_date = new_start;
                request.end_date = new_end;
                if let Some((start_time, end_time)) = hourly {
                    request.start_time = Some(start_time);
                    request.end_time = Some(end_time);
                }
                request.requested_quantity = quantity;
                tracing::info!(
                    request_id = %request.id,
                    quantity = %quantity,
                    "leave period edited"
                );
                Ok(request.clone())
            })
            .ok_or(LeaveError::NotFound("leave request"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeRecord;
    use crate::model::leave_request::LeaveCategory;
    use crate::model::quantity::Quantity;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingNotifier(Mutex<Vec<Uuid>>);

    impl Notifier for RecordingNotifier {
        fn leave_decided(&self, request: &LeaveRequest) {
            self.0.lock().unwrap().push(request.id);
        }
    }

    fn fixture() -> (LeaveLifecycle, Arc<RecordingNotifier>) {
        let store = Arc::new(HrStore::new());
        store.upsert_employee(EmployeeRecord {
            id: 1,
            full_name: "Asha Rahman".into(),
            hire_date: Some("2020-01-01".parse().unwrap()),
            balances: HashMap::from([
                (LeaveCategory::Annual, Quantity::from_whole_days(5)),
                (LeaveCategory::Sick, Quantity::from_whole_days(1)),
            ]),
        });
        let notifier = Arc::new(RecordingNotifier(Mutex::new(Vec::new())));
        (LeaveLifecycle::new(store, notifier.clone()), notifier)
    }

    fn requester() -> Actor {
        Actor {
            user_id: 10,
            employee_id: Some(1),
            role: Role::Employee,
        }
    }

    fn other_employee() -> Actor {
        Actor {
            user_id: 11,
            employee_id: Some(2),
            role: Role::Employee,
        }
    }

    fn approver() -> Actor {
        Actor {
            user_id: 20,
            employee_id: None,
            role: Role::Hr,
        }
    }

    fn three_annual_days() -> LeaveInput {
        LeaveInput {
            category: LeaveCategory::Annual,
            start_date: "2025-06-01".parse().unwrap(),
            end_date: "2025-06-03".parse().unwrap(),
            reason: "visiting family out of town".into(),
            is_hourly: false,
            start_time: None,
            end_time: None,
        }
    }

    fn annual_balance(lc: &LeaveLifecycle) -> Quantity {
        lc.store().employee(1).unwrap().balances[&LeaveCategory::Annual]
    }

    #[test]
    fn submit_approve_cancel_round_trip() {
        let (lc, notifier) = fixture();

        let request = lc.submit(1, &three_annual_days()).unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(request.requested_quantity, Quantity::from_whole_days(3));
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));

        let approved = lc.approve(request.id, &approver(), None).unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approver_id, Some(20));
        assert!(approved.decision_at.is_some());
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(2));

        let cancelled = lc.cancel(request.id, &requester()).unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));

        // approve + cancel, both terminal transitions
        assert_eq!(notifier.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn insufficient_submission_persists_nothing() {
        let (lc, _) = fixture();
        let mut sick = three_annual_days();
        sick.category = LeaveCategory::Sick;
        sick.end_date = "2025-06-02".parse().unwrap(); // 2 days vs balance 1

        let err = lc.submit(1, &sick).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
        assert!(lc.store().list_requests(Some(1), None, None).is_empty());
    }

    #[test]
    fn reject_has_no_ledger_effect_and_is_terminal() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();

        let rejected = lc
            .reject(request.id, &approver(), Some("blackout week".into()))
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.decision_notes.as_deref(), Some("blackout week"));
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));

        let err = lc.cancel(request.id, &requester()).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();
        lc.approve(request.id, &approver(), None).unwrap();

        assert_eq!(
            lc.approve(request.id, &approver(), None).unwrap_err().code(),
            "INVALID_STATE_TRANSITION"
        );
        assert_eq!(
            lc.reject(request.id, &approver(), None).unwrap_err().code(),
            "INVALID_STATE_TRANSITION"
        );
        assert_eq!(
            lc.edit_period(
                request.id,
                &requester(),
                "2025-06-01".parse().unwrap(),
                "2025-06-02".parse().unwrap(),
                None,
            )
            .unwrap_err()
            .code(),
            "INVALID_STATE_TRANSITION"
        );
    }

    #[test]
    fn cancel_of_pending_leaves_balance_alone() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();
        let cancelled = lc.cancel(request.id, &requester()).unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));
    }

    #[test]
    fn restore_applies_exactly_once() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();
        lc.approve(request.id, &approver(), None).unwrap();
        lc.cancel(request.id, &requester()).unwrap();
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));

        // a second cancel must not restore again
        let err = lc.cancel(request.id, &requester()).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));
    }

    #[test]
    fn approval_requires_hr_or_admin() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();
        let err = lc.approve(request.id, &requester(), None).unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
    }

    #[test]
    fn cancel_requires_owner_or_hr() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();

        let err = lc.cancel(request.id, &other_employee()).unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");

        lc.cancel(request.id, &approver()).unwrap();
    }

    #[test]
    fn unknown_request_is_not_found() {
        let (lc, _) = fixture();
        let err = lc.cancel(Uuid::new_v4(), &requester()).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn edit_period_recomputes_quantity() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();

        let edited = lc
            .edit_period(
                request.id,
                &requester(),
                "2025-06-01".parse().unwrap(),
                "2025-06-05".parse().unwrap(),
                None,
            )
            .unwrap();
        assert_eq!(edited.requested_quantity, Quantity::from_whole_days(5));
        // still only checked, not committed
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(5));
    }

    #[test]
    fn insufficient_edit_keeps_original_period() {
        let (lc, _) = fixture();
        let request = lc.submit(1, &three_annual_days()).unwrap();

        let err = lc
            .edit_period(
                request.id,
                &requester(),
                "2025-06-01".parse().unwrap(),
                "2025-06-10".parse().unwrap(), // 10 days vs balance 5
                None,
            )
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");

        let unchanged = lc.store().request(request.id).unwrap();
        assert_eq!(unchanged.end_date, "2025-06-03".parse().unwrap());
        assert_eq!(unchanged.requested_quantity, Quantity::from_whole_days(3));
    }

    #[test]
    fn racing_approvals_yield_one_winner() {
        // Two pending requests of 3 days against a balance of 5: both pass
        // the submission check, only one approval may commit.
        let (lc, _) = fixture();
        let lc = Arc::new(lc);
        let first = lc.submit(1, &three_annual_days()).unwrap();
        let second = lc.submit(1, &three_annual_days()).unwrap();

        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|id| {
                let lc = Arc::clone(&lc);
                std::thread::spawn(move || lc.approve(id, &approver(), None))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let approvals = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| {
                matches!(r, Err(e) if e.code() == "INSUFFICIENT_BALANCE")
            })
            .count();
        assert_eq!(approvals, 1);
        assert_eq!(losses, 1);
        assert_eq!(annual_balance(&lc), Quantity::from_whole_days(2));
    }
}
