use crate::error::LeaveError;
use crate::model::employee::EmployeeRecord;
use crate::model::leave_request::LeaveCategory;
use crate::model::quantity::Quantity;
use crate::store::HrStore;

/// Balance ledger: the only two mutators of an employee's leave balances are
/// [`commit`] and [`restore`]. Both run as a single conditional update under
/// the store's employee lock, so two racing commits can never drive a
/// balance negative; the loser gets `INSUFFICIENT_BALANCE`.

fn available(
    employee: &EmployeeRecord,
    category: LeaveCategory,
) -> Result<Quantity, LeaveError> {
    // An unconfigured category is an error, never an implicit zero.
    employee.balances.get(&category).copied().ok_or_else(|| {
        LeaveError::Validation(format!("employee has no '{category}' leave balance"))
    })
}

/// Read-only sufficiency check. Used at submission and period edit, where
/// the observed two-phase design checks but does not yet reserve.
pub fn check_sufficient(
    store: &HrStore,
    employee_id: u64,
    category: LeaveCategory,
    quantity: Quantity,
) -> Result<(), LeaveError> {
    let employee = store
        .employee(employee_id)
        .ok_or(LeaveError::NotFound("employee"))?;
    let balance = available(&employee, category)?;
    if balance < quantity {
        return Err(LeaveError::InsufficientBalance {
            requested: quantity,
            available: balance,
        });
    }
    Ok(())
}

/// Deducts `quantity` iff the current balance covers it, atomically.
pub fn commit(
    store: &HrStore,
    employee_id: u64,
    category: LeaveCategory,
    quantity: Quantity,
) -> Result<(), LeaveError> {
    store
        .with_employee_mut(employee_id, |employee| {
            let balance = available(employee, category)?;
            let remaining = balance.checked_sub(quantity).ok_or(
                LeaveError::InsufficientBalance {
                    requested: quantity,
                    available: balance,
                },
            )?;
            employee.balances.insert(category, remaining);
            tracing::debug!(
                employee_id,
                category = %category,
                committed = %quantity,
                remaining = %remaining,
                "ledger commit"
            );
            Ok(())
        })
        .ok_or(LeaveError::NotFound("employee"))?
}

/// Returns a previously committed `quantity` to the balance, atomically.
/// Called exactly once per reversed approval.
pub fn restore(
    store: &HrStore,
    employee_id: u64,
    category: LeaveCategory,
    quantity: Quantity,
) -> Result<(), LeaveError> {
    store
        .with_employee_mut(employee_id, |employee| {
            let balance = available(employee, category)?;
            let restored = balance.saturating_add(quantity);
            employee.balances.insert(category, restored);
            tracing::debug!(
                employee_id,
                category = %category,
                restored = %quantity,
                remaining = %restored,
                "ledger restore"
            );
            Ok(())
        })
        .ok_or(LeaveError::NotFound("employee"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn store_with_balance(days: u32) -> HrStore {
        let store = HrStore::new();
        store.upsert_employee(EmployeeRecord {
            id: 1,
            full_name: "Asha Rahman".into(),
            hire_date: Some("2020-01-01".parse().unwrap()),
            balances: HashMap::from([(LeaveCategory::Annual, Quantity::from_whole_days(days))]),
        });
        store
    }

    fn annual_balance(store: &HrStore) -> Quantity {
        store.employee(1).unwrap().balances[&LeaveCategory::Annual]
    }

    #[test]
    fn commit_deducts_and_restore_returns() {
        let store = store_with_balance(5);
        let q = Quantity::from_whole_days(3);

        commit(&store, 1, LeaveCategory::Annual, q).unwrap();
        assert_eq!(annual_balance(&store), Quantity::from_whole_days(2));

        restore(&store, 1, LeaveCategory::Annual, q).unwrap();
        assert_eq!(annual_balance(&store), Quantity::from_whole_days(5));
    }

    #[test]
    fn overdraw_fails_and_leaves_balance_untouched() {
        let store = store_with_balance(1);
        let err = commit(&store, 1, LeaveCategory::Annual, Quantity::from_whole_days(2))
            .unwrap_err();
        assert_eq!(
            err,
            LeaveError::InsufficientBalance {
                requested: Quantity::from_whole_days(2),
                available: Quantity::from_whole_days(1),
            }
        );
        assert_eq!(annual_balance(&store), Quantity::from_whole_days(1));
    }

    #[test]
    fn unknown_category_is_an_error_not_zero() {
        let store = store_with_balance(5);
        let err =
            check_sufficient(&store, 1, LeaveCategory::Sick, Quantity::from_whole_days(1))
                .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn unknown_employee_is_not_found() {
        let store = store_with_balance(5);
        let err = commit(&store, 99, LeaveCategory::Annual, Quantity::from_whole_days(1))
            .unwrap_err();
        assert_eq!(err, LeaveError::NotFound("employee"));
    }

    #[test]
    fn racing_commits_never_go_negative() {
        // Balance 5, two concurrent commits of 3: exactly one may win.
        let store = Arc::new(store_with_balance(5));
        let q = Quantity::from_whole_days(3);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || commit(&store, 1, LeaveCategory::Annual, q))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert_eq!(annual_balance(&store), Quantity::from_whole_days(2));
    }
}
