use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::model::employee::EmployeeRecord;
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};

/// In-memory store for the leave core: the employee directory (with live
/// balances) and the leave-request table.
///
/// Lock order is requests -> employees. Lifecycle transitions hold the
/// request entry while they touch the ledger, so nothing may take the
/// request lock while holding the employee lock.
pub struct HrStore {
    employees: RwLock<HashMap<u64, EmployeeRecord>>,
    requests: RwLock<HashMap<Uuid, LeaveRequest>>,
}

impl Default for HrStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HrStore {
    pub fn new() -> Self {
        HrStore {
            employees: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
        }
    }

    pub fn upsert_employee(&self, record: EmployeeRecord) {
        self.employees
            .write()
            .expect("employee table lock poisoned")
            .insert(record.id, record);
    }

    /// Point-in-time copy of an employee record.
    pub fn employee(&self, id: u64) -> Option<EmployeeRecord> {
        self.employees
            .read()
            .expect("employee table lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Runs `f` on the employee record under the write lock. This is the
    /// ledger's atomic section; nothing else mutates balances.
    pub(crate) fn with_employee_mut<R>(
        &self,
        id: u64,
        f: impl FnOnce(&mut EmployeeRecord) -> R,
    ) -> Option<R> {
        self.employees
            .write()
            .expect("employee table lock poisoned")
            .get_mut(&id)
            .map(f)
    }

    pub fn insert_request(&self, request: LeaveRequest) {
        self.requests
            .write()
            .expect("request table lock poisoned")
            .insert(request.id, request);
    }

    pub fn request(&self, id: Uuid) -> Option<LeaveRequest> {
        self.requests
            .read()
            .expect("request table lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Runs `f` on the request entry under the write lock, serializing
    /// concurrent transitions of the same request.
    pub(crate) fn with_request_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut LeaveRequest) -> R,
    ) -> Option<R> {
        self.requests
            .write()
            .expect("request table lock poisoned")
            .get_mut(&id)
            .map(f)
    }

    /// Filtered listing, newest first.
    pub fn list_requests(
        &self,
        employee_id: Option<u64>,
        status: Option<LeaveStatus>,
        category: Option<LeaveCategory>,
    ) -> Vec<LeaveRequest> {
        let requests = self.requests.read().expect("request table lock poisoned");
        let mut rows: Vec<LeaveRequest> = requests
            .values()
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .filter(|r| category.is_none_or(|c| r.category == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Loads the employee directory from a JSON seed file. Returns the number
    /// of records loaded.
    pub fn load_directory(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let records: Vec<EmployeeRecord> =
            serde_json::from_str(&raw).context("seed file is not a valid employee list")?;
        let count = records.len();
        for record in records {
            self.upsert_employee(record);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quantity::Quantity;
    use chrono::Utc;

    fn employee(id: u64) -> EmployeeRecord {
        EmployeeRecord {
            id,
            full_name: format!("Employee {id}"),
            hire_date: Some("2020-01-01".parse().unwrap()),
            balances: HashMap::from([(LeaveCategory::Annual, Quantity::from_whole_days(20))]),
        }
    }

    fn request(employee_id: u64, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            category: LeaveCategory::Annual,
            start_date: "2025-06-01".parse().unwrap(),
            end_date: "2025-06-02".parse().unwrap(),
            is_hourly: false,
            start_time: None,
            end_time: None,
            reason: "family matters at home".into(),
            status,
            requested_quantity: Quantity::from_whole_days(2),
            approver_id: None,
            decision_at: None,
            decision_notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_and_snapshot() {
        let store = HrStore::new();
        store.upsert_employee(employee(1));
        let snap = store.employee(1).unwrap();
        assert_eq!(snap.full_name, "Employee 1");
        assert!(store.employee(2).is_none());
    }

    #[test]
    fn seed_file_populates_directory() {
        let path = std::env::temp_dir().join(format!("leave-seed-{}.json", Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"id": 7, "full_name": "Nadia Islam", "hire_date": "2023-04-01",
                 "balances": {"annual": 18, "sick": 7.5}}]"#,
        )
        .unwrap();

        let store = HrStore::new();
        let count = store.load_directory(&path).unwrap();
        assert_eq!(count, 1);
        let nadia = store.employee(7).unwrap();
        assert_eq!(
            nadia.balances[&LeaveCategory::Sick],
            Quantity::from_centidays(750)
        );
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn listing_filters_by_employee_and_status() {
        let store = HrStore::new();
        store.insert_request(request(1, LeaveStatus::Pending));
        store.insert_request(request(1, LeaveStatus::Approved));
        store.insert_request(request(2, LeaveStatus::Pending));

        assert_eq!(store.list_requests(Some(1), None, None).len(), 2);
        assert_eq!(
            store
                .list_requests(Some(1), Some(LeaveStatus::Pending), None)
                .len(),
            1
        );
        assert_eq!(store.list_requests(None, None, None).len(), 3);
        assert_eq!(
            store
                .list_requests(None, None, Some(LeaveCategory::Sick))
                .len(),
            0
        );
    }
}
