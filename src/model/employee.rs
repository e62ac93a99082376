use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::leave_request::LeaveCategory;
use crate::model::quantity::Quantity;

/// Employee record as the leave core sees it: identity, the tenure anchor and
/// the live per-category balance. The full HR profile lives elsewhere; this
/// service only consumes the fields the ledger and the tenure gate need.
///
/// `hire_date` may be absent for records migrated from the old system; such
/// employees pass the tenure gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Remaining leave per category, in days. Mutated only through the ledger.
    pub balances: HashMap<LeaveCategory, Quantity>,
}
