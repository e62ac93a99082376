use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::leave_request::LeaveCategory;
use crate::store::HrStore;

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1000,
    "balances": { "annual": 12.5, "sick": 4.0 }
}))]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// Remaining leave per category, in days
    pub balances: HashMap<LeaveCategory, f64>,
}

/// Remaining per-category balance for one employee
#[utoipa::path(
    get,
    path = "/api/v1/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balance to fetch")
    ),
    responses(
        (status = 200, description = "Current balances", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn get_balance(
    auth: AuthUser,
    store: web::Data<HrStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // employees may only read their own balance
    if auth.employee_id != Some(employee_id) {
        auth.require_hr_or_admin()?;
    }

    let employee = store
        .employee(employee_id)
        .ok_or(LeaveError::NotFound("employee"))?;

    let balances = employee
        .balances
        .iter()
        .map(|(category, quantity)| (*category, quantity.as_days()))
        .collect();

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        balances,
    }))
}
