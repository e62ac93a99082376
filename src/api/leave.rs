use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::lifecycle::LeaveLifecycle;
use crate::leave::validate::LeaveInput;
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "annual")]
    pub category: LeaveCategory, // enum ensures Swagger dropdown
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "attending a family wedding")]
    pub reason: String,
    #[serde(default)]
    #[schema(example = false)]
    pub is_hourly: bool,
    #[schema(example = "09:00:00", format = "time", value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "12:30:00", format = "time", value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
}

impl CreateLeave {
    fn into_input(self) -> LeaveInput {
        LeaveInput {
            category: self.category,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            is_hourly: self.is_hourly,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionPayload {
    #[schema(example = "enjoy your trip")]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditPeriod {
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-04", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(format = "time", value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(format = "time", value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeaveResponse {
    /// leave request id
    #[schema(value_type = String, example = "7f8a1b8e-5b0a-4d35-9a57-3d9f2b6c1e44")]
    pub id: Uuid,
    /// employee id for whom the leave is applied
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub category: LeaveCategory,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub is_hourly: bool,
    #[schema(format = "time", value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(format = "time", value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    /// day-equivalent quantity fixed at submission time
    #[schema(example = 3.0)]
    pub requested_days: f64,
    pub approver_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub decision_at: Option<DateTime<Utc>>,
    pub decision_notes: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveResponse {
    fn from(r: LeaveRequest) -> Self {
        LeaveResponse {
            id: r.id,
            employee_id: r.employee_id,
            category: r.category,
            start_date: r.start_date,
            end_date: r.end_date,
            is_hourly: r.is_hourly,
            start_time: r.start_time,
            end_time: r.end_time,
            reason: r.reason,
            status: r.status,
            requested_days: r.requested_quantity.as_days(),
            approver_id: r.approver_id,
            decision_at: r.decision_at,
            decision_notes: r.decision_notes,
            created_at: r.created_at,
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = "annual")]
    /// Filter by leave category
    pub category: Option<LeaveCategory>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<usize>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<usize>, // items per page
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 10)]
    pub per_page: usize,
    #[schema(example = 1)]
    pub total: usize,
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully", body = LeaveResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Insufficient balance"),
        (status = 422, description = "Tenure not met")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_profile()?;
    let request = lifecycle.submit(employee_id, &payload.into_inner().into_input())?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/approve",
    params(
        ("id" = String, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = DecisionPayload, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved, balance committed", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not pending, or balance no longer sufficient")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<Uuid>,
    payload: web::Json<DecisionPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let notes = payload.into_inner().notes;
    let request = lifecycle.approve(leave_id, &auth.actor(), notes)?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/reject",
    params(
        ("id" = String, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = DecisionPayload, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected, no balance effect", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is not pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<Uuid>,
    payload: web::Json<DecisionPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let notes = payload.into_inner().notes;
    let request = lifecycle.reject(leave_id, &auth.actor(), notes)?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Cancel leave (owner or HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/cancel",
    params(
        ("id" = String, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled; approved leave is restored", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already rejected or cancelled")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let request = lifecycle.cancel(leave_id, &auth.actor())?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Edit period (owner, pending only)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/period",
    params(
        ("id" = String, Path, description = "ID of the pending leave request to re-period")
    ),
    request_body(content = EditPeriod, content_type = "application/json"),
    responses(
        (status = 200, description = "Period updated, quantity recomputed", body = LeaveResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not pending, or new period not covered by balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn edit_leave_period(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<Uuid>,
    payload: web::Json<EditPeriod>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let edit = payload.into_inner();
    let new_times = match (edit.start_time, edit.end_time) {
        (Some(start), Some(end)) => Some((start, end)),
        (None, None) => None,
        _ => {
            return Err(LeaveError::Validation(
                "start_time and end_time must be supplied together".into(),
            )
            .into());
        }
    };
    let request = lifecycle.edit_period(
        leave_id,
        &auth.actor(),
        edit.start_date,
        edit.end_date,
        new_times,
    )?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{id}",
    params(
        ("id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = lifecycle
        .store()
        .request(leave_id)
        .ok_or(LeaveError::NotFound("leave request"))?;

    // employees may only read their own requests
    if auth.employee_id != Some(request.employee_id) {
        auth.require_hr_or_admin()?;
    }

    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let rows = lifecycle
        .store()
        .list_requests(query.employee_id, query.status, query.category);
    let total = rows.len();

    let data: Vec<LeaveResponse> = rows
        .into_iter()
        .skip(offset)
        .take(per_page)
        .map(LeaveResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
