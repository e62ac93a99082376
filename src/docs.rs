use crate::api::balance::BalanceResponse;
use crate::api::leave::{
    CreateLeave, DecisionPayload, EditPeriod, LeaveFilter, LeaveListResponse, LeaveResponse,
};
use crate::model::leave_request::{LeaveCategory, LeaveStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Leave Request & Balance Ledger

This API owns the leave subsystem of the HR platform: the per-employee,
per-category balance ledger and the request lifecycle around it.

### 🔹 Key Features
- **Leave Requests**
  - Submit full-day or hourly requests, edit the period while pending
  - Approve / reject (HR or Admin) and cancel (requester)
- **Balance Ledger**
  - Balance is checked at submission and committed atomically at approval
  - Cancelling approved leave restores the committed amount exactly once
- **Eligibility**
  - Requests require 3+ months of tenure

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication**; tokens are
issued by the platform's identity service.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints
- Failures carry a stable `error` code (e.g. `INSUFFICIENT_BALANCE`)

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::submit_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::cancel_leave,
        crate::api::leave::edit_leave_period,

        crate::api::balance::get_balance
    ),
    components(
        schemas(
            CreateLeave,
            DecisionPayload,
            EditPeriod,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            BalanceResponse,
            LeaveCategory,
            LeaveStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Balance", description = "Leave balance APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
