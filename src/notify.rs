use crate::model::leave_request::LeaveRequest;

/// Outbound notification hook, invoked after every terminal transition
/// (approve, reject, cancel). Fire-and-forget: implementations must swallow
/// their own failures — a notification can never roll back a transition.
pub trait Notifier: Send + Sync {
    fn leave_decided(&self, request: &LeaveRequest);
}

/// Default notifier: writes the event to the log. Real delivery (email,
/// toast) is wired in by the hosting application.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn leave_decided(&self, request: &LeaveRequest) {
        tracing::info!(
            request_id = %request.id,
            employee_id = request.employee_id,
            category = %request.category,
            status = %request.status,
            quantity = %request.requested_quantity,
            "leave request decided"
        );
    }
}
