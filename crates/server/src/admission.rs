//! Helpers around the `kube` AdmissionReview types.

use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use kube::core::DynamicObject;
use serde_json::Value;

/// HTTP status reported in `response.status.code` for denied requests.
pub const DENIED_CODE: u16 = 403;

/// Deny `request` with `message` and a 403 status code.
pub fn deny(request: &AdmissionRequest<DynamicObject>, message: impl ToString) -> AdmissionResponse {
    let mut response = AdmissionResponse::from(request).deny(message);
    response.result.code = DENIED_CODE;
    response
}

/// The admitted object as plain JSON; `null` when the request carries none (DELETE).
pub fn object_json(request: &AdmissionRequest<DynamicObject>) -> serde_json::Result<Value> {
    match &request.object {
        Some(object) => serde_json::to_value(object),
        None => Ok(Value::Null),
    }
}
