//! `/admission` and `/healthcheck` handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use tracing::{debug, error, info, warn};

use aegir_notify::ViolationNotice;
use aegir_rules::Decision;

use crate::admission;
use crate::state::AppState;

const JSON_CONTENT_TYPE: &str = "application/json";

pub async fn healthcheck() -> &'static str {
    "UP\n"
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!(%message, "rejecting admission request");
    (StatusCode::BAD_REQUEST, message).into_response()
}

/// True when the media type is JSON; parameters such as `charset` are ignored.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}

pub async fn admission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return bad_request(format!(
            "invalid Content-Type, expected `{JSON_CONTENT_TYPE}`"
        ));
    }

    let review: AdmissionReview<DynamicObject> = match serde_json::from_slice(&body) {
        Ok(review) => review,
        Err(e) => return bad_request(format!("could not deserialize request: {e}")),
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => return bad_request(format!("malformed admission review: {e}")),
    };

    let namespace = request.namespace.as_deref().unwrap_or_default();
    let kind = request.kind.kind.as_str();
    debug!(
        uid = %request.uid,
        namespace,
        kind,
        operation = ?request.operation,
        name = %request.name,
        "processing admission request"
    );

    let object = match admission::object_json(&request) {
        Ok(object) => object,
        Err(e) => {
            error!(uid = %request.uid, error = %e, "failed to re-encode admitted object");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    let decision = state.engine.decide(&object, namespace, kind);

    let response = match decision.denial_message() {
        None => {
            info!(uid = %request.uid, namespace, kind, "admission request allowed");
            AdmissionResponse::from(&request)
        }
        Some(message) => {
            warn!(
                uid = %request.uid,
                namespace,
                kind,
                violations = decision.violations.len(),
                "admission request denied"
            );
            // Delivery runs on background tasks; the verdict never waits on it.
            drop(state.dispatcher.notify_all(notices(&decision, &request)));
            admission::deny(&request, message)
        }
    };

    (StatusCode::OK, Json(response.into_review())).into_response()
}

fn notices(decision: &Decision, request: &AdmissionRequest<DynamicObject>) -> Vec<ViolationNotice> {
    decision
        .violations
        .iter()
        .map(|v| ViolationNotice {
            rule_name: v.rule_name.clone(),
            description: v.description.clone(),
            path: v.path.clone(),
            message: v.message.clone(),
            channel: v.notification_channel.clone(),
            resource_type: request.kind.kind.clone(),
            namespace: request.namespace.clone().unwrap_or_default(),
        })
        .collect()
}
