use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::generation::{Gateway, GatewayOutcome, GeneralOutcome, GeneralSpecRequest, GenerationRequest, Principal};
use crate::task::TaskResult;

pub const PRINCIPAL_HEADER: &str = "x-principal-id";

pub type AppState = Arc<Gateway>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpecBody {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub spec_example: String,
    pub product_name_example: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateGeneralBody {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub spec_example: String,
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_generate_spec(
    State(gateway): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateSpecBody>,
) -> Response {
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(resp) => return resp,
    };
    if body.model.trim().is_empty() || body.spec_example.trim().is_empty() {
        return bad_request("model and specExample are required");
    }

    let request = GenerationRequest::new(
        body.model.trim(),
        body.spec_example,
        body.product_name_example,
        principal,
    );
    match gateway.submit(request).await {
        GatewayOutcome::Finished(result) => (StatusCode::OK, Json(result)).into_response(),
        GatewayOutcome::Accepted { task_id } => (StatusCode::ACCEPTED, Json(json!({ "taskId": task_id }))).into_response(),
        GatewayOutcome::Failed { task_id, message } => {
            warn!(task_id = %task_id, error = %message, "generation failed inside wait window");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(TaskResult::failed(message))).into_response()
        }
        GatewayOutcome::Cancelled { .. } => (StatusCode::OK, Json(TaskResult::cancelled())).into_response(),
        GatewayOutcome::InsufficientCredit { remaining } => insufficient_credit(remaining),
    }
}

pub async fn handle_generate_general(
    State(gateway): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateGeneralBody>,
) -> Response {
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(resp) => return resp,
    };
    if body.product_name.trim().is_empty() || body.spec_example.trim().is_empty() {
        return bad_request("productName and specExample are required");
    }

    let request = GeneralSpecRequest {
        product_name: body.product_name.trim().to_string(),
        spec_example: body.spec_example,
        principal,
    };
    match gateway.generate_general(request).await {
        GeneralOutcome::Finished(result) => {
            (StatusCode::OK, Json(json!({ "result": result, "taskId": null }))).into_response()
        }
        GeneralOutcome::Failed { message } => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(TaskResult::failed(message))).into_response()
        }
        GeneralOutcome::InsufficientCredit { remaining } => insufficient_credit(remaining),
    }
}

pub async fn handle_result(State(gateway): State<AppState>, Path(task_id): Path<String>) -> Json<TaskResult> {
    Json(gateway.poll(&task_id))
}

pub async fn handle_cancel(State(gateway): State<AppState>, Path(task_id): Path<String>) -> Json<serde_json::Value> {
    Json(json!({ "success": gateway.cancel(&task_id) }))
}

pub async fn handle_credit(State(gateway): State<AppState>, headers: HeaderMap) -> Response {
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(resp) => return resp,
    };
    match gateway.balance(&principal).await {
        Ok(balance) => Json(json!({ "principal": principal.id, "balance": balance })).into_response(),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": err.to_string() }))).into_response(),
    }
}

fn principal_from(headers: &HeaderMap) -> Result<Principal, Response> {
    headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Principal::new)
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "missing X-Principal-Id header" })),
            )
                .into_response()
        })
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn insufficient_credit(remaining: i64) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "insufficient credit", "remaining": remaining })),
    )
        .into_response()
}
