use adsmgr_core::Rule;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_webhook_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RuleAck {
    name: String,
    is_active: bool,
    conditions: usize,
    targets: usize,
}

pub(super) async fn create_rule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(rule): Json<Rule>,
) -> Result<(StatusCode, Json<ApiResponse<RuleAck>>), ApiError> {
    state
        .webhooks
        .create_rule(&rule)
        .await
        .map_err(|e| map_webhook_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            RuleAck {
                conditions: rule.conditions.len(),
                targets: rule.target_ids.iter().filter(|t| !t.trim().is_empty()).count(),
                name: rule.name,
                is_active: rule.is_active,
            },
            req_id.0,
        )),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct RuleStatusBody {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RuleControlAck {
    rule_id: String,
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

pub(super) async fn set_rule_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(rule_id): Path<String>,
    Json(body): Json<RuleStatusBody>,
) -> Result<Json<ApiResponse<RuleControlAck>>, ApiError> {
    state
        .webhooks
        .set_rule_status(&rule_id, body.is_active)
        .await
        .map_err(|e| map_webhook_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        RuleControlAck {
            rule_id,
            action: "toggle",
            is_active: Some(body.is_active),
        },
        req_id.0,
    )))
}

pub(super) async fn delete_rule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(rule_id): Path<String>,
) -> Result<Json<ApiResponse<RuleControlAck>>, ApiError> {
    state
        .webhooks
        .delete_rule(&rule_id)
        .await
        .map_err(|e| map_webhook_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        RuleControlAck {
            rule_id,
            action: "delete",
            is_active: None,
        },
        req_id.0,
    )))
}
