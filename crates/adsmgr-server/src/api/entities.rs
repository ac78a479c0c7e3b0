use std::str::FromStr;

use adsmgr_core::{
    aggregate, apply_entity_filter, sort_by_spend, EntityFilter, EntityType, Level, MutationField,
    ParentFilter, Totals,
};
use adsmgr_state::{merge, BulkOutcome, EntityView, MutationTarget};
use adsmgr_webhook::CreateEntityRequest;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_mutation_error, map_webhook_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct EntityQuery {
    pub level: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account: Option<String>,
    pub campaign: Option<String>,
    pub adset: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct EntityListData {
    level: Level,
    from: NaiveDate,
    to: NaiveDate,
    entities: Vec<EntityView>,
    totals: Totals,
}

/// Aggregates the report rows for the requested level and date range and
/// lays live overlays over the result.
pub(super) async fn list_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<ApiResponse<EntityListData>>, ApiError> {
    let level = query
        .level
        .as_deref()
        .map_or(Ok(Level::Campaign), Level::from_str)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let (Some(from), Some(to)) = (query.from, query.to) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "both from and to dates are required (YYYY-MM-DD)",
        ));
    };

    let rows = adsmgr_db::list_report_rows(
        &state.pool,
        adsmgr_db::ReportRowFilters {
            from,
            to,
            account: query.account.as_deref(),
            campaign: query.campaign.as_deref(),
            adset: query.adset.as_deref(),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let parent = ParentFilter {
        account: query.account.as_deref(),
        campaign: query.campaign.as_deref(),
        adset: query.adset.as_deref(),
    };
    let filter = EntityFilter {
        name_contains: query.name.as_deref(),
        status: query.status.as_deref(),
    };

    let mut entities = apply_entity_filter(aggregate(&rows, &parent, level).into_values(), &filter);
    sort_by_spend(&mut entities);
    let totals = Totals::from_entities(&entities);

    let overlays = level
        .entity_type()
        .map(|t| state.store().get_updates(t))
        .unwrap_or_default();
    let views = merge(&entities, &overlays);

    tracing::debug!(
        level = %level,
        rows = rows.len(),
        entities = views.len(),
        overlays = overlays.len(),
        "listed entities"
    );

    Ok(Json(ApiResponse::new(
        EntityListData {
            level,
            from,
            to,
            entities: views,
            totals,
        },
        req_id.0,
    )))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateEntityBody {
    pub field: String,
    pub value: Value,
    /// Overlay key, when it differs from the path id.
    pub key: Option<String>,
    /// Required when `field` is `budget`.
    pub current_budget: Option<f64>,
    #[serde(default)]
    pub confirmed: bool,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub(super) struct MutationAck {
    entity_type: EntityType,
    real_id: String,
    key: String,
    field: MutationField,
    value: Value,
}

fn parse_entity_type(request_id: &str, raw: &str) -> Result<EntityType, ApiError> {
    EntityType::from_str(raw)
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

fn parse_field(request_id: &str, raw: &str) -> Result<MutationField, ApiError> {
    MutationField::from_str(raw)
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

fn parse_budget(request_id: &str, value: &Value) -> Result<f64, ApiError> {
    value
        .as_f64()
        .ok_or_else(|| ApiError::new(request_id, "validation_error", "budget value must be a number"))
}

fn require_current_budget(request_id: &str, current: Option<f64>) -> Result<f64, ApiError> {
    current.ok_or_else(|| {
        ApiError::new(
            request_id,
            "validation_error",
            "current_budget is required for budget changes",
        )
    })
}

fn require_user<'a>(request_id: &str, user: &'a str) -> Result<&'a str, ApiError> {
    let user = user.trim();
    if user.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "user must be non-empty",
        ));
    }
    Ok(user)
}

/// Runs the optimistic apply and dispatch for one field of one entity.
///
/// Budget changes pass through the confirmation gate; a held change answers
/// `409 confirmation_required` and is neither stored nor sent.
pub(super) async fn update_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((entity_type, real_id)): Path<(String, String)>,
    Json(body): Json<UpdateEntityBody>,
) -> Result<Json<ApiResponse<MutationAck>>, ApiError> {
    let rid = req_id.0;
    let entity_type = parse_entity_type(&rid, &entity_type)?;
    let field = parse_field(&rid, &body.field)?;
    let user = require_user(&rid, &body.user)?;

    let mut target = MutationTarget::new(entity_type, real_id);
    if let Some(key) = body.key.as_deref().filter(|k| !k.is_empty()) {
        target = target.with_key(key);
    }

    let result = if field == MutationField::Budget {
        let requested = parse_budget(&rid, &body.value)?;
        target = target.with_current_budget(require_current_budget(&rid, body.current_budget)?);
        state
            .coordinator
            .update_budget(&target, requested, body.confirmed, user)
            .await
    } else {
        state
            .coordinator
            .update_field(&target, field, body.value.clone(), user)
            .await
    };
    result.map_err(|e| map_mutation_error(rid.clone(), &e))?;

    let key = target.overlay_key().to_owned();
    let value = state
        .store()
        .get(&key)
        .and_then(|entry| entry.fields.get(field.as_str()).cloned())
        .unwrap_or(body.value);

    Ok(Json(ApiResponse::new(
        MutationAck {
            entity_type,
            real_id: target.real_id,
            key,
            field,
            value,
        },
        rid,
    )))
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkTargetBody {
    pub real_id: String,
    pub key: Option<String>,
    /// Required for every target when `field` is `budget`.
    pub current_budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkUpdateBody {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub field: String,
    pub value: Value,
    pub targets: Vec<BulkTargetBody>,
    #[serde(default)]
    pub confirmed: bool,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BulkData {
    ok: bool,
    #[serde(flatten)]
    outcome: BulkOutcome,
}

/// Applies one change to many entities. Answers `502` with the per-item
/// outcome when any item failed; failed items are already rolled back.
///
/// Budget batches pass the confirmation gate per target before anything is
/// stored or sent.
pub(super) async fn bulk_update(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BulkUpdateBody>,
) -> Result<(StatusCode, Json<ApiResponse<BulkData>>), ApiError> {
    let rid = req_id.0;
    let entity_type = parse_entity_type(&rid, &body.entity_type)?;
    let field = parse_field(&rid, &body.field)?;
    let user = require_user(&rid, &body.user)?;

    let is_budget = field == MutationField::Budget;
    let mut targets = Vec::with_capacity(body.targets.len());
    for t in body.targets {
        let mut target = MutationTarget::new(entity_type, t.real_id);
        if let Some(key) = t.key.filter(|k| !k.is_empty()) {
            target = target.with_key(key);
        }
        if is_budget {
            target = target.with_current_budget(require_current_budget(&rid, t.current_budget)?);
        }
        targets.push(target);
    }

    let result = if is_budget {
        let requested = parse_budget(&rid, &body.value)?;
        state
            .coordinator
            .bulk_update_budget(&targets, requested, body.confirmed, user)
            .await
    } else {
        state
            .coordinator
            .bulk_update(&targets, field, body.value, user)
            .await
    };
    let outcome = result.map_err(|e| map_mutation_error(rid.clone(), &e))?;

    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    Ok((
        status,
        Json(ApiResponse::new(
            BulkData {
                ok: outcome.is_ok(),
                outcome,
            },
            rid,
        )),
    ))
}

#[derive(Debug, Serialize)]
pub(super) struct CreateAck {
    level: EntityType,
    name: String,
}

/// Hands a campaign or adset creation request to the creation webhook.
pub(super) async fn create_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CreateEntityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateAck>>), ApiError> {
    state
        .webhooks
        .create_entity(&request)
        .await
        .map_err(|e| map_webhook_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            CreateAck {
                level: request.level,
                name: request.name,
            },
            req_id.0,
        )),
    ))
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedData {
    cleared: usize,
}

pub(super) async fn clear_optimistic(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ClearedData>> {
    let cleared = state.store().len();
    state.store().clear_all_optimistic();
    tracing::info!(cleared, "cleared all optimistic overlays");
    Json(ApiResponse::new(ClearedData { cleared }, req_id.0))
}
