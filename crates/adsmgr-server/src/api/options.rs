use adsmgr_core::{Platform, PLATFORMS};
use axum::{Extension, Json};

use crate::middleware::RequestId;

use super::ApiResponse;

/// Publisher platforms and their placements, as accepted by entity creation.
pub(super) async fn list_placements(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<&'static [Platform]>> {
    Json(ApiResponse::new(PLATFORMS, req_id.0))
}
