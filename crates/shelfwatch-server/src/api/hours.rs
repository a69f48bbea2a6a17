use axum::{
    extract::{Path, State},
    Extension, Json,
};
use shelfwatch_upstream::{store_hours, StoreHours};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_store_hours(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<StoreHours>>, ApiError> {
    let hours = store_hours(&state.client, &state.store_pages_base, &slug)
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: hours,
        meta: ResponseMeta::new(req_id.0),
    }))
}
