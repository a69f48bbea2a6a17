use axum::{
    extract::{Path, State},
    Extension, Json,
};
use shelfwatch_upstream::NormalizedRecord;

use crate::middleware::RequestId;

use super::{map_lookup_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_stock(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((market, lang, article, store)): Path<(String, String, String, String)>,
) -> Result<Json<ApiResponse<NormalizedRecord>>, ApiError> {
    let record = state
        .engine
        .lookup(&article, &store, &market, &lang)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}
