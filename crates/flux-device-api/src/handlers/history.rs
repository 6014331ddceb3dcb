use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use flux_timeseries::TimeBound;
use tracing::debug;

/// 获取设备可绘制的字段
pub async fn get_fields(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<FieldsResponse>> {
    debug!(mac = %mac, "Getting device fields");

    let fields = state.history.fields(&mac).await?;

    Ok(Json(FieldsResponse { mac, fields }))
}

/// 获取某字段的历史序列
pub async fn get_history(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let field = query
        .field
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("query parameter \"field\" is required".into()))?;

    let start = parse_bound(query.start.as_deref(), TimeBound::Epoch)?;
    let stop = parse_bound(query.stop.as_deref(), TimeBound::Now)?;
    debug!(mac = %mac, field = %field, ?start, ?stop, "Getting field history");

    let data = state.history.history(&mac, &field, start, stop).await?;

    Ok(Json(HistoryResponse {
        mac,
        field,
        count: data.len(),
        data,
    }))
}

/// 空参数使用缺省边界
fn parse_bound(raw: Option<&str>, default: TimeBound) -> Result<TimeBound> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => Ok(s.parse()?),
    }
}
