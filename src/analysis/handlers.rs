use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    AnalysisRecord, AnalysisStats, AnalysisStatus, EnqueueRequest, EnqueueResponse,
    ExportedAnalysis, ListQuery, ListResponse,
};
use super::repo;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis", get(list_analyses))
        .route("/analysis/status", get(get_status))
        .route("/analysis/export", get(export_analyses))
        .route("/analysis/artwork/:artwork_id", get(get_by_artwork))
        .route("/analysis/:id", get(get_analysis))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/enqueue", post(enqueue))
        .route("/analysis/retry/:id", post(retry))
}

#[instrument(skip(state, payload), fields(count = payload.artwork_ids.len()))]
pub async fn enqueue(
    State(state): State<AppState>,
    Json(payload): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, (StatusCode, String)> {
    if payload.artwork_ids.is_empty() {
        warn!("enqueue without artwork ids");
        return Err((
            StatusCode::BAD_REQUEST,
            "artworkIds must contain at least one id".into(),
        ));
    }

    let mut job_ids = Vec::with_capacity(payload.artwork_ids.len());
    for artwork_id in &payload.artwork_ids {
        match repo::enqueue(&state.db, artwork_id).await.map_err(internal)? {
            Some(id) => job_ids.push(id),
            None => info!(%artwork_id, "already analysed; skipping"),
        }
    }

    info!(enqueued = job_ids.len(), "analyses queued");
    Ok(Json(EnqueueResponse {
        success: true,
        enqueued: job_ids.len(),
        job_ids,
    }))
}

#[instrument(skip(state))]
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<AnalysisStats>, (StatusCode, String)> {
    let counts = repo::count_by_status(&state.db).await.map_err(internal)?;
    Ok(Json(AnalysisStats::from_counts(counts)))
}

#[instrument(skip(state))]
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, (StatusCode, String)> {
    repo::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(&id.to_string()))
}

#[instrument(skip(state))]
pub async fn get_by_artwork(
    State(state): State<AppState>,
    Path(artwork_id): Path<String>,
) -> Result<Json<AnalysisRecord>, (StatusCode, String)> {
    repo::find_by_artwork(&state.db, &artwork_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(&artwork_id))
}

#[instrument(skip(state))]
pub async fn retry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if !repo::reset_to_pending(&state.db, id).await.map_err(internal)? {
        return Err(not_found(&id.to_string()));
    }
    info!(%id, "analysis requeued");
    Ok(Json(json!({ "success": true, "id": id })))
}

#[instrument(skip(state))]
pub async fn list_analyses(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ListResponse>, (StatusCode, String)> {
    let status = parse_status_filter(q.status.as_deref())?;
    if q.limit < 1 || q.offset < 0 {
        warn!(limit = q.limit, offset = q.offset, "invalid pagination");
        return Err((StatusCode::BAD_REQUEST, "invalid limit or offset".into()));
    }

    let (results, total) = repo::list(&state.db, status, q.limit, q.offset)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse {
        results,
        total,
        limit: q.limit,
        offset: q.offset,
    }))
}

#[instrument(skip(state))]
pub async fn export_analyses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = repo::list_done(&state.db).await.map_err(internal)?;
    let exported: Vec<ExportedAnalysis> = records.into_iter().map(Into::into).collect();
    info!(count = exported.len(), "exporting analyses");

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=artwork-analyses.json",
        )],
        Json(exported),
    ))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<AnalysisStatus>, (StatusCode, String)> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<AnalysisStatus>().map(Some).map_err(|e| {
            warn!(status = s, "unknown status filter");
            (StatusCode::BAD_REQUEST, e)
        }),
    }
}

fn not_found(what: &str) -> (StatusCode, String) {
    warn!(%what, "analysis not found");
    (StatusCode::NOT_FOUND, "Analysis not found".into())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = ?e, "analysis request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fakes::{FakeCatalog, FakeVision};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        super::super::router().with_state(AppState::fake(
            FakeCatalog::new(vec![]),
            FakeVision::default(),
        ))
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("failed")).unwrap(),
            Some(AnalysisStatus::Failed)
        );
        let (code, _) = parse_status_filter(Some("queued")).unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn enqueue_rejects_empty_list() {
        let res = app()
            .oneshot(
                Request::post("/analysis/enqueue")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"artworkIds":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_rejects_unknown_status() {
        let res = app()
            .oneshot(
                Request::get("/analysis?status=queued")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let res = app()
            .oneshot(Request::get("/analysis/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
