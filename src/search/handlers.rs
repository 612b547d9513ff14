use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{
    CombinedSearchRequest, CombinedSearchResponse, ErrorBody, ImageSearchRequest,
    ImageSearchResponse, TextSearchRequest, TextSearchResponse,
};
use super::services::get_matched_artworks;
use crate::matching::MatchCriteria;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search/text", post(text_search))
        .route("/search/image", post(image_search))
        .route("/search/combined", post(combined_search))
        .route("/search/recommendations", get(recommendations))
}

#[instrument(skip(state, payload))]
pub async fn text_search(
    State(state): State<AppState>,
    Json(payload): Json<TextSearchRequest>,
) -> Result<Json<TextSearchResponse>, ApiError> {
    let query = payload.query().map_err(bad_request)?;

    let criteria = state
        .vision
        .analyze_text_query(query)
        .await
        .map_err(|e| internal("text query analysis", e))?;
    let match_criteria = MatchCriteria::Text(criteria.clone());

    let results = get_matched_artworks(&state, &match_criteria, state.config.search_result_limit)
        .await
        .map_err(|e| internal("text search", e))?;

    info!(count = results.len(), "text search done");
    Ok(Json(TextSearchResponse {
        success: true,
        criteria,
        count: results.len(),
        results,
    }))
}

#[instrument(skip(state, payload))]
pub async fn image_search(
    State(state): State<AppState>,
    Json(payload): Json<ImageSearchRequest>,
) -> Result<Json<ImageSearchResponse>, ApiError> {
    let image = payload
        .image()
        .map_err(bad_request)?
        .ok_or_else(|| bad_request("Either imageUrl or imageBase64 must be provided".into()))?;

    let room = state
        .vision
        .analyze_room(&image)
        .await
        .map_err(|e| internal("room analysis", e))?;
    let match_criteria = MatchCriteria::Room(room.clone());

    let results = get_matched_artworks(&state, &match_criteria, state.config.search_result_limit)
        .await
        .map_err(|e| internal("image search", e))?;

    info!(count = results.len(), "image search done");
    Ok(Json(ImageSearchResponse {
        success: true,
        room_analysis: room,
        count: results.len(),
        results,
    }))
}

#[instrument(skip(state, payload))]
pub async fn combined_search(
    State(state): State<AppState>,
    Json(payload): Json<CombinedSearchRequest>,
) -> Result<Json<CombinedSearchResponse>, ApiError> {
    let image = payload.image.image().map_err(bad_request)?;
    let query = payload.query();
    if image.is_none() && query.is_none() {
        return Err(bad_request("Either query or image must be provided".into()));
    }

    let room = match &image {
        Some(image) => Some(
            state
                .vision
                .analyze_room(image)
                .await
                .map_err(|e| internal("room analysis", e))?,
        ),
        None => None,
    };
    let text = match query {
        Some(q) => Some(
            state
                .vision
                .analyze_text_query(q)
                .await
                .map_err(|e| internal("text query analysis", e))?,
        ),
        None => None,
    };
    let criteria = MatchCriteria::from_parts(room, text)
        .ok_or_else(|| bad_request("Either query or image must be provided".into()))?;

    let results = get_matched_artworks(&state, &criteria, state.config.search_result_limit)
        .await
        .map_err(|e| internal("combined search", e))?;

    info!(count = results.len(), "combined search done");
    Ok(Json(CombinedSearchResponse {
        success: true,
        criteria,
        count: results.len(),
        results,
    }))
}

pub async fn recommendations() -> ApiError {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorBody {
            success: false,
            error: "Room ID recommendations not yet implemented".into(),
        }),
    )
}

fn bad_request(error: String) -> ApiError {
    warn!(%error, "invalid search request");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            success: false,
            error,
        }),
    )
}

fn internal(what: &str, e: impl std::fmt::Display) -> ApiError {
    error!(error = %e, "{} failed", what);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            success: false,
            error: e.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fakes::{FakeCatalog, FakeVision};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app(vision: FakeVision) -> Router {
        routes().with_state(AppState::fake(FakeCatalog::new(vec![]), vision))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let res = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn text_search_requires_query() {
        let (status, body) = post_json(app(FakeVision::default()), "/search/text", r#"{"query":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn image_search_requires_image() {
        let (status, _) = post_json(app(FakeVision::default()), "/search/image", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            app(FakeVision::default()),
            "/search/image",
            r#"{"imageUrl":"not-a-url"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn combined_search_without_input() {
        let (status, body) = post_json(app(FakeVision::default()), "/search/combined", r#"{"query":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either query or image must be provided");
    }

    #[tokio::test]
    async fn provider_failure_is_500() {
        // FakeVision without a canned text answer fails the analysis call
        let (status, body) = post_json(
            app(FakeVision::default()),
            "/search/text",
            r#"{"query":"calm blue abstract"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "no response from AI");
    }

    #[tokio::test]
    async fn recommendations_not_implemented() {
        let res = app(FakeVision::default())
            .oneshot(
                Request::get("/search/recommendations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
