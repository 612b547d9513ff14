use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{ArtworkRecord, ArtworkSearchQuery, ArtworkSearchResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/artworks/search", get(search_artworks))
        .route("/artworks/:id", get(get_artwork))
}

#[instrument(skip(state))]
pub async fn search_artworks(
    State(state): State<AppState>,
    Query(query): Query<ArtworkSearchQuery>,
) -> Result<Json<ArtworkSearchResponse>, (StatusCode, String)> {
    if let Err(msg) = query.validate() {
        warn!(%msg, "invalid catalog search");
        return Err((StatusCode::BAD_REQUEST, msg));
    }

    let page = state.catalog.search(&query).await.map_err(|e| {
        error!(error = ?e, "catalog search failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(ArtworkSearchResponse::new(page.hits, page.total, &query)))
}

#[instrument(skip(state))]
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtworkRecord>, (StatusCode, String)> {
    match state.catalog.get(&id).await {
        Ok(Some(artwork)) => Ok(Json(artwork)),
        Ok(None) => {
            warn!(%id, "artwork not found");
            Err((StatusCode::NOT_FOUND, "Artwork not found".into()))
        }
        Err(e) => {
            error!(error = ?e, %id, "get_artwork failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artworks::dto::fixtures::artwork;
    use crate::state::fakes::{FakeCatalog, FakeVision};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        let mut other = artwork("b2", 30.0, 30.0);
        other.creator = "Atelier Sud".into();
        let catalog = FakeCatalog::new(vec![artwork("a1", 50.0, 40.0), other]);
        routes().with_state(AppState::fake(catalog, FakeVision::default()))
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn search_pages_through_catalog() {
        let res = app()
            .oneshot(
                Request::get("/artworks/search?hitsPerPage=1&page=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res).await;
        assert_eq!(body["nbHits"], 2);
        assert_eq!(body["nbPages"], 2);
        assert_eq!(body["page"], 2);
        assert_eq!(body["hits"][0]["objectID"], "b2");
    }

    #[tokio::test]
    async fn search_rejects_oversized_page() {
        let res = app()
            .oneshot(
                Request::get("/artworks/search?hitsPerPage=500")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_rejects_overflowing_page() {
        let res = app()
            .oneshot(
                Request::get("/artworks/search?page=9223372036854775807&hitsPerPage=100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_artwork_is_404() {
        let res = app()
            .oneshot(Request::get("/artworks/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app()
            .oneshot(Request::get("/artworks/a1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["title"], "Untitled a1");
    }
}
