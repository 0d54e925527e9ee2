use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog::{rank, select_best, DatasetDescriptor};
use formats::FeatureCollection;
use layers::{compose_filter, compose_paint_named, LayerSet, PaintInstruction, SeaLevel};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// Pre-serialized Florida overlay; fetched once at startup.
    overlay_geojson: Bytes,
}

impl AppState {
    pub fn new(overlay: &FeatureCollection) -> Result<Self, serde_json::Error> {
        Ok(Self {
            overlay_geojson: Bytes::from(overlay.to_geojson_string()?),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/overlay/sea-level.geojson", get(get_overlay))
        .route("/datasets/best", post(best_dataset))
        .route("/datasets/rank", post(rank_datasets))
        .route("/style/paint/:scheme", get(paint_style))
        .route("/style/filter", get(filter_style))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

/// Comma-separated layer ids; blanks are dropped.
fn parse_layers(raw: &str) -> LayerSet {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_overlay(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.overlay_geojson.clone(),
    )
        .into_response()
}

async fn best_dataset(Json(descriptors): Json<Vec<DatasetDescriptor>>) -> Response {
    match select_best(&descriptors) {
        Some(best) => {
            info!(
                candidates = descriptors.len(),
                quality = best.quality_score().value(),
                "selected best dataset"
            );
            Json(best).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn rank_datasets(Json(descriptors): Json<Vec<DatasetDescriptor>>) -> Response {
    let ranked: Vec<&DatasetDescriptor> = rank(&descriptors);
    Json(ranked).into_response()
}

#[derive(Debug, Deserialize)]
struct PaintQuery {
    #[serde(default)]
    layers: String,
}

async fn paint_style(
    Path(scheme): Path<String>,
    Query(query): Query<PaintQuery>,
) -> Json<Vec<PaintInstruction>> {
    Json(compose_paint_named(&scheme, &parse_layers(&query.layers)))
}

#[derive(Debug, Deserialize)]
struct FilterQuery {
    #[serde(default)]
    layers: String,
    threshold: Option<f64>,
}

async fn filter_style(Query(query): Query<FilterQuery>) -> Response {
    let level = match query.threshold {
        None => SeaLevel::DEFAULT,
        Some(t) => match SeaLevel::new(t) {
            Some(level) => level,
            None => {
                return api_error(StatusCode::BAD_REQUEST, "threshold must be a finite number")
                    .into_response()
            }
        },
    };
    Json(compose_filter(level, &parse_layers(&query.layers))).into_response()
}

#[cfg(test)]
mod tests {
    use super::{router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use formats::FeatureCollection;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let overlay = FeatureCollection::from_geojson_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "state": "FL" }, "geometry": null }
            ]
        }))
        .unwrap();
        router(AppState::new(&overlay).unwrap())
    }

    async fn send(req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(req).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn post_json(uri: &str, payload: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(req).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn serves_filtered_overlay() {
        let (status, body) = get_json("/overlay/sea-level.geojson").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn best_dataset_prefers_quality_then_recency() {
        let (status, body) = post_json(
            "/datasets/best",
            json!([
                { "qualityLevel": "QL2", "publicationDate": "2020-01-01", "id": "a" },
                { "qualityLevel": "QL0", "publicationDate": "2019-01-01", "id": "b" },
                { "qualityLevel": "QL0", "publicationDate": "2021-01-01", "id": "c" }
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "c");
    }

    #[tokio::test]
    async fn empty_search_has_no_best() {
        let (status, _) = post_json("/datasets/best", json!([])).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn rank_returns_full_order() {
        let (status, body) = post_json(
            "/datasets/rank",
            json!([
                { "qualityLevel": "unknown", "id": "x" },
                { "qualityLevel": "ql3", "date": "2001-01-01", "id": "y" },
                { "qualityLevel": "QL3", "date": "2011-01-01", "id": "z" }
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }

    #[tokio::test]
    async fn paint_instructions_per_layer() {
        let (status, body) = get_json("/style/paint/classification?layers=a,%20b,,").await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1]["layerId"], "b");
        assert_eq!(list[1]["property"], "circle-color");
        assert_eq!(list[1]["value"][0], "match");
    }

    #[tokio::test]
    async fn unknown_scheme_yields_no_instructions() {
        let (status, body) = get_json("/style/paint/sepia?layers=a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn filter_instructions_use_threshold() {
        let (status, body) = get_json("/style/filter?threshold=3.2&layers=a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{ "layerId": "a", "filter": [">=", ["get", "Z"], 3.2] }])
        );

        let (_, body) = get_json("/style/filter?layers=a").await;
        assert_eq!(body[0]["filter"][2], 1.5);
    }

    #[tokio::test]
    async fn non_finite_threshold_is_rejected() {
        let (status, body) = get_json("/style/filter?threshold=NaN&layers=a").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
