//! HTTP surface: `POST /predict`, `GET /categories`, `GET /health`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use super::error::PredictionError;
use super::service::{PredictionResponse, PredictionService};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    service: PredictionService,
    limiter: Arc<Semaphore>,
}

impl AppState {
    /// `max_concurrency` bounds simultaneous predictor calls (at least 1).
    pub fn new(service: PredictionService, max_concurrency: usize) -> Self {
        Self {
            service,
            limiter: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/categories", get(categories))
        .route("/health", get(health))
        .with_state(state)
}

/// An absent body, invalid JSON and a non-object all count as "no input".
fn parse_payload(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, PredictionError> {
    let body = body.map_err(|rejection| PredictionError::UnreadableBody {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let payload = parse_payload(&body);
    let row = state.service.validate(payload.as_ref())?;

    let permit = state
        .limiter
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| PredictionError::PredictionFailure(e.to_string()))?;

    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        service.predict_row(&row)
    })
    .await
    .map_err(|e| PredictionError::PredictionFailure(format!("prediction task failed: {e}")))??;

    tracing::debug!(predicted_salary = response.predicted_salary, "prediction served");
    Ok(Json(response))
}

async fn categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.list_categories().clone())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.service.store().pipeline().model();
    Json(json!({
        "status": "ok",
        "model": {
            "n_trees": model.n_trees(),
            "n_features": model.n_features(),
        },
    }))
}
