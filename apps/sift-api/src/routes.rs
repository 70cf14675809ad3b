use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use sift_service::{
	Error as ServiceError, EventRequest, EventResponse, IngestRequest, IngestResponse,
	SearchRequest, SearchResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/events", post(record_event))
		.route("/v1/catalog/ingest", post(ingest_catalog))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

async fn record_event(
	State(state): State<AppState>,
	Json(payload): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
	let response = state.service.record_event(payload).await?;

	Ok((StatusCode::ACCEPTED, Json(response)))
}

async fn ingest_catalog(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest_catalog(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		let (status, error_code) = match err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::RetrievalUnavailable { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "retrieval_unavailable"),
			ServiceError::StoreUnavailable { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
			ServiceError::StreamUnavailable { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "stream_unavailable"),
			ServiceError::PublishFailure { .. } => (StatusCode::BAD_GATEWAY, "publish_failure"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
		};

		Self { status, error_code, message }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
