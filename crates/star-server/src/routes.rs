//! Axum route handlers for the HTTP API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use star_core::geometry::{is_points_range_valid, SkyPoint, MIN_POLYGON_POINTS};
use star_core::sky::SearchStatistics;
use star_core::{Attribute, Entry, Star, StarError};
use star_search::RangeSummary;

use crate::models::{
    ConstellationRequest, DeleteResponse, ErrorResponse, HealthResponse, PointRequest,
    SearchResponse, SegmentRequest, SortRequest, ERROR_CONSTELLATION_DOES_NOT_EXIST,
    ERROR_NOT_ENOUGH_POINTS, ERROR_POINTS_OUT_OF_RANGE,
};
use crate::session::{new_session_key, session_key, SESSION_HEADER};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Client mistakes map to 400; everything else is a server fault.
fn star_error(e: StarError) -> ApiError {
    let status = match e {
        StarError::InvalidAttribute { .. } | StarError::IndexNotFound { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("request failed: {e}");
    }
    api_error(status, e.to_string())
}

/// A validation failure reported with status 200, the way the search
/// page expects it.
fn soft_error(message: &str) -> Response {
    Json(ErrorResponse {
        error: message.to_string(),
    })
    .into_response()
}

/// `GET /health`: health check endpoint.
///
/// # Example Response
///
/// ```json
/// {"status": "ok", "version": "0.1.0"}
/// ```
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Replaces the caller's session with a new one indexing `stars`, and
/// answers with `statistics` and the new key.
///
/// The previous session named in the request headers is evicted first.
/// If building any attribute index fails, the partial session is evicted
/// again before the error is returned.
fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    stars: &[Star],
    statistics: SearchStatistics,
) -> Result<Response, ApiError> {
    if let Some(previous) = session_key(headers) {
        state.registry.evict(previous).map_err(star_error)?;
    }

    let session = new_session_key();
    if let Err(e) = state
        .registry
        .build_all(&session, stars, state.catalog.names())
    {
        if let Err(cleanup) = state.registry.evict(&session) {
            tracing::warn!(session = %session, "failed to release partial session: {cleanup}");
        }
        return Err(star_error(e));
    }

    tracing::info!(session = %session, stars = stars.len(), "started search session");

    let body = SearchResponse {
        statistics,
        session: session.clone(),
    };
    Ok(([(SESSION_HEADER, session)], Json(body)).into_response())
}

/// `POST /api/search_constellation`: select stars by constellation tag.
///
/// Starts a new session over the selected stars and returns their
/// statistics with the new session key.
///
/// # Errors
///
/// - 200 with `{"error": ...}`: unknown constellation tag
/// - 500 Internal Server Error: a star has no catalog designation
pub async fn search_constellation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ConstellationRequest>,
) -> Result<Response, ApiError> {
    let Some(stars) = state.catalog.select_constellation(&request.tag) else {
        return Ok(soft_error(ERROR_CONSTELLATION_DOES_NOT_EXIST));
    };
    let statistics = state.catalog.constellation_statistics(&stars);
    start_session(&state, &headers, &stars, statistics)
}

/// `POST /api/search_points`: select stars inside a sky polygon.
///
/// The body is a JSON array of `{"ra": .., "dec": ..}` vertices.
///
/// # Errors
///
/// - 200 with `{"error": ...}`: fewer than three vertices, or a vertex
///   outside the coordinate limits
/// - 422 Unprocessable Entity: malformed vertex (handled by Axum)
pub async fn search_points(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<Vec<PointRequest>>,
) -> Result<Response, ApiError> {
    if request.len() < MIN_POLYGON_POINTS {
        return Ok(soft_error(ERROR_NOT_ENOUGH_POINTS));
    }
    let points: Vec<SkyPoint> = request
        .iter()
        .map(|p| SkyPoint::new(p.ra, p.dec))
        .collect();
    if !is_points_range_valid(&points) {
        return Ok(soft_error(ERROR_POINTS_OUT_OF_RANGE));
    }

    let stars = state.catalog.select_polygon(&points);
    let statistics = state.catalog.statistics(&stars);
    start_session(&state, &headers, &stars, statistics)
}

/// Session key and attribute every follow-up request needs.
fn session_target<'h>(
    headers: &'h HeaderMap,
    attribute: &str,
) -> Result<(&'h str, Attribute), ApiError> {
    let attribute = attribute.parse::<Attribute>().map_err(star_error)?;
    let session = session_key(headers).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("missing {SESSION_HEADER} header"),
        )
    })?;
    Ok((session, attribute))
}

/// `POST /api/segment_search`: range query on one attribute.
///
/// Caches the matched run for later `sort_search` calls on the same
/// session and attribute.
///
/// # Errors
///
/// - 400 Bad Request: unknown `type`, missing session header, or no
///   index for the session
pub async fn segment_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SegmentRequest>,
) -> Result<Json<RangeSummary>, ApiError> {
    let (session, attribute) = session_target(&headers, &request.attribute)?;
    let index = state.registry.get(session, attribute).map_err(star_error)?;
    let summary = index
        .range_query(request.minimum, request.maximum)
        .map_err(star_error)?;
    Ok(Json(summary))
}

/// `POST /api/sort_search`: one page of the last range query.
///
/// Returns an empty array when no range query matched yet or the page
/// lies past the end of the run.
///
/// # Errors
///
/// - 400 Bad Request: unknown `type`, missing session header, or no
///   index for the session
pub async fn sort_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SortRequest>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let (session, attribute) = session_target(&headers, &request.attribute)?;
    let index = state.registry.get(session, attribute).map_err(star_error)?;
    let entries = index
        .list_page(request.page, request.descending)
        .map_err(star_error)?;
    Ok(Json(entries))
}

/// `GET|POST /api/delete_all`: release every index of the caller's
/// session.
///
/// Always answers 200; a missing or unknown session deletes nothing.
pub async fn delete_all(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<DeleteResponse> {
    let deleted = match session_key(&headers) {
        Some(session) => state.registry.evict(session).unwrap_or_else(|e| {
            tracing::warn!(session = %session, "failed to evict session: {e}");
            0
        }),
        None => 0,
    };
    Json(DeleteResponse { deleted })
}
