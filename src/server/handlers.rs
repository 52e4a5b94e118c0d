use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::detail::HospitalDetail;
use crate::geo::GeoPoint;
use crate::hospital::HospitalRecord;
use crate::hours;
use crate::nearby::{self, NearbyQuery, DEFAULT_LIMIT, DEFAULT_RADIUS_KM};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub hospitals: usize,
    pub timezone: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        hospitals: state.catalog.len(),
        timezone: state.tz.to_string(),
    })
}

// ─── GET /api/hospitals/nearby ───────────────────────────────────

#[derive(Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    pub specialty: Option<String>,
    pub emergency_only: Option<bool>,
    pub limit: Option<i64>,
    pub at: Option<String>,
}

#[derive(Serialize)]
pub struct NearbyItem {
    pub hospital: HospitalRecord,
    /// Rounded to 10 m.
    pub distance_km: f64,
    pub is_open: bool,
}

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<NearbyItem>>, ApiError> {
    let start = Instant::now();

    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon' parameters")),
    };
    let origin = GeoPoint::new(lat, lon);
    if !origin.is_valid() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lon: -180..180",
        ));
    }
    let now = local_now(&state, params.at.as_deref())?;

    let mut query = NearbyQuery::new(origin)
        .within_km(params.radius.unwrap_or(DEFAULT_RADIUS_KM))
        .emergency_only(params.emergency_only.unwrap_or(false))
        .limit(params.limit.unwrap_or(DEFAULT_LIMIT));
    query.specialty = params.specialty.clone();

    let items: Vec<NearbyItem> = nearby::find_nearby(state.catalog.hospitals(), &query)
        .into_iter()
        .map(|r| NearbyItem {
            is_open: hours::is_open(&r.hospital.schedule, now),
            distance_km: (r.distance_km * 100.0).round() / 100.0,
            hospital: r.hospital,
        })
        .collect();

    tracing::info!(
        lat,
        lon,
        radius_km = query.max_distance_km,
        results = items.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/hospitals/nearby"
    );

    Ok(Json(items))
}

// ─── GET /api/hospitals/search ───────────────────────────────────

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub specialty: Option<String>,
    pub limit: Option<i64>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<HospitalRecord>> {
    let start = Instant::now();
    let query = params.query.as_deref().unwrap_or("");

    let results: Vec<HospitalRecord> = state
        .catalog
        .search(query, params.specialty.as_deref(), params.limit.unwrap_or(DEFAULT_LIMIT))
        .into_iter()
        .cloned()
        .collect();

    tracing::info!(
        query,
        results = results.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/hospitals/search"
    );

    Json(results)
}

// ─── GET /api/hospitals/{id} ─────────────────────────────────────

#[derive(Deserialize)]
pub struct DetailParams {
    pub at: Option<String>,
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Json<HospitalDetail>, ApiError> {
    let hospital = state
        .catalog
        .get(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Hospital '{}' not found", id)))?;
    let now = local_now(&state, params.at.as_deref())?;

    let detail = HospitalDetail::at(hospital, now);
    tracing::info!(id = %id, open = detail.is_open_now, "GET /api/hospitals/{{id}}");
    Ok(Json(detail))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Facility-local time: the `at` override ("YYYY-MM-DDTHH:MM") or now in the
/// configured zone.
fn local_now(state: &AppState, at: Option<&str>) -> Result<NaiveDateTime, ApiError> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Invalid 'at' value '{}': {}", s, e))
        }),
        None => Ok(hours::localize(Utc::now(), state.tz)),
    }
}
