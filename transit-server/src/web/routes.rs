//! HTTP route handlers.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::Local;
use tower_http::services::ServeDir;

use crate::domain::RouteId;
use crate::jobs::JobRequest;
use crate::planner::Preference;
use crate::realtime::VehicleProvider;
use crate::streets::StreetProvider;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// `static_dir` is the path to the map frontend's static assets.
pub fn create_router<S, V>(state: AppState<S, V>, static_dir: &str) -> Router
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/routes/calculate", post(calculate_route))
        .route("/routes/jobs", post(submit_job))
        .route("/routes/jobs/:request_id", get(job_status))
        .route("/realtime/routes", get(list_transit_routes))
        .route("/realtime/routes/:route_id/shape", get(route_shape))
        .route("/realtime/vehicles", get(list_vehicles))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_request(
    request: &CalculateRouteRequest,
) -> Result<JobRequest, AppError> {
    let origin = request.origin.into_domain()?;
    let destination = request.destination.into_domain()?;
    let depart_at = match request.depart_at.as_deref() {
        Some(s) => parse_time(s)?,
        None => Local::now().naive_local(),
    };

    Ok(JobRequest {
        origin,
        destination,
        depart_at,
        preference: request.preference.unwrap_or(Preference::Fastest),
    })
}

/// Calculate an itinerary synchronously.
async fn calculate_route<S, V>(
    State(state): State<AppState<S, V>>,
    Json(request): Json<CalculateRouteRequest>,
) -> Result<Json<RouteResponse>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let request = parse_request(&request)?;

    let itinerary = state.planner.calculate_route(
        request.origin,
        request.destination,
        request.depart_at,
        request.preference,
    )?;

    Ok(Json(RouteResponse::from(&itinerary)))
}

/// Submit an async route job.
async fn submit_job<S, V>(
    State(state): State<AppState<S, V>>,
    Json(request): Json<CalculateRouteRequest>,
) -> Result<Json<SubmitJobResponse>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let request = parse_request(&request)?;
    let request_id = state.jobs.submit(request).await;

    Ok(Json(SubmitJobResponse { request_id }))
}

/// Poll an async route job.
async fn job_status<S, V>(
    State(state): State<AppState<S, V>>,
    Path(request_id): Path<String>,
) -> Result<Json<JobStatusResponse>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let record = state
        .jobs
        .get(&request_id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown job {request_id}"),
        })?;

    Ok(Json(JobStatusResponse::from(&record)))
}

/// List transit routes for the map legend.
async fn list_transit_routes<S, V>(
    State(state): State<AppState<S, V>>,
) -> Result<Json<Vec<TransitRouteDto>>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let routes = state.realtime.list_routes()?;
    Ok(Json(routes.iter().map(TransitRouteDto::from).collect()))
}

/// Representative shape polyline for one route.
async fn route_shape<S, V>(
    State(state): State<AppState<S, V>>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteShapeResponse>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let points = state.realtime.route_shape(&RouteId::new(&route_id))?;

    Ok(Json(RouteShapeResponse {
        route_id,
        points: points.into_iter().map(Into::into).collect(),
    }))
}

/// Current vehicle positions.
async fn list_vehicles<S, V>(
    State(state): State<AppState<S, V>>,
    Query(query): Query<VehiclesQuery>,
) -> Result<Json<VehiclesResponse>, AppError>
where
    S: StreetProvider + Send + Sync + 'static,
    V: VehicleProvider + Send + Sync + 'static,
{
    let filter: Option<HashSet<RouteId>> = query.route_id.as_deref().map(|csv| {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(RouteId::new)
            .collect()
    });

    let now = Local::now().naive_local();
    let vehicles = state
        .realtime
        .list_vehicles(now, filter.as_ref())
        .await?;

    Ok(Json(VehiclesResponse {
        fetched_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        vehicles: vehicles.iter().map(VehicleDto::from).collect(),
    }))
}
