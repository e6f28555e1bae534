use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CitizenId, ShelterId};
use super::error::{AllocationError, ErrorKind};
use super::registration::RegistrationRequest;
use super::repository::{AssignmentRepository, CitizenRepository, ShelterRepository};
use super::service::AllocationService;

/// Body of `POST /api/v1/assignments`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualAssignmentRequest {
    pub citizen_id: CitizenId,
    pub shelter_id: ShelterId,
}

type SharedService<C, S, A> = Arc<AllocationService<C, S, A>>;

/// Router builder exposing registration, allocation, and report endpoints.
pub fn allocation_router<C, S, A>(service: SharedService<C, S, A>) -> Router
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/citizens",
            get(list_citizens_handler::<C, S, A>).post(register_handler::<C, S, A>),
        )
        .route("/api/v1/shelters", get(shelters_handler::<C, S, A>))
        .route("/api/v1/assignments", post(manual_assign_handler::<C, S, A>))
        .route(
            "/api/v1/assignments/auto",
            post(auto_assign_handler::<C, S, A>),
        )
        .route("/api/v1/reports/summary", get(summary_handler::<C, S, A>))
        .route("/api/v1/reports/full", get(full_report_handler::<C, S, A>))
        .with_state(service)
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Duplicate | ErrorKind::Capacity | ErrorKind::RiskConstraint => {
            StatusCode::CONFLICT
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: AllocationError) -> Response {
    let kind = error.kind();
    let payload = json!({
        "kind": kind.label(),
        "error": error.to_string(),
    });
    (status_for(kind), axum::Json(payload)).into_response()
}

/// A body that does not decode is reported like any other rejected input.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "kind": ErrorKind::Validation.label(),
        "error": rejection.body_text(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, AllocationError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_citizens_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    respond(StatusCode::OK, service.citizens())
}

pub(crate) async fn register_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
    request: Result<axum::Json<RegistrationRequest>, JsonRejection>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    match request {
        Ok(axum::Json(request)) => respond(StatusCode::CREATED, service.register_citizen(request)),
        Err(rejection) => rejection_response(rejection),
    }
}

pub(crate) async fn shelters_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    respond(StatusCode::OK, service.shelter_occupancy())
}

pub(crate) async fn auto_assign_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    respond(StatusCode::OK, service.auto_assign())
}

pub(crate) async fn manual_assign_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
    request: Result<axum::Json<ManualAssignmentRequest>, JsonRejection>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    respond(
        StatusCode::CREATED,
        service.manual_assign(&request.citizen_id, &request.shelter_id),
    )
}

pub(crate) async fn summary_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    respond(StatusCode::OK, service.allocation_summary())
}

pub(crate) async fn full_report_handler<C, S, A>(
    State(service): State<SharedService<C, S, A>>,
) -> Response
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    respond(StatusCode::OK, service.allocation_report())
}
