//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    CreatePersonRequest, CreatePersonResponse, ErrorResponse, HealthResponse,
    ListPersonsResponse, PersonView,
};
use common::ServiceError;
use tracing::{info, warn};

use super::{middleware::principal, state::AppState};
use crate::store::{FieldView, PersonRead, StoreError};

/// `POST /persons`: store a new person, sealing every entry of `fields`.
pub async fn create_person(
    State(state): State<AppState>,
    Json(req): Json<CreatePersonRequest>,
) -> Response {
    if req.username.trim().is_empty() {
        return error_response(ServiceError::BadRequest("username must not be empty".into()));
    }

    match state
        .store
        .create(&state.cipher, &req.username, &req.fields)
        .await
    {
        Ok(id) => {
            info!(id, "person created");
            (StatusCode::CREATED, Json(CreatePersonResponse { id })).into_response()
        }
        Err(e) => store_failure(e),
    }
}

/// `GET /persons`: every person; only the caller's own record is decrypted.
///
/// A failed owner read fails the whole listing.
pub async fn list_persons(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let requester = match principal(&headers, &state.principal_header) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };

    let mut persons = Vec::new();
    for id in state.store.ids().await {
        match state.store.read(&state.cipher, id, requester).await {
            Ok(read) => persons.push(person_view(read)),
            Err(e) => return store_failure(e),
        }
    }
    (StatusCode::OK, Json(ListPersonsResponse { persons })).into_response()
}

/// `GET /persons/:id`: one person, decrypted only for its owner.
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let requester = match principal(&headers, &state.principal_header) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };

    match state.store.read(&state.cipher, id, requester).await {
        Ok(read) => (StatusCode::OK, Json(person_view(read))).into_response(),
        Err(e) => store_failure(e),
    }
}

/// `GET /health`: liveness check with the current record count.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        records: state.store.len().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn person_view(read: PersonRead) -> PersonView {
    match read.view {
        FieldView::Plain(fields) => PersonView {
            id: read.id,
            username: read.username,
            sealed: false,
            fields,
            wrapped_subkey: None,
            rotation_counter: None,
        },
        FieldView::Sealed(sealed) => PersonView {
            id: read.id,
            username: read.username,
            sealed: true,
            fields: sealed.fields,
            wrapped_subkey: Some(sealed.wrapped_subkey),
            rotation_counter: Some(sealed.rotation_counter),
        },
    }
}

fn store_failure(err: StoreError) -> Response {
    if let StoreError::Crypto(e) = &err {
        warn!(error = %e, "envelope operation failed");
    }
    error_response(err.into())
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}
