use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{ProgressInput, ResetRequest},
    services::ProgressService,
    state::AppState,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the caller's active progress records, most recently updated first.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of progress records.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_progress(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let records = ProgressService::new(&state).list(current_user.id).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Upserts the caller's progress record for a pathway.
///
/// At most one active record exists per (user, pathway) pair, and its state
/// only moves forward: not_started -> in_progress -> complete. Moving
/// backwards requires an explicit admin reset.
///
/// ## Request Body:
/// - `pathway_id`: The pathway to track.
/// - `state`: "not_started", "in_progress", or "complete".
///
/// ## Responses:
/// - `200 OK`: Returns the upserted record.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the pathway is absent or not visible to the caller.
/// - `409 Conflict`: If the transition would move the state backwards.
#[put("")]
pub async fn mark_progress(
    state: web::Data<AppState>,
    progress_data: web::Json<ProgressInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    progress_data.validate()?;

    let record = ProgressService::new(&state)
        .mark(current_user.id, progress_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Resets a user's progress record to not_started. Admin only.
///
/// ## Request Body:
/// - `user_id`: Whose record to reset.
/// - `pathway_id`: Which pathway.
///
/// ## Responses:
/// - `200 OK`: Returns the reset record.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not an admin.
/// - `404 Not Found`: If no active record exists for the pair.
#[post("/reset")]
pub async fn reset_progress(
    state: web::Data<AppState>,
    reset_data: web::Json<ResetRequest>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    reset_data.validate()?;

    let record = ProgressService::new(&state)
        .reset(current_user, reset_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}
