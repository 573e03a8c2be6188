use crate::{
    auth::CurrentUser, error::AppError, models::UpdateProfileRequest, services::AccountService,
    state::AppState,
};
use actix_web::{delete, put, web, HttpResponse, Responder};
use validator::Validate;

/// Update the caller's profile (email and/or password).
///
/// ## Responses:
/// - `200 OK`: Returns the updated account.
/// - `401 Unauthorized`: If the request lacks a valid token or the account is deactivated.
/// - `409 Conflict`: If the new email belongs to another account.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[put("/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    update_data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let user = AccountService::new(&state)
        .update_profile(current_user.id, update_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Soft-deactivate the caller's account.
///
/// The account row is retained so owned pathways and progress history remain
/// referentially intact; login is refused afterwards.
///
/// ## Responses:
/// - `204 No Content`: On successful deactivation.
/// - `401 Unauthorized`: If the request lacks a valid token.
#[delete("/me")]
pub async fn deactivate_me(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    AccountService::new(&state)
        .deactivate(current_user.id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
