use crate::{
    auth::{AuthResponse, CurrentUser, LoginRequest, RegisterRequest},
    error::AppError,
    services::AccountService,
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new member account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: Returns the token and new user id.
/// - `409 Conflict`: If the username or email is already registered.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let (user, token) = AccountService::new(&state)
        .register(register_data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
///
/// ## Responses:
/// - `200 OK`: Returns the token and user id.
/// - `401 Unauthorized`: On unknown email, wrong password, or a deactivated account.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let (user, token) = AccountService::new(&state)
        .authenticate(login_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Current user profile
///
/// Returns the authenticated caller's account. Fails with 401 if the account
/// was deactivated after the token was issued.
#[get("/me")]
pub async fn me(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = AccountService::new(&state).profile(current_user.id).await?;
    Ok(HttpResponse::Ok().json(user))
}
