use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{ContentInput, ContentUpdate, PathwayInput, PathwayQuery},
    services::PathwayService,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the pathways visible to the authenticated user.
///
/// Returns the caller's own pathways plus public ones, ordered by creation
/// date descending. Each entry carries the content-item count and the
/// caller's progress state, if any.
///
/// ## Query Parameters:
/// - `owner` (optional): Restrict to pathways owned by this user id.
/// - `visibility` (optional): "private" or "public".
/// - `search` (optional): Case-insensitive match against title and description.
/// - `limit` / `offset` (optional): Pagination; the listing is restartable from any offset.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of pathway summaries.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_pathways(
    state: web::Data<AppState>,
    query_params: web::Query<PathwayQuery>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let summaries = PathwayService::new(&state)
        .list(current_user.id, query_params.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(summaries))
}

/// Creates a new pathway owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: Between 1 and 200 characters (required).
/// - `description` (optional): Up to 2000 characters.
/// - `visibility` (optional): "private" (default) or "public".
///
/// ## Responses:
/// - `201 Created`: Returns the new pathway with an empty content sequence.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[post("")]
pub async fn create_pathway(
    state: web::Data<AppState>,
    pathway_data: web::Json<PathwayInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    pathway_data.validate()?;

    let pathway = PathwayService::new(&state)
        .create(current_user.id, pathway_data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(pathway))
}

/// Retrieves a specific pathway by its ID.
///
/// Private pathways of other users are indistinguishable from absent ones.
///
/// ## Responses:
/// - `200 OK`: Returns the pathway.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the pathway is absent, deleted, or not visible to the caller.
#[get("/{id}")]
pub async fn get_pathway(
    state: web::Data<AppState>,
    pathway_id: web::Path<Uuid>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let pathway = PathwayService::new(&state)
        .get(current_user.id, pathway_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(pathway))
}

/// Updates a pathway's title, description, or visibility. Owner only.
///
/// ## Responses:
/// - `200 OK`: Returns the updated pathway.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not the owner.
/// - `404 Not Found`: If the pathway is absent or not visible to the caller.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[put("/{id}")]
pub async fn update_pathway(
    state: web::Data<AppState>,
    pathway_id: web::Path<Uuid>,
    pathway_data: web::Json<PathwayInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    pathway_data.validate()?;

    let pathway = PathwayService::new(&state)
        .update(
            current_user.id,
            pathway_id.into_inner(),
            pathway_data.into_inner(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(pathway))
}

/// Deletes a pathway. Owner only.
///
/// The delete is soft and cascades to the pathway's content items and
/// progress records.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not the owner.
/// - `404 Not Found`: If the pathway is absent or not visible to the caller.
#[delete("/{id}")]
pub async fn delete_pathway(
    state: web::Data<AppState>,
    pathway_id: web::Path<Uuid>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    PathwayService::new(&state)
        .delete(current_user.id, pathway_id.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Adds a content item to a pathway at the given position. Owner only.
///
/// Trailing items are shifted up by one so positions stay contiguous.
///
/// ## Request Body:
/// - `kind`: "text", "link", or "exercise".
/// - `title`: Between 1 and 200 characters (required).
/// - `body` (optional): Up to 10000 characters.
/// - `url` (optional): Must be a valid URL.
/// - `position`: 0-based insertion index, at most the current item count.
///
/// ## Responses:
/// - `201 Created`: Returns the new content item.
/// - `400 Bad Request`: If the position is out of bounds.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not the owner.
/// - `404 Not Found`: If the pathway is absent or not visible to the caller.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[post("/{id}/content")]
pub async fn add_content(
    state: web::Data<AppState>,
    pathway_id: web::Path<Uuid>,
    content_data: web::Json<ContentInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    content_data.validate()?;

    let item = PathwayService::new(&state)
        .add_content(
            current_user.id,
            pathway_id.into_inner(),
            content_data.into_inner(),
        )
        .await?;

    Ok(HttpResponse::Created().json(item))
}

/// Lists a pathway's content items ordered by position.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of content items.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the pathway is absent or not visible to the caller.
#[get("/{id}/content")]
pub async fn list_content(
    state: web::Data<AppState>,
    pathway_id: web::Path<Uuid>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let items = PathwayService::new(&state)
        .list_content(current_user.id, pathway_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(items))
}

/// Updates a content item's fields. Owner only; the position is not moved.
///
/// ## Responses:
/// - `200 OK`: Returns the updated content item.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not the owner.
/// - `404 Not Found`: If the pathway or item is absent.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[put("/{id}/content/{content_id}")]
pub async fn update_content(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    content_data: web::Json<ContentUpdate>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    content_data.validate()?;
    let (pathway_id, content_id) = path.into_inner();

    let item = PathwayService::new(&state)
        .update_content(
            current_user.id,
            pathway_id,
            content_id,
            content_data.into_inner(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(item))
}

/// Removes a content item from a pathway. Owner only.
///
/// Trailing items shift down by one so positions stay contiguous.
///
/// ## Responses:
/// - `204 No Content`: On successful removal.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not the owner.
/// - `404 Not Found`: If the pathway or item is absent.
#[delete("/{id}/content/{content_id}")]
pub async fn delete_content(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let (pathway_id, content_id) = path.into_inner();

    PathwayService::new(&state)
        .remove_content(current_user.id, pathway_id, content_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
