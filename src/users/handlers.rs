use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{dto::PublicUser, repo::UserChanges, AdminUser, Role, User},
    error::{AppError, AppResult},
    i18n::Lang,
    pagination::Pagination,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub role: Option<Role>,
    pub avatar: Option<String>,
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Lang(locale): Lang,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<PublicUser>>> {
    let (limit, offset) = p.clamped();
    let users = User::list(&state.db, limit, offset).await?;
    Ok(Json(
        users
            .into_iter()
            .map(|u| PublicUser::from_user(u, locale))
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(PublicUser::from_user(user, locale)))
}

#[instrument(skip(state))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    if matches!(body.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if id == admin.id && body.role == Some(Role::Client) {
        return Err(AppError::BadRequest("Admins cannot demote themselves".into()));
    }
    let changes = UserChanges {
        name: body.name.as_deref().map(str::trim),
        name_ar: body.name_ar.as_deref().map(str::trim),
        avatar: body.avatar.as_deref(),
        role: body.role,
    };
    let user = User::update(&state.db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    info!(admin_id = %admin.id, user_id = %id, role = ?user.role, "user updated");
    Ok(Json(PublicUser::from_user(user, locale)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if id == admin.id {
        return Err(AppError::BadRequest("Admins cannot delete themselves".into()));
    }
    if !User::delete(&state.db, id).await? {
        return Err(AppError::not_found("User"));
    }
    info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
