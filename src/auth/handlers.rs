use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        repo::UserChanges,
        repo_types::User,
        services::{
            hash_password, is_valid_email, normalize_email, post_login_redirect, verify_password,
            JwtKeys, MIN_PASSWORD_LEN,
        },
    },
    error::{AppError, AppResult},
    i18n::Lang,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

fn issue_tokens(
    state: &AppState,
    user: User,
    redirect: String,
    lang: Lang,
) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, user.role)?;
    let refresh_token = keys.sign_refresh(user.id, user.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from_user(user, lang.0),
        redirect,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    lang: Lang,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        payload.name.trim(),
        payload.name_ar.as_deref().map(str::trim),
        &payload.email,
        &hash,
    )
    .await?
    .ok_or_else(|| {
        // lost a race with a concurrent sign-up
        warn!(email = %payload.email, "email already registered");
        AppError::Conflict("Email already registered".into())
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let redirect = post_login_redirect(user.role, None);
    Ok((
        StatusCode::CREATED,
        Json(issue_tokens(&state, user, redirect, lang)?),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    lang: Lang,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, role = ?user.role, "user logged in");
    let redirect = post_login_redirect(user.role, payload.redirect_to.as_deref());
    Ok(Json(issue_tokens(&state, user, redirect, lang)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    lang: Lang,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Reload so a role change since the last login takes effect.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    let redirect = post_login_redirect(user.role, None);
    Ok(Json(issue_tokens(&state, user, redirect, lang)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(PublicUser::from_user(user, locale)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    if matches!(payload.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    let changes = UserChanges {
        name: payload.name.as_deref().map(str::trim),
        name_ar: payload.name_ar.as_deref().map(str::trim),
        avatar: payload.avatar.as_deref(),
        role: None,
    };
    let updated = User::update(&state.db, user.id, &changes)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    info!(user_id = %updated.id, "profile updated");
    Ok(Json(PublicUser::from_user(updated, locale)))
}
