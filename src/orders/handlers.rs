use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateOrderRequest, OrderResponse, StatusFilter, TrackQuery, UpdateStatusRequest,
};
use super::repo;
use super::services::{can_view, guest_can_track, place_order};
use crate::{
    auth::{AdminUser, AuthUser, MaybeAuthUser},
    error::{AppError, AppResult},
    i18n::{Lang, Locale},
    pagination::Pagination,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/mine", get(my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/track", get(track_order))
        .route("/orders/:id/status", patch(update_order_status))
}

async fn with_items(
    st: &AppState,
    order: super::repo_types::Order,
    locale: Locale,
) -> AppResult<OrderResponse> {
    let items = repo::items(&st.db, order.id).await?;
    Ok(OrderResponse::new(order, items, locale))
}

#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Lang(locale): Lang,
    Json(body): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let (order, items) = place_order(&state, user, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::new(order, items, locale)),
    ))
}

#[instrument(skip(state))]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let (limit, offset) = p.clamped();
    let orders = repo::list_by_user(&state.db, user.id, limit, offset).await?;
    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        out.push(with_items(&state, order, locale).await?);
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let order = repo::get(&state.db, id)
        .await?
        .filter(|o| can_view(o, &user))
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(Json(with_items(&state, order, locale).await?))
}

/// GET /orders/:id/track?email=... for guest orders.
#[instrument(skip(state, q))]
pub async fn track_order(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    Query(q): Query<TrackQuery>,
) -> AppResult<Json<OrderResponse>> {
    let order = repo::get(&state.db, id)
        .await?
        .filter(|o| guest_can_track(o, &q.email))
        .ok_or_else(|| {
            warn!(order_id = %id, "order tracking miss");
            AppError::not_found("Order")
        })?;
    Ok(Json(with_items(&state, order, locale).await?))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Lang(locale): Lang,
    Query(filter): Query<StatusFilter>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let (limit, offset) = p.clamped();
    let orders = repo::list_all(&state.db, filter.status, limit, offset).await?;
    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        out.push(with_items(&state, order, locale).await?);
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = repo::set_status(&state.db, id, body.status)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    info!(admin_id = %admin.id, order_id = %id, status = ?body.status, "order status updated");
    Ok(Json(with_items(&state, order, locale).await?))
}
