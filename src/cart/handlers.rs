use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{AddToCartRequest, CartResponse, UpdateCartItemRequest};
use super::repo;
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    i18n::{Lang, Locale},
    products,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_to_cart))
        .route(
            "/cart/items/:product_id",
            patch(update_cart_item).delete(remove_from_cart),
        )
}

fn check_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }
    if quantity > repo::MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity per item cannot exceed {}",
            repo::MAX_LINE_QUANTITY
        )));
    }
    Ok(())
}

async fn current_cart(st: &AppState, user_id: Uuid, locale: Locale) -> AppResult<CartResponse> {
    let lines = repo::lines(&st.db, user_id).await?;
    Ok(CartResponse::new(lines, locale))
}

#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
) -> AppResult<Json<CartResponse>> {
    Ok(Json(current_cart(&state, user.id, locale).await?))
}

#[instrument(skip(state))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Json(body): Json<AddToCartRequest>,
) -> AppResult<Json<CartResponse>> {
    check_quantity(body.quantity)?;
    let product = products::repo::get(&state.db, body.product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::not_found("Product"))?;

    if !repo::add(&state.db, user.id, product.id, body.quantity).await? {
        return Err(AppError::BadRequest(format!(
            "quantity per item cannot exceed {}",
            repo::MAX_LINE_QUANTITY
        )));
    }
    info!(user_id = %user.id, product_id = %product.id, quantity = body.quantity, "added to cart");
    Ok(Json(current_cart(&state, user.id, locale).await?))
}

#[instrument(skip(state))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Path(product_id): Path<Uuid>,
    Json(body): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartResponse>> {
    let found = match body.quantity {
        q if q < 0 => return Err(AppError::BadRequest("quantity must not be negative".into())),
        0 => repo::remove(&state.db, user.id, product_id).await?,
        q => {
            check_quantity(q)?;
            repo::set_quantity(&state.db, user.id, product_id, q).await?
        }
    };
    if !found {
        return Err(AppError::not_found("Cart item"));
    }
    Ok(Json(current_cart(&state, user.id, locale).await?))
}

#[instrument(skip(state))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<CartResponse>> {
    if !repo::remove(&state.db, user.id, product_id).await? {
        return Err(AppError::not_found("Cart item"));
    }
    Ok(Json(current_cart(&state, user.id, locale).await?))
}

#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Lang(locale): Lang,
) -> AppResult<Json<CartResponse>> {
    let removed = repo::clear(&state.db, user.id).await?;
    info!(user_id = %user.id, removed, "cart cleared");
    Ok(Json(CartResponse::new(Vec::new(), locale)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{services::JwtKeys, Role};
    use axum::{
        body::Body,
        extract::FromRef,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn authed(state: &AppState, method: &str, uri: &str, body: &str) -> Request<Body> {
        let token = JwtKeys::from_ref(state)
            .sign_access(Uuid::new_v4(), Role::Client)
            .unwrap();
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn cart_requires_login() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(Request::builder().uri("/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn zero_quantity_add_is_rejected() {
        let state = AppState::fake();
        let req = authed(
            &state,
            "POST",
            "/cart/items",
            &format!(r#"{{"product_id":"{}","quantity":0}}"#, Uuid::new_v4()),
        );
        let res = routes().with_state(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_quantities_are_rejected() {
        let state = AppState::fake();
        let add = authed(
            &state,
            "POST",
            "/cart/items",
            &format!(r#"{{"product_id":"{}","quantity":{}}}"#, Uuid::new_v4(), i32::MAX),
        );
        let res = routes().with_state(state.clone()).oneshot(add).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let update = authed(
            &state,
            "PATCH",
            &format!("/cart/items/{}", Uuid::new_v4()),
            &format!(r#"{{"quantity":{}}}"#, repo::MAX_LINE_QUANTITY + 1),
        );
        let res = routes().with_state(state).oneshot(update).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_quantity_update_is_rejected() {
        let state = AppState::fake();
        let req = authed(
            &state,
            "PATCH",
            &format!("/cart/items/{}", Uuid::new_v4()),
            r#"{"quantity":-1}"#,
        );
        let res = routes().with_state(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
