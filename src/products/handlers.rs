use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CatalogScope, CreateProductRequest, ProductResponse, UpdateProductRequest};
use super::filter::ProductFilter;
use super::images::{self, UploadItem};
use super::repo::{self, NewProduct, ProductChanges};
use super::repo_types::Product;
use crate::{
    auth::{AdminUser, MaybeAuthUser},
    categories,
    error::{AppError, AppResult},
    i18n::{Lang, Locale},
    state::AppState,
};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route(
            "/products/:id",
            axum::routing::patch(update_product).delete(delete_product),
        )
        .route(
            "/products/:id/images",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

async fn respond(st: &AppState, product: Product, locale: Locale) -> AppResult<ProductResponse> {
    let urls = images::resolve_urls(st, &product.images).await?;
    Ok(ProductResponse::new(product, urls, locale))
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

async fn ensure_category(st: &AppState, id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = id {
        if !categories::repo::exists(&st.db, id).await? {
            return Err(AppError::BadRequest("Unknown category".into()));
        }
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Lang(locale): Lang,
    Query(filter): Query<ProductFilter>,
    Query(scope): Query<CatalogScope>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let is_admin = user.is_some_and(|u| u.is_admin());
    if scope.include_inactive && !is_admin {
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    let products = filter.apply(repo::list(&state.db, scope.include_inactive).await?);
    let mut out = Vec::with_capacity(products.len());
    for product in products {
        out.push(respond(&state, product, locale).await?);
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductResponse>> {
    let is_admin = user.is_some_and(|u| u.is_admin());
    let product = repo::get(&state.db, id)
        .await?
        .filter(|p| p.active || is_admin)
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(Json(respond(&state, product, locale).await?))
}

#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Json(body): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    validate_name("name", &body.name)?;
    validate_name("name_ar", &body.name_ar)?;
    validate_price(body.price)?;
    validate_stock(body.stock)?;
    ensure_category(&state, body.category_id).await?;

    let product = repo::create(
        &state.db,
        &NewProduct {
            name: body.name.trim(),
            name_ar: body.name_ar.trim(),
            description: &body.description,
            description_ar: &body.description_ar,
            price: body.price,
            images: &body.images,
            stock: body.stock,
            featured: body.featured,
            active: body.active,
            category_id: body.category_id,
        },
    )
    .await?;

    info!(admin_id = %admin.id, product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(respond(&state, product, locale).await?)))
}

#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    if let Some(name) = &body.name {
        validate_name("name", name)?;
    }
    if let Some(name_ar) = &body.name_ar {
        validate_name("name_ar", name_ar)?;
    }
    if let Some(price) = body.price {
        validate_price(price)?;
    }
    if let Some(stock) = body.stock {
        validate_stock(stock)?;
    }
    ensure_category(&state, body.category_id.flatten()).await?;

    let changes = ProductChanges {
        name: body.name.as_deref().map(str::trim),
        name_ar: body.name_ar.as_deref().map(str::trim),
        description: body.description.as_deref(),
        description_ar: body.description_ar.as_deref(),
        price: body.price,
        images: body.images.as_deref(),
        stock: body.stock,
        featured: body.featured,
        active: body.active,
        category_id: body.category_id,
    };
    let product = repo::update(&state.db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    info!(admin_id = %admin.id, product_id = %id, "product updated");
    Ok(Json(respond(&state, product, locale).await?))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let images = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    images::remove_stored(&state, &images).await;

    info!(admin_id = %admin.id, product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/:id/images (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((content_type, body));
            break;
        }
    }
    let Some((content_type, body)) = upload else {
        return Err(AppError::BadRequest("file is required".into()));
    };
    if images::ext_from_mime(&content_type).is_none() {
        return Err(AppError::BadRequest(format!(
            "unsupported image type {content_type}"
        )));
    }
    if repo::get(&state.db, id).await?.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let key = images::upload_product_image(
        &state,
        id,
        UploadItem {
            body,
            content_type: &content_type,
        },
    )
    .await?;
    repo::append_image(&state.db, id, &key).await?;

    let product = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    info!(admin_id = %admin.id, product_id = %id, key = %key, "product image uploaded");
    Ok((StatusCode::CREATED, Json(respond(&state, product, locale).await?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{services::JwtKeys, Role};
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        read_routes().merge(write_routes()).with_state(state)
    }

    fn bearer(state: &AppState, role: Role) -> String {
        let token = JwtKeys::from_ref(state)
            .sign_access(Uuid::new_v4(), role)
            .unwrap();
        format!("Bearer {token}")
    }

    fn json_req(method: &str, uri: &str, auth: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", auth)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn guests_cannot_see_inactive_products() {
        let res = app(AppState::fake())
            .oneshot(
                Request::builder()
                    .uri("/products?include_inactive=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn bad_category_filter_is_rejected() {
        let res = app(AppState::fake())
            .oneshot(
                Request::builder()
                    .uri("/products?category=not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let state = AppState::fake();
        let auth = bearer(&state, Role::Admin);
        let res = app(state)
            .oneshot(json_req(
                "POST",
                "/products",
                &auth,
                r#"{"name":"Lamp","name_ar":"مصباح","price":"-1","category_id":null}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_stock_update_is_rejected() {
        let state = AppState::fake();
        let auth = bearer(&state, Role::Admin);
        let res = app(state)
            .oneshot(json_req(
                "PATCH",
                &format!("/products/{}", Uuid::new_v4()),
                &auth,
                r#"{"stock":-3}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clients_cannot_delete_products() {
        let state = AppState::fake();
        let auth = bearer(&state, Role::Client);
        let res = app(state)
            .oneshot(json_req(
                "DELETE",
                &format!("/products/{}", Uuid::new_v4()),
                &auth,
                "",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
