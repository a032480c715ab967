use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CategoryResponse, CreateCategoryRequest, DeleteCategoryResponse, UpdateCategoryRequest,
};
use super::repo::{self, CategoryChanges, NewCategory};
use crate::{
    auth::AdminUser,
    error::{AppError, AppResult},
    i18n::Lang,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    Lang(locale): Lang,
) -> AppResult<Json<Vec<CategoryResponse>>> {
    let rows = repo::list(&state.db).await?;
    Ok(Json(
        rows.into_iter()
            .map(|c| CategoryResponse::new(c, locale))
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CategoryResponse>> {
    let category = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(Json(CategoryResponse::new(category, locale)))
}

#[instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Json(body): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    required("name", &body.name)?;
    required("name_ar", &body.name_ar)?;

    let category = repo::create(
        &state.db,
        &NewCategory {
            name: body.name.trim(),
            name_ar: body.name_ar.trim(),
            description: body.description.as_deref(),
            description_ar: body.description_ar.as_deref(),
        },
    )
    .await?;

    info!(admin_id = %admin.id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::new(category, locale))))
}

#[instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Lang(locale): Lang,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> AppResult<Json<CategoryResponse>> {
    if let Some(name) = &body.name {
        required("name", name)?;
    }
    if let Some(name_ar) = &body.name_ar {
        required("name_ar", name_ar)?;
    }

    let changes = CategoryChanges {
        name: body.name.as_deref().map(str::trim),
        name_ar: body.name_ar.as_deref().map(str::trim),
        description: body.description.as_deref(),
        description_ar: body.description_ar.as_deref(),
    };
    let category = repo::update(&state.db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    info!(admin_id = %admin.id, category_id = %id, "category updated");
    Ok(Json(CategoryResponse::new(category, locale)))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteCategoryResponse>> {
    let detached = repo::delete_detaching_products(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    info!(admin_id = %admin.id, category_id = %id, detached, "category deleted");
    Ok(Json(DeleteCategoryResponse {
        id,
        detached_products: detached,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{services::JwtKeys, Role};
    use crate::categories::repo_types::Category;
    use crate::i18n::Locale;
    use axum::{body::Body, extract::FromRef, http::Request};
    use time::OffsetDateTime;
    use tower::ServiceExt;

    fn bearer(state: &AppState, role: Role) -> String {
        let token = JwtKeys::from_ref(state)
            .sign_access(Uuid::new_v4(), role)
            .unwrap();
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn clients_cannot_create_categories() {
        let state = AppState::fake();
        let auth = bearer(&state, Role::Client);
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/categories")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Phones","name_ar":"هواتف"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_touching_db() {
        let state = AppState::fake();
        let auth = bearer(&state, Role::Admin);
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/categories")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"  ","name_ar":"هواتف"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn anonymous_delete_is_unauthorized() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/categories/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn response_localizes_and_flattens() {
        let category = Category {
            id: Uuid::new_v4(),
            name: "Phones".into(),
            name_ar: "هواتف".into(),
            description: Some("Mobile phones".into()),
            description_ar: None,
            product_count: 3,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let res = CategoryResponse::new(category, Locale::Ar);
        assert_eq!(res.display_name, "هواتف");
        assert_eq!(res.display_description.as_deref(), Some("Mobile phones"));
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["product_count"], 3);
        assert_eq!(json["name"], "Phones");
    }
}
