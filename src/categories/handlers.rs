use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    categories::{
        dto::{CategoryMutationResponse, CategoryRequest, DeletedResponse},
        repo::{self, Category},
    },
    error::{is_unique_violation, AppError},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state, session))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<Category>>, AppError> {
    let rows = repo::list_by_owner(&state.db, session.sub).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryMutationResponse>, AppError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Category name required".into()))?;

    let category = repo::insert(&state.db, &name, admin.sub)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Category name already exists".into())
            } else {
                AppError::Internal(e.into())
            }
        })?;

    info!(category_id = %category.id, owner = %admin.sub, "category created");
    Ok(Json(CategoryMutationResponse {
        message: "Category added successfully".into(),
        data: category,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryMutationResponse>, AppError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Category name required".into()))?;

    let category = repo::update(&state.db, id, admin.sub, &name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Category name already exists".into())
            } else {
                AppError::Internal(e.into())
            }
        })?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(Json(CategoryMutationResponse {
        message: "Category updated successfully".into(),
        data: category,
    }))
}

#[instrument(skip(state, admin))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = repo::delete(&state.db, id, admin.sub).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    info!(category_id = %id, owner = %admin.sub, "category deleted");
    Ok(Json(DeletedResponse {
        message: "Category deleted successfully".into(),
    }))
}
