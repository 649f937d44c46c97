use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    brands::{
        dto::{BrandMutationResponse, CreateBrandRequest, DeletedResponse, UpdateBrandRequest},
        repo::{self, BrandWithCategory},
    },
    error::{is_unique_violation, AppError},
    state::AppState,
};

pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route("/brands/category/:cat_id", get(list_brands_by_category))
        .route("/brands/:id", put(update_brand).delete(delete_brand))
}

#[instrument(skip(state, session))]
pub async fn list_brands(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<BrandWithCategory>>, AppError> {
    let rows = repo::list_by_owner(&state.db, session.sub).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, session))]
pub async fn list_brands_by_category(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(cat_id): Path<i64>,
) -> Result<Json<Vec<BrandWithCategory>>, AppError> {
    let rows = repo::list_by_owner_and_category(&state.db, session.sub, cat_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_brand(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateBrandRequest>,
) -> Result<Json<BrandMutationResponse>, AppError> {
    let name = payload.name.filter(|n| !n.is_empty());
    let (name, category_id) = match (name, payload.category_id) {
        (Some(n), Some(c)) => (n, c),
        _ => {
            return Err(AppError::BadRequest(
                "Brand name and category required".into(),
            ))
        }
    };

    let brand = repo::insert(&state.db, &name, category_id, admin.sub)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Brand already exists in this category".into())
            } else {
                AppError::Internal(e.into())
            }
        })?;

    info!(brand_id = %brand.id, owner = %admin.sub, "brand created");
    Ok(Json(BrandMutationResponse {
        message: "Brand added successfully".into(),
        data: brand,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_brand(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBrandRequest>,
) -> Result<Json<BrandMutationResponse>, AppError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Brand name required".into()))?;

    let brand = repo::update(&state.db, id, admin.sub, &name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Brand already exists in this category".into())
            } else {
                AppError::Internal(e.into())
            }
        })?
        .ok_or_else(|| AppError::NotFound("Brand not found".into()))?;

    Ok(Json(BrandMutationResponse {
        message: "Brand updated successfully".into(),
        data: brand,
    }))
}

#[instrument(skip(state, admin))]
pub async fn delete_brand(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = repo::delete(&state.db, id, admin.sub).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Brand not found".into()));
    }

    info!(brand_id = %id, owner = %admin.sub, "brand deleted");
    Ok(Json(DeletedResponse {
        message: "Brand deleted successfully".into(),
    }))
}
