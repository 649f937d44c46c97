use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminUser,
    error::AppError,
    products::{
        dto::{
            CreateProductRequest, DeletedResponse, ProductMutationResponse, UpdateProductRequest,
        },
        repo::{self, ProductWithRefs},
    },
    state::AppState,
};

/// Public catalog views: browse, detail, search, filters. Unscoped by owner.
pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/search/:query", get(search_products))
        .route("/products/filter/category/:cat_id", get(filter_by_category))
        .route("/products/filter/brand/:brand_id", get(filter_by_brand))
}

/// Admin management views, all owner-scoped.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/my-products", get(my_products))
        .route("/products/:id", put(update_product).delete(delete_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductWithRefs>>, AppError> {
    let rows = repo::list_all(&state.db).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin))]
pub async fn my_products(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<ProductWithRefs>>, AppError> {
    let rows = repo::list_by_owner(&state.db, admin.sub).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductWithRefs>, AppError> {
    let product = repo::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn search_products(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<ProductWithRefs>>, AppError> {
    let rows = repo::search(&state.db, &query).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn filter_by_category(
    State(state): State<AppState>,
    Path(cat_id): Path<i64>,
) -> Result<Json<Vec<ProductWithRefs>>, AppError> {
    let rows = repo::list_by_category(&state.db, cat_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn filter_by_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i64>,
) -> Result<Json<Vec<ProductWithRefs>>, AppError> {
    let rows = repo::list_by_brand(&state.db, brand_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<ProductMutationResponse>, AppError> {
    let title = payload.title.filter(|t| !t.is_empty());
    let (title, price, category_id, brand_id) =
        match (title, payload.price, payload.category_id, payload.brand_id) {
            (Some(t), Some(p), Some(c), Some(b)) => (t, p, c, b),
            _ => {
                return Err(AppError::BadRequest(
                    "Product title, price, category, and brand required".into(),
                ))
            }
        };

    let product = repo::insert(
        &state.db,
        &title,
        price,
        &payload.description,
        &payload.keyword,
        &payload.image,
        category_id,
        brand_id,
        admin.sub,
    )
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    info!(product_id = %product.id, owner = %admin.sub, "product created");
    Ok(Json(ProductMutationResponse {
        message: "Product added successfully".into(),
        data: product,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductMutationResponse>, AppError> {
    let product = repo::update(&state.db, id, admin.sub, &payload)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(Json(ProductMutationResponse {
        message: "Product updated successfully".into(),
        data: product,
    }))
}

#[instrument(skip(state, admin))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = repo::delete(&state.db, id, admin.sub).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Product not found".into()));
    }

    info!(product_id = %id, owner = %admin.sub, "product deleted");
    Ok(Json(DeletedResponse {
        message: "Product deleted successfully".into(),
    }))
}
