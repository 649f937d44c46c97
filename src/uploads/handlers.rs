use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AdminUser,
    error::AppError,
    products::repo as products_repo,
    state::AppState,
    uploads::services::{
        content_type_allowed, content_type_for_extension, extension_allowed, extension_of,
        make_filename, remove_file, resolves_under_root, sanitize_relative, storage_key,
        store_file, MAX_UPLOAD_BYTES,
    },
};

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload/product",
            post(upload_product_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/upload/product/*path", get(fetch_product_image))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub image_path: String,
    pub filename: String,
}

struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// POST /upload/product — multipart with an `image` file field and a
/// `product_id` text field.
#[instrument(skip(state, admin, multipart))]
pub async fn upload_product_image(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut product_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("product_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // strict integer parse before any path construction
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::BadRequest("Product ID must be an integer".into()))?;
                product_id = Some(id);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    let product_id = product_id.ok_or_else(|| AppError::BadRequest("Product ID required".into()))?;

    let ext = extension_of(&file.filename).unwrap_or_default();
    if !extension_allowed(&ext) || !content_type_allowed(&file.content_type) {
        warn!(filename = %file.filename, content_type = %file.content_type, "rejected upload");
        return Err(AppError::UnsupportedMediaType(
            "Only image files (jpeg, jpg, png, gif, webp) are allowed".into(),
        ));
    }

    let filename = make_filename(&ext);
    let key = storage_key(admin.sub, product_id, &filename);
    let written = store_file(&state.upload_root, &key, &file.bytes).await?;

    // Re-check after the write that the resolved path is still inside the
    // root. A failure here means the key escaped despite validation, so the
    // file must not stay.
    match resolves_under_root(&state.upload_root, &written) {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            remove_file(&written).await;
            return Err(AppError::Forbidden("Invalid upload location".into()));
        }
    }

    let image_path = format!("uploads/{key}");
    match products_repo::set_image(&state.db, product_id, admin.sub, &image_path).await {
        Ok(0) => {
            // product missing or owned by someone else; don't keep the file
            remove_file(&written).await;
            Err(AppError::NotFound("Product not found".into()))
        }
        Ok(_) => {
            info!(product_id = %product_id, owner = %admin.sub, %image_path, "image uploaded");
            Ok(Json(UploadResponse {
                message: "Image uploaded successfully".into(),
                image_path,
                filename,
            }))
        }
        Err(e) => {
            remove_file(&written).await;
            Err(AppError::Internal(e.into()))
        }
    }
}

/// GET /upload/product/*path — serves a stored image by its relative path.
#[instrument(skip(state))]
pub async fn fetch_product_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<(HeaderMap, Bytes), AppError> {
    let rel = path.strip_prefix("uploads/").unwrap_or(&path);
    let rel = sanitize_relative(rel)
        .ok_or_else(|| AppError::Forbidden("Invalid file path".into()))?;

    let full = state.upload_root.join(&rel);
    if !full.is_file() {
        return Err(AppError::NotFound("Image not found".into()));
    }
    if !resolves_under_root(&state.upload_root, &full)? {
        return Err(AppError::Forbidden("Invalid file path".into()));
    }

    let bytes = tokio::fs::read(&full)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let ext = extension_of(&rel.to_string_lossy()).unwrap_or_default();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for_extension(&ext)),
    );
    Ok((headers, Bytes::from(bytes)))
}
