use serde::{Deserialize, Serialize};

use crate::brands::repo::BrandWithCategory;

/// Request body for creating a brand.
#[derive(Debug, Deserialize)]
pub struct CreateBrandRequest {
    pub name: Option<String>,
    pub category_id: Option<i64>,
}

/// Request body for renaming a brand.
#[derive(Debug, Deserialize)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrandMutationResponse {
    pub message: String,
    pub data: BrandWithCategory,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
