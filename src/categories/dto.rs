use serde::{Deserialize, Serialize};

use crate::categories::repo::Category;

/// Request body for creating or renaming a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryMutationResponse {
    pub message: String,
    pub data: Category,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
