use serde::{Deserialize, Serialize};

use crate::products::repo::ProductWithRefs;

/// Request body for creating a product. Title, price, category and brand are
/// required; the rest default to empty.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub image: String,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

/// Request body for a partial product update. Absent fields are untouched; an
/// explicitly provided empty string overwrites.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub keyword: Option<String>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductMutationResponse {
    pub message: String,
    pub data: ProductWithRefs,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_absent_from_empty() {
        let partial: UpdateProductRequest = serde_json::from_str(r#"{"title":"X"}"#).unwrap();
        assert_eq!(partial.title.as_deref(), Some("X"));
        assert!(partial.description.is_none());

        let cleared: UpdateProductRequest =
            serde_json::from_str(r#"{"description":""}"#).unwrap();
        assert_eq!(cleared.description.as_deref(), Some(""));
        assert!(cleared.title.is_none());
    }

    #[test]
    fn create_request_defaults_optional_text_fields() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"title":"Red Shoes","price":49.5,"category_id":1,"brand_id":2}"#,
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Red Shoes"));
        assert_eq!(req.description, "");
        assert_eq!(req.keyword, "");
        assert_eq!(req.image, "");
    }
}
