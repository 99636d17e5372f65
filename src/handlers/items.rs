use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::db::models::Item;
use crate::error::{ListingError, MessageResponse};
use crate::middleware::item_form::ItemForm;
use crate::router::ListingState;

/// `{"item": [...]}`, the listing envelope existing clients expect.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    #[serde(rename = "item")]
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

/// GET / -> liveness check.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello, world!"))
}

/// GET /items
pub async fn list_items(
    State(state): State<ListingState>,
) -> Result<Json<ItemsResponse>, ListingError> {
    let items = state.items.list_items().await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /items/:id -> zero or one item. Non-numeric or non-positive ids are rejected.
pub async fn get_item(
    State(state): State<ListingState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Item>>, ListingError> {
    let id = parse_item_id(&raw_id)?;
    Ok(Json(state.items.get_item(id).await?))
}

/// GET /search?keyword=
pub async fn search_items(
    State(state): State<ListingState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Item>>, ListingError> {
    Ok(Json(state.items.search_items(&query.keyword).await?))
}

/// POST /items
pub async fn add_item(
    State(state): State<ListingState>,
    ItemForm(item): ItemForm,
) -> Result<Json<MessageResponse>, ListingError> {
    let receipt = state.items.add_item(item).await?;
    Ok(Json(MessageResponse::new(receipt.message())))
}

fn parse_item_id(raw: &str) -> Result<i64, ListingError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ListingError::InvalidItemId(raw.to_string())),
    }
}
