use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::db::sqlite::{ItemsStorage, connect};
use crate::error::ListingError;
use crate::handlers;
use crate::service::{ImageResolver, ItemService};

/// Shared handler state.
#[derive(Clone)]
pub struct ListingState {
    pub items: ItemService,
    pub images: ImageResolver,
}

impl ListingState {
    pub fn new(items: ItemService, images: ImageResolver) -> Self {
        Self { items, images }
    }

    /// Open the store, create the schema and check the images directory.
    pub async fn from_config(cfg: &Config) -> Result<Self, ListingError> {
        let images = ImageResolver::new(&cfg.images_dir)?;
        let storage = ItemsStorage::new(connect(&cfg.database_url).await?);
        storage.init_schema().await?;
        let items = ItemService::new(storage, &cfg.images_dir);
        Ok(Self::new(items, images))
    }
}

pub fn listing_router(state: ListingState, cfg: &Config) -> Router {
    Router::new()
        .route("/", get(handlers::items::root))
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::add_item),
        )
        .route("/items/{id}", get(handlers::items::get_item))
        .route("/search", get(handlers::items::search_items))
        .route("/image/{image_filename}", get(handlers::images::get_image))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&cfg.front_url))
        .with_state(state)
}

/// Single allowed origin; GET, PUT, POST and DELETE.
fn cors_layer(front_url: &str) -> CorsLayer {
    let cors =
        CorsLayer::new().allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE]);
    match front_url.parse::<HeaderValue>() {
        // list, not exact: only a matching Origin is echoed back
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(e) => {
            warn!(front_url, error = %e, "invalid FRONT_URL; no cross-origin requests allowed");
            cors
        }
    }
}
