pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use config::Config;
pub use error::ListingError;
pub use router::{ListingState, listing_router};
