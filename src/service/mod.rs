pub mod content_hasher;
pub mod image_resolver;
pub mod items;

pub use image_resolver::{ImageResolver, ResolvedImage, ServedImage};
pub use items::{ImageSource, ItemReceipt, ItemService, NewItem};
