pub mod images;
pub mod items;
