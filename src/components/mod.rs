pub mod app;
pub mod thumbnail_grid;
pub mod viewer;
