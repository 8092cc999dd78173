pub mod app;
pub mod builders;
pub mod config;
pub mod error;
pub mod format;
pub mod frame;
pub mod loader;
pub mod pages;
pub mod state;
pub mod types;
