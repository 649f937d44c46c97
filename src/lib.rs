pub mod app;
pub mod auth;
pub mod brands;
pub mod categories;
pub mod config;
pub mod error;
pub mod products;
pub mod state;
pub mod uploads;
