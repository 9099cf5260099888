pub mod app;
pub mod config;
pub mod effects;
pub mod persistence;
pub mod ui;
pub mod viewport;
