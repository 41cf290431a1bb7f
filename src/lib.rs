pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod format;
pub mod handlers;
pub mod pagination;
pub mod poll;
pub mod service;
pub mod store;
pub mod ui;
