//! HTTP backend for the sales-rep app: product catalog, client list and login.

pub mod app;
pub mod repository;
pub mod settings;
