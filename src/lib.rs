pub mod analysis;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod repositories;
pub mod routes;
pub mod scrapes;
pub mod telemetry;
