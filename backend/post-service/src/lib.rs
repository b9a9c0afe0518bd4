//! Post Service Library
//!
//! Serves the `posts` resource for the Nova blog: the REST surface, a chunked
//! scan over the whole table and the per-user reading time report.
//!
//! # Modules
//!
//! - `handlers`: HTTP request handlers and route registration
//! - `models`: Post rows, request bodies and report shapes
//! - `services`: Business logic layer
//! - `db`: Database access layer (queries, chunked scan, aggregation)
//! - `error`: Error types and handling
//! - `config`: Configuration management
//! - `health`: Health, readiness and liveness probes
//! - `metrics`: Prometheus collectors and the `/metrics` handler
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
