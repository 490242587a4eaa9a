//! # jornal — Harvest Labor Marketplace Backend
//!
//! A seedable generator of synthetic tomato and strawberry harvest jobs for
//! Baja California, and the HTTP job board built on top of it.
//!
//! - [`simulator`] — crop sampling and arrival schedules
//! - [`formatter`] — samples to dated job postings
//! - [`store`], [`db`] — job and contract persistence (memory or PostgreSQL)
//! - [`stats`] — admin dashboard aggregates
//! - [`dashboard`] — Axum router and server
//! - [`config`], [`prom_metrics`], [`export`] — ambient plumbing

pub mod config;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod formatter;
pub mod prom_metrics;
pub mod simulator;
pub mod stats;
pub mod store;

pub use simulator::{generate, generate_with, JobSample, SimulationError, SimulationParams};
