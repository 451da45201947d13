//! Terminal client for the agricultural consultancy platform.
//!
//! - `store`: observable single-value stores every cached entity lives in
//! - `api`: REST client with the global unauthorized side effect
//! - `services`: per-entity façades over cached resources
//! - `ui` and `app`: the ratatui front end driven by the router

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod domain;
pub mod event;
pub mod logging;
pub mod notify;
pub mod router;
pub mod services;
pub mod session;
pub mod store;
pub mod ui;
