//! SensorHub admin API server.
//!
//! The binary in `main.rs` loads [`config::Config`], initializes logging and
//! serves the router built by [`app::build_app`].

pub mod app;
pub mod config;
pub mod logging;
