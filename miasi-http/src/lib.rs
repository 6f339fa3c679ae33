//! MIASI HTTP API Server
//!
//! Exposes the systems of a MIASI catalog and their form submission endpoint
//! over HTTP.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{AppState, ServerConfig, start_server};
