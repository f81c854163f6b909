//! HTTP API: server, routing, and request/response mapping for the catalog.

pub mod app;
pub mod config;
pub mod middleware;
