pub mod config;
pub mod error;
pub mod state;
pub mod middleware;
pub mod routes;
pub mod handlers;
pub mod docs;
pub mod app;
