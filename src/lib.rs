pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;
pub mod workflow;
