//! JSON HTTP API for the browser front end

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{create_router, start_server};
