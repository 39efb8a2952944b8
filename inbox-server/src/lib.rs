//! # inbox-server
//!
//! HTTP surface of the unified inbox (axum): sending and scheduling, the sweep trigger, the
//! provider webhook, threads, notes with presence, users and analytics.
//!
//! - [`ServerConfig`] – environment configuration
//! - [`AppState`] / [`router`] – services and routes, usable without a listener in tests
//! - [`run_server`] – wires everything and serves

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod server;
pub mod state;


pub use config::{database_url_from_env, ServerConfig, DEFAULT_DATABASE_URL};
pub use error::ApiError;
pub use identity::{CurrentUser, USER_ID_HEADER};
pub use routes::router;
pub use server::{connect, run_server};
pub use state::AppState;
