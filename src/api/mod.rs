//! Game Session HTTP API
//!
//! JSON endpoints for starting games, placing bets, settling, and verifying
//! fairness proofs. All state lives in the shared `SessionRegistry`.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{create_app, init_tracing, ApiServer};
