//! rift-watch library crate.
//!
//! Polls the Riot API for tracked players and turns what changed since the
//! previous poll into domain events.

pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod scheduler;
pub mod store;

pub use error::{Error, Result};
