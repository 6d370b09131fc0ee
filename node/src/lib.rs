//! Election service: the outer surface over the vote ledger.
//!
//! The service is the central coordinator that:
//! - Registers voters and authenticates them by challenge-response
//! - Turns a login token and a menu position into a sealed vote block
//! - Exposes the tally, the chain and, to the administrator, every vote
//! - Loads its configuration from TOML and initialises structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod tracing_spans;

pub use config::ElectionConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use service::{AdminSession, ElectionService};
