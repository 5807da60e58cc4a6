//! Shared types, errors, constants, and configuration for the Vehicle
//! Diagnostic Protocol workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use types::{CommandCode, EcuId, ResponseStatus, SeqNo};
