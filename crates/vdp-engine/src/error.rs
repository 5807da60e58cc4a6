//! Errors that can occur while driving a [`crate::ProtocolEngine`].
//!
//! Mirrors `turnkey-network`'s `TcpClientError`: a thin per-crate enum that
//! wraps the lower layer's error type with `#[from]` rather than leaking
//! `vdp_core::Error` directly through the engine's public API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A codec- or transaction-layer failure from `vdp-core`/`vdp-protocol`
    /// (bad payload length, table full, buffer overflow, ...).
    #[error("codec error: {0}")]
    Codec(#[from] vdp_core::error::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
