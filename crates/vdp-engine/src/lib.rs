//! Protocol engine composing the frame codec, streaming parser, and
//! transaction table over a pluggable transport.

pub mod engine;
pub mod error;
pub mod transport;

pub use engine::ProtocolEngine;
pub use error::{EngineError, Result};
pub use transport::{LoopbackTransport, Transport};
