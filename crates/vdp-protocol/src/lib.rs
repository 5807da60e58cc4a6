//! Frame codec, streaming parser, transaction table, and tokio codec
//! adapter for the Vehicle Diagnostic Protocol.

pub mod builder;
pub mod frame;
pub mod outcome;
pub mod stream_parser;
pub mod tokio_codec;
pub mod transaction;

pub use builder::FrameBuilder;
pub use frame::Frame;
pub use outcome::ParseOutcome;
pub use stream_parser::StreamParser;
pub use tokio_codec::VdpCodec;
pub use transaction::{Handler, TransactionTable};
