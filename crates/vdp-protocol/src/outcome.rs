//! The tagged result type shared by the streaming parser, transaction
//! table, and protocol engine.

use bytes::Bytes;
use vdp_core::error::Error;

use crate::frame::Frame;

/// One classified unit of progress through the byte stream, or a
/// transaction-layer event routed to a registered handler.
///
/// The streaming parser ([`crate::stream_parser::StreamParser`]) only ever
/// constructs [`ParseOutcome::Success`], [`ParseOutcome::Incomplete`], and
/// [`ParseOutcome::Invalid`]. [`ParseOutcome::Timeout`] and
/// [`ParseOutcome::Nack`] are constructed exclusively by the transaction
/// table when it invokes a registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete, validated frame plus the exact wire bytes it came from.
    Success { frame: Frame, raw_bytes: Bytes },
    /// The buffer holds a plausible prefix; more bytes are needed.
    Incomplete { missing_bytes_hint: usize },
    /// A specific, enumerated defect.
    Invalid { reason: Error, offending_bytes: Bytes },
    /// A previously registered request expired before a response arrived.
    Timeout,
    /// The peer answered with an explicit NAK.
    Nack { reason: vdp_core::types::ResponseStatus },
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ParseOutcome::Invalid { .. })
    }
}
