//! `tokio_util::codec` adapter wrapping [`StreamParser`] and [`Frame`]
//! serialization so the protocol can be driven inside a
//! `Framed<Stream, VdpCodec>` for any `AsyncRead + AsyncWrite` transport.

use std::collections::VecDeque;
use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use vdp_core::EngineConfig;

use crate::frame::Frame;
use crate::outcome::ParseOutcome;
use crate::stream_parser::StreamParser;

/// Decodes a byte stream into [`ParseOutcome`]s and encodes [`Frame`]s back
/// to bytes.
///
/// `decode` feeds everything tokio_util hands it to the inner
/// [`StreamParser`], clears tokio_util's own buffer (the parser owns the
/// authoritative copy from here on), and returns outcomes one at a time
/// from an internal queue — mirroring how the parser itself drains
/// multiple outcomes per `extract` call.
pub struct VdpCodec {
    parser: StreamParser,
    queued: VecDeque<ParseOutcome>,
}

impl VdpCodec {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        VdpCodec {
            parser: StreamParser::with_config(config),
            queued: VecDeque::new(),
        }
    }
}

impl Default for VdpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for VdpCodec {
    type Item = ParseOutcome;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            self.parser
                .feed(&src[..])
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e.to_string()))?;
            src.clear();
            self.queued.extend(self.parser.extract());
        }
        Ok(self.queued.pop_front())
    }
}

impl Encoder<Frame> for VdpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let wire = item
            .serialize()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        dst.extend_from_slice(&wire);
        Ok(())
    }
}
