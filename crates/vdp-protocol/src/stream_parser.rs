//! Streaming parser (component B).
//!
//! Owns a single growable byte buffer. `feed` appends; `extract` drains as
//! many [`ParseOutcome`]s as the buffer currently admits, leaving behind
//! whatever tail cannot yet be classified. The parser never blocks and
//! never discards a byte that has not already been accounted for in some
//! outcome.
//!
//! Resynchronization walks the extraction loop byte-by-byte whenever a
//! frame turns out to be malformed: rather than trusting the declared
//! length to skip past a bad frame, each error pops exactly one byte (the
//! suspect start sentinel) and starts over. This is slower per error but
//! is the only way to avoid trusting data that has already been shown to
//! be wrong.

use bytes::BytesMut;
use tracing::{debug, trace, warn};
use vdp_core::constants::{END_BYTE, MAX_FRAME_LEN, MIN_FRAME_LEN, START_BYTE};
use vdp_core::error::Error;
use vdp_core::EngineConfig;

use crate::frame::verify;
use crate::outcome::ParseOutcome;

/// Incremental, resynchronizing parser for the VDP wire format.
#[derive(Debug)]
pub struct StreamParser {
    buffer: BytesMut,
    /// Set once the parser has emitted at least one `Success` outcome in
    /// its lifetime. Governs whether pre-frame garbage is reported or
    /// silently discarded (§ startup-vs-mid-session garbage rule).
    produced_any_frame: bool,
    max_buffer_bytes: usize,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        StreamParser {
            buffer: BytesMut::with_capacity(1024),
            produced_any_frame: false,
            max_buffer_bytes: config.max_buffer_bytes(),
        }
    }

    /// Append bytes to the internal buffer. Does not parse.
    ///
    /// Returns `Err(Error::BufferOverflow)` if the buffer would exceed its
    /// configured cap, so a caller facing a stream that never yields a
    /// classifiable frame can back off instead of growing memory without
    /// bound.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.buffer.len() + bytes.len() > self.max_buffer_bytes {
            warn!(
                buffered = self.buffer.len(),
                incoming = bytes.len(),
                cap = self.max_buffer_bytes,
                "parser buffer would exceed configured cap"
            );
            return Err(Error::BufferOverflow(self.max_buffer_bytes));
        }
        self.buffer.extend_from_slice(bytes);
        trace!(buffered = self.buffer.len(), "fed bytes to stream parser");
        Ok(())
    }

    /// Drain every outcome the current buffer admits.
    pub fn extract(&mut self) -> Vec<ParseOutcome> {
        let mut out = Vec::new();
        while let Some(outcome) = self.step() {
            if outcome.is_success() {
                self.produced_any_frame = true;
            }
            out.push(outcome);
        }
        if let Some(incomplete) = self.trailing_incomplete() {
            out.push(incomplete);
        }
        out
    }

    /// Clear the buffer and resync state. Does not affect sequence
    /// counters or pending transactions — those live in the transaction
    /// table, not here.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.produced_any_frame = false;
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// One step of the extraction loop: at most one outcome, or `None` if
    /// no further progress is possible without more bytes.
    ///
    /// Resync happens inline here rather than as a separate pass: when the
    /// parser has not yet produced a frame this session, leading garbage is
    /// dropped silently and the same call falls through to try the header
    /// that now sits at the front of the buffer, so a single `extract`
    /// still reports a `Success` for a well-formed frame following startup
    /// noise. Once a frame has been produced, garbage instead becomes an
    /// `Invalid{GarbageBeforeStart}` outcome on its own, and the next call
    /// to `step` picks up the now-aligned buffer.
    fn step(&mut self) -> Option<ParseOutcome> {
        match self.buffer.iter().position(|&b| b == START_BYTE) {
            Some(0) => {}
            Some(pos) => {
                let garbage = self.buffer.split_to(pos).freeze();
                if self.produced_any_frame {
                    warn!(len = garbage.len(), "discarding garbage mid-session");
                    return Some(ParseOutcome::Invalid {
                        reason: Error::GarbageBeforeStart(garbage.len()),
                        offending_bytes: garbage,
                    });
                }
                trace!(len = garbage.len(), "discarding startup garbage");
            }
            None => {
                if self.buffer.is_empty() {
                    return None;
                }
                let garbage = self.buffer.split_to(self.buffer.len()).freeze();
                if self.produced_any_frame {
                    warn!(len = garbage.len(), "discarding garbage mid-session");
                    return Some(ParseOutcome::Invalid {
                        reason: Error::GarbageBeforeStart(garbage.len()),
                        offending_bytes: garbage,
                    });
                }
                trace!(len = garbage.len(), "discarding startup garbage");
                return None;
            }
        }

        // Header wait: need START + LEN before anything can be judged.
        if self.buffer.len() < 2 {
            return None;
        }

        let declared_len = self.buffer[1];
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&declared_len) {
            let bad = self.buffer.split_to(1).freeze();
            debug!(declared_len, "bad length, popping one byte to resync");
            return Some(ParseOutcome::Invalid {
                reason: Error::BadLength(declared_len),
                offending_bytes: bad,
            });
        }
        let l = declared_len as usize;

        // Body wait: the trailing Incomplete (if any) is computed once,
        // after the loop, not here.
        if self.buffer.len() < l {
            return None;
        }

        if self.buffer[l - 1] != END_BYTE {
            let bad = self.buffer.split_to(1).freeze();
            debug!("bad end sentinel, popping one byte to resync");
            return Some(ParseOutcome::Invalid {
                reason: Error::BadEnd,
                offending_bytes: bad,
            });
        }

        match verify(&self.buffer[..l]) {
            Ok(frame) => {
                let raw_bytes = self.buffer.split_to(l).freeze();
                debug!(ecu = %frame.ecu_id, command = ?frame.command, "accepted frame");
                Some(ParseOutcome::Success { frame, raw_bytes })
            }
            Err(Error::BadChecksum { computed, carried }) => {
                let bad = self.buffer.split_to(1).freeze();
                debug!(computed, carried, "bad checksum, popping one byte to resync");
                Some(ParseOutcome::Invalid {
                    reason: Error::BadChecksum { computed, carried },
                    offending_bytes: bad,
                })
            }
            Err(other) => unreachable!("verify() precondition already checked length/end: {other:?}"),
        }
    }

    fn trailing_incomplete(&self) -> Option<ParseOutcome> {
        if self.buffer.len() < 2 || self.buffer[0] != START_BYTE {
            return None;
        }
        let declared_len = self.buffer[1];
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&declared_len) {
            return None;
        }
        let l = declared_len as usize;
        if self.buffer.len() < l {
            Some(ParseOutcome::Incomplete {
                missing_bytes_hint: l - self.buffer.len(),
            })
        } else {
            None
        }
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdp_core::types::{CommandCode, EcuId};

    const S1: [u8; 6] = [0x7E, 0x06, 0x81, 0x10, 0x97, 0x7F];
    const S2: [u8; 9] = [0x7E, 0x09, 0x82, 0x20, 0x12, 0x34, 0x56, 0xA6, 0x7F];

    #[test]
    fn s1_round_trip_single_frame() {
        let mut parser = StreamParser::new();
        parser.feed(&S1).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        match &out[0] {
            ParseOutcome::Success { frame, .. } => {
                assert_eq!(frame.ecu_id, EcuId::new(0x81));
                assert_eq!(frame.command, CommandCode::ReadData);
                assert!(frame.data.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn s2_round_trip_with_payload() {
        let mut parser = StreamParser::new();
        parser.feed(&S2).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_success());
    }

    #[test]
    fn s3_startup_garbage_is_silently_discarded() {
        let mut parser = StreamParser::new();
        let mut stream = vec![0xDE, 0xAD, 0xBE, 0xEF];
        stream.extend_from_slice(&S1);
        parser.feed(&stream).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_success());
    }

    #[test]
    fn s4_bad_end_sentinel() {
        let mut wire = S1;
        wire[5] = 0x7D;
        let mut parser = StreamParser::new();
        parser.feed(&wire).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], ParseOutcome::Invalid { reason: Error::BadEnd, .. }));
    }

    #[test]
    fn s5_bad_checksum() {
        let mut wire = S1;
        wire[4] ^= 0xFF;
        let mut parser = StreamParser::new();
        parser.feed(&wire).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], ParseOutcome::Invalid { reason: Error::BadChecksum { .. }, .. }));
    }

    #[test]
    fn s6_bad_length_then_recovers() {
        let mut parser = StreamParser::new();
        let mut stream = vec![0x7E, 0x03, 0x01, 0x02, 0x03, 0x7F];
        stream.extend_from_slice(&S1);
        parser.feed(&stream).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], ParseOutcome::Invalid { reason: Error::BadLength(3), .. }));
        assert!(out[1].is_success());
    }

    #[test]
    fn s7_byte_at_a_time() {
        let mut parser = StreamParser::new();
        for (i, &b) in S1.iter().enumerate() {
            parser.feed(&[b]).unwrap();
            let out = parser.extract();
            if i < S1.len() - 1 {
                assert!(out.is_empty(), "expected no outcome at byte {i}");
            } else {
                assert_eq!(out.len(), 1);
                assert!(out[0].is_success());
            }
        }
    }

    #[test]
    fn s8_two_frames_in_one_feed() {
        let mut parser = StreamParser::new();
        let mut stream = S1.to_vec();
        stream.extend_from_slice(&S2);
        parser.feed(&stream).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 2);
        assert!(out[0].is_success());
        assert!(out[1].is_success());
    }

    #[test]
    fn idempotent_extract_with_no_intervening_feed() {
        let mut parser = StreamParser::new();
        parser.feed(&S1).unwrap();
        let first = parser.extract();
        assert_eq!(first.len(), 1);
        let second = parser.extract();
        assert!(second.is_empty());
    }

    #[test]
    fn mid_session_garbage_is_reported() {
        let mut parser = StreamParser::new();
        parser.feed(&S1).unwrap();
        parser.extract();
        parser.feed(&[0xAA, 0xBB]).unwrap();
        parser.feed(&S2).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], ParseOutcome::Invalid { reason: Error::GarbageBeforeStart(2), .. }));
        assert!(out[1].is_success());
    }

    #[test]
    fn incomplete_frame_waits_for_more_bytes() {
        let mut parser = StreamParser::new();
        parser.feed(&S1[..3]).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], ParseOutcome::Incomplete { missing_bytes_hint: 3 }));
        parser.feed(&S1[3..]).unwrap();
        let out = parser.extract();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_success());
    }

    #[test]
    fn reset_clears_buffer_and_resync_state() {
        let mut parser = StreamParser::new();
        parser.feed(&S1).unwrap();
        parser.extract();
        parser.reset();
        parser.feed(&[0xAA]).unwrap();
        parser.feed(&S2).unwrap();
        let out = parser.extract();
        // resync state was cleared, so leading garbage after reset is silent again.
        assert_eq!(out.len(), 1);
        assert!(out[0].is_success());
    }

    #[test]
    fn feed_rejects_past_configured_cap() {
        let config = EngineConfig::default().with_max_buffer_bytes(253).unwrap();
        let mut parser = StreamParser::with_config(&config);
        let result = parser.feed(&[0u8; 254]);
        assert!(matches!(result, Err(Error::BufferOverflow(_))));
    }
}
