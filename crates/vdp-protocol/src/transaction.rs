//! Transaction table (component C): tracks outstanding requests against
//! their responses and timeouts.
//!
//! Response frames carry no sequence number on the wire, so matching is by
//! `(ecu_id with response bit stripped, command)`. Two simultaneously
//! outstanding requests to the same ECU with the same command cannot be
//! told apart; the oldest-deadline entry wins the match (§ tie-break). A
//! future protocol revision embedding sequence numbers in data frames
//! would remove the ambiguity; this workspace does not attempt that.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use vdp_core::error::{Error, Result};
use vdp_core::types::{CommandCode, EcuId, ResponseStatus, SeqNo};

use crate::frame::Frame;
use crate::outcome::ParseOutcome;

/// Called exactly once per pending entry: on a matching response, an
/// ACK/NAK, or a timeout sweep. Owned exclusively by the table entry it is
/// attached to.
pub type Handler = Box<dyn FnOnce(ParseOutcome) + Send>;

struct PendingEntry {
    request_frame: Frame,
    handler: Handler,
    deadline: Instant,
}

/// Maps outstanding request sequence numbers to pending entries, routes
/// responses and control frames to their handlers, and expires entries
/// whose deadline has passed.
///
/// The lock here is acquired *after* the streaming parser's buffer lock
/// whenever both are needed in the same call path (see the protocol
/// engine), to avoid lock-order inversion deadlocks.
pub struct TransactionTable {
    entries: Mutex<HashMap<u8, PendingEntry>>,
    next_seq: std::sync::atomic::AtomicU8,
    max_pending: usize,
}

impl TransactionTable {
    pub fn new(max_pending: usize) -> Self {
        TransactionTable {
            entries: Mutex::new(HashMap::new()),
            next_seq: std::sync::atomic::AtomicU8::new(0),
            max_pending,
        }
    }

    /// Allocate a sequence number, insert a pending entry, and return the
    /// sequence it was filed under.
    pub fn register(&self, request_frame: Frame, handler: Handler, timeout: Duration) -> Result<SeqNo> {
        use std::sync::atomic::Ordering;

        let mut entries = self.entries.lock();
        if entries.len() >= self.max_pending.min(256) {
            warn!(live = entries.len(), "transaction table full");
            return Err(Error::TableFull);
        }

        let start = self.next_seq.load(Ordering::Relaxed);
        let mut candidate = start;
        loop {
            if !entries.contains_key(&candidate) {
                break;
            }
            candidate = candidate.wrapping_add(1);
            if candidate == start {
                warn!("transaction table full: exhausted entire sequence space");
                return Err(Error::TableFull);
            }
        }
        self.next_seq.store(candidate.wrapping_add(1), Ordering::Relaxed);

        let deadline = Instant::now() + timeout;
        entries.insert(
            candidate,
            PendingEntry {
                request_frame,
                handler,
                deadline,
            },
        );
        trace!(seq = candidate, "registered pending transaction");
        Ok(SeqNo(candidate))
    }

    /// Route a non-control response frame to the matching live entry, if
    /// any. `raw_bytes` must be the frame's actual original wire bytes (as
    /// produced by the streaming parser's `Success` outcome), not its
    /// payload — §3 defines `raw_bytes` as the wire image, and a handler
    /// downstream may want to log or re-verify against it. Returns `true`
    /// if a handler was invoked.
    pub fn route_response(&self, response: &Frame, raw_bytes: Bytes) -> bool {
        let requester_ecu = response.ecu_id.strip_response();
        let mut entries = self.entries.lock();

        let matched_seq = entries
            .iter()
            .filter(|(_, entry)| {
                entry.request_frame.command == response.command && entry.request_frame.ecu_id == requester_ecu
            })
            .min_by_key(|(_, entry)| entry.deadline)
            .map(|(seq, _)| *seq);

        match matched_seq {
            Some(seq) => {
                let entry = entries.remove(&seq).expect("just matched");
                drop(entries);
                debug!(seq, ecu = %requester_ecu, "routed response to pending transaction");
                (entry.handler)(ParseOutcome::Success {
                    frame: response.clone(),
                    raw_bytes,
                });
                true
            }
            None => {
                if response.command == CommandCode::KeepAlive {
                    trace!("dropping unsolicited keep-alive");
                } else {
                    debug!(ecu = %response.ecu_id, command = ?response.command, "unsolicited response, no sink registered");
                }
                false
            }
        }
    }

    /// Route an ACK/NAK control frame, which carries its sequence number
    /// in `data[0]` rather than matching by `(ecu_id, command)`. `raw_bytes`
    /// is the control frame's actual wire bytes, carried through the same
    /// way as in [`Self::route_response`].
    pub fn route_control(&self, control: &Frame, raw_bytes: Bytes) -> Result<bool> {
        let seq = *control.data.first().ok_or(Error::MalformedControlFrame)?;
        let mut entries = self.entries.lock();
        let Some(entry) = entries.remove(&seq) else {
            trace!(seq, "control frame refers to unknown or already-completed sequence");
            return Ok(false);
        };
        drop(entries);

        let outcome = if control.command == CommandCode::Acknowledge {
            ParseOutcome::Success {
                frame: control.clone(),
                raw_bytes,
            }
        } else {
            let reason_byte = control.data.get(1).copied().unwrap_or(ResponseStatus::GeneralError.to_u8());
            ParseOutcome::Nack {
                reason: ResponseStatus::from_u8(reason_byte),
            }
        };
        debug!(seq, command = ?control.command, "routed control frame to pending transaction");
        (entry.handler)(outcome);
        Ok(true)
    }

    /// Invoke every entry whose deadline has elapsed with `Timeout`, and
    /// remove it. Invoked at the start of every `extract` and, optionally,
    /// on an engine-driven timer tick.
    pub fn check_timeouts(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<u8> = {
            let entries = self.entries.lock();
            entries
                .iter()
                .filter(|(_, entry)| entry.deadline <= now)
                .map(|(seq, _)| *seq)
                .collect()
        };

        for seq in &expired {
            let entry = {
                let mut entries = self.entries.lock();
                entries.remove(seq)
            };
            if let Some(entry) = entry {
                warn!(seq, "transaction timed out");
                (entry.handler)(ParseOutcome::Timeout);
            }
        }
        expired.len()
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Cancel a specific pending entry without invoking its handler.
    /// Used by `send_and_wait` when the wait is interrupted before either
    /// a response or a timeout fires.
    pub fn cancel(&self, seq: SeqNo) {
        self.entries.lock().remove(&seq.0);
    }
}
