//! Protocol engine (component D): composes the frame codec, streaming
//! parser, and transaction table over a [`Transport`], classifying inbound
//! frames and exposing blocking and non-blocking outbound APIs.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use vdp_core::types::{CommandCode, EcuId, ResponseStatus, SeqNo};
use vdp_core::EngineConfig;
use vdp_protocol::{Frame, Handler, ParseOutcome, StreamParser, TransactionTable};

use crate::error::Result;
use crate::transport::Transport;

/// Drives a [`Transport`] through the frame codec, streaming parser, and
/// transaction table.
///
/// The streaming parser's buffer lock and the transaction table's lock are
/// never held at the same time here: `intake` computes outcomes under the
/// parser lock, drops it, then routes each outcome through the table. This
/// trivially satisfies the "buffer lock before table lock" ordering
/// requirement by never nesting them at all.
pub struct ProtocolEngine<T: Transport> {
    parser: parking_lot::Mutex<StreamParser>,
    table: Arc<TransactionTable>,
    transport: Arc<T>,
}

impl<T: Transport> ProtocolEngine<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        ProtocolEngine {
            parser: parking_lot::Mutex::new(StreamParser::with_config(config)),
            table: Arc::new(TransactionTable::new(config.max_pending())),
            transport: Arc::new(transport),
        }
    }

    /// Non-blocking send: register the pending entry, serialize, hand the
    /// bytes to the transport. `handler` fires exactly once, from either
    /// the intake path (response/NAK) or a timeout sweep.
    pub async fn send(&self, frame: Frame, handler: Handler, timeout: Duration) -> Result<SeqNo> {
        let wire = frame.serialize()?;
        let seq = self.table.register(frame, handler, timeout)?;
        if let Err(e) = self.transport.send(&wire).await {
            self.table.cancel(seq);
            return Err(e.into());
        }
        Ok(seq)
    }

    /// Blocking-from-the-caller's-perspective send: suspends until the
    /// response, NAK, or timeout fires. Built on a `oneshot` channel rather
    /// than an OS condition variable, since this engine is driven entirely
    /// through async tasks rather than free-standing threads; the
    /// suspension semantics (exactly one wakeup, timeout cancels the
    /// pending entry before returning) match the synchronous design this
    /// is adapted from.
    pub async fn send_and_wait(&self, frame: Frame, timeout: Duration) -> Result<ParseOutcome> {
        let (tx, rx) = oneshot::channel();
        let handler: Handler = Box::new(move |outcome| {
            let _ = tx.send(outcome);
        });
        let seq = self.send(frame, handler, timeout).await?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Ok(ParseOutcome::Timeout),
            Err(_) => {
                self.table.cancel(seq);
                Ok(ParseOutcome::Timeout)
            }
        }
    }

    /// Feed one chunk of inbound bytes through the parser and classify
    /// every outcome it yields. Sweeps expired transactions first, since
    /// the table sweep is specified to run at the start of every
    /// extraction pass.
    pub async fn intake(&self, bytes: &[u8]) -> Result<()> {
        self.table.check_timeouts();

        let outcomes = {
            let mut parser = self.parser.lock();
            parser.feed(bytes)?;
            parser.extract()
        };

        for outcome in outcomes {
            self.classify(outcome).await;
        }
        Ok(())
    }

    /// Pull bytes from the transport and intake them, forever. Intended to
    /// run as a background task; returns only when the transport reports
    /// disconnection.
    pub async fn run(&self) -> Result<()> {
        loop {
            let bytes = self.transport.recv().await?;
            self.intake(&bytes).await?;
        }
    }

    pub fn sweep_timeouts(&self) -> usize {
        self.table.check_timeouts()
    }

    pub fn live_transaction_count(&self) -> usize {
        self.table.live_count()
    }

    async fn classify(&self, outcome: ParseOutcome) {
        match outcome {
            ParseOutcome::Success { frame, raw_bytes } => self.classify_frame(frame, raw_bytes).await,
            ParseOutcome::Invalid { reason, .. } => {
                debug!(%reason, "dropping invalid fragment");
            }
            ParseOutcome::Incomplete { .. } => {}
            ParseOutcome::Timeout | ParseOutcome::Nack { .. } => {
                unreachable!("the streaming parser never emits Timeout or Nack directly")
            }
        }
    }

    /// `raw_bytes` is the frame's actual wire bytes, as produced by the
    /// parser's `Success` outcome; it is threaded through to whichever
    /// transaction-table routing call ends up constructing the outcome a
    /// registered handler sees, so that outcome's `raw_bytes` is never
    /// silently substituted with the frame's payload.
    async fn classify_frame(&self, frame: Frame, raw_bytes: Bytes) {
        if frame.command.is_control() {
            if let Err(e) = self.table.route_control(&frame, raw_bytes) {
                warn!(%e, "malformed control frame");
            }
            return;
        }

        if frame.ecu_id.is_response() {
            if let Some(&status_byte) = frame.data.first() {
                if ResponseStatus::from_u8(status_byte) == ResponseStatus::InvalidStatus {
                    self.emit_nak(frame.ecu_id.strip_response(), ResponseStatus::InvalidStatus).await;
                    return;
                }
            }
        }

        self.table.route_response(&frame, raw_bytes);
    }

    /// Emit a peer-visible NAK. The wire format carries no way to echo
    /// back a request-side sequence number in a data frame, so this NAK
    /// carries only the status byte — a direct consequence of the
    /// `(ecu_id, command)`-only matching limitation already noted for
    /// response routing.
    async fn emit_nak(&self, target: EcuId, status: ResponseStatus) {
        let nak = Frame::new(target.as_response(), CommandCode::NegativeAck, vec![status.to_u8()]);
        match nak.serialize() {
            Ok(wire) => {
                if let Err(e) = self.transport.send(&wire).await {
                    warn!(%e, "failed to send NAK");
                }
            }
            Err(e) => warn!(%e, "failed to serialize NAK"),
        }
    }
}
