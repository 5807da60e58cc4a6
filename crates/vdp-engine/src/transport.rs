//! The transport boundary: a narrow trait the engine drives, plus an
//! in-memory loopback implementation for tests and benches.
//!
//! Real hardware adapters (serial, CAN, Bluetooth) are out of scope for
//! this workspace; they are consumers of this trait, not things it
//! defines. Native `async fn` in the trait needs no `async_trait` macro
//! under the 2024 edition, at the cost of the trait not being
//! dyn-compatible — callers hold a concrete or generic `T: Transport`
//! rather than a `Box<dyn Transport>`.
#![allow(async_fn_in_trait)]

use tokio::sync::{mpsc, Mutex};
use vdp_core::error::{Error, Result};

/// Moves raw bytes between the engine and a peer. Implementations must be
/// safe to call from multiple tasks: `send` and `recv` may be invoked
/// concurrently with each other (though typically not with themselves).
pub trait Transport: Send + Sync {
    async fn send(&self, bytes: &[u8]) -> Result<()>;

    /// Blocks until at least one chunk of bytes is available.
    async fn recv(&self) -> Result<Vec<u8>>;

    fn is_connected(&self) -> bool;
}

/// An in-memory, paired duplex transport. `LoopbackTransport::pair()`
/// returns two ends that exchange bytes with each other, letting tests and
/// benches drive a full engine-to-engine exchange without real hardware.
pub struct LoopbackTransport {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl LoopbackTransport {
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::unbounded_channel();
        let (tx_b, rx_a) = mpsc::unbounded_channel();
        (
            LoopbackTransport {
                outbound: tx_a,
                inbound: Mutex::new(rx_a),
            },
            LoopbackTransport {
                outbound: tx_b,
                inbound: Mutex::new(rx_b),
            },
        )
    }
}

impl Transport for LoopbackTransport {
    async fn send(&self, bytes: &[u8]) -> Result<()> {
        self.outbound.send(bytes.to_vec()).map_err(|_| Error::TransportClosed)
    }

    async fn recv(&self) -> Result<Vec<u8>> {
        self.inbound.lock().await.recv().await.ok_or(Error::TransportClosed)
    }

    fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}
