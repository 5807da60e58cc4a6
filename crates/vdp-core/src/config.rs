use std::time::Duration;

use crate::constants::{DEFAULT_MAX_BUFFER_FRAMES, DEFAULT_MAX_PENDING, DEFAULT_REQUEST_TIMEOUT, MAX_FRAME_LEN};
use crate::error::{Error, Result};

/// Tunables shared by the streaming parser and the protocol engine.
///
/// Validated at construction time via the builder-style setters; every
/// setter returns `Result` so an invalid value is rejected where it is
/// set rather than discovered later as a silent misbehavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    max_buffer_bytes: usize,
    max_pending: usize,
    default_timeout: Duration,
}

impl EngineConfig {
    pub fn max_buffer_bytes(&self) -> usize {
        self.max_buffer_bytes
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Cap the parser's internal buffer. Must be at least one maximum-sized
    /// frame, otherwise a single oversized frame could never be fully
    /// buffered.
    pub fn with_max_buffer_bytes(mut self, bytes: usize) -> Result<Self> {
        if bytes < MAX_FRAME_LEN as usize {
            return Err(Error::BufferOverflow(bytes));
        }
        self.max_buffer_bytes = bytes;
        Ok(self)
    }

    /// Cap simultaneously outstanding transactions. Must fit in the 256-slot
    /// sequence space.
    pub fn with_max_pending(mut self, max_pending: usize) -> Result<Self> {
        if max_pending == 0 || max_pending > 256 {
            return Err(Error::TableFull);
        }
        self.max_pending = max_pending;
        Ok(self)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_buffer_bytes: DEFAULT_MAX_BUFFER_FRAMES * MAX_FRAME_LEN as usize,
            max_pending: DEFAULT_MAX_PENDING,
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
