use thiserror::Error;

/// Codec- and transaction-layer error kinds.
///
/// Most variants here describe conditions the parser recovers from locally
/// (they surface as `ParseOutcome::Invalid`, never as a `Result::Err`); the
/// two that *do* escape as `Err` to an immediate caller are [`Error::TableFull`]
/// and [`Error::BufferOverflow`], since those indicate the caller must act
/// rather than something the parser can paper over on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("declared frame length {0} outside valid range [6, 253]")]
    BadLength(u8),

    #[error("frame missing end sentinel (0x7F) at declared length boundary")]
    BadEnd,

    #[error("checksum mismatch: computed 0x{computed:02X}, frame carried 0x{carried:02X}")]
    BadChecksum { computed: u8, carried: u8 },

    #[error("discarded {0} byte(s) of garbage while resynchronizing mid-session")]
    GarbageBeforeStart(usize),

    #[error("buffer exhausted before frame could be completed")]
    Truncated,

    #[error("payload length {0} exceeds maximum of 247 bytes")]
    PayloadTooLarge(usize),

    #[error("transaction table full: all 256 sequence numbers are live")]
    TableFull,

    #[error("parser buffer exceeded configured cap of {0} bytes")]
    BufferOverflow(usize),

    #[error("control frame missing sequence byte in data[0]")]
    MalformedControlFrame,

    #[error("frame builder missing required field: {0}")]
    MissingField(&'static str),

    #[error("transport channel closed")]
    TransportClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
