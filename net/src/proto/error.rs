use super::state::PacketState;

/// Protocol decode/encode error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    #[error("truncated input")]
    Truncated,
    #[error("varint longer than 5 bytes")]
    VarIntTooLong,
    #[error("frame length {len} outside 1..={max}")]
    FrameTooLarge { len: i64, max: usize },
    #[error("negative length {0}")]
    NegativeLength(i32),
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    #[error("string too long ({actual} > {max})")]
    StringTooLong { max: usize, actual: usize },
    #[error("{0} trailing bytes after packet body")]
    TrailingBytes(usize),
    #[error("invalid next state {0}")]
    InvalidState(i32),
    #[error("unknown packet {id:#04x} in state {state:?}")]
    UnknownPacket { state: PacketState, id: i32 },
}

impl ProtoError {
    /// Whether the connection may keep reading after this error.
    ///
    /// Only an unknown packet outside the handshake is skipped; everything
    /// else leaves the stream misaligned or breaks the state contract.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtoError::UnknownPacket { state, .. } if *state != PacketState::Handshaking
        )
    }
}

pub type Result<T> = std::result::Result<T, ProtoError>;

pub(crate) fn debug_log_error(context: &str, error: &ProtoError) {
    log::debug!("{}: {}", context, error);
}
