use net::ProtoError;

/// Why a connection's processing unit stopped.
#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("Read timeout")]
    Timeout(#[from] tokio::time::error::Elapsed),
    #[error("Networking error - {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol violation - {0}")]
    Protocol(#[from] ProtoError),
    #[error("Could not build status - {0}")]
    Status(#[from] serde_json::Error),
}

impl ConnectionError {
    /// Whether the session may keep processing after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Protocol(err) => err.is_recoverable(),
            _ => false,
        }
    }

    /// Errors caused by the peer sending bytes we refuse to interpret.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AcceptError {
    #[error("Connection limit of {0} reached")]
    LimitReached(usize),
}
