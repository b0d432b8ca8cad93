use std::fmt;

use super::error::ProtoError;

/// Protocol state used to select packet IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketState {
    Handshaking,
    Status,
    Login,
    Play,
}

impl PacketState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handshaking => "handshaking",
            Self::Status => "status",
            Self::Login => "login",
            Self::Play => "play",
        }
    }
}

impl fmt::Display for PacketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next state value in the handshake packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeNextState {
    Status,
    Login,
}

impl HandshakeNextState {
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Status => 1,
            Self::Login => 2,
        }
    }
}

impl TryFrom<i32> for HandshakeNextState {
    type Error = ProtoError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            other => Err(ProtoError::InvalidState(other)),
        }
    }
}

impl From<HandshakeNextState> for PacketState {
    fn from(value: HandshakeNextState) -> Self {
        match value {
            HandshakeNextState::Status => PacketState::Status,
            HandshakeNextState::Login => PacketState::Login,
        }
    }
}
