use super::{
    error::Result,
    frame::{PacketDecode, PacketEncode},
    io::{
        read_i64_be, read_string, read_string_bounded, read_u16_be, write_i64_be, write_string,
        write_string_bounded, write_u16_be,
    },
    state::HandshakeNextState,
    varint::{read_varint, write_varint},
};

const SERVER_ADDRESS_MAX_CHARS: usize = 255;
const USERNAME_MAX_CHARS: usize = 16;

/// Handshake (C2S) packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeC2s {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: HandshakeNextState,
}

/// Status request (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequestC2s;

/// Status ping (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPingC2s {
    pub payload: i64,
}

/// Status response (S2C) packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponseS2c {
    pub json: String,
}

/// Status pong (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPongS2c {
    pub payload: i64,
}

/// Login start (C2S) packet.
///
/// Only the name is decoded; the version-dependent remainder (signature
/// data, profile id) is kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStartC2s {
    pub username: String,
    pub rest: Vec<u8>,
}

/// Login disconnect (S2C) packet. `reason` is a JSON text component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginDisconnectS2c {
    pub reason: String,
}

impl PacketDecode for HandshakeC2s {
    const ID: i32 = 0x00;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        let protocol_version = read_varint(input)?;
        let server_address = read_string_bounded(input, SERVER_ADDRESS_MAX_CHARS)?.to_owned();
        let server_port = read_u16_be(input)?;
        let next_state = HandshakeNextState::try_from(read_varint(input)?)?;

        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}

impl PacketEncode for HandshakeC2s {
    const ID: i32 = 0x00;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_varint(out, self.protocol_version);
        write_string_bounded(out, &self.server_address, SERVER_ADDRESS_MAX_CHARS)?;
        write_u16_be(out, self.server_port);
        write_varint(out, self.next_state.to_raw());
        Ok(())
    }
}

impl PacketDecode for StatusRequestC2s {
    const ID: i32 = 0x00;

    fn decode_body(_input: &mut &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

impl PacketEncode for StatusRequestC2s {
    const ID: i32 = 0x00;

    fn encode_body(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

impl PacketDecode for StatusPingC2s {
    const ID: i32 = 0x01;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            payload: read_i64_be(input)?,
        })
    }
}

impl PacketEncode for StatusPingC2s {
    const ID: i32 = 0x01;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_i64_be(out, self.payload);
        Ok(())
    }
}

impl PacketDecode for StatusResponseS2c {
    const ID: i32 = 0x00;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            json: read_string(input)?.to_owned(),
        })
    }
}

impl PacketEncode for StatusResponseS2c {
    const ID: i32 = 0x00;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string(out, &self.json)
    }
}

impl PacketDecode for StatusPongS2c {
    const ID: i32 = 0x01;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            payload: read_i64_be(input)?,
        })
    }
}

impl PacketEncode for StatusPongS2c {
    const ID: i32 = 0x01;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_i64_be(out, self.payload);
        Ok(())
    }
}

impl PacketDecode for LoginStartC2s {
    const ID: i32 = 0x00;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        let username = read_string_bounded(input, USERNAME_MAX_CHARS)?.to_owned();
        let rest = std::mem::take(input).to_vec();
        Ok(Self { username, rest })
    }
}

impl PacketEncode for LoginStartC2s {
    const ID: i32 = 0x00;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string_bounded(out, &self.username, USERNAME_MAX_CHARS)?;
        out.extend_from_slice(&self.rest);
        Ok(())
    }
}

impl PacketDecode for LoginDisconnectS2c {
    const ID: i32 = 0x00;

    fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            reason: read_string(input)?.to_owned(),
        })
    }
}

impl PacketEncode for LoginDisconnectS2c {
    const ID: i32 = 0x00;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string(out, &self.reason)
    }
}
