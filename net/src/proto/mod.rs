//! Minimal Minecraft protocol framing for handshake, status, and login start.

mod error;
mod frame;
mod io;
mod packets;
mod state;
mod varint;

#[cfg(test)]
mod tests;

pub use error::{ProtoError, Result};
pub use frame::{
    decode_exact, encode_packet, encode_raw_packet, PacketDecode, PacketDecoder, PacketEncode,
    PacketEncoder, PacketFrame, MAX_PACKET_SIZE,
};
pub use io::{
    read_i64_be, read_string, read_string_bounded, read_u16_be, take, write_i64_be, write_string,
    write_string_bounded, write_u16_be, MAX_STRING_CHARS,
};
pub use packets::{
    HandshakeC2s, LoginDisconnectS2c, LoginStartC2s, StatusPingC2s, StatusPongS2c,
    StatusRequestC2s, StatusResponseS2c,
};
pub use state::{HandshakeNextState, PacketState};
pub use varint::{read_varint, read_varint_partial, varint_len, write_varint, VARINT_MAX_LEN};
