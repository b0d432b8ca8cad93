//! Minimal Minecraft protocol types for handshake, status, and login start.
pub mod proto;

pub use proto::{
    decode_exact, encode_packet, encode_raw_packet, HandshakeC2s, HandshakeNextState,
    LoginDisconnectS2c, LoginStartC2s, PacketDecode, PacketDecoder, PacketEncode, PacketEncoder,
    PacketFrame, PacketState, ProtoError, StatusPingC2s, StatusPongS2c, StatusRequestC2s,
    StatusResponseS2c, MAX_PACKET_SIZE,
};
