use super::{
    error::{debug_log_error, ProtoError, Result},
    state::PacketState,
    varint::{read_varint, read_varint_partial, varint_len, write_varint},
};

/// Maximum packet length in bytes (protocol limit).
pub const MAX_PACKET_SIZE: usize = 2_097_152;

/// Clientbound or serverbound packet body encoding.
pub trait PacketEncode {
    const ID: i32;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()>;
}

/// Clientbound or serverbound packet body decoding.
pub trait PacketDecode: Sized {
    const ID: i32;

    fn decode_body(input: &mut &[u8]) -> Result<Self>;
}

/// Decoded packet frame with the raw body (without ID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketFrame {
    pub id: i32,
    pub body: Vec<u8>,
}

impl PacketFrame {
    /// Decodes the body as `P`, received in `state`. The whole body must be consumed.
    pub fn decode<P: PacketDecode>(&self, state: PacketState) -> Result<P> {
        if self.id != P::ID {
            return Err(ProtoError::UnknownPacket { state, id: self.id });
        }
        decode_exact(&self.body)
    }
}

/// Decodes `body` as `P`, rejecting leftover bytes.
pub fn decode_exact<P: PacketDecode>(body: &[u8]) -> Result<P> {
    let mut input = body;
    let packet = match P::decode_body(&mut input) {
        Ok(value) => value,
        Err(err) => {
            debug_log_error("packet body decode failed", &err);
            return Err(err);
        }
    };

    if !input.is_empty() {
        let err = ProtoError::TrailingBytes(input.len());
        debug_log_error("packet had trailing bytes", &err);
        return Err(err);
    }

    Ok(packet)
}

/// Incremental splitter for length-prefixed frames.
///
/// Bytes are queued as they arrive from the socket; [`try_next_packet`]
/// yields frames in arrival order once a whole frame is buffered and keeps
/// any trailing partial frame for the next call.
///
/// [`try_next_packet`]: PacketDecoder::try_next_packet
#[derive(Debug)]
pub struct PacketDecoder {
    buf: Vec<u8>,
    pos: usize,
    limit: usize,
}

/// Packet encoder for length-prefixed frames.
#[derive(Debug, Default)]
pub struct PacketEncoder {
    buf: Vec<u8>,
    scratch: Vec<u8>,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::with_limit(MAX_PACKET_SIZE)
    }

    /// Decoder that rejects frames declaring more than `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn queue_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of queued bytes not yet returned as frames.
    pub fn pending(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn take_pending_bytes(&mut self) -> Vec<u8> {
        if self.pos == 0 {
            return std::mem::take(&mut self.buf);
        }

        let pending = self.buf.split_off(self.pos);
        self.buf.clear();
        self.pos = 0;
        pending
    }

    /// Returns the next complete frame, or `Ok(None)` if more bytes are needed.
    ///
    /// An error leaves the stream misaligned; the caller must stop reading.
    pub fn try_next_packet(&mut self) -> Result<Option<PacketFrame>> {
        let data = &self.buf[self.pos..];
        let (packet_len, len_len) = match read_varint_partial(data) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(err) => {
                debug_log_error("packet length varint decode failed", &err);
                return Err(err);
            }
        };

        if packet_len <= 0 || packet_len as usize > self.limit {
            let err = ProtoError::FrameTooLarge {
                len: packet_len as i64,
                max: self.limit,
            };
            debug_log_error("packet length out of bounds", &err);
            return Err(err);
        }

        let total_len = len_len + packet_len as usize;
        if data.len() < total_len {
            return Ok(None);
        }

        let mut body = &data[len_len..total_len];
        let id = match read_varint(&mut body) {
            Ok(value) => value,
            Err(err) => {
                debug_log_error("packet id varint decode failed", &err);
                return Err(err);
            }
        };
        let body = body.to_vec();

        self.pos += total_len;
        self.compact_if_needed();

        Ok(Some(PacketFrame { id, body }))
    }

    fn compact_if_needed(&mut self) {
        if self.pos == 0 {
            return;
        }

        if self.pos >= self.buf.len() / 2 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

impl Iterator for PacketDecoder {
    type Item = Result<PacketFrame>;

    /// Yields buffered frames; `None` once more input is needed.
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next_packet().transpose()
    }
}

impl PacketEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_packet<P: PacketEncode>(&mut self, pkt: &P) -> Result<()> {
        self.scratch.clear();
        pkt.encode_body(&mut self.scratch)?;
        encode_raw_packet(&mut self.buf, P::ID, &self.scratch)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

pub fn encode_packet<P: PacketEncode>(out: &mut Vec<u8>, pkt: &P) -> Result<()> {
    let mut body = Vec::new();
    pkt.encode_body(&mut body)?;
    encode_raw_packet(out, P::ID, &body)
}

/// Frames `body` as `VarInt(len) VarInt(id) body`.
///
/// `len` counts the encoded ID as well as the body.
pub fn encode_raw_packet(out: &mut Vec<u8>, id: i32, body: &[u8]) -> Result<()> {
    let packet_len = varint_len(id) + body.len();
    if packet_len > MAX_PACKET_SIZE {
        return Err(ProtoError::FrameTooLarge {
            len: packet_len as i64,
            max: MAX_PACKET_SIZE,
        });
    }

    out.reserve(varint_len(packet_len as i32) + packet_len);
    write_varint(out, packet_len as i32);
    write_varint(out, id);
    out.extend_from_slice(body);
    Ok(())
}
