use super::{
    encode_packet, encode_raw_packet, read_string, read_u16_be, read_varint, varint_len,
    write_string, write_u16_be, write_varint, HandshakeC2s, HandshakeNextState, PacketDecoder,
    PacketEncoder, PacketState, ProtoError, StatusPingC2s, StatusResponseS2c, VARINT_MAX_LEN,
};

const VARINT_SAMPLES: [i32; 9] = [0, 1, 127, 128, 255, 2_097_151, 2_147_483_647, -1, -2_147_483_648];

fn handshake(next_state: HandshakeNextState) -> HandshakeC2s {
    HandshakeC2s {
        protocol_version: 760,
        server_address: "localhost".to_owned(),
        server_port: 25565,
        next_state,
    }
}

#[test]
fn varint_roundtrip() {
    for value in VARINT_SAMPLES {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        assert!(buf.len() <= VARINT_MAX_LEN);
        assert_eq!(buf.len(), varint_len(value));

        let mut slice = buf.as_slice();
        assert_eq!(read_varint(&mut slice).unwrap(), value);
        assert!(slice.is_empty());
    }
}

#[test]
fn varint_known_encodings() {
    let cases: [(i32, &[u8]); 5] = [
        (0, &[0x00]),
        (127, &[0x7f]),
        (128, &[0x80, 0x01]),
        (2_097_151, &[0xff, 0xff, 0x7f]),
        (-1, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
    ];
    for (value, expected) in cases {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        assert_eq!(buf, expected, "encoding of {value}");
    }
}

#[test]
fn varint_sixth_byte_is_rejected() {
    let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
    let mut slice = &bytes[..];
    assert_eq!(read_varint(&mut slice), Err(ProtoError::VarIntTooLong));
}

#[test]
fn varint_truncated() {
    let bytes = [0x80, 0x80];
    let mut slice = &bytes[..];
    assert_eq!(read_varint(&mut slice), Err(ProtoError::Truncated));
    // nothing consumed on failure
    assert_eq!(slice.len(), 2);
}

#[test]
fn string_roundtrip() {
    for value in ["", "localhost", "héllo wörld", "日本語", "🦀 crab"] {
        let mut buf = Vec::new();
        write_string(&mut buf, value).unwrap();
        let mut slice = buf.as_slice();
        assert_eq!(read_string(&mut slice).unwrap(), value);
        assert!(slice.is_empty());
    }
}

#[test]
fn string_short_read_is_truncated() {
    let mut buf = Vec::new();
    write_varint(&mut buf, 10);
    buf.extend_from_slice(b"abc");
    let mut slice = buf.as_slice();
    assert_eq!(read_string(&mut slice), Err(ProtoError::Truncated));
}

#[test]
fn string_negative_length() {
    let mut buf = Vec::new();
    write_varint(&mut buf, -3);
    let mut slice = buf.as_slice();
    assert_eq!(read_string(&mut slice), Err(ProtoError::NegativeLength(-3)));
}

#[test]
fn string_invalid_utf8() {
    let buf = [0x02, 0xc3, 0x28];
    let mut slice = &buf[..];
    assert_eq!(read_string(&mut slice), Err(ProtoError::InvalidUtf8));
}

#[test]
fn unsigned_short_is_big_endian() {
    let mut buf = Vec::new();
    write_u16_be(&mut buf, 25565);
    assert_eq!(buf, [0x63, 0xdd]);
    let mut slice = buf.as_slice();
    assert_eq!(read_u16_be(&mut slice).unwrap(), 25565);

    let mut short = &[0x63][..];
    assert_eq!(read_u16_be(&mut short), Err(ProtoError::Truncated));
}

#[test]
fn frame_roundtrip_sizes() {
    for size in [0usize, 1, 4096] {
        let payload: Vec<u8> = (0..size).map(|i| i as u8).collect();
        let mut bytes = Vec::new();
        encode_raw_packet(&mut bytes, 0x2a, &payload).unwrap();

        let mut dec = PacketDecoder::new();
        dec.queue_slice(&bytes);
        let frame = dec.try_next_packet().unwrap().unwrap();
        assert_eq!(frame.id, 0x2a);
        assert_eq!(frame.body, payload);
        assert!(dec.try_next_packet().unwrap().is_none());
        assert_eq!(dec.pending(), 0);
    }
}

#[test]
fn frame_length_counts_packet_id() {
    let mut bytes = Vec::new();
    // 300 needs a two byte varint, so the prefix must be 2 + 3
    encode_raw_packet(&mut bytes, 300, b"abc").unwrap();
    assert_eq!(bytes[0], 5);
    assert_eq!(bytes.len(), 6);
}

#[test]
fn frame_split_at_every_offset() {
    let mut bytes = Vec::new();
    encode_packet(&mut bytes, &handshake(HandshakeNextState::Status)).unwrap();

    let mut whole = PacketDecoder::new();
    whole.queue_slice(&bytes);
    let expected = whole.try_next_packet().unwrap().unwrap();

    for split in 0..=bytes.len() {
        let mut dec = PacketDecoder::new();
        dec.queue_slice(&bytes[..split]);
        let first = dec.try_next_packet().unwrap();
        if split < bytes.len() {
            assert!(first.is_none(), "frame yielded early at split {split}");
            dec.queue_slice(&bytes[split..]);
            let frame = dec.try_next_packet().unwrap().unwrap();
            assert_eq!(frame, expected);
        } else {
            assert_eq!(first.unwrap(), expected);
        }
        assert!(dec.try_next_packet().unwrap().is_none());
    }
}

#[test]
fn frames_keep_arrival_order_and_remainder() {
    let mut enc = PacketEncoder::new();
    enc.write_packet(&handshake(HandshakeNextState::Status)).unwrap();
    enc.write_packet(&StatusPingC2s { payload: 7 }).unwrap();
    let mut bytes = enc.take();
    let first_two_len = bytes.len();
    encode_packet(&mut bytes, &StatusPingC2s { payload: 8 }).unwrap();

    let mut dec = PacketDecoder::new();
    // deliver both frames and one byte short of the third
    dec.queue_slice(&bytes[..bytes.len() - 1]);
    let ids: Vec<i32> = dec.by_ref().map(|frame| frame.unwrap().id).collect();
    assert_eq!(ids, [0x00, 0x01]);
    assert_eq!(dec.pending(), bytes.len() - 1 - first_two_len);

    dec.queue_slice(&bytes[bytes.len() - 1..]);
    let frame = dec.try_next_packet().unwrap().unwrap();
    let ping: StatusPingC2s = frame.decode(PacketState::Status).unwrap();
    assert_eq!(ping.payload, 8);
}

#[test]
fn oversized_length_prefix_is_rejected_before_buffering() {
    let mut bytes = Vec::new();
    write_varint(&mut bytes, 100_000_000);
    bytes.push(0x00);

    let mut dec = PacketDecoder::with_limit(1024 * 1024);
    dec.queue_slice(&bytes);
    assert_eq!(
        dec.try_next_packet(),
        Err(ProtoError::FrameTooLarge {
            len: 100_000_000,
            max: 1024 * 1024
        })
    );
}

#[test]
fn zero_and_negative_lengths_are_rejected() {
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&[0x00]);
    assert!(matches!(
        dec.try_next_packet(),
        Err(ProtoError::FrameTooLarge { len: 0, .. })
    ));

    let mut bytes = Vec::new();
    write_varint(&mut bytes, -5);
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes);
    assert!(matches!(
        dec.try_next_packet(),
        Err(ProtoError::FrameTooLarge { len: -5, .. })
    ));
}

#[test]
fn overlong_length_prefix() {
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
    assert_eq!(dec.try_next_packet(), Err(ProtoError::VarIntTooLong));
}

#[test]
fn handshake_roundtrip() {
    let packet = handshake(HandshakeNextState::Login);

    let mut bytes = Vec::new();
    encode_packet(&mut bytes, &packet).unwrap();

    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes);
    let frame = dec.try_next_packet().unwrap().unwrap();
    let decoded: HandshakeC2s = frame.decode(PacketState::Handshaking).unwrap();
    assert_eq!(decoded, packet);
}

#[test]
fn handshake_unknown_next_state() {
    let mut body = Vec::new();
    write_varint(&mut body, 760);
    write_string(&mut body, "localhost").unwrap();
    write_u16_be(&mut body, 25565);
    write_varint(&mut body, 3);

    let mut bytes = Vec::new();
    encode_raw_packet(&mut bytes, 0x00, &body).unwrap();
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes);
    let frame = dec.try_next_packet().unwrap().unwrap();
    assert_eq!(
        frame.decode::<HandshakeC2s>(PacketState::Handshaking),
        Err(ProtoError::InvalidState(3))
    );
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = Vec::new();
    encode_raw_packet(&mut bytes, 0x01, &[0, 0, 0, 0, 0, 0, 0, 1, 0xee]).unwrap();
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes);
    let frame = dec.try_next_packet().unwrap().unwrap();
    assert_eq!(
        frame.decode::<StatusPingC2s>(PacketState::Status),
        Err(ProtoError::TrailingBytes(1))
    );
}

#[test]
fn mismatched_id_is_unknown_packet() {
    let mut bytes = Vec::new();
    encode_packet(&mut bytes, &StatusPingC2s { payload: 1 }).unwrap();
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes);
    let frame = dec.try_next_packet().unwrap().unwrap();
    assert_eq!(
        frame.decode::<StatusResponseS2c>(PacketState::Status),
        Err(ProtoError::UnknownPacket {
            state: PacketState::Status,
            id: 0x01
        })
    );
}

#[test]
fn take_pending_bytes_returns_partial_frame() {
    let mut bytes = Vec::new();
    encode_packet(&mut bytes, &StatusPingC2s { payload: 3 }).unwrap();
    let mut dec = PacketDecoder::new();
    dec.queue_slice(&bytes[..4]);
    assert!(dec.try_next_packet().unwrap().is_none());
    assert_eq!(dec.take_pending_bytes(), &bytes[..4]);
    assert_eq!(dec.pending(), 0);
}

#[test]
fn only_unknown_packets_outside_handshake_are_recoverable() {
    let status = ProtoError::UnknownPacket {
        state: PacketState::Status,
        id: 0x05,
    };
    let handshaking = ProtoError::UnknownPacket {
        state: PacketState::Handshaking,
        id: 0x05,
    };
    assert!(status.is_recoverable());
    assert!(!handshaking.is_recoverable());
    assert!(!ProtoError::Truncated.is_recoverable());
    assert!(!ProtoError::InvalidState(3).is_recoverable());
}
