//! Integration tests for the wire layer
//!
//! Tests the compressed flag byte, the binary move packet and a full
//! predict/validate/correct loop where every message crosses as bytes.

use bytes::{BufMut, Bytes, BytesMut};
use stride::protocol::{
    version::make_version, Codec, CodecType, GameMessage, InputFlags, JsonCodec, MessageRegistry, MoveAck,
    MoveCorrection, MoveFlags, MovePacket, ProtocolError, SessionId, Vec3, FLAG_LAYOUT,
    MOVE_WIRE_SIZE, PACKET_HEADER_SIZE, PROTOCOL_VERSION,
};
use stride::simulation::{
    authority::{AuthorityError, MoveVerdict, SprintAuthority},
    movement::FlatGroundMovement,
    predictor::SprintPredictor,
    saved_move::BaseInput,
};

const DT: f32 = 1.0 / 60.0;

// ============================================================================
// Compressed Flags
// ============================================================================

#[test]
fn test_every_flag_combination_round_trips() {
    for bits in 0u8..8 {
        let flags = InputFlags {
            jump_pressed: bits & 0b001 != 0,
            wants_to_crouch: bits & 0b010 != 0,
            sprint_pressed: bits & 0b100 != 0,
        };

        let byte = flags.encode();
        assert_eq!(InputFlags::decode(byte), flags);
        assert_eq!(byte & !MoveFlags::DEFINED.bits(), 0);
    }
}

#[test]
fn test_flag_layout_is_stable() {
    assert_eq!(MoveFlags::JUMP_PRESSED.bits(), 0x01);
    assert_eq!(MoveFlags::WANTS_TO_CROUCH.bits(), 0x02);
    assert_eq!(MoveFlags::SPRINT_PRESSED.bits(), 0x10);
    assert_eq!(FLAG_LAYOUT[4], (MoveFlags::SPRINT_PRESSED, "sprint_pressed"));
}

#[test]
fn test_unknown_bits_decode_to_defaults() {
    let reserved_and_free = 0b1110_1100;
    assert_eq!(InputFlags::decode(reserved_and_free), InputFlags::default());

    let sprint_with_noise = 0b1111_0000;
    let flags = InputFlags::decode(sprint_with_noise);
    assert!(flags.sprint_pressed);
    assert!(!flags.jump_pressed);
}

// ============================================================================
// Move Packets
// ============================================================================

#[test]
fn test_packet_carries_predicted_moves() {
    let mut predictor = SprintPredictor::new(FlatGroundMovement::default());
    predictor.request_start();

    // Flushing every tick sends each one as its own move
    let moves: Vec<_> = (0..3)
        .map(|i| {
            let base = BaseInput {
                acceleration: Vec3::new(0.0, 2048.0, 0.0),
                ..Default::default()
            };
            predictor.tick(base, DT, i as f32 * DT).unwrap();
            predictor.flush().unwrap()
        })
        .collect();

    let packet = MovePacket::new(moves.clone());
    let bytes = packet.to_bytes().unwrap();
    assert_eq!(bytes.len(), PACKET_HEADER_SIZE + 3 * MOVE_WIRE_SIZE);

    let decoded = MovePacket::from_bytes(bytes).unwrap();
    assert_eq!(decoded.protocol_version, PROTOCOL_VERSION);
    assert_eq!(decoded.moves, moves);
    assert!(decoded.moves.iter().all(|mv| mv.flags().sprint_pressed));
}

#[test]
fn test_packet_from_other_major_version_rejected() {
    let mut buf = BytesMut::new();
    buf.put_u16(make_version(9, 0));
    buf.put_u8(0);

    let result = MovePacket::from_bytes(buf.freeze());
    assert!(matches!(result, Err(ProtocolError::VersionMismatch { .. })));
}

#[test]
fn test_truncated_packet_rejected() {
    let packet = MovePacket::new(vec![stride::protocol::ClientMove {
        timestamp: 0.0,
        delta_time: DT,
        acceleration: Vec3::ZERO,
        compressed_flags: 0,
        predicted_position: Vec3::ZERO,
    }]);
    let bytes = packet.to_bytes().unwrap();
    let truncated = bytes.slice(..bytes.len() - 1);

    let result = MovePacket::from_bytes(truncated);
    assert!(matches!(result, Err(ProtocolError::BufferTooShort { .. })));
}

#[test]
fn test_registry_matches_between_sides() {
    let client = MessageRegistry::with_stride_messages();
    let server = MessageRegistry::with_stride_messages();

    assert_eq!(client.global_schema_hash(), server.global_schema_hash());
    assert!(client.is_registered(MoveAck::ROUTE_ID));
    assert!(client.is_registered(MoveCorrection::ROUTE_ID));
    assert!(client.is_registered(MovePacket::ROUTE_ID));
}

// ============================================================================
// Full Loop Over Bytes
// ============================================================================

/// Runs predictor and authority against each other with every message as bytes
fn converge_over(codec: CodecType) {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();

    let session_id = SessionId::new_v4();
    let mut predictor = SprintPredictor::new(FlatGroundMovement::default());
    let mut authority = SprintAuthority::new(FlatGroundMovement::default());

    // Server has the character sliding backwards
    authority.add_session(
        session_id,
        stride::protocol::PhysicsState {
            position: Vec3::new(0.0, 0.0, 0.0),
            velocity: Vec3::new(-300.0, 0.0, 0.0),
            ..Default::default()
        },
    );

    predictor.request_start();
    let input = BaseInput {
        acceleration: Vec3::new(2048.0, 0.0, 0.0),
        ..Default::default()
    };

    let mut corrections = 0;
    let mut now = 0.0;
    for tick in 0..=20 {
        let mut moves = predictor.tick(input, DT, now).unwrap();
        now += DT;
        if tick == 20 {
            moves.extend(predictor.flush());
        }
        if moves.is_empty() {
            continue;
        }

        let packet: Bytes = MovePacket::new(moves).to_bytes().unwrap();
        let verdicts = authority.apply_packet_bytes(session_id, packet).unwrap();

        for verdict in verdicts {
            match verdict {
                MoveVerdict::Ack(ack) => {
                    let wire = codec.encode(&ack).unwrap();
                    let ack: MoveAck = codec.decode(&wire).unwrap();
                    predictor.acknowledge(ack.timestamp);
                }
                MoveVerdict::Correct(correction) => {
                    let wire = codec.encode(&correction).unwrap();
                    let correction: MoveCorrection = codec.decode(&wire).unwrap();
                    predictor.apply_correction(&correction).unwrap();
                    corrections += 1;
                }
            }
        }
    }

    assert!(corrections >= 1);
    let character = authority.character(session_id).unwrap();
    assert_eq!(predictor.physics(), &character.physics);
    assert_eq!(predictor.sprint().snapshot(), character.sprint.snapshot());
    assert_eq!(predictor.pending_move_count(), 0);
}

#[test]
fn test_loop_over_bytes_converges() {
    converge_over(CodecType::default());
}

#[test]
fn test_loop_over_json_converges() {
    let codec = CodecType::from_id(JsonCodec.id()).unwrap();
    assert_eq!(codec.name(), "JSON");
    converge_over(codec);
}

#[test]
fn test_stale_packet_moves_are_skipped() {
    let session_id = SessionId::new_v4();
    let mut authority = SprintAuthority::new(FlatGroundMovement::default());
    let mut predictor = SprintPredictor::new(FlatGroundMovement::default());

    predictor.tick(BaseInput::default(), DT, 0.0).unwrap();
    let first = predictor.flush().unwrap();
    predictor.tick(BaseInput::default(), DT, DT).unwrap();
    let second = predictor.flush().unwrap();

    let bytes = MovePacket::new(vec![first]).to_bytes().unwrap();
    authority.apply_packet_bytes(session_id, bytes).unwrap();

    // Resend of `first` together with `second`
    let bytes = MovePacket::new(vec![first, second]).to_bytes().unwrap();
    let verdicts = authority.apply_packet_bytes(session_id, bytes).unwrap();
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].timestamp(), DT);

    // A lone resend is not an error either
    let bytes = MovePacket::new(vec![second]).to_bytes().unwrap();
    assert!(authority.apply_packet_bytes(session_id, bytes).unwrap().is_empty());

    // Direct application still reports it
    let result = authority.apply_move(session_id, &second);
    assert!(matches!(result, Err(AuthorityError::StaleMove { .. })));
}
