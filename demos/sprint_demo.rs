//! Predicting side and authoritative side exchanging encoded moves
//!
//! The authoritative character is spawned with a small offset, so the first
//! move is corrected and the predicting side replays its buffered moves.
//! Halfway through, a batch of packets is "lost" and resent, and the
//! authority skips the moves it already applied.
//!
//! Run with `RUST_LOG=debug cargo run --example sprint_demo` to see replays.
//! Pass a codec id (`1` for JSON, `2` for Postcard) to pick how acks and
//! corrections travel: `cargo run --example sprint_demo -- 1`.

use std::collections::VecDeque;

use stride::protocol::{
    CodecType, MoveAck, MoveCorrection, MovePacket, PhysicsState, SessionId, Vec3,
};
use stride::simulation::{
    authority::{MoveVerdict, SprintAuthority},
    movement::FlatGroundMovement,
    predictor::SprintPredictor,
    saved_move::BaseInput,
    StrideConfig,
};
use tracing_subscriber::EnvFilter;

const TICK: f32 = 1.0 / 30.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StrideConfig::from_json_str(
        r#"{ "predictor": { "sprint": { "duration_seconds": 1.0, "recharge_seconds": 1.5 } },
             "authority": { "sprint": { "duration_seconds": 1.0, "recharge_seconds": 1.5 } } }"#,
    )?;

    let codec = match std::env::args().nth(1) {
        Some(id) => CodecType::from_id(id.parse()?)?,
        None => CodecType::default(),
    };
    tracing::info!(codec = codec.name(), "Replies encoded");
    let session_id = SessionId::new_v4();

    let mut predictor = SprintPredictor::with_config(
        FlatGroundMovement::new(config.walk.clone()),
        config.predictor.clone(),
    );
    let mut authority = SprintAuthority::with_config(
        FlatGroundMovement::new(config.walk.clone()),
        config.authority.clone(),
    );
    authority.add_session(
        session_id,
        PhysicsState {
            position: Vec3::new(-5.0, 0.0, 0.0),
            ..Default::default()
        },
    );

    let input = BaseInput {
        acceleration: Vec3::new(2048.0, 0.0, 0.0),
        ..Default::default()
    };

    let mut in_flight = VecDeque::new();
    let mut resent = false;
    let mut now = 0.0;

    for tick in 0..120 {
        // Hold sprint for the first two seconds, then tap it again later
        match tick {
            0 | 90 => predictor.request_start(),
            60 | 100 => predictor.request_stop(),
            _ => {}
        }

        let mut ready = predictor.tick(input, TICK, now)?;
        now += TICK;
        if tick == 119 {
            ready.extend(predictor.flush());
        }
        in_flight.extend(ready);

        // Packets 40..45 are lost; the client resends them with the next batch
        if (40..45).contains(&tick) || in_flight.is_empty() {
            continue;
        }

        let moves: Vec<_> = in_flight.drain(..).collect();
        let resend = if tick >= 45 && !resent {
            resent = true;
            moves.last().copied()
        } else {
            None
        };

        let packet = MovePacket::new(moves).to_bytes()?;
        for verdict in authority.apply_packet_bytes(session_id, packet)? {
            deliver(&codec, &mut predictor, verdict)?;
        }
        if let Some(mv) = resend {
            // Already-applied move goes out again
            let packet = MovePacket::new(vec![mv]).to_bytes()?;
            let skipped = authority.apply_packet_bytes(session_id, packet)?;
            tracing::info!(verdicts = skipped.len(), "Resent move was skipped");
        }

        if tick % 15 == 0 {
            let sprint = predictor.sprint();
            tracing::info!(
                tick,
                now,
                x = predictor.physics().position.x,
                speed = predictor.physics().velocity.length(),
                active = sprint.active,
                recharging = sprint.is_recharging(now),
                pending = predictor.pending_move_count(),
                "Predicted state"
            );
        }
    }

    let character = authority
        .character(session_id)
        .ok_or("authoritative character missing")?;
    tracing::info!(
        predicted_x = predictor.physics().position.x,
        authoritative_x = character.physics.position.x,
        pending = predictor.pending_move_count(),
        "Finished"
    );

    Ok(())
}

fn deliver<M, E>(
    codec: &CodecType,
    predictor: &mut SprintPredictor<M, E>,
    verdict: MoveVerdict,
) -> Result<(), Box<dyn std::error::Error>>
where
    M: stride::simulation::MovementStep,
    E: stride::simulation::Eligibility,
{
    match verdict {
        MoveVerdict::Ack(ack) => {
            let wire = codec.encode(&ack)?;
            let ack: MoveAck = codec.decode(&wire)?;
            predictor.acknowledge(ack.timestamp);
        }
        MoveVerdict::Correct(correction) => {
            let wire = codec.encode(&correction)?;
            let correction: MoveCorrection = codec.decode(&wire)?;
            let report = predictor.apply_correction(&correction)?;
            tracing::info!(
                timestamp = correction.timestamp,
                replayed = report.replayed,
                "Applied correction"
            );
        }
    }
    Ok(())
}
