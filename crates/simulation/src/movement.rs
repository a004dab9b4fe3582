//! Reference movement step for flat ground
//!
//! Real hosts plug their own physics in through [`MovementStep`]. This one
//! walks, brakes, jumps and falls on an infinite floor at `z = 0`, which is
//! enough to drive the sprint protocol end to end in tests and demos.

use serde::{Deserialize, Serialize};
use stride_protocol::{PhysicsState, Vec3};

use crate::saved_move::MoveInput;
use crate::{MovementLimits, MovementStep};

/// Walking tunables for [`FlatGroundMovement`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub max_walk_speed: f32,
    pub max_acceleration: f32,

    /// Deceleration applied on the ground with no input
    pub braking_deceleration: f32,

    pub jump_z_velocity: f32,
    pub gravity: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_walk_speed: 600.0,
            max_acceleration: 2048.0,
            braking_deceleration: 2048.0,
            jump_z_velocity: 1000.0,
            gravity: 1960.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlatGroundMovement {
    config: WalkConfig,
}

impl FlatGroundMovement {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }
}

impl MovementStep for FlatGroundMovement {
    fn base_limits(&self) -> MovementLimits {
        MovementLimits {
            max_speed: self.config.max_walk_speed,
            max_acceleration: self.config.max_acceleration,
        }
    }

    fn step(
        &self,
        state: &PhysicsState,
        input: &MoveInput,
        limits: MovementLimits,
        delta_time: f32,
    ) -> PhysicsState {
        let mut next = *state;

        if next.grounded {
            next.crouching = input.wants_to_crouch;
        }

        let planar = Vec3::new(next.velocity.x, next.velocity.y, 0.0);
        let accel = Vec3::new(input.acceleration.x, input.acceleration.y, 0.0)
            .clamped_to(limits.max_acceleration);

        let planar = if accel.is_zero() {
            if next.grounded {
                brake(planar, self.config.braking_deceleration * delta_time)
            } else {
                planar
            }
        } else {
            (planar + accel * delta_time).clamped_to(limits.max_speed)
        };

        let mut vz = next.velocity.z;
        if next.grounded && input.jump_pressed && !next.crouching {
            vz = self.config.jump_z_velocity;
            next.grounded = false;
        }
        if !next.grounded {
            vz -= self.config.gravity * delta_time;
        }

        next.velocity = Vec3::new(planar.x, planar.y, vz);
        next.position = next.position + next.velocity * delta_time;

        if next.position.z <= 0.0 && !next.grounded {
            next.position.z = 0.0;
            next.velocity.z = 0.0;
            next.grounded = true;
        }

        next
    }
}

fn brake(velocity: Vec3, amount: f32) -> Vec3 {
    let speed = velocity.length();
    if speed <= amount || speed == 0.0 {
        Vec3::ZERO
    } else {
        velocity * ((speed - amount) / speed)
    }
}
