//! The player's airplane: throttle, control torques and the integrator

use serde::{Deserialize, Serialize};
use crate::rasterizer::{EulerAngle, Vec3};
use super::controls::ControlState;
use super::physics::{FlightPhysics, PhysicsParams};

pub const MAX_THROTTLE: f64 = 100.0;

/// Engine and control-surface constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirplaneParams {
    /// Thrust per percent of throttle
    pub max_engine_power: f64,
    pub pitch_speed: f64,
    pub yaw_speed: f64,
    pub roll_speed: f64,
    /// Throttle change per control tick
    pub throttle_step: f64,
}

impl Default for AirplaneParams {
    fn default() -> Self {
        Self {
            max_engine_power: 25.0,
            pitch_speed: 1.0,
            yaw_speed: 0.5,
            roll_speed: 1.0,
            throttle_step: 1.0,
        }
    }
}

/// State published after every physics tick. The frame loop writes it into
/// the scene entity and hands the position to the follow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightUpdate {
    pub position: Vec3,
    pub rotation: EulerAngle,
    pub velocity: Vec3,
    pub throttle: f64,
    pub grounded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Airplane {
    pub params: AirplaneParams,
    pub physics: FlightPhysics,
    throttle: f64,
}

impl Airplane {
    pub fn new(params: AirplaneParams, physics: PhysicsParams, position: Vec3) -> Self {
        Self {
            params,
            physics: FlightPhysics::new(physics, position),
            throttle: 0.0,
        }
    }

    /// Throttle in percent, 0..=100
    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn set_throttle(&mut self, throttle: f64) {
        self.throttle = throttle.clamp(0.0, MAX_THROTTLE);
    }

    /// Apply one control tick worth of held inputs
    pub fn apply_controls(&mut self, controls: &ControlState) {
        let step = self.params.throttle_step;
        if controls.throttle_up && self.throttle < MAX_THROTTLE {
            self.throttle = (self.throttle + step).min(MAX_THROTTLE);
        }
        if controls.throttle_down && self.throttle > 0.0 {
            self.throttle = (self.throttle - step).max(0.0);
        }

        let p = self.params;
        if controls.pitch_up {
            self.physics.add_pitch_torque(-p.pitch_speed);
        }
        if controls.pitch_down {
            self.physics.add_pitch_torque(p.pitch_speed);
        }
        if controls.roll_left {
            self.physics.add_roll_torque(p.roll_speed);
        }
        if controls.roll_right {
            self.physics.add_roll_torque(-p.roll_speed);
        }
        if controls.yaw_left {
            self.physics.add_yaw_torque(-p.yaw_speed);
        }
        if controls.yaw_right {
            self.physics.add_yaw_torque(p.yaw_speed);
        }
        // TODO: brakes are latched but need a ground friction term before they can act
    }

    /// Integrate one physics tick, then push thrust for the next one
    pub fn tick(&mut self) -> FlightUpdate {
        let grounded = self.physics.step();
        self.physics.apply_thrust(self.throttle * self.params.max_engine_power);
        FlightUpdate {
            position: self.physics.position,
            rotation: self.physics.rotation,
            velocity: self.physics.velocity,
            throttle: self.throttle,
            grounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airplane() -> Airplane {
        Airplane::new(AirplaneParams::default(), PhysicsParams::default(), Vec3::ZERO)
    }

    #[test]
    fn test_throttle_clamps() {
        let mut plane = airplane();
        let up = ControlState { throttle_up: true, ..Default::default() };
        for _ in 0..150 {
            plane.apply_controls(&up);
        }
        assert_eq!(plane.throttle(), 100.0);
        let down = ControlState { throttle_down: true, ..Default::default() };
        for _ in 0..150 {
            plane.apply_controls(&down);
        }
        assert_eq!(plane.throttle(), 0.0);
    }

    #[test]
    fn test_control_torques_are_mass_scaled() {
        let mut plane = airplane();
        plane.apply_controls(&ControlState {
            pitch_up: true,
            roll_left: true,
            yaw_right: true,
            ..Default::default()
        });
        assert_eq!(plane.physics.pitch_rate, -1.0 / 500.0);
        assert_eq!(plane.physics.roll_rate, 1.0 / 500.0);
        assert_eq!(plane.physics.yaw_rate, 0.5 / 500.0);
    }

    #[test]
    fn test_tick_applies_thrust_after_integration() {
        let mut plane = airplane();
        plane.set_throttle(100.0);
        let update = plane.tick();
        assert_eq!(update.position, Vec3::new(0.0, -3.0, 0.0));
        assert!((update.velocity - Vec3::new(0.0, -3.0, 5.0)).len() < 1e-12);
        assert!(!update.grounded);
    }

    fn state_bits(plane: &Airplane) -> Vec<u64> {
        let p = &plane.physics;
        [
            p.position.x, p.position.y, p.position.z,
            p.velocity.x, p.velocity.y, p.velocity.z,
            p.rotation.x, p.rotation.y, p.rotation.z,
            p.pitch_rate, p.yaw_rate, p.roll_rate,
            plane.throttle(),
        ]
        .iter()
        .map(|v| v.to_bits())
        .collect()
    }

    #[test]
    fn test_identical_inputs_give_identical_state() {
        let script: Vec<ControlState> = (0..300)
            .map(|i| ControlState {
                throttle_up: i < 60,
                pitch_up: i % 7 == 0,
                roll_right: i % 11 < 3,
                yaw_left: i % 5 == 1,
                ..Default::default()
            })
            .collect();

        let run = || {
            let mut plane = airplane();
            for controls in &script {
                plane.apply_controls(controls);
                plane.tick();
            }
            state_bits(&plane)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_never_below_ground() {
        let mut plane = airplane();
        for _ in 0..500 {
            let update = plane.tick();
            assert!(update.position.y >= plane.physics.params.ground_level);
        }
        assert!(plane.tick().grounded);
    }
}
