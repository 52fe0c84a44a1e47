//! Fixed-step flight integrator
//!
//! One call to `step` is one tick; nothing is scaled by wall-clock time.
//! Gravity is an acceleration added straight to velocity, while lift, thrust
//! and control torques are forces divided by mass.

use serde::{Deserialize, Serialize};
use crate::rasterizer::{EulerAngle, Vec3};

/// Constants of the flight model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub gravity: f64,
    pub mass: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    /// Fraction of each angular rate removed per tick
    pub angular_drag_coefficient: f64,
    /// Height of the flat floor
    pub ground_level: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 3.0,
            mass: 500.0,
            lift_coefficient: 1.1,
            drag_coefficient: 0.1,
            angular_drag_coefficient: 0.01,
            ground_level: -400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPhysics {
    pub params: PhysicsParams,
    pub position: Vec3,
    pub rotation: EulerAngle,
    pub velocity: Vec3,
    pub pitch_rate: f64,
    pub yaw_rate: f64,
    pub roll_rate: f64,
}

impl FlightPhysics {
    pub fn new(params: PhysicsParams, position: Vec3) -> Self {
        Self {
            params,
            position,
            rotation: EulerAngle::ZERO,
            velocity: Vec3::ZERO,
            pitch_rate: 0.0,
            yaw_rate: 0.0,
            roll_rate: 0.0,
        }
    }

    /// Body up axis in world space
    pub fn up(&self) -> Vec3 {
        Vec3::UP.rotate_euler(self.rotation)
    }

    /// Body forward axis in world space
    pub fn forward(&self) -> Vec3 {
        Vec3::FORWARD.rotate_euler(self.rotation)
    }

    pub fn add_force(&mut self, force: Vec3) {
        self.velocity = self.velocity + force * (1.0 / self.params.mass);
    }

    pub fn add_pitch_torque(&mut self, amount: f64) {
        self.pitch_rate += amount / self.params.mass;
    }

    pub fn add_yaw_torque(&mut self, amount: f64) {
        self.yaw_rate += amount / self.params.mass;
    }

    pub fn add_roll_torque(&mut self, amount: f64) {
        self.roll_rate += amount / self.params.mass;
    }

    /// Lift along the up axis, proportional to the squared speed across the wings
    pub fn apply_lift(&mut self) {
        let up = self.up();
        let across_wings = self.velocity.project_onto_plane(up);
        self.add_force(up * (across_wings.len_sq() * self.params.lift_coefficient));
    }

    pub fn apply_gravity(&mut self) {
        self.velocity = self.velocity + Vec3::new(0.0, -self.params.gravity, 0.0);
    }

    /// Computes the drag opposing motion normal to the wings. The result is
    /// returned but never applied to velocity.
    pub fn apply_drag(&self) -> Vec3 {
        let normal_to_wings = self.velocity.project_onto(self.up());
        (-self.velocity - normal_to_wings) * self.params.drag_coefficient
    }

    pub fn apply_angular_drag(&mut self) {
        let k = self.params.angular_drag_coefficient;
        self.pitch_rate -= self.pitch_rate * k;
        self.yaw_rate -= self.yaw_rate * k;
        self.roll_rate -= self.roll_rate * k;
    }

    pub fn update_orientation(&mut self) {
        self.rotation.x += self.pitch_rate;
        self.rotation.y += self.yaw_rate;
        self.rotation.z += self.roll_rate;
    }

    /// Move by velocity. If that would end at or below the ground the
    /// aircraft is put on the ground, loses its vertical velocity and keeps
    /// sliding horizontally. Returns true when clamped.
    pub fn update_position(&mut self) -> bool {
        let ground = self.params.ground_level;
        if (self.position + self.velocity).y > ground {
            self.position = self.position + self.velocity;
            false
        } else {
            self.position.y = ground;
            self.velocity.y = 0.0;
            self.position = self.position + self.velocity;
            true
        }
    }

    pub fn apply_thrust(&mut self, amount: f64) {
        let forward = self.forward();
        self.add_force(forward * amount);
    }

    /// One tick: lift, gravity, drag, angular drag, orientation, position.
    /// Returns true when the ground clamp engaged.
    pub fn step(&mut self) -> bool {
        self.apply_lift();
        self.apply_gravity();
        self.apply_drag();
        self.apply_angular_drag();
        self.update_orientation();
        self.update_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> FlightPhysics {
        FlightPhysics::new(PhysicsParams::default(), Vec3::ZERO)
    }

    #[test]
    fn test_thrust_then_gravity() {
        let mut p = physics();
        p.apply_thrust(100.0 * 25.0);
        assert!((p.velocity - Vec3::new(0.0, 0.0, 5.0)).len() < 1e-12);
        p.apply_gravity();
        assert!((p.velocity.y + 3.0).abs() < 1e-12);
        assert!((p.velocity.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_lift_uses_speed_across_wings() {
        let mut p = physics();
        p.velocity = Vec3::new(0.0, 7.0, 10.0);
        p.apply_lift();
        // only the 10 units along z count: 10^2 * 1.1 / 500
        assert!((p.velocity.y - (7.0 + 0.22)).abs() < 1e-12);
        assert_eq!(p.velocity.z, 10.0);
    }

    #[test]
    fn test_drag_is_computed_but_not_applied() {
        let mut p = physics();
        p.velocity = Vec3::new(3.0, -4.0, 12.0);
        let before = p.velocity;
        let drag = p.apply_drag();
        assert!(drag.len() > 0.0);
        assert_eq!(p.velocity, before);
    }

    #[test]
    fn test_angular_drag_decays_rates() {
        let mut p = physics();
        p.add_pitch_torque(500.0);
        p.add_yaw_torque(-250.0);
        assert_eq!(p.pitch_rate, 1.0);
        p.apply_angular_drag();
        assert!((p.pitch_rate - 0.99).abs() < 1e-12);
        assert!((p.yaw_rate + 0.495).abs() < 1e-12);
    }

    #[test]
    fn test_orientation_accumulates_without_wrapping() {
        let mut p = physics();
        p.roll_rate = 1.0;
        for _ in 0..10 {
            p.update_orientation();
        }
        assert_eq!(p.rotation.z, 10.0);
    }

    #[test]
    fn test_ground_clamp() {
        let mut p = physics();
        p.position = Vec3::new(0.0, -399.0, 0.0);
        p.velocity = Vec3::new(2.0, -10.0, 4.0);
        assert!(p.update_position());
        assert_eq!(p.position.y, -400.0);
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.position.x, 2.0);
        assert_eq!(p.position.z, 4.0);
    }

    #[test]
    fn test_resting_on_ground_stays_on_ground() {
        let mut p = physics();
        p.position = Vec3::new(0.0, -400.0, 0.0);
        for _ in 0..50 {
            p.step();
            assert_eq!(p.position.y, -400.0);
            assert_eq!(p.velocity.y, 0.0);
        }
    }

    #[test]
    fn test_step_order_gravity_before_position() {
        let mut p = physics();
        assert!(!p.step());
        assert_eq!(p.velocity, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.0, -3.0, 0.0));
    }

    #[test]
    fn test_axes_follow_rotation() {
        let mut p = physics();
        p.rotation = EulerAngle::new(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        assert!((p.forward() - Vec3::RIGHT).len() < 1e-12);
        assert!((p.up() - Vec3::UP).len() < 1e-12);
    }
}
