//! Latched pilot input
//!
//! The frame loop sets a flag while its key is held and clears it on
//! release. The airplane reads the flags once per control tick.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub throttle_up: bool,
    pub throttle_down: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub brakes: bool,
}
