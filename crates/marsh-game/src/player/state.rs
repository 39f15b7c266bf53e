//! Actor flags and the locomotion state derived from them

/// Boolean actor state, mutated once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorFlags {
    pub is_grounded: bool,
    pub is_jumping: bool,
    pub is_running: bool,
    /// Set while a scripted sequence owns the actor
    pub is_keyboard_blocked: bool,
    /// Set once every food item is eaten, cleared when a gate fires
    pub is_teleport_available: bool,
}

/// Locomotion state of the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    GroundedIdle,
    GroundedRunning,
    AirborneRising,
    AirborneFalling,
}

impl MotionState {
    /// Derive the state from the flags and the body's vertical velocity
    pub fn classify(flags: &ActorFlags, vertical_velocity: f32) -> Self {
        let airborne = flags.is_jumping || !flags.is_grounded;
        match (airborne, flags.is_running) {
            (true, _) if vertical_velocity > 0.0 => MotionState::AirborneRising,
            (true, _) => MotionState::AirborneFalling,
            (false, true) => MotionState::GroundedRunning,
            (false, false) => MotionState::GroundedIdle,
        }
    }

    pub fn is_grounded(self) -> bool {
        matches!(self, MotionState::GroundedIdle | MotionState::GroundedRunning)
    }
}
