//! Player actor module
//!
//! Tank-style locomotion with a ground probe, a shaped jump arc, and a
//! respawn key.

mod controller;
mod ground;
mod movement;
mod respawn;
mod state;

pub use controller::PlayerController;
pub use ground::{GroundProbe, GroundProbeConfig};
pub use movement::{GravityPhase, MovementConfig};
pub use respawn::{RespawnConfig, Respawner};
pub use state::{ActorFlags, MotionState};
