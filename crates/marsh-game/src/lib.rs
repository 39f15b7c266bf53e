//! Marsh Game - Game logic and systems
//!
//! Provides input sampling, the player controller, food collection,
//! teleport gates, moving platforms, props, level loading and the scene
//! that ties them together.

pub mod collect;
pub mod config;
pub mod events;
pub mod input;
pub mod level;
pub mod platform;
pub mod player;
pub mod props;
pub mod scene;
pub mod teleport;

#[cfg(test)]
mod testing;

pub use collect::{CollectedItemSet, CollectorConfig, FoodCounter, ItemCollector};
pub use config::GameplayConfig;
pub use events::{GameEvent, SoundCue};
pub use input::{FrameInput, InputAction, InputBindings, InputHandler, InputState};
pub use level::{LevelDesc, LevelError, ObjectTag};
pub use platform::{CarriedBy, MovingPlatform, PlatformConfig, PlatformId};
pub use player::{
    ActorFlags, GravityPhase, GroundProbe, GroundProbeConfig, MotionState, MovementConfig,
    PlayerController, RespawnConfig, Respawner,
};
pub use props::{BouncePad, BouncePadConfig, Companion, SpinningFood};
pub use scene::{Scene, SceneHost};
pub use teleport::{TeleportConfig, TeleportGate, TeleportPhase};
