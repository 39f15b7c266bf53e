//! Marsh Core - Core types and utilities for the Marsh prototype
//!
//! This crate provides the foundational types used throughout the game:
//! - Mathematical primitives (re-exported from glam)
//! - Transform, object IDs, and collision layer masks
//! - Frame/fixed-step time and one-shot countdowns
//! - Traits for the host services gameplay code consumes

pub mod services;
pub mod time;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use services::{Animator, Body, SpatialQuery};
pub use time::{Countdown, GameTime, TimeConfig};
pub use types::{LayerMask, ObjectId, Transform};
