//! Core types shared by every Marsh crate

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene object (actor, item, platform, gate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Pack the ID into a collider's 128-bit user data slot
    pub fn to_bits(self) -> u128 {
        self.0.as_u128()
    }

    /// Recover an ID stored with [`ObjectId::to_bits`]
    pub fn from_bits(bits: u128) -> Self {
        Self(Uuid::from_u128(bits))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit set of collision layers, used to filter spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const DEFAULT: LayerMask = LayerMask(1 << 0);
    pub const GROUND: LayerMask = LayerMask(1 << 1);
    pub const PLAYER: LayerMask = LayerMask(1 << 2);
    pub const ITEMS: LayerMask = LayerMask(1 << 3);
    pub const TRIGGERS: LayerMask = LayerMask(1 << 4);

    /// Union of two masks
    pub const fn with(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    /// Whether any layer is shared between the two masks
    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Transform component representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Rotate by the given quaternion (applied in world space)
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = rotation * self.rotation;
    }

    /// Rotate around the world up axis by `degrees`
    pub fn rotate_yaw(&mut self, degrees: f32) {
        self.rotate(Quat::from_rotation_y(degrees.to_radians()));
    }

    /// Rotate around the local Z axis by `degrees`
    pub fn rotate_roll(&mut self, degrees: f32) {
        self.rotation *= Quat::from_rotation_z(degrees.to_radians());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_bits_round_trip() {
        let id = ObjectId::new();
        assert_eq!(ObjectId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_layer_mask_intersects() {
        let mask = LayerMask::GROUND.with(LayerMask::DEFAULT);
        assert!(mask.intersects(LayerMask::GROUND));
        assert!(!mask.intersects(LayerMask::ITEMS));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }

    #[test]
    fn test_yaw_turns_forward() {
        let mut transform = Transform::default();
        assert!((transform.forward() - Vec3::NEG_Z).length() < 1e-5);

        transform.rotate_yaw(90.0);
        // Positive yaw is counter-clockwise seen from above: -Z turns to -X
        assert!((transform.forward() - Vec3::NEG_X).length() < 1e-5);
    }
}
