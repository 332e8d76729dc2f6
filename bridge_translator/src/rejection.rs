//! Reasons a client-declared action is rolled back.
//!
//! These are never surfaced to the player; they exist so every rollback is
//! logged with a cause.

use bridge_shared::math::Vec3i;

/// Validation failure that triggers desync recovery.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("invalid block face {0}")]
    InvalidFace(i32),
    #[error("no cell beyond face {face} of {clicked:?}")]
    CellOutOfRange { clicked: Vec3i, face: i32 },
    #[error("bridging placement on face {face} at yaw {yaw}")]
    GodBridging { face: i32, yaw: f32 },
    #[error("repeat placement over an extended collision block")]
    ExtendedCollisionDuplicate,
    #[error("held item does not match the authoritative hand slot")]
    HeldItemDesync,
    #[error("target outside the world border")]
    OutsideBorder,
    #[error("eye to block distance {distance_sq} exceeds {max}")]
    EyeTooFar { distance_sq: f32, max: f32 },
    #[error("eye to click point distance {distance_sq} exceeds {max}")]
    ClickPointTooFar { distance_sq: f64, max: f64 },
    #[error("feet to block centre distance {distance_sq} not below {max}")]
    CenterTooFar { distance_sq: f32, max: f32 },
    #[error("click point lies outside the clicked block")]
    ClickOutsideBlock,
    #[error("break distance {distance_sq} exceeds {max}")]
    BreakTooFar { distance_sq: f32, max: f32 },
}
