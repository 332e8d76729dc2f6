//! Look-direction correction for item use.
//!
//! The back server decides what an item use targets from the player's
//! rotation, while the front client reports the clicked point. Before such a
//! use we turn the player towards the point and, if that changed the
//! rotation noticeably, turn them back shortly after.

use std::time::Duration;

use bridge_shared::{
    math::{Vec3, Vec3d},
    protocol::BackPacket,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{scheduler::DeferredTask, session::Session};

/// Delay before the original rotation is restored.
pub const REVERT_DELAY: Duration = Duration::from_millis(150);

/// Rotation changes at or below this many degrees are not reverted.
pub const REVERT_THRESHOLD_DEGREES: f32 = 1.0;

/// Position and rotation captured when a correction is sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSnapshot {
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Yaw and pitch, in degrees, from an eye at `feet + eye_height` to `target`.
pub fn rotation_towards(feet: Vec3d, eye_height: f32, target: Vec3) -> (f32, f32) {
    let dx = (target.x as f64 - feet.x) as f32;
    let dy = (target.y as f64 - (feet.y + eye_height as f64)) as f32;
    let dz = (target.z as f64 - feet.z) as f32;

    let yaw = -(dx as f64).atan2(dz as f64).to_degrees() as f32;
    let xz = ((dx * dx + dz * dz) as f64).sqrt();
    let pitch = -(dy as f64).atan2(xz).to_degrees() as f32;
    (yaw, pitch)
}

/// Turns the player towards `target` on the back server, scheduling a revert
/// when the turn is larger than [`REVERT_THRESHOLD_DEGREES`].
pub fn look_at(session: &mut Session, target: Vec3) {
    let player = &session.player;
    let feet = player.back_position;
    let (yaw, pitch) = rotation_towards(feet, player.eye_height, target);
    let original = RotationSnapshot {
        position: feet,
        yaw: player.yaw,
        pitch: player.pitch,
        on_ground: player.on_ground,
    };

    session.send_back(BackPacket::MovePlayerPosRot {
        on_ground: original.on_ground,
        position: feet,
        yaw,
        pitch,
    });

    if let Some(previous) = session.interaction.scheduled_rotation_revert.take() {
        previous.cancel();
    }
    if (original.yaw - yaw).abs() > REVERT_THRESHOLD_DEGREES
        || (original.pitch - pitch).abs() > REVERT_THRESHOLD_DEGREES
    {
        let handle = session
            .scheduler
            .schedule(REVERT_DELAY, DeferredTask::RevertRotation(original));
        session.interaction.scheduled_rotation_revert = Some(handle);
    }
}

/// Re-sends the captured rotation unless the player has moved or turned
/// since it was captured.
pub fn revert_rotation(session: &Session, original: &RotationSnapshot) {
    let player = &session.player;
    if player.back_position != original.position
        || player.yaw != original.yaw
        || player.pitch != original.pitch
    {
        debug!(session = %session.name, "player moved, keeping rotation");
        return;
    }
    session.send_back(BackPacket::MovePlayerPosRot {
        on_ground: original.on_ground,
        position: original.position,
        yaw: original.yaw,
        pitch: original.pitch,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEET: Vec3d = Vec3d::new(0.0, 64.0, 0.0);
    const EYE: f32 = 1.62;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn straight_ahead_along_z_is_zero_yaw() {
        let (yaw, pitch) = rotation_towards(FEET, EYE, Vec3::new(0.0, 65.62, 5.0));
        assert!(approx(yaw, 0.0), "{yaw}");
        assert!(approx(pitch, 0.0), "{pitch}");
    }

    #[test]
    fn positive_x_is_negative_ninety() {
        let (yaw, _) = rotation_towards(FEET, EYE, Vec3::new(5.0, 65.62, 0.0));
        assert!(approx(yaw, -90.0), "{yaw}");
        let (yaw, _) = rotation_towards(FEET, EYE, Vec3::new(-5.0, 65.62, 0.0));
        assert!(approx(yaw, 90.0), "{yaw}");
    }

    #[test]
    fn looking_down_is_positive_pitch() {
        let (_, pitch) = rotation_towards(FEET, EYE, Vec3::new(0.0, 60.62, 5.0));
        assert!(approx(pitch, 45.0), "{pitch}");
    }

    #[test]
    fn eye_height_changes_pitch() {
        let (_, standing) = rotation_towards(FEET, EYE, Vec3::new(0.0, 64.0, 2.0));
        let (_, crouching) = rotation_towards(FEET, 1.27, Vec3::new(0.0, 64.0, 2.0));
        assert!(crouching < standing);
    }
}
