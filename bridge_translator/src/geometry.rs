//! Reach and click-position checks.
//!
//! These replicate the back server's own acceptance rules, including which
//! comparisons run in single vs double precision, so that anything the
//! server would refuse is rolled back on the client immediately. Distances
//! are compared squared; no square roots.

use bridge_shared::math::{Vec3, Vec3i};

use crate::rejection::Rejection;

/// Offset from a player's feet to the front protocol's reported position.
pub const PLAYER_EYE_OFFSET: f32 = 1.62;

pub const MAX_PLACE_DISTANCE_SQ: f32 = 144.0;
pub const MAX_EYE_PLACE_DISTANCE_SQ: f32 = 144.0;
pub const MAX_BREAK_DISTANCE_SQ: f32 = 144.0;

/// Per-axis bound between click point and block centre.
pub const MAX_CLICK_DEVIATION: f64 = 1.0000001;

/// Added to the vertical difference when breaking, approximating crouch height.
pub const BREAK_HEIGHT_OFFSET: f32 = 1.5;

/// Front position lowered so it sits at the player's current eye height.
pub fn eye_position(front_position: Vec3, eye_height: f32) -> Vec3 {
    front_position.down(PLAYER_EYE_OFFSET - eye_height)
}

pub fn eye_to_block_sq(eye: Vec3, block: Vec3i) -> f32 {
    let dx = eye.x - block.x as f32;
    let dy = eye.y - block.y as f32;
    let dz = eye.z - block.z as f32;
    dx * dx + dy * dy + dz * dz
}

/// Block origin plus sub-block click offset, in double precision.
pub fn click_point(block: Vec3i, click: Vec3) -> [f64; 3] {
    [
        block.x as f64 + click.x as f64,
        block.y as f64 + click.y as f64,
        block.z as f64 + click.z as f64,
    ]
}

pub fn eye_to_click_sq(eye: Vec3, block: Vec3i, click: Vec3) -> f64 {
    let [cx, cy, cz] = click_point(block, click);
    let dx = eye.x as f64 - cx;
    let dy = eye.y as f64 - cy;
    let dz = eye.z as f64 - cz;
    dx * dx + dy * dy + dz * dz
}

pub fn feet_to_center_sq(front_position: Vec3, block: Vec3i) -> f32 {
    front_position
        .down(PLAYER_EYE_OFFSET)
        .distance_sq(block.center())
}

/// Whether the click point lies within one block of the block centre on
/// every axis.
pub fn click_within_block(block: Vec3i, click: Vec3) -> bool {
    let point = click_point(block, click);
    let center = block.center();
    let center = [center.x as f64, center.y as f64, center.z as f64];
    point
        .iter()
        .zip(center.iter())
        .all(|(p, c)| (p - c).abs() < MAX_CLICK_DEVIATION)
}

pub fn break_distance_sq(front_position: Vec3, block: Vec3i) -> f32 {
    let block = block.to_f32();
    let dx = front_position.x - (block.x + 0.5);
    let dy = (front_position.y - PLAYER_EYE_OFFSET) - (block.y + 0.5) + BREAK_HEIGHT_OFFSET;
    let dz = front_position.z - (block.z + 0.5);
    dx * dx + dy * dy + dz * dz
}

/// Every placement reach check, in the order the server applies them.
pub fn check_place_reach(
    front_position: Vec3,
    eye_height: f32,
    block: Vec3i,
    click: Vec3,
) -> Result<(), Rejection> {
    let eye = eye_position(front_position, eye_height);

    let distance_sq = eye_to_block_sq(eye, block);
    if distance_sq > MAX_EYE_PLACE_DISTANCE_SQ {
        return Err(Rejection::EyeTooFar {
            distance_sq,
            max: MAX_EYE_PLACE_DISTANCE_SQ,
        });
    }

    let distance_sq = eye_to_click_sq(eye, block, click);
    let max = MAX_EYE_PLACE_DISTANCE_SQ as f64;
    if distance_sq > max {
        return Err(Rejection::ClickPointTooFar { distance_sq, max });
    }

    let distance_sq = feet_to_center_sq(front_position, block);
    // NaN must fail too.
    if !(distance_sq < MAX_PLACE_DISTANCE_SQ) {
        return Err(Rejection::CenterTooFar {
            distance_sq,
            max: MAX_PLACE_DISTANCE_SQ,
        });
    }

    if !click_within_block(block, click) {
        return Err(Rejection::ClickOutsideBlock);
    }
    Ok(())
}

pub fn check_break_reach(front_position: Vec3, block: Vec3i) -> Result<(), Rejection> {
    let distance_sq = break_distance_sq(front_position, block);
    if distance_sq > MAX_BREAK_DISTANCE_SQ {
        return Err(Rejection::BreakTooFar {
            distance_sq,
            max: MAX_BREAK_DISTANCE_SQ,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EYE: f32 = PLAYER_EYE_OFFSET;

    #[test]
    fn eye_position_tracks_crouching() {
        let p = eye_position(Vec3::new(0.0, 65.62, 0.0), 1.27);
        assert!((p.y - 65.27).abs() < 1e-4);
    }

    #[test]
    fn adjacent_block_is_in_reach() {
        let player = Vec3::new(0.5, 64.0 + EYE, 0.5);
        let block = Vec3i::new(1, 63, 0);
        assert_eq!(
            check_place_reach(player, EYE, block, Vec3::new(0.5, 1.0, 0.5)),
            Ok(())
        );
    }

    #[test]
    fn twenty_blocks_away_is_rejected_first_by_eye_check() {
        let player = Vec3::new(0.0, 64.0 + EYE, 0.0);
        let block = Vec3i::new(20, 64 + 1, 0);
        let err = check_place_reach(player, EYE, block, Vec3::new(0.5, 0.5, 0.0)).unwrap_err();
        assert!(matches!(err, Rejection::EyeTooFar { .. }), "{err:?}");
    }

    #[test]
    fn eye_boundary_is_inclusive() {
        // Exactly 12 blocks: 144 is not greater than 144.
        let eye = Vec3::new(0.0, 0.0, 0.0);
        assert_eq!(eye_to_block_sq(eye, Vec3i::new(12, 0, 0)), 144.0);
    }

    #[test]
    fn click_offset_can_push_past_the_limit() {
        // Block origin is within 12, but the clicked corner is not.
        let player = Vec3::new(0.0, EYE, 0.0);
        let block = Vec3i::new(11, 0, 4);
        assert!(eye_to_block_sq(player.down(0.0), block) <= 144.0);
        let err = check_place_reach(player, EYE, block, Vec3::new(1.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, Rejection::ClickPointTooFar { .. }), "{err:?}");
    }

    #[test]
    fn block_overhead_fails_the_feet_check() {
        // Eye is 10.38 below the block; feet are 12.5 below its centre.
        let player = Vec3::new(0.5, 64.0 + EYE, 0.5);
        let block = Vec3i::new(0, 76, 0);
        let err = check_place_reach(player, EYE, block, Vec3::new(0.5, 0.0, 0.5)).unwrap_err();
        assert!(matches!(err, Rejection::CenterTooFar { .. }), "{err:?}");
    }

    #[test]
    fn click_bound_is_strict() {
        let block = Vec3i::new(0, 0, 0);
        assert!(click_within_block(block, Vec3::new(1.0, 1.0, 0.0)));
        assert!(!click_within_block(block, Vec3::new(1.6, 0.5, 0.5)));
        assert!(!click_within_block(block, Vec3::new(0.5, -0.6, 0.5)));
    }

    #[test]
    fn break_uses_crouch_offset() {
        // Feet level with the block: vertical diff is -0.5 + 1.5 = 1.0.
        let player = Vec3::new(0.5, 64.0 + EYE, 0.5);
        let d = break_distance_sq(player, Vec3i::new(0, 64, 0));
        assert!((d - 1.0).abs() < 1e-4, "{d}");
    }

    #[test]
    fn break_far_away_is_rejected() {
        let player = Vec3::new(0.5, 64.0 + EYE, 0.5);
        assert!(check_break_reach(player, Vec3i::new(0, 64, 15)).is_err());
        assert!(check_break_reach(player, Vec3i::new(0, 64, 5)).is_ok());
    }
}
