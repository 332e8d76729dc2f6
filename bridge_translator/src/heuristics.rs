//! Placement heuristics: bridging, ghost duplicates, click spam.
//!
//! The pure predicates take plain values; the `check_*`/`register_*`
//! helpers read and update the session's interaction timers.

use bridge_shared::{block::BlockTraits, block::Direction, math::Vec3i};

use crate::{rejection::Rejection, session::Session};

/// Minimum spacing between two clicks on the same block.
pub const SPAM_WINDOW_MS: i64 = 110;
pub const SPAM_POSITION_EPSILON: f64 = 0.00001;

/// Window in which a placement over an extended collision block is a ghost
/// repeat of the previous one.
pub const EXTENDED_COLLISION_WINDOW_MS: i64 = 200;

/// Placing against the side of a block while looking away from it.
///
/// The yaw ranges are tuned against the front client; keep the literal
/// boundaries.
pub fn is_god_bridging(face: Direction, yaw: f32) -> bool {
    match face {
        Direction::North => yaw <= -135.0 || yaw > 135.0,
        Direction::South => yaw <= 45.0 && yaw > -45.0,
        Direction::West => yaw > 45.0 && yaw <= 135.0,
        Direction::East => yaw <= -45.0 && yaw > -135.0,
        Direction::Down | Direction::Up => false,
    }
}

/// Cell whose extended collision box could have absorbed the previous
/// placement, relative to the new placement cell.
pub fn extended_collision_probe(face: Direction, place_position: Vec3i) -> Option<Vec3i> {
    let (dx, dy, dz) = match face {
        Direction::Up => (0, -2, 0),
        Direction::North => (0, -1, 1),
        Direction::South => (0, -1, -1),
        Direction::West => (1, -1, 0),
        Direction::East => (-1, -1, 0),
        Direction::Down => return None,
    };
    place_position.checked_add(dx, dy, dz)
}

pub fn is_click_spam(elapsed_ms: i64, clicked: Vec3i, last_clicked: Vec3i) -> bool {
    elapsed_ms < SPAM_WINDOW_MS && clicked.distance_sq(last_clicked) < SPAM_POSITION_EPSILON
}

/// Rejects a placement that repeats one just absorbed by an extended
/// collision block below it.
pub fn check_extended_collision(
    session: &Session,
    face: Direction,
    place_position: Vec3i,
) -> Result<(), Rejection> {
    if !session.registries.has_extended_collision() {
        return Ok(());
    }
    let Some(probe) = extended_collision_probe(face, place_position) else {
        return Ok(());
    };
    let below = session.world.block_at(probe);
    let elapsed = session.now_ms() - session.interaction.last_interaction_time_ms;
    if session
        .registries
        .block_traits(below)
        .contains(BlockTraits::EXTENDED_COLLISION)
        && elapsed < EXTENDED_COLLISION_WINDOW_MS
    {
        return Err(Rejection::ExtendedCollisionDuplicate);
    }
    Ok(())
}

/// Records a click on `clicked`. Returns `false` for spam, leaving the
/// markers untouched so a held-down click keeps its original timestamp.
pub fn register_click(session: &mut Session, clicked: Vec3i) -> bool {
    let now = session.now_ms();
    let state = &mut session.interaction;
    if is_click_spam(
        now - state.last_interaction_time_ms,
        clicked,
        state.last_interaction_block_position,
    ) {
        return false;
    }
    state.last_interaction_time_ms = now;
    state.last_interaction_block_position = clicked;
    state.last_interaction_player_position = session.player.position;
    true
}
