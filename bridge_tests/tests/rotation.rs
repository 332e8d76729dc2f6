//! Rotation correction and its delayed revert, with the manual scheduler and
//! through a live session driver.

use std::{sync::Arc, time::Duration};

use bridge_shared::{
    math::{Vec3d, Vec3i},
    protocol::{BackPacket, InboundPacket},
};
use bridge_tests::{ids::*, init_tracing, Harness, FEET, FLOOR_BLOCK, TOP_CENTER};
use bridge_translator::{
    rotation::REVERT_DELAY,
    scheduler::{ScheduledTask, TokioScheduler},
    Session, SessionDriver,
};
use tokio::sync::mpsc;

const UP: i32 = 1;

fn boat() -> Harness {
    init_tracing();
    let mut h = Harness::new();
    h.hold(0, OAK_BOAT, 1);
    h
}

/// `(yaw, pitch)` of every rotation packet.
fn rotations(back: &[BackPacket]) -> Vec<(f32, f32)> {
    back.iter()
        .filter_map(|p| match p {
            BackPacket::MovePlayerPosRot { yaw, pitch, .. } => Some((*yaw, *pitch)),
            _ => None,
        })
        .collect()
}

#[test]
fn revert_is_scheduled_after_a_large_turn() {
    let mut h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    assert_eq!(h.scheduler.live(), 1);
    assert_eq!(h.scheduler.delays(), vec![REVERT_DELAY]);
    assert!(h.session.interaction.scheduled_rotation_revert.is_some());
}

#[test]
fn overlapping_turns_keep_one_live_revert() {
    let mut h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    let tx = h.place_tx(Vec3i::new(0, 63, 1), UP, TOP_CENTER);
    h.handle(tx);

    assert_eq!(h.scheduler.queued(), 2);
    assert_eq!(h.scheduler.live(), 1);
}

#[test]
fn fired_revert_restores_the_original_rotation() {
    let mut h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    let tx = h.place_tx(Vec3i::new(0, 63, 1), UP, TOP_CENTER);
    h.handle(tx);
    h.take_back();

    h.fire_scheduled();
    assert_eq!(
        h.take_back(),
        vec![BackPacket::MovePlayerPosRot {
            on_ground: true,
            position: FEET,
            yaw: 0.0,
            pitch: 0.0,
        }]
    );
    assert!(h.session.interaction.scheduled_rotation_revert.is_none());
}

#[test]
fn revert_is_skipped_once_the_player_moved() {
    let mut h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    h.take_back();

    h.session.player.back_position = Vec3d::new(0.5, 64.0, 1.5);
    h.fire_scheduled();
    assert!(h.take_back().is_empty());
}

#[test]
fn revert_is_skipped_once_the_player_turned() {
    let mut h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    h.take_back();

    h.session.player.yaw = 45.0;
    h.fire_scheduled();
    assert!(h.take_back().is_empty());
}

/// Harness whose session uses the tokio timer, split into the session and
/// its fired-task receiver.
fn live_session(h: Harness) -> (Session, mpsc::UnboundedReceiver<ScheduledTask>) {
    let (scheduler, fired) = TokioScheduler::new();
    let mut session = h.session;
    session.scheduler = Arc::new(scheduler);
    (session, fired)
}

#[tokio::test(start_paused = true)]
async fn driver_delivers_the_revert() -> anyhow::Result<()> {
    let h = boat();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    let back = h.back.clone();
    let (session, fired) = live_session(h);

    let (inbound, driver) = SessionDriver::spawn(session, fired);
    inbound.send(InboundPacket::InventoryTransaction(tx)).await?;
    tokio::time::sleep(REVERT_DELAY + Duration::from_millis(50)).await;
    drop(inbound);
    let session = driver.await?;

    let turns = rotations(&back.take());
    assert_eq!(turns.len(), 2, "{turns:?}");
    assert!((turns[0].0 + 90.0).abs() < 1e-3);
    assert_eq!(turns[1], (0.0, 0.0));
    assert!(session.interaction.scheduled_rotation_revert.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn newer_turn_cancels_the_pending_revert() -> anyhow::Result<()> {
    let h = boat();
    let first = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    let second = h.place_tx(Vec3i::new(0, 63, 1), UP, TOP_CENTER);
    let back = h.back.clone();
    let (session, fired) = live_session(h);

    let (inbound, driver) = SessionDriver::spawn(session, fired);
    inbound.send(InboundPacket::InventoryTransaction(first)).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    inbound.send(InboundPacket::InventoryTransaction(second)).await?;
    tokio::time::sleep(REVERT_DELAY * 3).await;
    drop(inbound);
    driver.await?;

    let turns = rotations(&back.take());
    assert_eq!(turns.len(), 3, "{turns:?}");
    assert_eq!(turns[2], (0.0, 0.0));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn driver_returns_the_session_when_inbound_closes() -> anyhow::Result<()> {
    let h = boat();
    let (session, fired) = live_session(h);
    let (inbound, driver) = SessionDriver::spawn(session, fired);
    inbound
        .send(InboundPacket::BlockChangedAck { sequence: 3 })
        .await?;
    drop(inbound);
    let session = driver.await?;
    assert_eq!(session.name, "tester");
    Ok(())
}
