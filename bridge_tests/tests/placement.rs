//! Block placement: reach checks, heuristics, rollback and bookkeeping.

use bridge_shared::{
    block::{BlockStateId, Direction, FrontBlockId},
    config::TranslatorConfig,
    entity::{EntityKind, ItemFrame},
    item::{FrontItemData, Hand},
    math::{Vec3, Vec3i},
    protocol::{
        front::{ContainerKind, LAYER_BLOCK, LAYER_LIQUID},
        BackPacket, FrontPacket,
    },
};
use bridge_tests::{
    block_updates, ids::*, init_tracing, sequences, Harness, FLOOR_BLOCK, TOP_CENTER,
};
use bridge_translator::{
    collaborators::WorldState, memory::WorldBorder, session::GameMode,
    testing::RecordingServices,
};

const DOWN: i32 = 0;
const UP: i32 = 1;
const NORTH: i32 = 2;

fn stone_in_hand() -> Harness {
    init_tracing();
    let mut h = Harness::new();
    h.hold(0, STONE_ITEM, 16);
    h
}

/// Rollback sends both layers at `at`, then the held slot.
fn assert_rolled_back(h: &Harness, at: Vec3i, layer0: FrontBlockId) {
    let front = h.take_front();
    assert_eq!(
        block_updates(&front),
        vec![(at, LAYER_BLOCK, layer0), (at, LAYER_LIQUID, FRONT_AIR)]
    );
    assert!(
        front.iter().any(|p| matches!(
            p,
            FrontPacket::InventorySlot { container_id: 0, slot: 0, .. }
        )),
        "held slot refreshed: {front:?}"
    );
}

#[test]
fn accepted_placement_emits_use_item_on() {
    let mut h = stone_in_hand();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);

    assert_eq!(
        h.take_back(),
        vec![BackPacket::UseItemOn {
            position: FLOOR_BLOCK,
            face: Direction::Up,
            hand: Hand::Main,
            cursor: TOP_CENTER,
            inside_block: false,
            sequence: 1,
        }]
    );
    assert!(h.take_front().is_empty());

    let state = &h.session.interaction;
    assert_eq!(state.last_block_place_position, Some(Vec3i::new(1, 64, 0)));
    assert_eq!(state.last_block_placed_id.as_deref(), Some("minecraft:stone"));
    assert!(state.interacting);
}

#[test]
fn block_twenty_away_is_rolled_back() {
    let mut h = stone_in_hand();
    let far = Vec3i::new(20, 64, 0);
    let tx = h.place_tx(far, UP, TOP_CENTER);
    h.handle(tx);

    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, Vec3i::new(20, 65, 0), FRONT_AIR);
    assert_eq!(h.session.world_cache.current_sequence(), 0);
    assert!(!h.session.interaction.interacting);
}

#[test]
fn rollback_restores_waterlogged_and_skull_blocks() {
    init_tracing();
    let skull_at = Vec3i::new(2, 64, 0);
    let services = RecordingServices::new().with_skull(skull_at, FrontBlockId(777));
    let mut h = Harness::with(TranslatorConfig::default(), services);
    h.hold(0, STONE_ITEM, 16);

    // Held-item desync forces a rollback of the target cell.
    h.world.set_block(Vec3i::new(1, 64, 0), WATERLOGGED_SLAB);
    let mut tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    tx.item_in_hand = Some(FrontItemData::new(front(OAK_BOAT), 1));
    h.handle(tx);
    assert_eq!(
        block_updates(&h.take_front()),
        vec![
            (Vec3i::new(1, 64, 0), LAYER_BLOCK, FRONT_SLAB),
            (Vec3i::new(1, 64, 0), LAYER_LIQUID, FRONT_WATER),
        ]
    );

    h.clock.advance(500);
    h.world.set_block(skull_at, PLAYER_SKULL);
    let mut tx = h.place_tx(Vec3i::new(2, 63, 0), UP, TOP_CENTER);
    tx.item_in_hand = Some(FrontItemData::new(front(OAK_BOAT), 1));
    h.handle(tx);
    assert_eq!(
        block_updates(&h.take_front()),
        vec![
            (skull_at, LAYER_BLOCK, FrontBlockId(777)),
            (skull_at, LAYER_LIQUID, FRONT_AIR),
        ]
    );
    assert!(h.take_back().is_empty());
}

#[test]
fn repeat_click_within_window_is_silent() {
    let mut h = stone_in_hand();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx.clone());
    let first_time = h.session.interaction.last_interaction_time_ms;
    assert_eq!(h.take_back().len(), 1);

    h.clock.advance(50);
    h.handle(tx.clone());
    assert!(h.take_back().is_empty());
    assert!(h.take_front().is_empty());
    assert_eq!(h.session.interaction.last_interaction_time_ms, first_time);

    // 110 ms after the accepted click the window has closed.
    h.clock.advance(60);
    h.handle(tx);
    assert_eq!(sequences(&h.take_back()), vec![2]);
}

#[test]
fn different_block_is_not_spam() {
    let mut h = stone_in_hand();
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    h.clock.advance(20);
    let tx = h.place_tx(Vec3i::new(0, 63, 1), UP, TOP_CENTER);
    h.handle(tx);
    assert_eq!(sequences(&h.take_back()), vec![1, 2]);
}

#[test]
fn god_bridging_rejected_only_when_scaffolding_disabled() {
    init_tracing();
    let clicked = Vec3i::new(0, 64, 1);
    let click = Vec3::new(0.5, 0.5, 0.0);

    let mut h = Harness::with_config(TranslatorConfig {
        disable_front_scaffolding: true,
        ..TranslatorConfig::default()
    });
    h.hold(0, STONE_ITEM, 16);
    h.world.set_block(clicked, STONE);
    h.session.player.yaw = 180.0;
    let tx = h.place_tx(clicked, NORTH, click);
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, Vec3i::new(0, 64, 0), FRONT_AIR);

    let mut h = Harness::new();
    h.hold(0, STONE_ITEM, 16);
    h.world.set_block(clicked, STONE);
    h.session.player.yaw = 180.0;
    let tx = h.place_tx(clicked, NORTH, click);
    h.handle(tx);
    assert_eq!(sequences(&h.take_back()), vec![1]);
}

#[test]
fn ghost_placement_over_fence_is_rolled_back() {
    let mut h = stone_in_hand();
    h.world.set_block(Vec3i::new(1, 62, 0), FENCE);

    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx.clone());
    assert_eq!(h.take_back().len(), 1);

    h.clock.advance(150);
    h.handle(tx.clone());
    assert!(h.take_back().is_empty());
    assert_eq!(block_updates(&h.take_front()).len(), 2);

    h.clock.advance(100);
    h.handle(tx);
    assert_eq!(sequences(&h.take_back()), vec![2]);
}

#[test]
fn held_item_desync_rolls_back() {
    let mut h = stone_in_hand();
    let mut tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    tx.item_in_hand = None;
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, Vec3i::new(1, 64, 0), FRONT_AIR);
}

#[test]
fn outside_world_border_rolls_back() {
    let mut h = stone_in_hand();
    h.world.set_border(Some(WorldBorder::centered(0.0, 0.0, 2.0)));
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, Vec3i::new(1, 64, 0), FRONT_AIR);
}

#[test]
fn click_outside_block_rolls_back() {
    let mut h = stone_in_hand();
    let tx = h.place_tx(FLOOR_BLOCK, UP, Vec3::new(0.5, 2.0, 0.5));
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_eq!(block_updates(&h.take_front()).len(), 2);
}

#[test]
fn block_far_above_the_feet_is_rolled_back() {
    let mut h = stone_in_hand();
    // Within reach of the eye but more than twelve blocks from the feet.
    let overhead = Vec3i::new(0, 76, 0);
    let tx = h.place_tx(overhead, DOWN, Vec3::new(0.5, 0.0, 0.5));
    h.handle(tx);

    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, Vec3i::new(0, 75, 0), FRONT_AIR);
    assert!(h.session.interaction.last_block_place_position.is_none());
}

#[test]
fn placement_past_the_top_cell_rolls_back_the_clicked_cell() {
    let mut h = stone_in_hand();
    let top = Vec3i::new(0, i32::MAX, 0);
    let tx = h.place_tx(top, UP, TOP_CENTER);
    h.handle(tx);

    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, top, FRONT_AIR);
    assert_eq!(h.session.world_cache.current_sequence(), 0);
}

#[test]
fn invalid_face_rolls_back_clicked_cell() {
    let mut h = stone_in_hand();
    let tx = h.place_tx(FLOOR_BLOCK, 9, TOP_CENTER);
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_rolled_back(&h, FLOOR_BLOCK, FRONT_STONE);
}

#[test]
fn item_frame_block_is_routed_to_the_entity() {
    let mut h = stone_in_hand();
    let cell = Vec3i::new(1, 64, 0);
    h.spawn(
        30,
        300,
        Vec3::new(1.5, 64.5, 0.5),
        EntityKind::ItemFrame(ItemFrame { has_item: true }),
    );
    let mut tx = h.place_tx(cell, NORTH, Vec3::new(0.5, 0.5, 0.0));
    tx.block_definition = FRONT_ITEM_FRAME;
    h.handle(tx);

    let back = h.take_back();
    assert!(back
        .iter()
        .all(|p| matches!(p, BackPacket::Interact { entity_id: 30, .. })));
    assert_eq!(back.len(), 2, "{back:?}");
    assert_eq!(h.session.world_cache.current_sequence(), 0);
}

#[test]
fn jigsaw_opens_editor_for_creative_operator() {
    let mut h = stone_in_hand();
    h.session.player.game_mode = GameMode::Creative;
    h.session.player.op_permission_level = 2;
    let mut tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    tx.block_definition = FRONT_JIGSAW;
    h.handle(tx);

    assert_eq!(
        h.take_front(),
        vec![FrontPacket::ContainerOpen {
            id: 1,
            container: ContainerKind::JigsawEditor,
            position: FLOOR_BLOCK,
            unique_entity_id: -1,
        }]
    );
}

#[test]
fn jigsaw_needs_operator() {
    let mut h = stone_in_hand();
    h.session.player.game_mode = GameMode::Creative;
    h.session.player.op_permission_level = 1;
    let mut tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    tx.block_definition = FRONT_JIGSAW;
    h.handle(tx);
    assert!(h.take_front().is_empty());
}

#[test]
fn non_block_item_leaves_placement_markers_alone() {
    let mut h = Harness::new();
    h.hold(0, STICK, 1);
    let tx = h.place_tx(FLOOR_BLOCK, UP, TOP_CENTER);
    h.handle(tx);
    assert_eq!(h.take_back().len(), 1);
    assert_eq!(h.session.interaction.last_block_place_position, None);
    assert!(h.session.interaction.interacting);
}

#[test]
fn fresh_harness_has_only_the_floor() {
    let h = Harness::new();
    assert_eq!(h.world.block_at(Vec3i::new(0, 64, 0)), BlockStateId::AIR);
    assert_eq!(h.world.block_at(FLOOR_BLOCK), STONE);
}
