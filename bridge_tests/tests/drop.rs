//! Dropping from the hotbar.

use bridge_shared::{
    block::Direction,
    inventory::PlayerInventory,
    item::ItemStack,
    math::Vec3i,
    protocol::{
        back::{ClickKind, PlayerAction},
        front::SourceKind,
        BackPacket,
    },
};
use bridge_tests::{ids::*, init_tracing, Harness};

fn harness() -> Harness {
    init_tracing();
    let mut h = Harness::new();
    h.hold(0, STONE_ITEM, 5);
    h
}

fn drop_action(action: PlayerAction) -> BackPacket {
    BackPacket::PlayerAction {
        action,
        position: Vec3i::ZERO,
        face: Direction::Down,
        sequence: 0,
    }
}

#[test]
fn selected_slot_drops_one() {
    let mut h = harness();
    let tx = h.drop_tx(0, 1);
    h.handle(tx);
    assert_eq!(h.take_back(), vec![drop_action(PlayerAction::DropItem)]);
    assert_eq!(h.session.inventory.item_in_hand(), ItemStack::new(STONE_ITEM, 4));
}

#[test]
fn selected_slot_drops_whole_stack() {
    let mut h = harness();
    let tx = h.drop_tx(0, 5);
    h.handle(tx);
    assert_eq!(h.take_back(), vec![drop_action(PlayerAction::DropItemStack)]);
    assert!(h.session.inventory.item_in_hand().is_empty());
}

#[test]
fn last_item_empties_the_slot() {
    let mut h = harness();
    h.hold(0, STONE_ITEM, 1);
    let tx = h.drop_tx(0, 1);
    h.handle(tx);
    assert_eq!(h.session.inventory.item_in_hand(), ItemStack::EMPTY);
}

#[test]
fn empty_hand_drops_nothing() {
    init_tracing();
    let mut h = Harness::new();
    let tx = h.drop_tx(0, 1);
    h.handle(tx);
    assert!(h.take_back().is_empty());
}

#[test]
fn other_slot_drop_all_goes_through_a_container_click() {
    let mut h = harness();
    let slot = PlayerInventory::offset_for_hotbar(3);
    h.give(slot, STICK, 5);
    let tx = h.drop_tx(3, 5);
    h.handle(tx);

    assert_eq!(
        h.take_back(),
        vec![BackPacket::ContainerClick {
            container_id: 0,
            state_id: 0,
            slot: 39,
            click: ClickKind::DropAll,
            carried: None,
            changed_slots: vec![(39, None)],
        }]
    );
    assert!(h.session.inventory.item(slot).is_empty());
    assert_eq!(h.session.inventory.item_in_hand(), ItemStack::new(STONE_ITEM, 5));
}

#[test]
fn other_slot_drop_one_predicts_the_remainder() {
    let mut h = harness();
    h.session.inventory.set_state_id(12);
    let slot = PlayerInventory::offset_for_hotbar(3);
    h.give(slot, STICK, 5);
    let tx = h.drop_tx(3, 1);
    h.handle(tx);

    let remainder = ItemStack::new(STICK, 4);
    assert_eq!(
        h.take_back(),
        vec![BackPacket::ContainerClick {
            container_id: 0,
            state_id: 12,
            slot: 39,
            click: ClickKind::DropOne,
            carried: None,
            changed_slots: vec![(39, Some(remainder))],
        }]
    );
    assert_eq!(h.session.inventory.item(slot), remainder);
}

#[test]
fn carried_stack_is_reported() {
    let mut h = harness();
    let cursor = ItemStack::new(STICK, 2);
    h.session.inventory.set_cursor(cursor);
    h.give(PlayerInventory::offset_for_hotbar(1), STONE_ITEM, 3);
    let tx = h.drop_tx(1, 3);
    h.handle(tx);
    assert!(matches!(
        h.take_back().as_slice(),
        [BackPacket::ContainerClick { carried: Some(c), .. }] if *c == cursor
    ));
}

#[test]
fn empty_other_slot_drops_nothing() {
    let mut h = harness();
    let tx = h.drop_tx(4, 1);
    h.handle(tx);
    assert!(h.take_back().is_empty());
}

#[test]
fn slot_outside_the_hotbar_is_ignored() {
    let mut h = harness();
    let tx = h.drop_tx(20, 1);
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_eq!(h.session.inventory.item_in_hand(), ItemStack::new(STONE_ITEM, 5));
}

#[test]
fn creative_source_is_not_a_drop() {
    let mut h = harness();
    let mut tx = h.drop_tx(0, 1);
    tx.actions[0].source.kind = SourceKind::Creative;
    h.handle(tx);
    assert!(h.take_back().is_empty());
    assert_eq!(h.session.inventory.item_in_hand(), ItemStack::new(STONE_ITEM, 5));
}
