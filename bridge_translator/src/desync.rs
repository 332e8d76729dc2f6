//! Rolls the client back to authoritative block and slot state.

use bridge_shared::{
    block::BlockTraits,
    inventory::{PlayerInventory, HOTBAR_SIZE},
    math::Vec3i,
    protocol::{
        front::{UpdateBlockFlags, LAYER_BLOCK, LAYER_LIQUID},
        FrontPacket, InventoryTransaction,
    },
};
use tracing::debug;

use crate::session::Session;

/// Re-sends the authoritative block at `position` on both layers, then the
/// hotbar slot the client acted with. Safe to repeat.
pub fn restore_correct_block(session: &Session, position: Vec3i, hotbar_slot: u32) {
    let state = session.world.block_at(position);
    let traits = session.registries.block_traits(state);

    let mut block = session.registries.front_block(state);
    if traits.contains(BlockTraits::PLAYER_SKULL) {
        if let Some(custom) = session.services.custom_skull_block(position) {
            block = custom;
        }
    }
    session.send_front(FrontPacket::UpdateBlock {
        position,
        data_layer: LAYER_BLOCK,
        block,
        flags: UpdateBlockFlags::ALL_PRIORITY,
    });

    let liquid = if traits.contains(BlockTraits::WATERLOGGED) {
        session.registries.front_water()
    } else {
        session.registries.front_air()
    };
    session.send_front(FrontPacket::UpdateBlock {
        position,
        data_layer: LAYER_LIQUID,
        block: liquid,
        flags: UpdateBlockFlags::ALL_PRIORITY,
    });

    refresh_hotbar_slot(session, hotbar_slot);
}

/// Sends the authoritative contents of an absolute inventory slot.
pub fn refresh_slot(session: &Session, slot: usize) {
    let Some((container_id, front_slot)) = PlayerInventory::front_location(slot) else {
        return;
    };
    let item = session.registries.front_item(&session.inventory.item(slot));
    session.send_front(FrontPacket::InventorySlot {
        container_id,
        slot: front_slot,
        item,
    });
}

pub fn refresh_hotbar_slot(session: &Session, hotbar_slot: u32) {
    let hotbar = hotbar_slot as usize;
    if hotbar < HOTBAR_SIZE {
        refresh_slot(session, PlayerInventory::offset_for_hotbar(hotbar));
    }
}

/// Whether the item the client claims to hold differs from the
/// authoritative stack in the slot it names.
pub fn is_incorrect_held_item(session: &Session, tx: &InventoryTransaction) -> bool {
    let slot = PlayerInventory::offset_for_hotbar(tx.hotbar_slot as usize);
    let expected = session
        .registries
        .front_item(&session.inventory.item(slot))
        .definition;
    let received = tx.declared_item().definition;
    if expected != received {
        debug!(
            session = %session.name,
            ?expected,
            ?received,
            hotbar_slot = tx.hotbar_slot,
            "held item desynced"
        );
        return true;
    }
    false
}
