//! Hotbar and item-frame drops.
//!
//! The back protocol can only drop from the selected slot. Drops from any
//! other hotbar slot go through a container click on the player inventory
//! instead, with the resulting slot contents predicted locally.

use bridge_shared::{
    block::Direction,
    inventory::{PlayerInventory, HOTBAR_SIZE},
    item::ItemStack,
    math::Vec3i,
    protocol::{
        back::{ClickKind, InteractAction, PlayerAction},
        front::SlotAction,
        BackPacket,
    },
};
use tracing::debug;

use crate::session::Session;

/// Drop gesture: `world_action` is the drop into the world, and
/// `container_action` the hotbar slot it came from. More than one item
/// leaving means the whole stack.
pub fn handle_hotbar_drop(
    session: &mut Session,
    world_action: &SlotAction,
    container_action: &SlotAction,
) {
    let drop_all = world_action.to_item.count > 1;
    let hotbar = container_action.slot as usize;

    if hotbar != session.inventory.held_slot() {
        drop_from_other_slot(session, hotbar, drop_all);
        return;
    }
    if session.inventory.item_in_hand().is_empty() {
        return;
    }

    let action = if drop_all {
        PlayerAction::DropItemStack
    } else {
        PlayerAction::DropItem
    };
    session.send_back(BackPacket::PlayerAction {
        action,
        position: Vec3i::ZERO,
        face: Direction::Down,
        sequence: 0,
    });

    if drop_all {
        session.inventory.set_item_in_hand(ItemStack::EMPTY);
    } else if let Some(stack) = session.inventory.item_in_hand_mut() {
        stack.sub(1);
    }
}

fn drop_from_other_slot(session: &mut Session, hotbar: usize, drop_all: bool) {
    if hotbar >= HOTBAR_SIZE {
        debug!(session = %session.name, hotbar, "drop from a non-hotbar slot ignored");
        return;
    }
    let slot = PlayerInventory::offset_for_hotbar(hotbar);

    let (click, predicted) = if drop_all {
        (ClickKind::DropAll, None)
    } else {
        let mut stack = session.inventory.item(slot);
        if stack.is_empty() {
            return;
        }
        stack.sub(1);
        (ClickKind::DropOne, stack.to_option())
    };

    let inventory = &session.inventory;
    session.send_back(BackPacket::ContainerClick {
        container_id: inventory.container_id(),
        state_id: inventory.state_id(),
        slot: slot as i32,
        click,
        carried: inventory.cursor().to_option(),
        changed_slots: vec![(slot as i32, predicted)],
    });
    session
        .inventory
        .set_item(slot, predicted.unwrap_or(ItemStack::EMPTY));
}

/// Removing an item from a frame is an attack on the frame entity.
pub fn translate_item_frame_drop(session: &mut Session, position: Vec3i) {
    let Some(frame) = session.entities.item_frame_at(position) else {
        return;
    };
    session.send_back(BackPacket::Interact {
        entity_id: frame.entity_id,
        action: InteractAction::Attack,
        sneaking: session.player.sneaking,
    });
}
