//! Item-specific follow-ups to a block placement.
//!
//! Some items act on the world through a plain use-item on the back server
//! rather than through use-item-on-block; the front client reports both as a
//! placement.

use bridge_shared::{
    block::{BlockStateId, BlockTraits},
    inventory::PlayerInventory,
    item::{BucketKind, Hand, ItemKind},
    protocol::{BackPacket, InventoryTransaction},
};
use tracing::trace;

use crate::{desync, rotation, session::Session};

/// Whether a placement continues to its bookkeeping after the side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementFlow {
    Continue,
    Stop,
}

/// Sends a use-item for the held stack aimed at the clicked point. Returns
/// whether anything was sent.
pub fn use_item(session: &mut Session, tx: &InventoryTransaction, block: BlockStateId) -> bool {
    let held_slot = PlayerInventory::offset_for_hotbar(tx.hotbar_slot as usize);
    desync::refresh_slot(session, held_slot);

    // A used bucket or bottle from a stack lands in the first empty slot.
    let stack = session.inventory.item(held_slot);
    if stack.count > 1
        && matches!(
            session.item_kind_of(&stack),
            Some(ItemKind::Bucket(BucketKind::Empty) | ItemKind::GlassBottle)
        )
    {
        if let Some(slot) = session.inventory.first_empty_slot() {
            desync::refresh_slot(session, slot);
        }
    }

    if !session.player.sneaking {
        let traits = session.registries.block_traits(block);
        if traits.contains(BlockTraits::INTERACTIVE) {
            trace!(?block, "interactive block, no use-item");
            return false;
        }
        if session.player.game_mode.may_build() && traits.contains(BlockTraits::INTERACTIVE_MAY_BUILD)
        {
            trace!(?block, "buildable interactive block, no use-item");
            return false;
        }
    }

    let target = tx.block_position.to_f32().add(tx.click_position);
    rotation::look_at(session, target);

    let sequence = session.world_cache.next_prediction_sequence();
    session.send_back(BackPacket::UseItem {
        hand: Hand::Main,
        sequence,
    });
    true
}

/// Runs the held item's side effect after use-item-on-block was sent.
pub fn after_placement(session: &mut Session, tx: &InventoryTransaction) -> PlacementFlow {
    if tx.item_in_hand.is_none() {
        return PlacementFlow::Continue;
    }
    let Some(kind) = session.held_item_kind() else {
        return PlacementFlow::Continue;
    };
    let block = session.world.block_at(tx.block_position);
    let traits = session.registries.block_traits(block);
    let sneaking = session.player.sneaking;

    match kind {
        ItemKind::Boat | ItemKind::LilyPad | ItemKind::Frogspawn => {
            use_item(session, tx, block);
        }
        ItemKind::GlassBottle => {
            if sneaking
                && traits.contains(BlockTraits::CAULDRON)
                && !traits.contains(BlockTraits::NON_WATER_CAULDRON)
            {
                return PlacementFlow::Stop;
            }
            use_item(session, tx, block);
        }
        ItemKind::Bucket(BucketKind::PowderSnow) => {
            session.interaction.placed_bucket = true;
        }
        ItemKind::Bucket(_) => {
            if sneaking && traits.contains(BlockTraits::CAULDRON) {
                return PlacementFlow::Stop;
            }
            session.interaction.placed_bucket = use_item(session, tx, block);
        }
        _ => {}
    }
    PlacementFlow::Continue
}
