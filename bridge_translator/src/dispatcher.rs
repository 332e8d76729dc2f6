//! Composite transaction classification and the block/item/entity paths.
//!
//! The front client folds placing, breaking, using and attacking into one
//! transaction packet. [`classify`] turns the `(type, action)` pair into a
//! [`Gesture`]; [`handle`] validates it against authoritative state and
//! emits the matching back commands, or rolls the client back.

use bridge_shared::{
    block::{BlockStateId, BlockTraits, Direction, FrontBlockTraits},
    inventory::{HEAD_SLOT, HOTBAR_SIZE, LEGACY_ARMOR_CONTAINER},
    item::{BucketKind, Hand, ItemKind},
    math::Vec3i,
    protocol::{
        back::{InteractAction, PlayerAction},
        front::{ContainerKind, LevelEventKind, SourceKind, TransactionType},
        BackPacket, FrontPacket, InventoryTransaction,
    },
};
use tracing::{debug, trace};

use crate::{
    desync, drop_bridge, geometry, heuristics, interaction,
    rejection::Rejection,
    session::{GameMode, Session},
    side_effects::{self, PlacementFlow},
};

/// What a composite transaction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Dropping from the hotbar.
    DropItem,
    InventoryMismatch,
    PlaceBlock,
    UseItem,
    BreakBlock,
    ReleaseItem,
    InteractEntity,
    AttackEntity,
    /// A shape this engine does not translate.
    Unsupported,
}

pub fn classify(tx: &InventoryTransaction) -> Gesture {
    use TransactionType::*;
    match (tx.transaction_type, tx.action_type) {
        (Normal, _) if tx.actions.len() == 2 && tx.actions[0].source.is_drop() => {
            Gesture::DropItem
        }
        (Normal, _) => Gesture::Unsupported,
        (InventoryMismatch, _) => Gesture::InventoryMismatch,
        (ItemUse, 0) => Gesture::PlaceBlock,
        (ItemUse, 1) => Gesture::UseItem,
        (ItemUse, 2) => Gesture::BreakBlock,
        (ItemRelease, 0) => Gesture::ReleaseItem,
        (ItemUseOnEntity, 0) => Gesture::InteractEntity,
        (ItemUseOnEntity, 1) => Gesture::AttackEntity,
        (ItemUse | ItemRelease | ItemUseOnEntity, _) => Gesture::Unsupported,
    }
}

/// Book page edits arrive as a three-action transaction on the held slot;
/// the book translator owns those.
pub fn is_book_edit(session: &Session, tx: &InventoryTransaction) -> bool {
    if tx.transaction_type != TransactionType::Normal || tx.actions.len() != 3 {
        return false;
    }
    let action = &tx.actions[0];
    action.source.kind == SourceKind::Container
        && action.slot as usize == session.inventory.held_slot()
        && session.registries.front_item_kind(action.from_item.definition)
            == ItemKind::WritableBook
}

/// Entry point for one composite transaction.
pub fn handle(session: &mut Session, tx: &InventoryTransaction) {
    if is_book_edit(session, tx) {
        trace!(session = %session.name, "book edit transaction, skipping");
        return;
    }
    session.services.flush_book_edits();

    let gesture = classify(tx);
    trace!(session = %session.name, ?gesture, kind = ?tx.transaction_type, action = tx.action_type, "transaction");
    match gesture {
        Gesture::DropItem => drop_bridge::handle_hotbar_drop(session, &tx.actions[0], &tx.actions[1]),
        Gesture::InventoryMismatch | Gesture::Unsupported => {}
        Gesture::PlaceBlock => place_block(session, tx),
        Gesture::UseItem => use_held_item(session, tx),
        Gesture::BreakBlock => break_block(session, tx),
        Gesture::ReleaseItem => session.send_back(BackPacket::PlayerAction {
            action: PlayerAction::ReleaseUseItem,
            position: Vec3i::ZERO,
            face: Direction::Down,
            sequence: 0,
        }),
        Gesture::InteractEntity => {
            interaction::process_entity_interaction(session, tx.runtime_entity_id, tx.click_position)
        }
        Gesture::AttackEntity => attack_entity(session, tx.runtime_entity_id),
    }
}

fn reject(session: &Session, position: Vec3i, tx: &InventoryTransaction, reason: Rejection) {
    debug!(session = %session.name, %reason, ?position, "rolling back");
    desync::restore_correct_block(session, position, tx.hotbar_slot);
}

fn place_block(session: &mut Session, tx: &InventoryTransaction) {
    let clicked = tx.block_position;
    let Some(face) = Direction::from_index(tx.block_face) else {
        return reject(session, clicked, tx, Rejection::InvalidFace(tx.block_face));
    };
    let Some(target) = face.relative(clicked) else {
        let reason = Rejection::CellOutOfRange {
            clicked,
            face: tx.block_face,
        };
        return reject(session, clicked, tx, reason);
    };

    let yaw = session.player.yaw;
    if session.config.disable_front_scaffolding && heuristics::is_god_bridging(face, yaw) {
        let reason = Rejection::GodBridging {
            face: tx.block_face,
            yaw,
        };
        return reject(session, target, tx, reason);
    }
    if let Err(reason) = heuristics::check_extended_collision(session, face, target) {
        return reject(session, target, tx, reason);
    }
    if !heuristics::register_click(session, clicked) {
        trace!(session = %session.name, ?clicked, "repeat click ignored");
        return;
    }
    if desync::is_incorrect_held_item(session, tx) {
        return reject(session, target, tx, Rejection::HeldItemDesync);
    }

    // Item frames are entities on the back server but blocks on the front.
    if session
        .registries
        .front_block_traits(tx.block_definition)
        .contains(FrontBlockTraits::ITEM_FRAME)
    {
        if let Some(frame) = session.entities.item_frame_at(clicked).map(|e| e.runtime_id) {
            interaction::process_entity_interaction(session, frame, tx.click_position);
            return;
        }
    }

    if !session.world.is_inside_border(target.center()) {
        return reject(session, target, tx, Rejection::OutsideBorder);
    }
    let player = &session.player;
    if let Err(reason) =
        geometry::check_place_reach(player.position, player.eye_height, clicked, tx.click_position)
    {
        return reject(session, target, tx, reason);
    }

    // Use-item-on-block with a spawn egg on water spawns more than one mob.
    if tx.item_in_hand.is_some()
        && session.registries.front_item_kind(tx.declared_item().definition) == ItemKind::SpawnEgg
    {
        let state = session.world.block_at(clicked);
        if session
            .registries
            .block_traits(state)
            .contains(BlockTraits::WATER)
        {
            side_effects::use_item(session, tx, state);
            return;
        }
    }

    let sequence = session.world_cache.next_prediction_sequence();
    session.send_back(BackPacket::UseItemOn {
        position: clicked,
        face,
        hand: Hand::Main,
        cursor: tx.click_position,
        inside_block: false,
        sequence,
    });

    if side_effects::after_placement(session, tx) == PlacementFlow::Stop {
        return;
    }

    if tx.actions.is_empty()
        && session.player.op_permission_level >= 2
        && session.player.game_mode == GameMode::Creative
        && session
            .registries
            .front_block_traits(tx.block_definition)
            .contains(FrontBlockTraits::JIGSAW)
    {
        session.send_front(FrontPacket::ContainerOpen {
            id: 1,
            container: ContainerKind::JigsawEditor,
            position: clicked,
            unique_entity_id: -1,
        });
    }

    let held = session.inventory.item_in_hand();
    if session.item_kind_of(&held).is_some_and(ItemKind::is_block_item) {
        session.interaction.last_block_place_position = Some(target);
        session.interaction.last_block_placed_id = Some(session.registries.item_identifier(held.item));
    }
    session.interaction.interacting = true;
}

fn use_held_item(session: &mut Session, tx: &InventoryTransaction) {
    if desync::is_incorrect_held_item(session, tx) {
        desync::refresh_hotbar_slot(session, tx.hotbar_slot);
        return;
    }
    // Blocking is driven by sneaking.
    if session.held_item_kind() == Some(ItemKind::Shield) {
        return;
    }
    if let Some(declared) = tx.item_in_hand {
        match session.registries.front_item_kind(declared.definition) {
            ItemKind::Bucket(kind) if kind != BucketKind::Milk => return,
            ItemKind::SpawnEgg | ItemKind::GlassBottle => return,
            _ => {}
        }
    }

    let sequence = session.world_cache.next_prediction_sequence();
    session.send_back(BackPacket::UseItem {
        hand: Hand::Main,
        sequence,
    });

    if is_head_swap(session, tx) {
        session.services.restore_original_skin();
    }
}

/// Swapping a player head out of the head slot through the hotbar.
fn is_head_swap(session: &Session, tx: &InventoryTransaction) -> bool {
    let [action] = tx.actions.as_slice() else {
        return false;
    };
    let Some(legacy) = tx.legacy_slots.first() else {
        return false;
    };
    if legacy.container_id != LEGACY_ARMOR_CONTAINER
        || action.from_item.is_null()
        || tx.hotbar_slot as usize >= HOTBAR_SIZE
    {
        return false;
    }
    let Some(&armor_index) = legacy.slots.first() else {
        return false;
    };
    let slot = armor_index as usize + HEAD_SLOT;
    slot == HEAD_SLOT
        && session.item_kind_of(&session.inventory.item(slot)) == Some(ItemKind::PlayerHead)
}

fn break_block(session: &mut Session, tx: &InventoryTransaction) {
    let position = tx.block_position;
    let creative = session.player.game_mode == GameMode::Creative;
    let state = if creative {
        session.world.block_at(position)
    } else {
        session
            .interaction
            .breaking_block
            .unwrap_or(BlockStateId::AIR)
    };

    session.interaction.last_block_place_position = None;
    session.interaction.last_block_placed_id = None;

    let Some(face) = Direction::from_index(tx.block_face) else {
        return reject(session, position, tx, Rejection::InvalidFace(tx.block_face));
    };
    if !session.world.is_inside_border(position.center()) {
        return reject(session, position, tx, Rejection::OutsideBorder);
    }
    if let Err(reason) = geometry::check_break_reach(session.player.position, position) {
        return reject(session, position, tx, reason);
    }

    let sequence = session.world_cache.next_prediction_sequence();
    session.world_cache.mark_position_in_sequence(position);

    let front_block = session.registries.front_block(state);
    session.send_front(FrontPacket::LevelEvent {
        event: LevelEventKind::ParticleDestroyBlock,
        position: position.to_f32(),
        data: front_block.0 as i32,
    });
    session.interaction.breaking_block = None;

    let sneaking = session.player.sneaking;
    if let Some(frame) = session.entities.item_frame_at(position) {
        let entity_id = frame.entity_id;
        session.send_back(BackPacket::Interact {
            entity_id,
            action: InteractAction::Attack,
            sneaking,
        });
        return;
    }

    let action = if creative {
        PlayerAction::StartDigging
    } else {
        PlayerAction::FinishDigging
    };
    session.send_back(BackPacket::PlayerAction {
        action,
        position,
        face,
        sequence,
    });
}

fn attack_entity(session: &mut Session, runtime_id: u64) {
    let Some(entity) = session.entities.get(runtime_id) else {
        return;
    };
    let entity_id = entity.attack_target_id();
    session.send_back(BackPacket::Interact {
        entity_id,
        action: InteractAction::Attack,
        sneaking: session.player.sneaking,
    });
    session.services.send_attack_cooldown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_shared::{
        item::FrontItemData,
        protocol::front::{ActionSource, SlotAction, SourceFlag},
    };

    fn tx(kind: TransactionType, action_type: u32) -> InventoryTransaction {
        let mut tx = InventoryTransaction::new(kind);
        tx.action_type = action_type;
        tx
    }

    fn action(kind: SourceKind, flag: SourceFlag) -> SlotAction {
        SlotAction {
            source: ActionSource {
                kind,
                flag,
                container_id: 0,
            },
            slot: 0,
            from_item: FrontItemData::AIR,
            to_item: FrontItemData::AIR,
        }
    }

    #[test]
    fn item_use_sub_actions() {
        assert_eq!(classify(&tx(TransactionType::ItemUse, 0)), Gesture::PlaceBlock);
        assert_eq!(classify(&tx(TransactionType::ItemUse, 1)), Gesture::UseItem);
        assert_eq!(classify(&tx(TransactionType::ItemUse, 2)), Gesture::BreakBlock);
        assert_eq!(classify(&tx(TransactionType::ItemUse, 7)), Gesture::Unsupported);
    }

    #[test]
    fn entity_and_release_sub_actions() {
        assert_eq!(
            classify(&tx(TransactionType::ItemUseOnEntity, 0)),
            Gesture::InteractEntity
        );
        assert_eq!(
            classify(&tx(TransactionType::ItemUseOnEntity, 1)),
            Gesture::AttackEntity
        );
        assert_eq!(classify(&tx(TransactionType::ItemRelease, 0)), Gesture::ReleaseItem);
        assert_eq!(classify(&tx(TransactionType::ItemRelease, 1)), Gesture::Unsupported);
        assert_eq!(
            classify(&tx(TransactionType::InventoryMismatch, 3)),
            Gesture::InventoryMismatch
        );
    }

    #[test]
    fn normal_needs_world_drop_first() {
        let mut t = tx(TransactionType::Normal, 0);
        t.actions = vec![
            action(SourceKind::WorldInteraction, SourceFlag::DropItem),
            action(SourceKind::Container, SourceFlag::None),
        ];
        assert_eq!(classify(&t), Gesture::DropItem);

        t.actions.swap(0, 1);
        assert_eq!(classify(&t), Gesture::Unsupported);

        t.actions.truncate(1);
        assert_eq!(classify(&t), Gesture::Unsupported);
    }
}
