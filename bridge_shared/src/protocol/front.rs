//! Front-protocol packets: the composite transaction we receive and the
//! corrective packets we send back.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    block::FrontBlockId,
    item::FrontItemData,
    math::{Vec3, Vec3i},
};

/// Composite transaction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Normal,
    InventoryMismatch,
    ItemUse,
    ItemUseOnEntity,
    ItemRelease,
}

/// Where a slot action originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Container,
    WorldInteraction,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SourceFlag {
    #[default]
    None,
    DropItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSource {
    pub kind: SourceKind,
    #[serde(default)]
    pub flag: SourceFlag,
    #[serde(default)]
    pub container_id: i32,
}

impl ActionSource {
    pub fn is_drop(&self) -> bool {
        self.kind == SourceKind::WorldInteraction && self.flag == SourceFlag::DropItem
    }
}

/// One low-level slot change inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAction {
    pub source: ActionSource,
    pub slot: u32,
    #[serde(default)]
    pub from_item: FrontItemData,
    #[serde(default)]
    pub to_item: FrontItemData,
}

/// Legacy slot update record attached to item-use transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySlotUpdate {
    pub container_id: u8,
    pub slots: Vec<u8>,
}

/// The composite transaction. Payload fields only matter for the types
/// that carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub actions: Vec<SlotAction>,
    #[serde(default)]
    pub action_type: u32,
    #[serde(default)]
    pub block_position: Vec3i,
    #[serde(default)]
    pub block_face: i32,
    #[serde(default)]
    pub hotbar_slot: u32,
    #[serde(default)]
    pub item_in_hand: Option<FrontItemData>,
    /// Sub-block offset for blocks, absolute point for entities.
    #[serde(default)]
    pub click_position: Vec3,
    /// Front block the client saw at `block_position`.
    #[serde(default)]
    pub block_definition: FrontBlockId,
    #[serde(default)]
    pub runtime_entity_id: u64,
    #[serde(default)]
    pub legacy_slots: Vec<LegacySlotUpdate>,
}

impl InventoryTransaction {
    pub fn new(transaction_type: TransactionType) -> Self {
        Self {
            transaction_type,
            actions: Vec::new(),
            action_type: 0,
            block_position: Vec3i::ZERO,
            block_face: 0,
            hotbar_slot: 0,
            item_in_hand: None,
            click_position: Vec3::ZERO,
            block_definition: FrontBlockId::default(),
            runtime_entity_id: 0,
            legacy_slots: Vec::new(),
        }
    }

    /// Declared held item; a missing snapshot reads as air.
    pub fn declared_item(&self) -> FrontItemData {
        self.item_in_hand.unwrap_or(FrontItemData::AIR)
    }
}

/// Creative/legacy item frame removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFrameDropItem {
    pub block_position: Vec3i,
}

/// Everything the interaction engine accepts on a session's inbound queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "packet", rename_all = "snake_case")]
pub enum InboundPacket {
    InventoryTransaction(InventoryTransaction),
    ItemFrameDropItem(ItemFrameDropItem),
    /// Back server acknowledged predictions up to `sequence`.
    BlockChangedAck { sequence: i32 },
}

bitflags! {
    /// Update-block flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct UpdateBlockFlags: u8 {
        const NEIGHBORS = 1 << 0;
        const NETWORK = 1 << 1;
        const PRIORITY = 1 << 3;
    }
}

impl UpdateBlockFlags {
    pub const ALL_PRIORITY: Self = Self::NEIGHBORS
        .union(Self::NETWORK)
        .union(Self::PRIORITY);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelEventKind {
    ParticleDestroyBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    JigsawEditor,
}

/// Data layer of an update-block packet.
pub const LAYER_BLOCK: u32 = 0;
pub const LAYER_LIQUID: u32 = 1;

/// Client-bound packets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrontPacket {
    UpdateBlock {
        position: Vec3i,
        data_layer: u32,
        block: FrontBlockId,
        flags: UpdateBlockFlags,
    },
    InventorySlot {
        container_id: u32,
        slot: u32,
        item: FrontItemData,
    },
    LevelEvent {
        event: LevelEventKind,
        position: Vec3,
        data: i32,
    },
    ContainerOpen {
        id: u8,
        container: ContainerKind,
        position: Vec3i,
        unique_entity_id: i64,
    },
}
