//! Shared harness for the bridge integration tests.
//!
//! [`Harness`] wires a [`Session`] to an in-memory world, a fixed registry
//! table, recording sinks, a manual clock and a manual scheduler. The player
//! stands at feet `(0.5, 64, 0.5)` on a stone floor at `y = 63`.

use std::sync::Arc;

use bridge_shared::{
    block::{BlockStateId, BlockTraits, FrontBlockId, FrontBlockTraits},
    config::TranslatorConfig,
    entity::{Entity, EntityKind},
    inventory::PlayerInventory,
    item::{BackItemId, BucketKind, FrontItemData, FrontItemDef, ItemKind, ItemStack},
    math::{Vec3, Vec3d, Vec3i},
    protocol::{
        front::{ActionSource, SlotAction, SourceFlag, SourceKind, TransactionType},
        BackPacket, FrontPacket, InboundPacket, InventoryTransaction,
    },
};
use bridge_translator::{
    collaborators::{Registries, WorldState},
    memory::{MemoryWorld, StaticRegistries},
    session::PlayerState,
    testing::{ManualClock, ManualScheduler, RecordingServices, RecordingSink},
    Collaborators, Session,
};

/// Ids used by the standard registry table.
pub mod ids {
    use super::{BackItemId, BlockStateId, FrontBlockId, FrontItemDef};

    pub const STONE: BlockStateId = BlockStateId(1);
    pub const WATER: BlockStateId = BlockStateId(2);
    pub const FENCE: BlockStateId = BlockStateId(3);
    pub const CHEST: BlockStateId = BlockStateId(4);
    pub const WATER_CAULDRON: BlockStateId = BlockStateId(5);
    pub const LAVA_CAULDRON: BlockStateId = BlockStateId(6);
    pub const WATERLOGGED_SLAB: BlockStateId = BlockStateId(7);
    pub const PLAYER_SKULL: BlockStateId = BlockStateId(8);
    pub const REPEATER: BlockStateId = BlockStateId(9);

    pub const FRONT_AIR: FrontBlockId = FrontBlockId(500);
    pub const FRONT_STONE: FrontBlockId = FrontBlockId(501);
    pub const FRONT_WATER: FrontBlockId = FrontBlockId(502);
    pub const FRONT_FENCE: FrontBlockId = FrontBlockId(503);
    pub const FRONT_CHEST: FrontBlockId = FrontBlockId(504);
    pub const FRONT_CAULDRON: FrontBlockId = FrontBlockId(505);
    pub const FRONT_SLAB: FrontBlockId = FrontBlockId(507);
    pub const FRONT_SKULL: FrontBlockId = FrontBlockId(508);
    pub const FRONT_REPEATER: FrontBlockId = FrontBlockId(509);
    pub const FRONT_ITEM_FRAME: FrontBlockId = FrontBlockId(590);
    pub const FRONT_JIGSAW: FrontBlockId = FrontBlockId(591);

    pub const STONE_ITEM: BackItemId = BackItemId(1);
    pub const OAK_BOAT: BackItemId = BackItemId(2);
    pub const BUCKET: BackItemId = BackItemId(3);
    pub const WATER_BUCKET: BackItemId = BackItemId(4);
    pub const MILK_BUCKET: BackItemId = BackItemId(5);
    pub const POWDER_SNOW_BUCKET: BackItemId = BackItemId(6);
    pub const GLASS_BOTTLE: BackItemId = BackItemId(7);
    pub const COW_SPAWN_EGG: BackItemId = BackItemId(8);
    pub const SHIELD: BackItemId = BackItemId(9);
    pub const PLAYER_HEAD: BackItemId = BackItemId(10);
    pub const WRITABLE_BOOK: BackItemId = BackItemId(11);
    pub const LILY_PAD: BackItemId = BackItemId(12);
    pub const STICK: BackItemId = BackItemId(13);

    /// Front definition of a back item in the standard table.
    pub const fn front(item: BackItemId) -> FrontItemDef {
        FrontItemDef(item.0 + 100)
    }
}

use ids::*;

/// The registry table every harness starts with.
pub fn standard_registries() -> StaticRegistries {
    let items: [(BackItemId, &str, ItemKind); 13] = [
        (STONE_ITEM, "minecraft:stone", ItemKind::Block),
        (OAK_BOAT, "minecraft:oak_boat", ItemKind::Boat),
        (BUCKET, "minecraft:bucket", ItemKind::Bucket(BucketKind::Empty)),
        (WATER_BUCKET, "minecraft:water_bucket", ItemKind::Bucket(BucketKind::Water)),
        (MILK_BUCKET, "minecraft:milk_bucket", ItemKind::Bucket(BucketKind::Milk)),
        (
            POWDER_SNOW_BUCKET,
            "minecraft:powder_snow_bucket",
            ItemKind::Bucket(BucketKind::PowderSnow),
        ),
        (GLASS_BOTTLE, "minecraft:glass_bottle", ItemKind::GlassBottle),
        (COW_SPAWN_EGG, "minecraft:cow_spawn_egg", ItemKind::SpawnEgg),
        (SHIELD, "minecraft:shield", ItemKind::Shield),
        (PLAYER_HEAD, "minecraft:player_head", ItemKind::PlayerHead),
        (WRITABLE_BOOK, "minecraft:writable_book", ItemKind::WritableBook),
        (LILY_PAD, "minecraft:lily_pad", ItemKind::LilyPad),
        (STICK, "minecraft:stick", ItemKind::Other),
    ];

    let mut registries = StaticRegistries::new(FRONT_AIR, FRONT_WATER)
        .with_block(BlockStateId::AIR, FRONT_AIR, BlockTraits::empty())
        .with_block(STONE, FRONT_STONE, BlockTraits::empty())
        .with_block(WATER, FRONT_WATER, BlockTraits::WATER)
        .with_block(FENCE, FRONT_FENCE, BlockTraits::EXTENDED_COLLISION)
        .with_block(CHEST, FRONT_CHEST, BlockTraits::INTERACTIVE)
        .with_block(WATER_CAULDRON, FRONT_CAULDRON, BlockTraits::CAULDRON)
        .with_block(
            LAVA_CAULDRON,
            FRONT_CAULDRON,
            BlockTraits::CAULDRON | BlockTraits::NON_WATER_CAULDRON,
        )
        .with_block(WATERLOGGED_SLAB, FRONT_SLAB, BlockTraits::WATERLOGGED)
        .with_block(PLAYER_SKULL, FRONT_SKULL, BlockTraits::PLAYER_SKULL)
        .with_block(REPEATER, FRONT_REPEATER, BlockTraits::INTERACTIVE_MAY_BUILD)
        .with_front_block(FRONT_ITEM_FRAME, FrontBlockTraits::ITEM_FRAME)
        .with_front_block(FRONT_JIGSAW, FrontBlockTraits::JIGSAW);
    for (item, identifier, kind) in items {
        registries = registries.with_item(item, front(item), identifier, kind);
    }
    registries
}

/// Feet position of the harness player.
pub const FEET: Vec3d = Vec3d::new(0.5, 64.0, 0.5);

/// Stone block next to the player's feet, one level down.
pub const FLOOR_BLOCK: Vec3i = Vec3i::new(1, 63, 0);

/// Top-face click in the middle of a block.
pub const TOP_CENTER: Vec3 = Vec3::new(0.5, 1.0, 0.5);

pub struct Harness {
    pub session: Session,
    pub world: Arc<MemoryWorld>,
    pub registries: Arc<StaticRegistries>,
    pub back: RecordingSink<BackPacket>,
    pub front: RecordingSink<FrontPacket>,
    pub clock: ManualClock,
    pub scheduler: ManualScheduler,
    pub services: RecordingServices,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with(TranslatorConfig::default(), RecordingServices::new())
    }

    pub fn with_config(config: TranslatorConfig) -> Self {
        Self::with(config, RecordingServices::new())
    }

    pub fn with(config: TranslatorConfig, services: RecordingServices) -> Self {
        let world = Arc::new(MemoryWorld::new());
        for x in -3..=3 {
            for z in -3..=3 {
                world.set_block(Vec3i::new(x, 63, z), STONE);
            }
        }
        let registries = Arc::new(standard_registries());
        let back = RecordingSink::new();
        let front = RecordingSink::new();
        let clock = ManualClock::default();
        let scheduler = ManualScheduler::new();

        let session = Session::new(
            "tester",
            Arc::new(config),
            PlayerState::standing_at(FEET),
            Collaborators {
                world: world.clone(),
                registries: registries.clone(),
                services: Box::new(services.clone()),
                back: Box::new(back.clone()),
                front: Box::new(front.clone()),
                scheduler: Arc::new(scheduler.clone()),
                clock: Arc::new(clock.clone()),
            },
        );

        Self {
            session,
            world,
            registries,
            back,
            front,
            clock,
            scheduler,
            services,
        }
    }

    /// Puts `count` of `item` in a hotbar slot and selects it.
    pub fn hold(&mut self, hotbar: usize, item: BackItemId, count: u32) {
        self.session.inventory.set_held_slot(hotbar);
        self.give(PlayerInventory::offset_for_hotbar(hotbar), item, count);
    }

    pub fn give(&mut self, slot: usize, item: BackItemId, count: u32) {
        self.session
            .inventory
            .set_item(slot, ItemStack::new(item, count));
    }

    pub fn spawn(&mut self, entity_id: i32, runtime_id: u64, position: Vec3, kind: EntityKind) {
        self.session.entities.insert(Entity {
            entity_id,
            runtime_id,
            position,
            kind,
        });
    }

    pub fn handle(&mut self, tx: InventoryTransaction) {
        self.session
            .handle_inbound(InboundPacket::InventoryTransaction(tx));
    }

    pub fn take_back(&self) -> Vec<BackPacket> {
        self.back.take()
    }

    pub fn take_front(&self) -> Vec<FrontPacket> {
        self.front.take()
    }

    /// Runs every task the scheduler has queued, cancelled ones included.
    pub fn fire_scheduled(&mut self) {
        for task in self.scheduler.drain() {
            self.session.run_deferred(task);
        }
    }

    /// Front form of the authoritative held stack.
    pub fn held_front_item(&self) -> FrontItemData {
        self.registries
            .front_item(&self.session.inventory.item_in_hand())
    }

    fn item_use(&self, action_type: u32) -> InventoryTransaction {
        let mut tx = InventoryTransaction::new(TransactionType::ItemUse);
        tx.action_type = action_type;
        tx.hotbar_slot = self.session.inventory.held_slot() as u32;
        tx.item_in_hand = Some(self.held_front_item());
        tx
    }

    /// Placement against `face` of `clicked`, declaring the held item.
    pub fn place_tx(&self, clicked: Vec3i, face: i32, click: Vec3) -> InventoryTransaction {
        let mut tx = self.item_use(0);
        tx.block_position = clicked;
        tx.block_face = face;
        tx.click_position = click;
        tx.block_definition = self.registries.front_block(self.world.block_at(clicked));
        tx
    }

    pub fn use_tx(&self) -> InventoryTransaction {
        self.item_use(1)
    }

    pub fn break_tx(&self, position: Vec3i, face: i32) -> InventoryTransaction {
        let mut tx = self.item_use(2);
        tx.block_position = position;
        tx.block_face = face;
        tx
    }

    pub fn entity_tx(&self, action_type: u32, runtime_id: u64, click: Vec3) -> InventoryTransaction {
        let mut tx = InventoryTransaction::new(TransactionType::ItemUseOnEntity);
        tx.action_type = action_type;
        tx.runtime_entity_id = runtime_id;
        tx.click_position = click;
        tx.hotbar_slot = self.session.inventory.held_slot() as u32;
        tx.item_in_hand = Some(self.held_front_item());
        tx
    }

    /// Drop gesture from `hotbar`; `count` items leave the slot.
    pub fn drop_tx(&self, hotbar: u32, count: u32) -> InventoryTransaction {
        let mut tx = InventoryTransaction::new(TransactionType::Normal);
        tx.actions = vec![
            SlotAction {
                source: ActionSource {
                    kind: SourceKind::WorldInteraction,
                    flag: SourceFlag::DropItem,
                    container_id: 0,
                },
                slot: 0,
                from_item: FrontItemData::AIR,
                to_item: FrontItemData::new(FrontItemDef(1), count),
            },
            SlotAction {
                source: ActionSource {
                    kind: SourceKind::Container,
                    flag: SourceFlag::None,
                    container_id: 0,
                },
                slot: hotbar,
                from_item: FrontItemData::AIR,
                to_item: FrontItemData::AIR,
            },
        ];
        tx
    }
}

/// Update-block packets in `packets`, as `(position, layer, block)`.
pub fn block_updates(packets: &[FrontPacket]) -> Vec<(Vec3i, u32, FrontBlockId)> {
    packets
        .iter()
        .filter_map(|p| match p {
            FrontPacket::UpdateBlock {
                position,
                data_layer,
                block,
                ..
            } => Some((*position, *data_layer, *block)),
            _ => None,
        })
        .collect()
}

/// Prediction sequences carried by `packets`, in order.
pub fn sequences(packets: &[BackPacket]) -> Vec<i32> {
    packets.iter().filter_map(BackPacket::sequence).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
