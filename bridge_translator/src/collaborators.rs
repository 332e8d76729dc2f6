//! Contracts for the state and outputs the engine does not own.
//!
//! The translator reads authoritative world and registry state through these
//! traits and writes packets through [`PacketSink`]s. Everything is
//! object-safe so a session can hold them as trait objects.

use std::time::{SystemTime, UNIX_EPOCH};

use bridge_shared::{
    block::{BlockStateId, BlockTraits, FrontBlockId, FrontBlockTraits},
    item::{BackItemId, FrontItemData, FrontItemDef, ItemKind, ItemStack},
    math::{Vec3, Vec3i},
};
use tokio::sync::mpsc;
use tracing::trace;

/// Authoritative world state mirrored from the back server.
pub trait WorldState: Send + Sync {
    fn block_at(&self, position: Vec3i) -> BlockStateId;

    /// World-border containment for a point.
    fn is_inside_border(&self, position: Vec3) -> bool;
}

/// Block/item id mapping and classification tables.
pub trait Registries: Send + Sync {
    fn front_block(&self, state: BlockStateId) -> FrontBlockId;
    fn front_water(&self) -> FrontBlockId;
    fn front_air(&self) -> FrontBlockId;
    fn block_traits(&self, state: BlockStateId) -> BlockTraits;
    /// Whether any block registers an extended collision footprint.
    fn has_extended_collision(&self) -> bool;
    fn front_block_traits(&self, block: FrontBlockId) -> FrontBlockTraits;

    fn item_kind(&self, item: BackItemId) -> ItemKind;
    fn front_item_kind(&self, definition: FrontItemDef) -> ItemKind;
    /// Front representation of an authoritative stack; empty maps to air.
    fn front_item(&self, stack: &ItemStack) -> FrontItemData;
    /// Namespaced identifier, e.g. `minecraft:stone`.
    fn item_identifier(&self, item: BackItemId) -> String;
}

/// Per-session hooks owned by other translators.
pub trait SessionServices: Send {
    /// Sends any book edit the client is still typing.
    fn flush_book_edits(&mut self) {}

    /// Attack sounds/cooldown indicator after an entity attack.
    fn send_attack_cooldown(&mut self) {}

    /// Reverts the custom head skin after the head slot was swapped out.
    fn restore_original_skin(&mut self) {}

    /// Custom front block cached for a player skull at `position`.
    fn custom_skull_block(&self, _position: Vec3i) -> Option<FrontBlockId> {
        None
    }
}

/// Services that do nothing.
#[derive(Debug, Default)]
pub struct NoopServices;

impl SessionServices for NoopServices {}

/// Ordered, fire-and-forget packet output.
pub trait PacketSink<P>: Send {
    fn send(&self, packet: P);
}

impl<P: Send + std::fmt::Debug> PacketSink<P> for mpsc::UnboundedSender<P> {
    fn send(&self, packet: P) {
        if let Err(e) = mpsc::UnboundedSender::send(self, packet) {
            trace!(packet = ?e.0, "sink closed, dropping packet");
        }
    }
}

/// Millisecond time source for interaction timers.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}
