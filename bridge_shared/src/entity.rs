//! Entity mirror and the per-kind interaction capability.
//!
//! Each entity kind implements [`Interactable`]; the defaults return
//! [`InteractionResult::Pass`], so kinds only override what they react to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    item::{Hand, ItemKind},
    math::{Vec3, Vec3i},
};

/// Outcome of a local interaction prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionResult {
    /// Not handled; the next step gets a chance.
    Pass,
    /// Handled, no arm swing.
    Consume,
    /// Handled, with an arm swing.
    Success,
}

impl InteractionResult {
    pub fn consumes_action(self) -> bool {
        !matches!(self, InteractionResult::Pass)
    }

    pub fn should_swing(self) -> bool {
        matches!(self, InteractionResult::Success)
    }
}

/// What the player brings to an interaction. `None` is an empty hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractContext {
    pub main_hand: Option<ItemKind>,
    pub off_hand: Option<ItemKind>,
    pub sneaking: bool,
}

impl InteractContext {
    pub fn held(&self, hand: Hand) -> Option<ItemKind> {
        match hand {
            Hand::Main => self.main_hand,
            Hand::Off => self.off_hand,
        }
    }
}

/// Local interaction capability.
pub trait Interactable {
    /// Positional interaction, tried first.
    fn interact_at(&mut self, _hand: Hand, _ctx: &InteractContext) -> InteractionResult {
        InteractionResult::Pass
    }

    /// Generic interaction, tried when `interact_at` passes.
    fn interact(&mut self, _hand: Hand, _ctx: &InteractContext) -> InteractionResult {
        InteractionResult::Pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemFrame {
    #[serde(default)]
    pub has_item: bool,
}

impl Interactable for ItemFrame {
    fn interact(&mut self, hand: Hand, ctx: &InteractContext) -> InteractionResult {
        // A filled frame rotates its item; an empty one takes the held item.
        if self.has_item || ctx.held(hand).is_some() {
            InteractionResult::Success
        } else {
            InteractionResult::Pass
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArmorStand {
    #[serde(default)]
    pub marker: bool,
    #[serde(default)]
    pub has_equipment: bool,
}

impl Interactable for ArmorStand {
    fn interact_at(&mut self, hand: Hand, ctx: &InteractContext) -> InteractionResult {
        if self.marker {
            return InteractionResult::Pass;
        }
        if ctx.held(hand).is_none() && !self.has_equipment {
            return InteractionResult::Pass;
        }
        InteractionResult::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Villager {
    #[serde(default)]
    pub has_profession: bool,
}

impl Interactable for Villager {
    fn interact(&mut self, hand: Hand, ctx: &InteractContext) -> InteractionResult {
        if matches!(ctx.held(hand), Some(ItemKind::SpawnEgg)) || !self.has_profession {
            return InteractionResult::Pass;
        }
        InteractionResult::Success
    }
}

/// Rideable entity: boats and minecarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Vehicle;

impl Interactable for Vehicle {
    fn interact(&mut self, _hand: Hand, ctx: &InteractContext) -> InteractionResult {
        if ctx.sneaking {
            InteractionResult::Pass
        } else {
            InteractionResult::Success
        }
    }
}

/// Multi-part boss. Attacks on the head part land on the body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnderDragon;

impl EnderDragon {
    /// Offset from the head part's entity id to the body part's.
    pub const BODY_PART_OFFSET: i32 = 3;
}

impl Interactable for EnderDragon {}

/// Any entity without special interaction behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenericEntity;

impl Interactable for GenericEntity {}

/// Tagged union of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Generic(GenericEntity),
    ItemFrame(ItemFrame),
    ArmorStand(ArmorStand),
    Villager(Villager),
    Vehicle(Vehicle),
    EnderDragon(EnderDragon),
}

impl EntityKind {
    fn capability(&mut self) -> &mut dyn Interactable {
        match self {
            EntityKind::Generic(e) => e,
            EntityKind::ItemFrame(e) => e,
            EntityKind::ArmorStand(e) => e,
            EntityKind::Villager(e) => e,
            EntityKind::Vehicle(e) => e,
            EntityKind::EnderDragon(e) => e,
        }
    }
}

impl Interactable for EntityKind {
    fn interact_at(&mut self, hand: Hand, ctx: &InteractContext) -> InteractionResult {
        self.capability().interact_at(hand, ctx)
    }

    fn interact(&mut self, hand: Hand, ctx: &InteractContext) -> InteractionResult {
        self.capability().interact(hand, ctx)
    }
}

/// Mirrored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Back-protocol entity id.
    pub entity_id: i32,
    /// Session-local front-protocol id.
    pub runtime_id: u64,
    pub position: Vec3,
    pub kind: EntityKind,
}

impl Entity {
    pub fn is_item_frame(&self) -> bool {
        matches!(self.kind, EntityKind::ItemFrame(_))
    }

    /// Entity id an attack should target.
    pub fn attack_target_id(&self) -> i32 {
        match self.kind {
            EntityKind::EnderDragon(_) => self.entity_id + EnderDragon::BODY_PART_OFFSET,
            _ => self.entity_id,
        }
    }
}

/// Entities known to one session.
#[derive(Debug, Default, Clone)]
pub struct EntityCache {
    by_runtime: HashMap<u64, Entity>,
    /// Frames per cell, oldest first.
    item_frames: HashMap<Vec3i, Vec<u64>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts/replaces an entity; item frames are also indexed by cell.
    pub fn insert(&mut self, entity: Entity) {
        if let Some(old) = self.by_runtime.remove(&entity.runtime_id) {
            self.unindex_frame(&old);
        }
        if entity.is_item_frame() {
            self.item_frames
                .entry(Vec3i::floor(entity.position))
                .or_default()
                .push(entity.runtime_id);
        }
        self.by_runtime.insert(entity.runtime_id, entity);
    }

    pub fn remove(&mut self, runtime_id: u64) -> Option<Entity> {
        let entity = self.by_runtime.remove(&runtime_id)?;
        self.unindex_frame(&entity);
        Some(entity)
    }

    fn unindex_frame(&mut self, entity: &Entity) {
        if !entity.is_item_frame() {
            return;
        }
        let cell = Vec3i::floor(entity.position);
        if let Some(ids) = self.item_frames.get_mut(&cell) {
            ids.retain(|&id| id != entity.runtime_id);
            if ids.is_empty() {
                self.item_frames.remove(&cell);
            }
        }
    }

    pub fn get(&self, runtime_id: u64) -> Option<&Entity> {
        self.by_runtime.get(&runtime_id)
    }

    pub fn get_mut(&mut self, runtime_id: u64) -> Option<&mut Entity> {
        self.by_runtime.get_mut(&runtime_id)
    }

    /// Item frame hanging in the given cell; the newest one when several
    /// share it.
    pub fn item_frame_at(&self, position: Vec3i) -> Option<&Entity> {
        self.item_frames
            .get(&position)
            .and_then(|ids| ids.last())
            .and_then(|id| self.by_runtime.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_runtime.is_empty()
    }
}
