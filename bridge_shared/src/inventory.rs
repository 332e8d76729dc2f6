//! Back-protocol player inventory mirror.
//!
//! Slot layout:
//! - 0: crafting output, 1..=4: crafting grid
//! - 5..=8: armor (5 is the head)
//! - 9..=35: main inventory
//! - 36..=44: hotbar
//! - 45: off-hand

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::item::ItemStack;

pub const SLOT_COUNT: usize = 46;
pub const HEAD_SLOT: usize = 5;
pub const MAIN_START: usize = 9;
pub const HOTBAR_START: usize = 36;
pub const HOTBAR_SIZE: usize = 9;
pub const OFFHAND_SLOT: usize = 45;

/// Front-protocol container ids the inventory slots map onto.
pub const FRONT_INVENTORY_CONTAINER: u32 = 0;
pub const FRONT_OFFHAND_CONTAINER: u32 = 119;
pub const FRONT_ARMOR_CONTAINER: u32 = 120;
pub const FRONT_CRAFTING_CONTAINER: u32 = 124;

/// Front container id carried by legacy slot updates for armor.
pub const LEGACY_ARMOR_CONTAINER: u8 = 6;

/// Player inventory as the back server sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInventory {
    slots: Vec<ItemStack>,
    /// Selected hotbar index (0..9).
    held_slot: usize,
    cursor: ItemStack,
    /// Container state id echoed in container clicks.
    state_id: i32,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self {
            slots: vec![ItemStack::EMPTY; SLOT_COUNT],
            held_slot: 0,
            cursor: ItemStack::EMPTY,
            state_id: 0,
        }
    }
}

impl PlayerInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute slot for a hotbar index.
    pub fn offset_for_hotbar(hotbar: usize) -> usize {
        HOTBAR_START + hotbar
    }

    pub fn container_id(&self) -> u8 {
        0
    }

    pub fn state_id(&self) -> i32 {
        self.state_id
    }

    pub fn set_state_id(&mut self, state_id: i32) {
        self.state_id = state_id;
    }

    pub fn held_slot(&self) -> usize {
        self.held_slot
    }

    pub fn set_held_slot(&mut self, hotbar: usize) {
        self.held_slot = hotbar.min(HOTBAR_SIZE - 1);
    }

    /// Stack at an absolute slot; out-of-range slots read as empty.
    pub fn item(&self, slot: usize) -> ItemStack {
        self.slots.get(slot).copied().unwrap_or(ItemStack::EMPTY)
    }

    pub fn item_mut(&mut self, slot: usize) -> Option<&mut ItemStack> {
        self.slots.get_mut(slot)
    }

    pub fn set_item(&mut self, slot: usize, stack: ItemStack) {
        match self.slots.get_mut(slot) {
            Some(s) => *s = stack,
            None => warn!(slot, "write to out-of-range inventory slot ignored"),
        }
    }

    pub fn item_in_hand(&self) -> ItemStack {
        self.item(Self::offset_for_hotbar(self.held_slot))
    }

    pub fn item_in_hand_mut(&mut self) -> Option<&mut ItemStack> {
        let slot = Self::offset_for_hotbar(self.held_slot);
        self.item_mut(slot)
    }

    pub fn set_item_in_hand(&mut self, stack: ItemStack) {
        self.set_item(Self::offset_for_hotbar(self.held_slot), stack);
    }

    pub fn offhand(&self) -> ItemStack {
        self.item(OFFHAND_SLOT)
    }

    pub fn cursor(&self) -> ItemStack {
        self.cursor
    }

    pub fn set_cursor(&mut self, stack: ItemStack) {
        self.cursor = stack;
    }

    /// First empty slot in the order a stacked item lands: hotbar left to
    /// right, then the main inventory.
    pub fn first_empty_slot(&self) -> Option<usize> {
        (0..HOTBAR_SIZE)
            .map(Self::offset_for_hotbar)
            .chain(MAIN_START..HOTBAR_START)
            .find(|&slot| self.item(slot).is_empty())
    }

    /// Front `(container, slot)` pair for an absolute slot.
    pub fn front_location(slot: usize) -> Option<(u32, u32)> {
        let s = slot as u32;
        match slot {
            0..=4 => Some((FRONT_CRAFTING_CONTAINER, s)),
            5..=8 => Some((FRONT_ARMOR_CONTAINER, s - 5)),
            MAIN_START..=35 => Some((FRONT_INVENTORY_CONTAINER, s)),
            HOTBAR_START..=44 => Some((FRONT_INVENTORY_CONTAINER, s - HOTBAR_START as u32)),
            OFFHAND_SLOT => Some((FRONT_OFFHAND_CONTAINER, 0)),
            _ => None,
        }
    }
}
