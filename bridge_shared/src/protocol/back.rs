//! Server-bound commands in the back protocol.

use serde::{Deserialize, Serialize};

use crate::{
    block::Direction,
    item::{Hand, ItemStack},
    math::{Vec3, Vec3d, Vec3i},
};

/// Player action sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    StartDigging,
    FinishDigging,
    DropItemStack,
    DropItem,
    ReleaseUseItem,
}

/// Entity interaction sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InteractAction {
    Interact { hand: Hand },
    Attack,
    /// Positional interaction; `target` is relative to the entity.
    InteractAt { target: Vec3, hand: Hand },
}

/// Container click mode used by the drop workaround.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    DropOne,
    DropAll,
}

/// Commands sent to the back server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackPacket {
    UseItemOn {
        position: Vec3i,
        face: Direction,
        hand: Hand,
        /// Click offset inside the block.
        cursor: Vec3,
        inside_block: bool,
        sequence: i32,
    },
    UseItem {
        hand: Hand,
        sequence: i32,
    },
    PlayerAction {
        action: PlayerAction,
        position: Vec3i,
        face: Direction,
        sequence: i32,
    },
    Interact {
        entity_id: i32,
        action: InteractAction,
        sneaking: bool,
    },
    Swing {
        hand: Hand,
    },
    ContainerClick {
        container_id: u8,
        state_id: i32,
        slot: i32,
        click: ClickKind,
        carried: Option<ItemStack>,
        /// Predicted contents per changed slot; `None` is empty.
        changed_slots: Vec<(i32, Option<ItemStack>)>,
    },
    MovePlayerPosRot {
        on_ground: bool,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
    },
}

impl BackPacket {
    /// Prediction sequence carried by the command, if it takes part in
    /// server reconciliation.
    pub fn sequence(&self) -> Option<i32> {
        match self {
            BackPacket::UseItemOn { sequence, .. }
            | BackPacket::UseItem { sequence, .. }
            | BackPacket::PlayerAction { sequence, .. }
                if *sequence > 0 =>
            {
                Some(*sequence)
            }
            _ => None,
        }
    }
}
