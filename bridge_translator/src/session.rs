//! Per-player state owned by the interaction engine.
//!
//! A [`Session`] is only ever touched from its driver task, so nothing here
//! is synchronised. Collaborators are shared trait objects.

use std::{collections::HashMap, sync::Arc};

use bridge_shared::{
    block::BlockStateId,
    config::TranslatorConfig,
    entity::{EntityCache, InteractContext},
    inventory::PlayerInventory,
    item::{ItemKind, ItemStack},
    math::{Vec3, Vec3d, Vec3i},
    protocol::{BackPacket, FrontPacket, InboundPacket},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    collaborators::{Clock, PacketSink, Registries, SessionServices, WorldState},
    dispatcher, drop_bridge,
    geometry::PLAYER_EYE_OFFSET,
    rotation,
    scheduler::{DeferredTask, ScheduledTask, TaskHandle, TaskScheduler},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    /// Modes in which the player may place and break blocks.
    pub fn may_build(self) -> bool {
        matches!(self, GameMode::Survival | GameMode::Creative)
    }
}

fn default_eye_height() -> f32 {
    PLAYER_EYE_OFFSET
}

/// Mirror of the local player as both protocols see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Front-protocol position (eye level).
    pub position: Vec3,
    /// Bounding-box bottom centre as the back server sees it.
    pub back_position: Vec3d,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    #[serde(default = "default_true")]
    pub on_ground: bool,
    #[serde(default)]
    pub sneaking: bool,
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub op_permission_level: u8,
}

fn default_true() -> bool {
    true
}

impl PlayerState {
    /// Player standing with feet at `feet`.
    pub fn standing_at(feet: Vec3d) -> Self {
        Self {
            position: Vec3::new(
                feet.x as f32,
                feet.y as f32 + PLAYER_EYE_OFFSET,
                feet.z as f32,
            ),
            back_position: feet,
            yaw: 0.0,
            pitch: 0.0,
            eye_height: PLAYER_EYE_OFFSET,
            on_ground: true,
            sneaking: false,
            game_mode: GameMode::Survival,
            op_permission_level: 0,
        }
    }
}

/// Short-lived interaction markers and timers.
#[derive(Debug, Default)]
pub struct InteractionState {
    pub last_interaction_time_ms: i64,
    pub last_interaction_block_position: Vec3i,
    pub last_interaction_player_position: Vec3,
    /// Block currently being mined; `None` when unknown.
    pub breaking_block: Option<BlockStateId>,
    pub last_block_place_position: Option<Vec3i>,
    pub last_block_placed_id: Option<String>,
    pub placed_bucket: bool,
    pub interacting: bool,
    pub scheduled_rotation_revert: Option<TaskHandle>,
}

/// Prediction sequence allocation and unacknowledged block positions.
#[derive(Debug, Default)]
pub struct WorldCache {
    prediction_sequence: i32,
    unverified_predictions: HashMap<Vec3i, i32>,
}

impl WorldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next sequence. The first one handed out is 1.
    pub fn next_prediction_sequence(&mut self) -> i32 {
        self.prediction_sequence += 1;
        self.prediction_sequence
    }

    pub fn current_sequence(&self) -> i32 {
        self.prediction_sequence
    }

    /// Marks `position` as predicted under the current sequence.
    pub fn mark_position_in_sequence(&mut self, position: Vec3i) {
        self.unverified_predictions
            .insert(position, self.prediction_sequence);
    }

    /// Drops every prediction at or below `sequence`. Returns how many were
    /// cleared.
    pub fn acknowledge(&mut self, sequence: i32) -> usize {
        let before = self.unverified_predictions.len();
        self.unverified_predictions.retain(|_, s| *s > sequence);
        before - self.unverified_predictions.len()
    }

    pub fn is_pending(&self, position: Vec3i) -> bool {
        self.unverified_predictions.contains_key(&position)
    }

    pub fn pending_count(&self) -> usize {
        self.unverified_predictions.len()
    }
}

/// Everything a session needs from outside.
pub struct Collaborators {
    pub world: Arc<dyn WorldState>,
    pub registries: Arc<dyn Registries>,
    pub services: Box<dyn SessionServices>,
    pub back: Box<dyn PacketSink<BackPacket>>,
    pub front: Box<dyn PacketSink<FrontPacket>>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub clock: Arc<dyn Clock>,
}

/// One connected player.
pub struct Session {
    /// Display name, for diagnostics.
    pub name: String,
    pub player: PlayerState,
    pub inventory: PlayerInventory,
    pub entities: EntityCache,
    pub interaction: InteractionState,
    pub world_cache: WorldCache,
    pub config: Arc<TranslatorConfig>,

    pub world: Arc<dyn WorldState>,
    pub registries: Arc<dyn Registries>,
    pub services: Box<dyn SessionServices>,
    back: Box<dyn PacketSink<BackPacket>>,
    front: Box<dyn PacketSink<FrontPacket>>,
    pub scheduler: Arc<dyn TaskScheduler>,
    clock: Arc<dyn Clock>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        config: Arc<TranslatorConfig>,
        player: PlayerState,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            world,
            registries,
            services,
            back,
            front,
            scheduler,
            clock,
        } = collaborators;
        Self {
            name: name.into(),
            player,
            inventory: PlayerInventory::new(),
            entities: EntityCache::new(),
            interaction: InteractionState::default(),
            world_cache: WorldCache::new(),
            config,
            world,
            registries,
            services,
            back,
            front,
            scheduler,
            clock,
        }
    }

    pub fn send_back(&self, packet: BackPacket) {
        trace!(session = %self.name, ?packet, "-> back");
        self.back.send(packet);
    }

    pub fn send_front(&self, packet: FrontPacket) {
        trace!(session = %self.name, ?packet, "-> front");
        self.front.send(packet);
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Item class of a stack; `None` for an empty one.
    pub fn item_kind_of(&self, stack: &ItemStack) -> Option<ItemKind> {
        (!stack.is_empty()).then(|| self.registries.item_kind(stack.item))
    }

    /// Item class of the authoritative main-hand stack.
    pub fn held_item_kind(&self) -> Option<ItemKind> {
        self.item_kind_of(&self.inventory.item_in_hand())
    }

    pub fn interact_context(&self) -> InteractContext {
        InteractContext {
            main_hand: self.held_item_kind(),
            off_hand: self.item_kind_of(&self.inventory.offhand()),
            sneaking: self.player.sneaking,
        }
    }

    /// Routes one inbound front packet.
    pub fn handle_inbound(&mut self, packet: InboundPacket) {
        match packet {
            InboundPacket::InventoryTransaction(tx) => dispatcher::handle(self, &tx),
            InboundPacket::ItemFrameDropItem(frame_drop) => {
                drop_bridge::translate_item_frame_drop(self, frame_drop.block_position)
            }
            InboundPacket::BlockChangedAck { sequence } => {
                let cleared = self.world_cache.acknowledge(sequence);
                trace!(session = %self.name, sequence, cleared, "predictions acknowledged");
            }
        }
    }

    /// Runs a deferred task that fired. Cancelled tasks are dropped.
    pub fn run_deferred(&mut self, scheduled: ScheduledTask) {
        if scheduled.token.is_cancelled() {
            debug!(session = %self.name, "dropping cancelled task");
            return;
        }
        let ScheduledTask { token, task } = scheduled;
        match task {
            DeferredTask::RevertRotation(snapshot) => {
                let current = self
                    .interaction
                    .scheduled_rotation_revert
                    .as_ref()
                    .is_some_and(|h| h.token().same_as(&token));
                if current {
                    self.interaction.scheduled_rotation_revert = None;
                }
                rotation::revert_rotation(self, &snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_start_at_one_and_increase() {
        let mut cache = WorldCache::new();
        assert_eq!(cache.next_prediction_sequence(), 1);
        assert_eq!(cache.next_prediction_sequence(), 2);
        assert_eq!(cache.current_sequence(), 2);
    }

    #[test]
    fn acknowledge_clears_up_to_sequence() {
        let mut cache = WorldCache::new();
        let a = Vec3i::new(0, 64, 0);
        let b = Vec3i::new(1, 64, 0);
        cache.next_prediction_sequence();
        cache.mark_position_in_sequence(a);
        cache.next_prediction_sequence();
        cache.mark_position_in_sequence(b);

        assert_eq!(cache.acknowledge(1), 1);
        assert!(!cache.is_pending(a));
        assert!(cache.is_pending(b));
        assert_eq!(cache.acknowledge(5), 1);
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn remarking_a_position_moves_it_to_the_newer_sequence() {
        let mut cache = WorldCache::new();
        let a = Vec3i::new(3, 3, 3);
        cache.next_prediction_sequence();
        cache.mark_position_in_sequence(a);
        cache.next_prediction_sequence();
        cache.mark_position_in_sequence(a);
        assert_eq!(cache.acknowledge(1), 0);
        assert!(cache.is_pending(a));
    }

    #[test]
    fn only_survival_and_creative_may_build() {
        assert!(GameMode::Survival.may_build());
        assert!(GameMode::Creative.may_build());
        assert!(!GameMode::Adventure.may_build());
        assert!(!GameMode::Spectator.may_build());
    }

    #[test]
    fn standing_player_is_eye_offset_above_feet() {
        let p = PlayerState::standing_at(Vec3d::new(0.5, 64.0, 0.5));
        assert!((p.position.y - 65.62).abs() < 1e-4);
        assert_eq!(p.eye_height, PLAYER_EYE_OFFSET);
    }

    #[test]
    fn player_state_defaults_from_json() {
        let p: PlayerState = serde_json::from_str(
            r#"{"position":{"x":0,"y":65.62,"z":0},"back_position":{"x":0,"y":64,"z":0}}"#,
        )
        .unwrap();
        assert_eq!(p.eye_height, PLAYER_EYE_OFFSET);
        assert!(p.on_ground);
        assert_eq!(p.game_mode, GameMode::Survival);
    }
}
