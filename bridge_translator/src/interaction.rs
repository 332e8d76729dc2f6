//! Two-phase entity interaction across both hands.

use bridge_shared::{
    entity::{InteractionResult, Interactable},
    item::Hand,
    math::Vec3,
    protocol::{back::InteractAction, BackPacket},
};
use tracing::debug;

use crate::session::{GameMode, Session};

/// Mirrors a vanilla client's interaction with an entity: for each hand, an
/// interact-at followed by a plain interact if the first did nothing, until
/// one of them is consumed. `click_position` is absolute.
pub fn process_entity_interaction(session: &mut Session, runtime_id: u64, click_position: Vec3) {
    let Some(entity) = session.entities.get(runtime_id) else {
        return;
    };
    let entity_id = entity.entity_id;
    let position = entity.position;
    if !session.world.is_inside_border(position) {
        debug!(session = %session.name, entity_id, "entity outside world border");
        return;
    }

    let target = click_position.sub(position);
    let spectator = session.player.game_mode == GameMode::Spectator;
    let sneaking = session.player.sneaking;
    let ctx = session.interact_context();

    for hand in Hand::ALL {
        session.send_back(BackPacket::Interact {
            entity_id,
            action: InteractAction::InteractAt { target, hand },
            sneaking,
        });

        let mut result = if spectator {
            InteractionResult::Pass
        } else {
            session
                .entities
                .get_mut(runtime_id)
                .map_or(InteractionResult::Pass, |e| e.kind.interact_at(hand, &ctx))
        };

        if !result.consumes_action() {
            session.send_back(BackPacket::Interact {
                entity_id,
                action: InteractAction::Interact { hand },
                sneaking,
            });
            if !spectator {
                result = session
                    .entities
                    .get_mut(runtime_id)
                    .map_or(InteractionResult::Pass, |e| e.kind.interact(hand, &ctx));
            }
        }

        if result.consumes_action() {
            // The front client only swings on its own for the main hand.
            if result.should_swing() && hand == Hand::Off {
                session.send_back(BackPacket::Swing { hand });
            }
            return;
        }
    }
}
