//! Packet models for both sides of the bridge.
//!
//! - `front`: what the game client sends us and what we send back to it.
//! - `back`: commands we send to the game server.
//!
//! Binary layout belongs to the codec layer; these are the decoded forms.

pub mod back;
pub mod front;

pub use back::BackPacket;
pub use front::{FrontPacket, InboundPacket, InventoryTransaction};
