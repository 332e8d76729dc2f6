//! `bridge_translator`
//!
//! World and inventory interaction for the front/back protocol bridge:
//! - Classifies composite front transactions
//! - Re-validates them against authoritative world/inventory state
//! - Emits discrete back commands, or rolls the client back
//!
//! Each player session runs on its own serial task ([`SessionDriver`]).

pub mod collaborators;
pub mod desync;
pub mod dispatcher;
pub mod driver;
pub mod drop_bridge;
pub mod fixture;
pub mod geometry;
pub mod heuristics;
pub mod interaction;
pub mod memory;
pub mod rejection;
pub mod rotation;
pub mod scheduler;
pub mod session;
pub mod side_effects;
pub mod testing;

pub use driver::SessionDriver;
pub use rejection::Rejection;
pub use session::{Collaborators, Session};
