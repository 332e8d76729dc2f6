//! `bridge_shared`
//!
//! Types shared by the interaction translator, its binaries, and its tests.
//!
//! Design goals:
//! - Decoded packet models for both protocols, free of wire layout.
//! - Mirrors of the authoritative state the translator consults (inventory,
//!   entities) with small, explicit APIs.
//! - No `unsafe`.

pub mod block;
pub mod codec;
pub mod config;
pub mod entity;
pub mod inventory;
pub mod item;
pub mod math;
pub mod protocol;
