//! # Arena Client Library
//!
//! Client half of the arena netcode: everything needed to follow an authoritative
//! server smoothly over an unreliable, laggy link.
//!
//! ## Core Concepts
//!
//! ### Client-Side Prediction
//! The local avatar moves every frame from input alone, using the same obstacle
//! rule as the server. The client sends the resulting position and the server
//! either accepts it or answers with a correction.
//!
//! ### Corrections
//! A correction always wins over the predicted position. When it moves the avatar
//! by more than the teleport threshold (a respawn, or a rejected jump) local
//! collision is suspended for a short grace window, so prediction does not fight
//! the position the server just imposed.
//!
//! ### Interpolation
//! Other players are never predicted. Each frame they ease a fixed fraction of the
//! way toward the last snapshot, angles taking the short way round.
//!
//! ## Module Organization
//!
//! - [`game`]: the reconciled client world
//! - [`input`]: per-frame input snapshots and scripted input sources
//! - [`network`]: the headless UDP client loop
//! - [`config`] and [`error`]: settings and transport errors
//!
//! ## Usage Example
//!
//! ```rust
//! use client::game::ClientWorld;
//! use client::input::InputSnapshot;
//! use shared::{Packet, get_timestamp};
//!
//! let mut world = ClientWorld::new();
//! // Feed it packets from the server as they arrive...
//! world.apply_packet(Packet::BossWarning, get_timestamp());
//! // ...and one input snapshot per frame.
//! let output = world.frame(&InputSnapshot::from_keys(false, false, false, true), get_timestamp());
//! for packet in output.packets() {
//!     // send to the server
//!     let _ = packet;
//! }
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
