//! # Arena Server Library
//!
//! Authoritative server for a multiplayer top-down arena shooter. Every arena runs
//! its own simulation; clients submit movement, shots and purchases, and receive a
//! snapshot of their arena each tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server decides positions, hits, deaths and rewards. Client-submitted
//! positions are only accepted when they are a plausible step from the current
//! authoritative position; otherwise the client receives a correction.
//!
//! ### Arenas
//! Two arenas run side by side: an open `normal` arena scattered with obstacles,
//! and a `rescue` arena with hostile NPCs and a boss guarding the top of the map.
//! Arenas share nothing and never wait on one another.
//!
//! ### Session Management
//! The UDP gateway maps remote addresses to session ids, enforces the client
//! limit, drops idle peers and moves a session between arenas when it joins again.
//!
//! ## Architecture Design
//!
//! ### One Actor per Arena
//! Each arena is owned by a single tokio task. Gateway input becomes an
//! [`scheduler::ArenaCommand`] on that arena's bounded queue and is applied at the
//! start of the next tick, so the simulation itself needs no locks. Ticks run on
//! a fixed interval that skips missed ticks instead of bursting to catch up.
//!
//! ### Fire-and-Forget Output
//! Simulation code never touches the socket. Outgoing packets are queued on the
//! arena's outbox during the tick, then handed to the network sender task.
//!
//! ## Module Organization
//!
//! - [`arena`]: the world model and its per-tick pipeline
//! - [`movement`]: validation of client-submitted positions
//! - [`combat`]: projectiles, damage, death and respawn
//! - [`npc`]: the rescue-arena NPC director and NPC steering
//! - [`items`]: pickups, hazards and upgrades
//! - [`spawn`]: bounded safe-spawn search
//! - [`scheduler`]: the arena actor and tick loop
//! - [`gateway`] and [`network`]: sessions and the UDP transport
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "127.0.0.1:8080".to_string(),
//!         seed: Some(42),
//!         ..ServerConfig::default()
//!     };
//!     let mut server = Server::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod arena;
pub mod combat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod items;
pub mod movement;
pub mod network;
pub mod npc;
pub mod player;
pub mod scheduler;
pub mod spawn;
