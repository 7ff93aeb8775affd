//! Wire protocol. Every message in either direction is one bincode-encoded [`Packet`].

use crate::classes::{NpcKind, PickupKind, PlayerClass};
use crate::spatial::Obstacle;
use crate::{EntityId, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // Client -> server
    Join {
        name: String,
        color: String,
        class_tag: String,
        mode_tag: String,
    },
    Move {
        x: f32,
        y: f32,
    },
    Shoot {
        angle: f32,
    },
    BuyUpgrade {
        kind: String,
    },
    PlaceHazard,
    Disconnect,

    // Server -> client
    Init {
        id: PlayerId,
        map_size: f32,
        players: Vec<PlayerView>,
        obstacles: Vec<Obstacle>,
        pickups: Vec<Pickup>,
        hazards: Vec<Hazard>,
    },
    StateUpdate {
        tick: u32,
        timestamp: u64,
        players: Vec<PlayerView>,
        projectiles: Vec<ProjectileView>,
        npcs: Vec<NpcView>,
    },
    ItemsUpdate {
        pickups: Vec<Pickup>,
    },
    HazardsUpdate {
        hazards: Vec<Hazard>,
    },
    Correction {
        x: f32,
        y: f32,
    },
    PlayerDied {
        x: f32,
        y: f32,
        color: String,
    },
    DamageText {
        x: f32,
        y: f32,
        amount: f32,
        target: DamageTarget,
    },
    BossWarning,
    LeaderboardUpdate {
        entries: Vec<LeaderboardEntry>,
    },
    Disconnected {
        reason: String,
    },
}

impl Packet {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Join { .. } => "join",
            Packet::Move { .. } => "move",
            Packet::Shoot { .. } => "shoot",
            Packet::BuyUpgrade { .. } => "buy_upgrade",
            Packet::PlaceHazard => "place_hazard",
            Packet::Disconnect => "disconnect",
            Packet::Init { .. } => "init",
            Packet::StateUpdate { .. } => "state_update",
            Packet::ItemsUpdate { .. } => "items_update",
            Packet::HazardsUpdate { .. } => "hazards_update",
            Packet::Correction { .. } => "correction",
            Packet::PlayerDied { .. } => "player_died",
            Packet::DamageText { .. } => "damage_text",
            Packet::BossWarning => "boss_warning",
            Packet::LeaderboardUpdate { .. } => "leaderboard_update",
            Packet::Disconnected { .. } => "disconnected",
        }
    }
}

/// Snapshot of one player as broadcast to every client in the arena.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub class: PlayerClass,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub coins: u32,
    pub speed: f32,
    pub damage: f32,
    pub aim_angle: f32,
    pub hazard_capacity: u32,
    pub speed_buff: u32,
    pub shield_buff: u32,
    pub dead: bool,
    /// Wall-clock millis at which a dead player respawns; 0 while alive.
    pub respawn_at: u64,
}

impl PlayerView {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProjectileView {
    pub id: EntityId,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub damage: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NpcView {
    pub id: EntityId,
    pub kind: NpcKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub kind: PickupKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub id: EntityId,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub name: String,
    pub coins: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DamageTarget {
    Player,
    Npc,
}
