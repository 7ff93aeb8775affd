//! The per-arena world model.
//!
//! An [`Arena`] owns every entity in one simulation universe. It is mutated only by
//! the task that owns it (see [`crate::scheduler`]), so nothing in here locks.
//! Operations never fail: bad input is ignored or replaced with a default, and any
//! message a client should see is queued on the arena's outbox for the scheduler to
//! flush after the tick.

use crate::combat::{self, Projectile};
use crate::config::ArenaConfig;
use crate::items;
use crate::npc::{self, Npc, NpcDirector};
use crate::player::Player;
use crate::spawn;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    sanitize_color, sanitize_name, ArenaMap, EntityId, GameMode, Hazard, LeaderboardEntry, NpcView, Obstacle,
    Packet, Pickup, PlayerClass, PlayerId, PlayerView, ProjectileView, DEFAULT_PLAYER_SIZE,
};
use std::collections::BTreeMap;

/// A message produced by the simulation, addressed to the arena or one player.
#[derive(Debug, Clone)]
pub enum Outbound {
    Broadcast(Packet),
    To(PlayerId, Packet),
}

pub struct Arena {
    pub config: ArenaConfig,
    pub map: ArenaMap,
    /// Ordered by id so hit resolution is reproducible.
    pub players: BTreeMap<PlayerId, Player>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,
    pub npcs: Vec<Npc>,
    pub boss_active: bool,
    pub director: NpcDirector,
    pub tick: u32,
    pub(crate) rng: StdRng,
    pub(crate) items_dirty: bool,
    pub(crate) hazards_dirty: bool,
    next_entity_id: EntityId,
    fallback_spawn: (f32, f32),
    outbox: Vec<Outbound>,
}

impl Arena {
    /// Builds an arena and generates its map from the mode.
    pub fn new(config: ArenaConfig) -> Self {
        let mut rng = seeded_rng(config.seed);
        let obstacles = match config.mode {
            GameMode::Normal => generate_obstacles(&mut rng, config.map_size, config.obstacle_count),
            GameMode::Rescue => boundary_walls(config.map_size),
        };
        Self::build(config, obstacles, rng)
    }

    /// Builds an arena around a fixed set of obstacles.
    pub fn with_obstacles(config: ArenaConfig, obstacles: Vec<Obstacle>) -> Self {
        let rng = seeded_rng(config.seed);
        Self::build(config, obstacles, rng)
    }

    fn build(config: ArenaConfig, obstacles: Vec<Obstacle>, rng: StdRng) -> Self {
        let map = ArenaMap::new(config.map_size, obstacles);
        let footprint = PlayerClass::largest_size().max(DEFAULT_PLAYER_SIZE);
        let fallback_spawn = spawn::validated_fallback(&map, footprint);

        let mut arena = Self {
            config,
            map,
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            hazards: Vec::new(),
            npcs: Vec::new(),
            boss_active: false,
            director: NpcDirector::default(),
            tick: 0,
            rng,
            items_dirty: false,
            hazards_dirty: false,
            next_entity_id: 1,
            fallback_spawn,
            outbox: Vec::new(),
        };
        items::replenish_pickups(&mut arena);
        arena.items_dirty = false;

        info!(
            "Arena '{}' ready: {}x{} with {} obstacles and {} pickups",
            arena.config.mode.tag(),
            arena.map.size,
            arena.map.size,
            arena.map.obstacles.len(),
            arena.pickups.len()
        );
        arena
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    /// Creates a player and replies with the `Init` snapshot. Unknown class tags
    /// become the default class. Joining again with the same id replaces the player.
    pub fn add_player(&mut self, session_id: PlayerId, class_tag: &str, name: &str, color: &str) -> (f32, f32) {
        let class = PlayerClass::from_tag(class_tag);
        let size = class.stats().size;
        let (x, y) = self.spawn_point(size);

        let player = Player::new(session_id, class, sanitize_name(name), sanitize_color(color), x, y);
        info!(
            "Player {} ({}, {}) joined '{}' at ({:.0}, {:.0})",
            session_id,
            player.name,
            class.stats().name,
            self.config.mode.tag(),
            x,
            y
        );
        self.players.insert(session_id, player);

        let init = Packet::Init {
            id: session_id,
            map_size: self.map.size,
            players: self.player_views(),
            obstacles: self.map.obstacles.clone(),
            pickups: self.pickups.clone(),
            hazards: self.hazards.clone(),
        };
        self.send_to(session_id, init);
        (x, y)
    }

    /// Removes a player. Removing an absent player is a no-op.
    pub fn remove_player(&mut self, session_id: PlayerId) -> bool {
        match self.players.remove(&session_id) {
            Some(player) => {
                info!("Player {} ({}) left '{}'", session_id, player.name, self.config.mode.tag());
                true
            }
            None => false,
        }
    }

    /// Advances the arena by exactly one tick.
    pub fn mutate_tick(&mut self, now: u64) {
        self.tick = self.tick.wrapping_add(1);

        if self.config.mode == GameMode::Rescue {
            npc::run_director(self);
            npc::steer_npcs(self);
        }

        combat::advance_projectiles(self, now);
        combat::resolve_respawns(self, now);

        items::collect_pickups(self);
        items::trigger_hazards(self, now);
        items::replenish_pickups(self);

        for player in self.players.values_mut() {
            player.tick_buffs();
        }
    }

    /// Spawn position for a new or respawning player of the given hitbox size.
    pub fn spawn_point(&mut self, size: f32) -> (f32, f32) {
        match self.config.mode {
            GameMode::Rescue => self.config.rescue_point(),
            GameMode::Normal => spawn::find_safe_spawn(
                &self.map,
                &mut self.rng,
                size.max(DEFAULT_PLAYER_SIZE),
                self.fallback_spawn,
            ),
        }
    }

    pub fn fallback_spawn(&self) -> (f32, f32) {
        self.fallback_spawn
    }

    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = self.next_entity_id.wrapping_add(1);
        id
    }

    pub fn broadcast(&mut self, packet: Packet) {
        self.outbox.push(Outbound::Broadcast(packet));
    }

    pub fn send_to(&mut self, player_id: PlayerId, packet: Packet) {
        self.outbox.push(Outbound::To(player_id, packet));
    }

    /// Takes every queued outbound message, oldest first.
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.values().map(Player::to_view).collect()
    }

    pub fn projectile_views(&self) -> Vec<ProjectileView> {
        self.projectiles.iter().map(Projectile::to_view).collect()
    }

    pub fn npc_views(&self) -> Vec<NpcView> {
        self.npcs.iter().map(Npc::to_view).collect()
    }

    /// Players sorted by coin balance, richest first.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .values()
            .map(|p| LeaderboardEntry {
                id: p.id,
                name: p.name.clone(),
                coins: p.coins,
            })
            .collect();
        entries.sort_by(|a, b| b.coins.cmp(&a.coins).then(a.id.cmp(&b.id)));
        entries.truncate(self.config.leaderboard_size);
        entries
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Random rectangles scattered over the map.
pub fn generate_obstacles<R: Rng + ?Sized>(rng: &mut R, map_size: f32, count: usize) -> Vec<Obstacle> {
    let span = (map_size - 200.0).max(1.0);
    (0..count)
        .map(|_| {
            Obstacle::new(
                rng.gen_range(0.0..span).floor(),
                rng.gen_range(0.0..span).floor(),
                rng.gen_range(50.0..200.0_f32).floor(),
                rng.gen_range(50.0..200.0_f32).floor(),
            )
        })
        .collect()
}

/// Four walls hugging the outside of the map.
pub fn boundary_walls(map_size: f32) -> Vec<Obstacle> {
    vec![
        Obstacle::new(-50.0, -50.0, map_size + 100.0, 50.0),
        Obstacle::new(-50.0, map_size, map_size + 100.0, 50.0),
        Obstacle::new(-50.0, 0.0, 50.0, map_size),
        Obstacle::new(map_size, 0.0, 50.0, map_size),
    ]
}
