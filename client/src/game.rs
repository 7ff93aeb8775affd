//! Client-side world: prediction for the local avatar, smoothing for everyone else.
//!
//! The local avatar moves every frame from input alone and only yields to the
//! server through corrections. Remote avatars are never predicted; each frame they
//! ease toward the position and aim of the latest snapshot.

use crate::input::InputSnapshot;
use log::{debug, info, warn};
use shared::{
    distance, lerp, lerp_angle, ArenaMap, EntityId, Hazard, LeaderboardEntry, NpcView, Packet, Pickup,
    PlayerClass, PlayerId, PlayerView, ProjectileView, ACCELERATION, FRICTION, LOCAL_AIM_LERP,
    PROJECTILE_SIZE, PROJECTILE_SPEED, REMOTE_LERP, TELEPORT_GRACE_MS, TELEPORT_THRESHOLD,
};
use std::collections::HashMap;

/// Velocity below which the avatar counts as standing still.
const MOVE_EPSILON: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct LocalAvatar {
    pub id: PlayerId,
    pub class: PlayerClass,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub speed: f32,
    pub aim_angle: f32,
    pub health: f32,
    pub max_health: f32,
    pub coins: u32,
    pub dead: bool,
    last_shot_at: Option<u64>,
}

impl LocalAvatar {
    fn from_view(view: &PlayerView) -> Self {
        Self {
            id: view.id,
            class: view.class,
            x: view.x,
            y: view.y,
            vx: 0.0,
            vy: 0.0,
            size: view.size,
            speed: view.speed,
            aim_angle: view.aim_angle,
            health: view.health,
            max_health: view.max_health,
            coins: view.coins,
            dead: view.dead,
            last_shot_at: None,
        }
    }

    /// Takes everything but the position from the server.
    fn sync_stats(&mut self, view: &PlayerView) {
        self.class = view.class;
        self.size = view.size;
        self.speed = view.speed;
        self.health = view.health;
        self.max_health = view.max_health;
        self.coins = view.coins;
        if view.dead && !self.dead {
            self.vx = 0.0;
            self.vy = 0.0;
        }
        self.dead = view.dead;
    }

    fn can_fire(&self, now: u64) -> bool {
        match self.last_shot_at {
            Some(last) => now.saturating_sub(last) >= self.class.stats().fire_cooldown_ms,
            None => true,
        }
    }
}

/// Another player, drawn where it is easing toward.
#[derive(Debug, Clone)]
pub struct RemoteAvatar {
    pub x: f32,
    pub y: f32,
    pub aim_angle: f32,
    /// Latest state reported by the server
    pub target: PlayerView,
}

impl RemoteAvatar {
    fn new(view: PlayerView) -> Self {
        Self {
            x: view.x,
            y: view.y,
            aim_angle: view.aim_angle,
            target: view,
        }
    }

    fn smooth(&mut self) {
        self.x = lerp(self.x, self.target.x, REMOTE_LERP);
        self.y = lerp(self.y, self.target.y, REMOTE_LERP);
        self.aim_angle = lerp_angle(self.aim_angle, self.target.aim_angle, REMOTE_LERP);
    }
}

/// A shot drawn immediately on fire, before the server echoes it back.
#[derive(Debug, Clone)]
pub struct LocalShot {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub fired_at: u64,
}

/// One-off events kept for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    PlayerDied { x: f32, y: f32, color: String },
    DamageText { x: f32, y: f32, amount: f32 },
    BossWarning,
    Disconnected { reason: String },
}

/// What the frame wants sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutput {
    pub move_to: Option<(f32, f32)>,
    pub shoot: Option<f32>,
}

impl FrameOutput {
    pub fn packets(&self) -> Vec<Packet> {
        let mut packets = Vec::new();
        if let Some((x, y)) = self.move_to {
            packets.push(Packet::Move { x, y });
        }
        if let Some(angle) = self.shoot {
            packets.push(Packet::Shoot { angle });
        }
        packets
    }
}

#[derive(Debug, Default)]
pub struct ClientWorld {
    pub my_id: Option<PlayerId>,
    pub map: ArenaMap,
    pub local: Option<LocalAvatar>,
    pub remotes: HashMap<PlayerId, RemoteAvatar>,
    pub projectiles: Vec<ProjectileView>,
    pub local_shots: Vec<LocalShot>,
    pub npcs: Vec<NpcView>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub events: Vec<ClientEvent>,
    pub server_tick: u32,
    /// Local collision is skipped until this time, after a teleport-sized correction.
    grace_until: Option<u64>,
    /// Highest id among our own projectiles the server has echoed so far.
    newest_own_projectile: Option<EntityId>,
}

impl ClientWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_joined(&self) -> bool {
        self.my_id.is_some()
    }

    pub fn in_grace(&self, now: u64) -> bool {
        self.grace_until.is_some_and(|until| now < until)
    }

    /// Applies one server packet.
    pub fn apply_packet(&mut self, packet: Packet, now: u64) {
        match packet {
            Packet::Init {
                id,
                map_size,
                players,
                obstacles,
                pickups,
                hazards,
            } => {
                info!("Joined as player {} on a {}x{} map", id, map_size, map_size);
                self.my_id = Some(id);
                self.map = ArenaMap::new(map_size, obstacles);
                self.pickups = pickups;
                self.hazards = hazards;
                self.local = None;
                self.remotes.clear();
                self.projectiles.clear();
                self.local_shots.clear();
                self.npcs.clear();
                self.grace_until = None;
                self.newest_own_projectile = None;
                self.apply_players(players);
            }

            Packet::StateUpdate {
                tick,
                players,
                projectiles,
                npcs,
                ..
            } => {
                self.server_tick = tick;
                self.apply_players(players);
                self.projectiles = projectiles;
                self.npcs = npcs;
                self.retire_echoed_shots();
            }

            Packet::ItemsUpdate { pickups } => self.pickups = pickups,
            Packet::HazardsUpdate { hazards } => self.hazards = hazards,
            Packet::Correction { x, y } => self.apply_correction(x, y, now),
            Packet::PlayerDied { x, y, color } => {
                self.events.push(ClientEvent::PlayerDied { x, y, color });
            }
            Packet::DamageText { x, y, amount, .. } => {
                self.events.push(ClientEvent::DamageText { x, y, amount });
            }
            Packet::BossWarning => {
                warn!("Boss incoming!");
                self.events.push(ClientEvent::BossWarning);
            }
            Packet::LeaderboardUpdate { entries } => self.leaderboard = entries,
            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.my_id = None;
                self.local = None;
                self.events.push(ClientEvent::Disconnected { reason });
            }

            other => warn!("Unexpected {} packet from server", other.kind()),
        }
    }

    /// Drops the oldest local shots, one per own projectile that first appeared in
    /// the latest snapshot. Projectile ids only grow within an arena.
    fn retire_echoed_shots(&mut self) {
        let Some(my_id) = self.my_id else {
            return;
        };
        let newest_seen = self.newest_own_projectile;
        let fresh: Vec<EntityId> = self
            .projectiles
            .iter()
            .filter(|p| p.owner == my_id && newest_seen.map_or(true, |seen| p.id > seen))
            .map(|p| p.id)
            .collect();

        if let Some(newest) = fresh.iter().max() {
            self.newest_own_projectile = Some(*newest);
        }
        let echoed = fresh.len().min(self.local_shots.len());
        self.local_shots.drain(..echoed);
    }

    /// A move to the current position, sent while standing still so the server
    /// keeps the session alive.
    pub fn keepalive(&self) -> Option<Packet> {
        self.my_id?;
        self.local
            .as_ref()
            .map(|local| Packet::Move { x: local.x, y: local.y })
    }

    fn apply_players(&mut self, players: Vec<PlayerView>) {
        let my_id = self.my_id;
        let mut seen = Vec::with_capacity(players.len());

        for view in players {
            if Some(view.id) == my_id {
                match self.local.as_mut() {
                    Some(local) => local.sync_stats(&view),
                    None => self.local = Some(LocalAvatar::from_view(&view)),
                }
                continue;
            }
            seen.push(view.id);
            match self.remotes.get_mut(&view.id) {
                Some(remote) => remote.target = view,
                None => {
                    self.remotes.insert(view.id, RemoteAvatar::new(view));
                }
            }
        }

        self.remotes.retain(|id, _| seen.contains(id));
    }

    /// Snaps the local avatar to the server's position. A jump larger than the
    /// teleport threshold suspends local collision for the grace window.
    pub fn apply_correction(&mut self, x: f32, y: f32, now: u64) {
        let Some(local) = self.local.as_mut() else {
            return;
        };
        let jump = distance(local.x, local.y, x, y);
        if jump > TELEPORT_THRESHOLD {
            debug!("Teleport correction of {:.0} units, collision grace on", jump);
            self.grace_until = Some(now + TELEPORT_GRACE_MS);
        }
        local.x = x;
        local.y = y;
        local.vx = 0.0;
        local.vy = 0.0;
    }

    /// Advances one render frame and reports what to send.
    pub fn frame(&mut self, input: &InputSnapshot, now: u64) -> FrameOutput {
        for remote in self.remotes.values_mut() {
            remote.smooth();
        }
        self.advance_local_shots();

        let grace = self.in_grace(now);
        if !grace {
            self.grace_until = None;
        }

        let Some(local) = self.local.as_mut() else {
            return FrameOutput::default();
        };
        if local.dead {
            return FrameOutput::default();
        }

        let mut output = FrameOutput::default();

        let (dir_x, dir_y) = input.direction();
        local.vx = (local.vx + dir_x * ACCELERATION) * FRICTION;
        local.vy = (local.vy + dir_y * ACCELERATION) * FRICTION;
        let velocity = (local.vx * local.vx + local.vy * local.vy).sqrt();
        if velocity > local.speed && velocity > 0.0 {
            local.vx *= local.speed / velocity;
            local.vy *= local.speed / velocity;
        }

        let next_x = local.x + local.vx;
        if grace || !self.map.hits_obstacle(next_x, local.y, local.size) {
            local.x = next_x;
        } else {
            local.vx = 0.0;
        }
        let next_y = local.y + local.vy;
        if grace || !self.map.hits_obstacle(local.x, next_y, local.size) {
            local.y = next_y;
        } else {
            local.vy = 0.0;
        }
        local.x = self.map.clamp_axis(local.x, local.size);
        local.y = self.map.clamp_axis(local.y, local.size);

        if local.vx.abs() > MOVE_EPSILON || local.vy.abs() > MOVE_EPSILON {
            output.move_to = Some((local.x, local.y));
        }

        if let Some(aim) = input.aim.filter(|a| a.is_finite()) {
            local.aim_angle = lerp_angle(local.aim_angle, aim, LOCAL_AIM_LERP);

            if input.firing && local.can_fire(now) {
                local.last_shot_at = Some(now);
                output.shoot = Some(aim);

                let (cx, cy) = (local.x + local.size / 2.0, local.y + local.size / 2.0);
                self.local_shots.push(LocalShot {
                    x: cx,
                    y: cy,
                    dx: aim.cos() * PROJECTILE_SPEED,
                    dy: aim.sin() * PROJECTILE_SPEED,
                    fired_at: now,
                });
            }
        }

        output
    }

    fn advance_local_shots(&mut self) {
        let map = &self.map;
        self.local_shots.retain_mut(|shot| {
            shot.x += shot.dx;
            shot.y += shot.dy;
            !map.intersects_obstacle(shot.x, shot.y, PROJECTILE_SIZE)
        });
    }

    /// Remote players' smoothed positions, for drawing.
    pub fn remote_positions(&self) -> Vec<(PlayerId, f32, f32)> {
        let mut positions: Vec<_> = self
            .remotes
            .iter()
            .map(|(id, remote)| (*id, remote.x, remote.y))
            .collect();
        positions.sort_by_key(|(id, _, _)| *id);
        positions
    }

    /// Hands over and clears the events collected since the last call.
    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }
}
