//! Projectiles, damage, death and respawn.

use crate::arena::Arena;
use crate::player::LifeState;
use log::{debug, info};
use shared::{
    normalize_angle, DamageTarget, EntityId, GameMode, Packet, PlayerId, ProjectileView, PROJECTILE_SIZE,
    PROJECTILE_SPEED, RESPAWN_DELAY_MS,
};

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub damage: f32,
}

impl Projectile {
    pub fn to_view(&self) -> ProjectileView {
        ProjectileView {
            id: self.id,
            owner: self.owner,
            x: self.x,
            y: self.y,
            dx: self.dx,
            dy: self.dy,
            damage: self.damage,
        }
    }
}

/// Fires a projectile from the player's center along `angle`.
///
/// Returns false when the player is unknown, dead, still cooling down, or the angle
/// is not a finite number.
pub fn shoot(arena: &mut Arena, id: PlayerId, angle: f32, now: u64) -> bool {
    if !angle.is_finite() {
        return false;
    }

    let angle = normalize_angle(angle);
    let (cx, cy, damage) = {
        let Some(player) = arena.players.get_mut(&id) else {
            return false;
        };
        if !player.is_alive() {
            return false;
        }
        if !player.can_fire(now) {
            debug!("Player {} fired during cooldown, shot dropped", id);
            return false;
        }
        player.last_shot_at = Some(now);
        player.aim_angle = angle;
        let (cx, cy) = player.center();
        (cx, cy, player.damage)
    };

    let projectile_id = arena.next_entity_id();
    arena.projectiles.push(Projectile {
        id: projectile_id,
        owner: id,
        x: cx,
        y: cy,
        dx: angle.cos() * PROJECTILE_SPEED,
        dy: angle.sin() * PROJECTILE_SPEED,
        damage,
    });
    true
}

/// Moves every projectile one step and resolves what it hits.
///
/// Obstacle impact is checked first, then living players other than the owner, then
/// (rescue mode) NPCs. A projectile damages at most one entity.
pub fn advance_projectiles(arena: &mut Arena, now: u64) {
    let mut projectiles = std::mem::take(&mut arena.projectiles);

    projectiles.retain_mut(|b| {
        b.x += b.dx;
        b.y += b.dy;

        if arena.map.intersects_obstacle(b.x, b.y, PROJECTILE_SIZE) {
            return false;
        }

        let victim = arena
            .players
            .values()
            .find(|p| p.is_alive() && p.id != b.owner && p.contains_point(b.x, b.y))
            .map(|p| p.id);

        if let Some(victim) = victim {
            if damage_player(arena, victim, b.damage, now) {
                let bounty = arena.config.kill_bounty;
                award_coins(arena, b.owner, victim, bounty);
            }
            return false;
        }

        if arena.config.mode == GameMode::Rescue && hit_npc(arena, b) {
            return false;
        }

        true
    });

    // Nothing spawns projectiles mid-tick, but keep anything that did.
    projectiles.append(&mut arena.projectiles);
    arena.projectiles = projectiles;
}

/// Applies damage to a living player and handles death. Returns true if the hit
/// killed them.
pub fn damage_player(arena: &mut Arena, victim: PlayerId, amount: f32, now: u64) -> bool {
    let (x, y, taken, died, color) = {
        let Some(player) = arena.players.get_mut(&victim) else {
            return false;
        };
        if !player.is_alive() {
            return false;
        }
        let taken = player.absorb(amount);
        let died = player.health <= 0.0;
        if died {
            player.life = LifeState::Dead {
                respawn_at: now + RESPAWN_DELAY_MS,
            };
        }
        (player.x, player.y, taken, died, player.color.clone())
    };

    arena.broadcast(Packet::DamageText {
        x,
        y,
        amount: taken,
        target: DamageTarget::Player,
    });

    if died {
        info!("Player {} died at ({:.0}, {:.0})", victim, x, y);
        arena.broadcast(Packet::PlayerDied { x, y, color });
    }
    died
}

/// Credits `coins` to `recipient` if they are still in the arena and are not the victim.
pub fn award_coins(arena: &mut Arena, recipient: PlayerId, victim: PlayerId, coins: u32) {
    if recipient == victim {
        return;
    }
    if let Some(player) = arena.players.get_mut(&recipient) {
        player.coins += coins;
    }
}

fn hit_npc(arena: &mut Arena, b: &Projectile) -> bool {
    let Some(index) = arena.npcs.iter().position(|n| n.contains_point(b.x, b.y)) else {
        return false;
    };

    let npc = &mut arena.npcs[index];
    npc.health -= b.damage;
    npc.last_hit_by = Some(b.owner);
    let (x, y, dead) = (npc.x, npc.y, npc.health <= 0.0);

    arena.broadcast(Packet::DamageText {
        x,
        y,
        amount: b.damage,
        target: DamageTarget::Npc,
    });

    if dead {
        let npc = arena.npcs.remove(index);
        if npc.kind.is_boss() {
            info!("Boss {} destroyed", npc.id);
            arena.boss_active = false;
        }
        if let Some(killer) = npc.last_hit_by {
            if let Some(player) = arena.players.get_mut(&killer) {
                player.coins += arena.config.npc_bounty;
            }
        }
    }
    true
}

/// Brings back every dead player whose respawn deadline has passed. Returns how
/// many respawned.
pub fn resolve_respawns(arena: &mut Arena, now: u64) -> usize {
    let due: Vec<(PlayerId, f32)> = arena
        .players
        .values()
        .filter_map(|p| match p.life {
            LifeState::Dead { respawn_at } if now > respawn_at => Some((p.id, p.size)),
            _ => None,
        })
        .collect();

    for &(id, size) in &due {
        let (x, y) = arena.spawn_point(size);
        if let Some(player) = arena.players.get_mut(&id) {
            player.life = LifeState::Alive;
            player.health = player.max_health;
            player.x = x;
            player.y = y;
            player.speed_buff = 0;
            player.shield_buff = 0;
        }
        debug!("Player {} respawned at ({:.0}, {:.0})", id, x, y);
        arena.send_to(id, Packet::Correction { x, y });
    }
    due.len()
}
