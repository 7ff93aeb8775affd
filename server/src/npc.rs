//! Hostile NPCs for the rescue arena.
//!
//! The director rolls for grunt spawns each tick and watches for the boss trigger.
//! It never clears the boss itself; combat does that when the boss dies, and the
//! director notices on its next run.

use crate::arena::Arena;
use crate::spawn::sample_clear_spot;
use log::{debug, info, warn};
use rand::Rng;
use shared::{distance, EntityId, NpcKind, NpcView, Packet, PlayerId};

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: EntityId,
    pub kind: NpcKind,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    /// Last player whose projectile hit this NPC.
    pub last_hit_by: Option<PlayerId>,
}

impl Npc {
    pub fn new(id: EntityId, kind: NpcKind, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            health: kind.max_health(),
            max_health: kind.max_health(),
            last_hit_by: None,
        }
    }

    pub fn size(&self) -> f32 {
        self.kind.size()
    }

    pub fn center(&self) -> (f32, f32) {
        let half = self.size() / 2.0;
        (self.x + half, self.y + half)
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        let (cx, cy) = self.center();
        distance(px, py, cx, cy) < self.size() / 2.0
    }

    fn overlaps(&self, x: f32, y: f32, size: f32) -> bool {
        let s = self.size();
        x < self.x + s && self.x < x + size && y < self.y + s && self.y < y + size
    }

    pub fn to_view(&self) -> NpcView {
        NpcView {
            id: self.id,
            kind: self.kind,
            x: self.x,
            y: self.y,
            size: self.size(),
            health: self.health,
            max_health: self.max_health,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectorPhase {
    #[default]
    Idle,
    Spawning,
    BossPending,
    BossActive,
}

#[derive(Debug, Default)]
pub struct NpcDirector {
    phase: DirectorPhase,
    boss_warnings: u32,
}

impl NpcDirector {
    pub fn phase(&self) -> DirectorPhase {
        self.phase
    }

    /// Boss warnings emitted over the arena's lifetime.
    pub fn boss_warnings(&self) -> u32 {
        self.boss_warnings
    }
}

/// One director step: resync after a boss death, roll for a grunt, check the boss
/// trigger.
pub fn run_director(arena: &mut Arena) {
    if arena.director.phase == DirectorPhase::BossActive && !arena.boss_active {
        info!("Boss cleared, director back to spawning grunts");
        arena.director.phase = settled_phase(arena);
    }

    maybe_spawn_grunt(arena);
    check_boss_trigger(arena);
}

fn settled_phase(arena: &Arena) -> DirectorPhase {
    if arena.boss_active {
        DirectorPhase::BossActive
    } else if arena.npcs.is_empty() {
        DirectorPhase::Idle
    } else {
        DirectorPhase::Spawning
    }
}

fn maybe_spawn_grunt(arena: &mut Arena) {
    if arena.boss_active || arena.players.is_empty() || arena.npcs.len() >= arena.config.npc_cap {
        return;
    }
    if !arena.rng.gen_bool(arena.config.npc_spawn_chance.clamp(0.0, 1.0)) {
        return;
    }

    let kind = if arena.rng.gen_bool(0.8) {
        NpcKind::Scout
    } else {
        NpcKind::Tank
    };
    let size = kind.size();

    let npcs = &arena.npcs;
    let spot = sample_clear_spot(&arena.map, &mut arena.rng, size, |x, y| {
        npcs.iter().any(|n| n.overlaps(x, y, size))
    });

    match spot {
        Some((x, y)) => {
            let id = arena.next_entity_id();
            debug!("Spawned {:?} {} at ({:.0}, {:.0})", kind, id, x, y);
            arena.npcs.push(Npc::new(id, kind, x, y));
            arena.director.phase = DirectorPhase::Spawning;
        }
        None => warn!("No clear spot for a {:?}, skipping spawn", kind),
    }
}

fn check_boss_trigger(arena: &mut Arena) {
    if arena.boss_active {
        return;
    }
    let trigger_y = arena.config.boss_trigger_y;
    let triggered = arena.players.values().any(|p| p.is_alive() && p.y < trigger_y);
    if !triggered {
        return;
    }

    arena.director.phase = DirectorPhase::BossPending;
    let (x, y) = arena.config.boss_spawn_point();
    let id = arena.next_entity_id();
    arena.npcs.push(Npc::new(id, NpcKind::Boss, x, y));
    arena.boss_active = true;

    info!("Boss {} spawned at ({:.0}, {:.0})", id, x, y);
    arena.broadcast(Packet::BossWarning);
    arena.director.boss_warnings += 1;
    arena.director.phase = DirectorPhase::BossActive;
}

/// Moves each NPC straight toward the nearest living player inside the aggro radius.
/// A step that would hit an obstacle is skipped for this tick.
pub fn steer_npcs(arena: &mut Arena) {
    let targets: Vec<(f32, f32)> = arena
        .players
        .values()
        .filter(|p| p.is_alive())
        .map(|p| p.center())
        .collect();
    if targets.is_empty() {
        return;
    }

    let radius = arena.config.aggro_radius;
    let map = &arena.map;

    for npc in arena.npcs.iter_mut() {
        let (cx, cy) = npc.center();
        let nearest = targets
            .iter()
            .map(|&(tx, ty)| (tx, ty, distance(cx, cy, tx, ty)))
            .filter(|&(_, _, d)| d < radius)
            .min_by(|a, b| a.2.total_cmp(&b.2));

        let Some((tx, ty, dist)) = nearest else {
            continue;
        };
        if dist <= f32::EPSILON {
            continue;
        }

        let speed = npc.kind.speed();
        let nx = npc.x + (tx - cx) / dist * speed;
        let ny = npc.y + (ty - cy) / dist * speed;
        if !map.intersects_obstacle(nx, ny, npc.size()) {
            npc.x = nx;
            npc.y = ny;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Outbound;
    use crate::config::ArenaConfig;
    use crate::player::LifeState;
    use shared::{GameMode, Obstacle};

    fn rescue(npc_spawn_chance: f64, obstacles: Vec<Obstacle>) -> Arena {
        let config = ArenaConfig {
            seed: Some(4),
            pickup_cap: 0,
            npc_spawn_chance,
            ..ArenaConfig::for_mode(GameMode::Rescue)
        };
        Arena::with_obstacles(config, obstacles)
    }

    fn warnings(arena: &mut Arena) -> usize {
        arena
            .drain_outbound()
            .into_iter()
            .filter(|o| matches!(o, Outbound::Broadcast(Packet::BossWarning)))
            .count()
    }

    #[test]
    fn test_boss_trigger_spawns_exactly_one_boss() {
        let mut arena = rescue(0.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        arena.players.get_mut(&1).unwrap().y = 500.0;
        arena.drain_outbound();

        run_director(&mut arena);
        assert!(arena.boss_active);
        assert_eq!(arena.director.phase(), DirectorPhase::BossActive);
        assert_eq!(warnings(&mut arena), 1);

        for _ in 0..10 {
            run_director(&mut arena);
        }
        let bosses = arena.npcs.iter().filter(|n| n.kind.is_boss()).count();
        assert_eq!(bosses, 1);
        assert_eq!(warnings(&mut arena), 0);
        assert_eq!(arena.director.boss_warnings(), 1);

        let boss = &arena.npcs[0];
        assert_eq!((boss.x, boss.y), (2000.0, 200.0));
        assert_eq!(boss.health, 3000.0);
    }

    #[test]
    fn test_dead_player_does_not_trigger_boss() {
        let mut arena = rescue(0.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        {
            let p = arena.players.get_mut(&1).unwrap();
            p.y = 100.0;
            p.life = LifeState::Dead { respawn_at: 1 };
        }
        run_director(&mut arena);
        assert!(!arena.boss_active);
        assert!(arena.npcs.is_empty());
    }

    #[test]
    fn test_director_resyncs_after_boss_death() {
        let mut arena = rescue(0.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        arena.players.get_mut(&1).unwrap().y = 500.0;
        run_director(&mut arena);

        // Combat kills the boss and the player moves back out of the trigger zone.
        arena.npcs.clear();
        arena.boss_active = false;
        arena.players.get_mut(&1).unwrap().y = 3000.0;
        run_director(&mut arena);
        assert_eq!(arena.director.phase(), DirectorPhase::Idle);
    }

    #[test]
    fn test_grunts_spawn_under_cap() {
        let mut arena = rescue(1.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        for _ in 0..40 {
            run_director(&mut arena);
        }
        assert_eq!(arena.npcs.len(), arena.config.npc_cap);
        assert_eq!(arena.director.phase(), DirectorPhase::Spawning);
        assert!(arena.npcs.iter().all(|n| !n.kind.is_boss()));

        for (i, a) in arena.npcs.iter().enumerate() {
            for b in arena.npcs.iter().skip(i + 1) {
                assert!(!a.overlaps(b.x, b.y, b.size()));
            }
        }
    }

    #[test]
    fn test_no_grunts_while_boss_active() {
        let mut arena = rescue(1.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        arena.boss_active = true;
        run_director(&mut arena);
        assert!(arena.npcs.is_empty());
    }

    #[test]
    fn test_npc_steers_toward_nearest_player() {
        let mut arena = rescue(0.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        {
            let p = arena.players.get_mut(&1).unwrap();
            p.x = 1000.0;
            p.y = 1000.0;
        }
        arena.npcs.push(Npc::new(90, NpcKind::Scout, 500.0, 1000.0));

        steer_npcs(&mut arena);
        let npc = &arena.npcs[0];
        assert!((npc.x - 508.0).abs() < 1e-3);
        assert!((npc.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_npc_blocked_by_obstacle_stays_put() {
        let mut arena = rescue(0.0, vec![Obstacle::new(545.0, 900.0, 20.0, 300.0)]);
        arena.add_player(1, "square", "A", "red");
        {
            let p = arena.players.get_mut(&1).unwrap();
            p.x = 1000.0;
            p.y = 1000.0;
        }
        arena.npcs.push(Npc::new(90, NpcKind::Scout, 500.0, 1000.0));

        steer_npcs(&mut arena);
        assert_eq!((arena.npcs[0].x, arena.npcs[0].y), (500.0, 1000.0));
    }

    #[test]
    fn test_npc_ignores_players_outside_aggro_radius() {
        let mut arena = rescue(0.0, vec![]);
        arena.add_player(1, "square", "A", "red");
        {
            let p = arena.players.get_mut(&1).unwrap();
            p.x = 3900.0;
            p.y = 3900.0;
        }
        arena.npcs.push(Npc::new(90, NpcKind::Tank, 0.0, 0.0));

        steer_npcs(&mut arena);
        assert_eq!((arena.npcs[0].x, arena.npcs[0].y), (0.0, 0.0));
    }
}
