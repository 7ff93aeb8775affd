//! Pickups, player-placed hazards and the upgrade shop.

use crate::arena::Arena;
use crate::combat;
use crate::spawn::sample_clear_spot;
use log::{debug, warn};
use rand::Rng;
use shared::{distance, Hazard, Pickup, PickupKind, PlayerId, UpgradeKind};

/// Box used to find clear ground for a new pickup.
const PICKUP_FOOTPRINT: f32 = 20.0;

/// Tops the arena's pickups back up to its cap.
pub fn replenish_pickups(arena: &mut Arena) {
    while arena.pickups.len() < arena.config.pickup_cap {
        let Some((x, y)) = sample_clear_spot(&arena.map, &mut arena.rng, PICKUP_FOOTPRINT, |_, _| false) else {
            warn!("No clear ground left for pickups");
            break;
        };
        let kind = PickupKind::from_roll(arena.rng.gen::<f32>());
        let id = arena.next_entity_id();
        arena.pickups.push(Pickup { id, x, y, kind });
        arena.items_dirty = true;
    }
}

/// Lets every living player consume the pickups within reach.
pub fn collect_pickups(arena: &mut Arena) {
    if arena.pickups.is_empty() {
        return;
    }
    let reach = arena.config.pickup_radius;
    let coin_value = arena.config.coin_value;
    let health_pickup = arena.config.health_pickup;
    let buff_ticks = arena.config.buff_ticks;

    let pickups = &mut arena.pickups;
    let mut consumed = false;

    for player in arena.players.values_mut().filter(|p| p.is_alive()) {
        let (cx, cy) = player.center();
        let radius = player.size / 2.0 + reach;

        pickups.retain(|item| {
            if distance(cx, cy, item.x, item.y) >= radius {
                return true;
            }
            match item.kind {
                PickupKind::Coin => player.coins += coin_value,
                PickupKind::Health => player.heal(health_pickup),
                PickupKind::Speed => player.speed_buff = buff_ticks,
                PickupKind::Shield => player.shield_buff = buff_ticks,
            }
            debug!("Player {} picked up {:?}", player.id, item.kind);
            consumed = true;
            false
        });
    }

    if consumed {
        arena.items_dirty = true;
    }
}

/// Sets off hazards touched by a living player other than their owner.
pub fn trigger_hazards(arena: &mut Arena, now: u64) {
    if arena.hazards.is_empty() {
        return;
    }
    let reach = arena.config.hazard_radius;
    let mut triggered: Vec<(Hazard, PlayerId)> = Vec::new();

    arena.hazards.retain(|hazard| {
        let victim = arena.players.values().find(|p| {
            let (cx, cy) = p.center();
            p.is_alive() && p.id != hazard.owner && distance(cx, cy, hazard.x, hazard.y) < p.size / 2.0 + reach
        });
        match victim {
            Some(p) => {
                triggered.push((*hazard, p.id));
                false
            }
            None => true,
        }
    });

    if triggered.is_empty() {
        return;
    }
    arena.hazards_dirty = true;

    let damage = arena.config.hazard_damage;
    let bounty = arena.config.hazard_kill_bounty;
    for (hazard, victim) in triggered {
        debug!("Hazard {} triggered by player {}", hazard.id, victim);
        if combat::damage_player(arena, victim, damage, now) {
            combat::award_coins(arena, hazard.owner, victim, bounty);
        }
    }
}

/// Buys an upgrade for `id`. Unknown kinds, dead players and short balances are no-ops.
pub fn buy_upgrade(arena: &mut Arena, id: PlayerId, kind_tag: &str) -> bool {
    let Some(kind) = UpgradeKind::from_tag(kind_tag) else {
        debug!("Player {} asked for unknown upgrade '{}'", id, kind_tag);
        return false;
    };
    let Some(player) = arena.players.get_mut(&id) else {
        return false;
    };
    let cost = kind.cost();
    if !player.is_alive() || player.coins < cost {
        return false;
    }

    player.coins -= cost;
    match kind {
        UpgradeKind::Health => {
            player.max_health += 50.0;
            player.health += 50.0;
        }
        UpgradeKind::Damage => player.damage += 5.0,
        UpgradeKind::Mine => player.hazard_capacity += 1,
    }
    debug!("Player {} bought {:?} for {}", id, kind, cost);
    true
}

/// Drops a hazard at the player's center, consuming one unit of capacity.
pub fn place_hazard(arena: &mut Arena, id: PlayerId) -> bool {
    let (x, y) = {
        let Some(player) = arena.players.get_mut(&id) else {
            return false;
        };
        if !player.is_alive() || player.hazard_capacity == 0 {
            return false;
        }
        player.hazard_capacity -= 1;
        player.center()
    };

    let hazard_id = arena.next_entity_id();
    arena.hazards.push(Hazard {
        id: hazard_id,
        owner: id,
        x,
        y,
    });
    arena.hazards_dirty = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::player::LifeState;
    use shared::GameMode;

    fn arena() -> Arena {
        let config = ArenaConfig {
            seed: Some(13),
            pickup_cap: 0,
            ..ArenaConfig::for_mode(GameMode::Normal)
        };
        let mut arena = Arena::with_obstacles(config, vec![]);
        for (id, x) in [(1, 100.0), (2, 1000.0)] {
            arena.add_player(id, "square", "P", "red");
            let p = arena.players.get_mut(&id).unwrap();
            p.x = x;
            p.y = 100.0;
        }
        arena.drain_outbound();
        arena
    }

    fn drop_pickup(arena: &mut Arena, kind: PickupKind, x: f32, y: f32) {
        let id = arena.next_entity_id();
        arena.pickups.push(Pickup { id, x, y, kind });
    }

    #[test]
    fn test_pickup_effects() {
        let mut arena = arena();
        arena.players.get_mut(&1).unwrap().health = 50.0;
        drop_pickup(&mut arena, PickupKind::Coin, 120.0, 120.0);
        drop_pickup(&mut arena, PickupKind::Health, 125.0, 120.0);
        drop_pickup(&mut arena, PickupKind::Shield, 145.0, 120.0);
        drop_pickup(&mut arena, PickupKind::Speed, 500.0, 500.0);

        collect_pickups(&mut arena);
        let p = &arena.players[&1];
        assert_eq!(p.coins, 10);
        assert_eq!(p.health, 80.0);
        assert_eq!(p.shield_buff, 150);
        assert_eq!(p.speed_buff, 0);
        assert_eq!(arena.pickups.len(), 1);
        assert!(arena.items_dirty);
    }

    #[test]
    fn test_dead_players_do_not_collect() {
        let mut arena = arena();
        arena.players.get_mut(&1).unwrap().life = LifeState::Dead { respawn_at: 10 };
        drop_pickup(&mut arena, PickupKind::Coin, 120.0, 120.0);
        collect_pickups(&mut arena);
        assert_eq!(arena.pickups.len(), 1);
        assert!(!arena.items_dirty);
    }

    #[test]
    fn test_replenish_fills_to_cap() {
        let mut arena = arena();
        arena.config.pickup_cap = 5;
        replenish_pickups(&mut arena);
        assert_eq!(arena.pickups.len(), 5);
        assert!(arena.items_dirty);

        arena.items_dirty = false;
        replenish_pickups(&mut arena);
        assert!(!arena.items_dirty);
    }

    #[test]
    fn test_upgrades() {
        let mut arena = arena();
        arena.players.get_mut(&1).unwrap().coins = 130;

        assert!(buy_upgrade(&mut arena, 1, "health"));
        assert!(buy_upgrade(&mut arena, 1, "mine"));
        assert!(buy_upgrade(&mut arena, 1, "damage"));
        assert!(!buy_upgrade(&mut arena, 1, "damage"));
        assert!(!buy_upgrade(&mut arena, 1, "laser"));

        let p = &arena.players[&1];
        assert_eq!(p.coins, 0);
        assert_eq!(p.max_health, 150.0);
        assert_eq!(p.health, 150.0);
        assert_eq!(p.damage, 20.0);
        assert_eq!(p.hazard_capacity, 1);
    }

    #[test]
    fn test_dead_player_cannot_buy() {
        let mut arena = arena();
        {
            let p = arena.players.get_mut(&1).unwrap();
            p.coins = 100;
            p.life = LifeState::Dead { respawn_at: 10 };
        }
        assert!(!buy_upgrade(&mut arena, 1, "damage"));
        assert_eq!(arena.players[&1].coins, 100);
    }

    #[test]
    fn test_place_hazard_needs_capacity() {
        let mut arena = arena();
        assert!(!place_hazard(&mut arena, 1));
        assert!(arena.hazards.is_empty());

        arena.players.get_mut(&1).unwrap().hazard_capacity = 1;
        assert!(place_hazard(&mut arena, 1));
        assert!(!place_hazard(&mut arena, 1));
        assert_eq!(arena.hazards.len(), 1);
        assert_eq!((arena.hazards[0].x, arena.hazards[0].y), (120.0, 120.0));
        assert!(arena.hazards_dirty);
    }

    #[test]
    fn test_owner_does_not_trigger_own_hazard() {
        let mut arena = arena();
        arena.players.get_mut(&1).unwrap().hazard_capacity = 1;
        place_hazard(&mut arena, 1);
        arena.hazards_dirty = false;

        trigger_hazards(&mut arena, 1000);
        assert_eq!(arena.hazards.len(), 1);
        assert!(!arena.hazards_dirty);
    }

    #[test]
    fn test_hazard_kill_pays_owner() {
        let mut arena = arena();
        arena.players.get_mut(&1).unwrap().hazard_capacity = 1;
        place_hazard(&mut arena, 1);
        {
            let victim = arena.players.get_mut(&2).unwrap();
            victim.x = 100.0;
            victim.health = 30.0;
        }

        trigger_hazards(&mut arena, 1000);
        assert!(arena.hazards.is_empty());
        assert!(arena.hazards_dirty);
        assert!(!arena.players[&2].is_alive());
        assert_eq!(arena.players[&1].coins, arena.config.hazard_kill_bounty);
    }
}
