//! Server and per-arena tuning.
//!
//! `main` builds a [`ServerConfig`] from command-line arguments; each arena gets an
//! [`ArenaConfig`] derived from its mode. Tests construct these directly.

use shared::{GameMode, TICK_RATE};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tick_rate: u32,
    pub max_clients: usize,
    /// Seed for arena generation and NPC rolls. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub client_timeout: Duration,
    /// Capacity of each arena's inbound command queue.
    pub command_queue: usize,
}

impl ServerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    /// Arena tuning for `mode`, with a mode-specific seed when one was configured.
    pub fn arena_config(&self, mode: GameMode) -> ArenaConfig {
        let mut config = ArenaConfig::for_mode(mode);
        config.seed = self.seed.map(|seed| match mode {
            GameMode::Normal => seed,
            GameMode::Rescue => seed.wrapping_add(1),
        });
        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            tick_rate: TICK_RATE,
            max_clients: 64,
            seed: None,
            client_timeout: Duration::from_secs(5),
            command_queue: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub mode: GameMode,
    pub map_size: f32,
    pub obstacle_count: usize,
    pub pickup_cap: usize,
    pub seed: Option<u64>,

    // NPC director (rescue mode)
    pub npc_cap: usize,
    pub npc_spawn_chance: f64,
    pub aggro_radius: f32,
    pub boss_trigger_y: f32,
    pub npc_bounty: u32,

    // Rewards and pickups
    pub kill_bounty: u32,
    pub hazard_kill_bounty: u32,
    pub coin_value: u32,
    pub health_pickup: f32,
    pub buff_ticks: u32,
    pub pickup_radius: f32,
    pub hazard_damage: f32,
    pub hazard_radius: f32,

    /// Ticks between leaderboard broadcasts.
    pub leaderboard_interval: u32,
    pub leaderboard_size: usize,
}

impl ArenaConfig {
    pub fn for_mode(mode: GameMode) -> Self {
        let (map_size, obstacle_count, pickup_cap) = match mode {
            GameMode::Normal => (3000.0, 40, 60),
            GameMode::Rescue => (4000.0, 0, 40),
        };

        Self {
            mode,
            map_size,
            obstacle_count,
            pickup_cap,
            seed: None,
            npc_cap: 15,
            npc_spawn_chance: 0.01,
            aggro_radius: 2000.0,
            boss_trigger_y: 600.0,
            npc_bounty: 20,
            kill_bounty: 25,
            hazard_kill_bounty: 10,
            coin_value: 10,
            health_pickup: 30.0,
            buff_ticks: 150,
            pickup_radius: 10.0,
            hazard_damage: 40.0,
            hazard_radius: 10.0,
            leaderboard_interval: TICK_RATE,
            leaderboard_size: 10,
        }
    }

    /// Fixed entry point for rescue-mode joins and respawns.
    pub fn rescue_point(&self) -> (f32, f32) {
        (self.map_size / 2.0, self.map_size - 600.0)
    }

    pub fn boss_spawn_point(&self) -> (f32, f32) {
        (self.map_size / 2.0, 200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tick_duration() {
        let config = ServerConfig::default();
        let tick = config.tick_duration();
        assert!(tick.as_millis() >= 33 && tick.as_millis() <= 34);
    }

    #[test]
    fn test_zero_tick_rate_does_not_divide_by_zero() {
        let config = ServerConfig {
            tick_rate: 0,
            ..ServerConfig::default()
        };
        assert_eq!(config.tick_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_mode_configs() {
        let normal = ArenaConfig::for_mode(GameMode::Normal);
        assert_eq!(normal.map_size, 3000.0);
        assert_eq!(normal.obstacle_count, 40);

        let rescue = ArenaConfig::for_mode(GameMode::Rescue);
        assert_eq!(rescue.map_size, 4000.0);
        assert_eq!(rescue.rescue_point(), (2000.0, 3400.0));
        assert_eq!(rescue.boss_spawn_point(), (2000.0, 200.0));
    }

    #[test]
    fn test_arena_seeds_differ_per_mode() {
        let config = ServerConfig {
            seed: Some(7),
            ..ServerConfig::default()
        };
        assert_eq!(config.arena_config(GameMode::Normal).seed, Some(7));
        assert_eq!(config.arena_config(GameMode::Rescue).seed, Some(8));
        assert_eq!(ServerConfig::default().arena_config(GameMode::Normal).seed, None);
    }
}
