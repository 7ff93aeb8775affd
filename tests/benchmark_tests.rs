//! Performance guards for the hot paths of the arena
//!
//! Simple timing loops with generous bounds. They catch accidental quadratic
//! behavior, not small regressions.

use assert_approx_eq::assert_approx_eq;
use client::game::ClientWorld;
use client::input::InputSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::arena::{generate_obstacles, Arena};
use server::config::ArenaConfig;
use server::scheduler::{apply_command, run_tick, ArenaCommand};
use server::spawn::find_safe_spawn;
use shared::{lerp_angle, ArenaMap, GameMode, Packet};
use std::time::Instant;

fn busy_arena(mode: GameMode, players: u32) -> Arena {
    let config = ArenaConfig {
        seed: Some(42),
        ..ArenaConfig::for_mode(mode)
    };
    let mut arena = Arena::new(config);
    for id in 1..=players {
        apply_command(
            &mut arena,
            ArenaCommand::Join {
                id,
                name: format!("Bench{}", id),
                color: "#00ff00".to_string(),
                class_tag: "scout".to_string(),
            },
            0,
        );
    }
    arena.drain_outbound();
    arena
}

mod benchmark_tests {
    use super::*;

    #[test]
    fn benchmark_obstacle_queries() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = ArenaMap::new(3000.0, generate_obstacles(&mut rng, 3000.0, 40));
        let iterations = 100_000;

        let start = Instant::now();
        let mut hits = 0;
        for _ in 0..iterations {
            let x = rng.gen_range(0.0..3000.0);
            let y = rng.gen_range(0.0..3000.0);
            if map.intersects_obstacle(x, y, 40.0) {
                hits += 1;
            }
        }
        let duration = start.elapsed();

        println!(
            "Obstacle query: {:?} total, {:.2} ns/query, {} hits",
            duration,
            duration.as_nanos() as f64 / iterations as f64,
            hits
        );
        assert!(duration.as_millis() < 500);
    }

    #[test]
    fn benchmark_safe_spawn() {
        let mut rng = StdRng::seed_from_u64(2);
        let map = ArenaMap::new(3000.0, generate_obstacles(&mut rng, 3000.0, 40));
        let iterations = 1_000;

        let start = Instant::now();
        for _ in 0..iterations {
            let (x, y) = find_safe_spawn(&map, &mut rng, 40.0, (200.0, 200.0));
            assert!(x >= 0.0 && y >= 0.0);
        }
        let duration = start.elapsed();

        println!(
            "Safe spawn: {:?} total, {:.2} µs/spawn",
            duration,
            duration.as_micros() as f64 / iterations as f64
        );
        assert!(duration.as_millis() < 500);
    }

    #[test]
    fn benchmark_full_tick() {
        let mut arena = busy_arena(GameMode::Rescue, 50);
        let mut rng = StdRng::seed_from_u64(3);
        let ticks = 300;
        let mut now = 1_000;

        let start = Instant::now();
        for _ in 0..ticks {
            now += 33;
            for id in 1..=50 {
                apply_command(
                    &mut arena,
                    ArenaCommand::Shoot {
                        id,
                        angle: rng.gen_range(-3.1..3.1),
                    },
                    now,
                );
            }
            run_tick(&mut arena, now);
            arena.drain_outbound();
        }
        let duration = start.elapsed();

        println!(
            "Full tick (50 players, rescue): {:?} total, {:.2} µs/tick, {} projectiles live",
            duration,
            duration.as_micros() as f64 / ticks as f64,
            arena.projectiles.len()
        );
        assert!(duration.as_millis() < 3_000);
    }

    #[test]
    fn benchmark_client_frame() {
        let mut world = ClientWorld::new();
        let mut arena = busy_arena(GameMode::Normal, 20);
        let players = arena.player_views();
        let obstacles = arena.map.obstacles.clone();
        world.apply_packet(
            Packet::Init {
                id: 1,
                map_size: arena.map.size,
                players: players.clone(),
                obstacles,
                pickups: vec![],
                hazards: vec![],
            },
            0,
        );
        arena.drain_outbound();

        let iterations = 10_000;
        let input = InputSnapshot::from_keys(false, true, false, true).aiming(0.5, false);

        let start = Instant::now();
        for frame in 0..iterations {
            let output = world.frame(&input, frame * 16);
            assert!(output.shoot.is_none());
        }
        let duration = start.elapsed();

        println!(
            "Client frame (19 remotes): {:?} total, {:.2} ns/frame",
            duration,
            duration.as_nanos() as f64 / iterations as f64
        );

        let local = world.local.as_ref().unwrap();
        assert_approx_eq!(local.aim_angle, 0.5, 1e-3);
        assert!(duration.as_millis() < 500);
    }

    #[test]
    fn benchmark_angle_interpolation() {
        let iterations = 1_000_000;

        let start = Instant::now();
        let mut angle = 3.0f32;
        for _ in 0..iterations {
            angle = lerp_angle(angle, -3.0, 0.2);
        }
        let duration = start.elapsed();

        println!(
            "Angle interpolation: {:?} total, {:.2} ns/step",
            duration,
            duration.as_nanos() as f64 / iterations as f64
        );
        // Settles on the target by wrapping through pi, never by sweeping through zero.
        assert_approx_eq!(angle.sin(), (-3.0f32).sin(), 1e-3);
        assert_approx_eq!(angle.cos(), (-3.0f32).cos(), 1e-3);
        assert!(duration.as_millis() < 500);
    }
}
