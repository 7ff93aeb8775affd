//! Safe-spawn search.
//!
//! Positions are sampled uniformly and accepted on the first obstacle-free hit. The
//! search is capped, so a crowded map can exhaust it; callers then fall back to a
//! position validated once when the arena is built.

use log::warn;
use rand::Rng;
use shared::{ArenaMap, FALLBACK_SPAWN, SPAWN_ATTEMPTS, SPAWN_MARGIN};

/// Samples up to [`SPAWN_ATTEMPTS`] positions for a `size` box that is clear of the
/// map's obstacles and of anything `blocked` reports.
pub fn sample_clear_spot<R, F>(map: &ArenaMap, rng: &mut R, size: f32, blocked: F) -> Option<(f32, f32)>
where
    R: Rng + ?Sized,
    F: Fn(f32, f32) -> bool,
{
    let range = (map.size - SPAWN_MARGIN).max(1.0);
    for _ in 0..SPAWN_ATTEMPTS {
        let x = rng.gen_range(0.0..range);
        let y = rng.gen_range(0.0..range);
        if !map.intersects_obstacle(x, y, size) && !blocked(x, y) {
            return Some((x, y));
        }
    }
    None
}

/// Finds a player spawn point, falling back to `fallback` when sampling fails.
pub fn find_safe_spawn<R: Rng + ?Sized>(
    map: &ArenaMap,
    rng: &mut R,
    size: f32,
    fallback: (f32, f32),
) -> (f32, f32) {
    match sample_clear_spot(map, rng, size, |_, _| false) {
        Some(spot) => spot,
        None => {
            warn!(
                "Spawn search exhausted after {} attempts, using fallback ({}, {})",
                SPAWN_ATTEMPTS, fallback.0, fallback.1
            );
            fallback
        }
    }
}

/// Picks the fallback spawn for a map: the fixed point when it is clear, otherwise
/// the first clear cell of a coarse grid scan.
pub fn validated_fallback(map: &ArenaMap, size: f32) -> (f32, f32) {
    let (fx, fy) = FALLBACK_SPAWN;
    if !map.intersects_obstacle(fx, fy, size) {
        return FALLBACK_SPAWN;
    }

    let step = size.max(1.0);
    let mut y = 0.0;
    while y + size <= map.size {
        let mut x = 0.0;
        while x + size <= map.size {
            if !map.intersects_obstacle(x, y, size) {
                warn!("Default fallback spawn is blocked, using ({}, {})", x, y);
                return (x, y);
            }
            x += step;
        }
        y += step;
    }

    warn!("No clear fallback spawn on this map; keeping the default point");
    FALLBACK_SPAWN
}
