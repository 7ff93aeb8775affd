//! Types and rules shared by the arena server and its clients.
//!
//! Everything the two sides must agree on lives here: the wire protocol, the class
//! and NPC stat tables, and the obstacle geometry used both for authoritative
//! movement on the server and for local collision response during client-side
//! prediction.

pub mod classes;
pub mod protocol;
pub mod spatial;

pub use classes::{ClassStats, GameMode, NpcKind, PickupKind, PlayerClass, UpgradeKind};
pub use protocol::{
    DamageTarget, Hazard, LeaderboardEntry, NpcView, Packet, Pickup, PlayerView, ProjectileView,
};
pub use spatial::{distance, lerp, lerp_angle, normalize_angle, ArenaMap, Obstacle};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type PlayerId = u32;
pub type EntityId = u32;

pub const TICK_RATE: u32 = 30;
pub const MAX_NAME_LEN: usize = 12;
/// Largest payload a single UDP datagram can carry.
pub const MAX_DATAGRAM: usize = 65_507;
pub const DEFAULT_NAME: &str = "Agent";
pub const DEFAULT_COLOR: &str = "#3498db";

/// Largest distance a submitted position may be from the authoritative one.
pub const MAX_MOVE_DISTANCE: f32 = 50.0;
pub const PROJECTILE_SPEED: f32 = 18.0;
pub const PROJECTILE_SIZE: f32 = 5.0;
pub const RESPAWN_DELAY_MS: u64 = 3000;

pub const DEFAULT_PLAYER_SIZE: f32 = 40.0;
pub const SPAWN_ATTEMPTS: u32 = 200;
pub const SPAWN_MARGIN: f32 = 100.0;
pub const FALLBACK_SPAWN: (f32, f32) = (200.0, 200.0);

/// Corrections farther than this from the predicted position count as teleports.
pub const TELEPORT_THRESHOLD: f32 = 100.0;
pub const TELEPORT_GRACE_MS: u64 = 1000;
pub const REMOTE_LERP: f32 = 0.2;
pub const LOCAL_AIM_LERP: f32 = 0.3;
pub const ACCELERATION: f32 = 1.5;
pub const FRICTION: f32 = 0.85;

/// Current wall-clock time in milliseconds.
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

/// Trims a requested display name to the allowed length, falling back to the default.
pub fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Accepts `#rgb` or `#rrggbb` hex colors; anything else becomes the default color.
pub fn sanitize_color(color: &str) -> String {
    let trimmed = color.trim();
    let valid = match trimmed.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    };
    if valid {
        trimmed.to_string()
    } else {
        DEFAULT_COLOR.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_truncates() {
        assert_eq!(sanitize_name("ABCDEFGHIJKLMNOP"), "ABCDEFGHIJKL");
        assert_eq!(sanitize_name("bob"), "bob");
    }

    #[test]
    fn test_sanitize_color() {
        assert_eq!(sanitize_color("#ff0000"), "#ff0000");
        assert_eq!(sanitize_color(" #AbC "), "#AbC");
        assert_eq!(sanitize_color("red"), DEFAULT_COLOR);
        assert_eq!(sanitize_color("#12345"), DEFAULT_COLOR);
        assert_eq!(sanitize_color("#ggg"), DEFAULT_COLOR);
        assert_eq!(sanitize_color(&"#".repeat(1900)), DEFAULT_COLOR);
    }

    #[test]
    fn test_sanitize_name_empty_uses_default() {
        assert_eq!(sanitize_name(""), DEFAULT_NAME);
        assert_eq!(sanitize_name("   "), DEFAULT_NAME);
    }

    #[test]
    fn test_sanitize_name_counts_chars_not_bytes() {
        let name = sanitize_name("ééééééééééééééé");
        assert_eq!(name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_get_timestamp() {
        let timestamp1 = get_timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let timestamp2 = get_timestamp();
        assert!(timestamp2 > timestamp1);
    }
}
