//! Enumerated tags and their stat tables.
//!
//! Wire messages carry free-form tags (`"tank"`, `"rescue"`, ...). They are parsed
//! once at the boundary into these enums; unknown class and mode tags resolve to the
//! documented defaults, unknown upgrade tags resolve to `None`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Normal,
    Rescue,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Normal, GameMode::Rescue];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "rescue" => GameMode::Rescue,
            _ => GameMode::Normal,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            GameMode::Normal => "normal",
            GameMode::Rescue => "rescue",
        }
    }
}

/// Stats derived from a player's class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub name: &'static str,
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    pub fire_cooldown_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerClass {
    #[default]
    Assault,
    Heavy,
    Sniper,
    Speed,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Assault,
        PlayerClass::Heavy,
        PlayerClass::Sniper,
        PlayerClass::Speed,
    ];

    /// Footprint of the bulkiest class.
    pub fn largest_size() -> f32 {
        Self::ALL
            .iter()
            .map(|class| class.stats().size)
            .fold(0.0, f32::max)
    }

    /// Parses a class tag. Anything unrecognised becomes the default class.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "square" => PlayerClass::Assault,
            "tank" => PlayerClass::Heavy,
            "triangle" => PlayerClass::Sniper,
            "scout" => PlayerClass::Speed,
            _ => PlayerClass::default(),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            PlayerClass::Assault => "square",
            PlayerClass::Heavy => "tank",
            PlayerClass::Sniper => "triangle",
            PlayerClass::Speed => "scout",
        }
    }

    pub const fn stats(self) -> ClassStats {
        match self {
            PlayerClass::Assault => ClassStats {
                name: "Assault",
                max_health: 100.0,
                speed: 6.0,
                damage: 15.0,
                size: 40.0,
                fire_cooldown_ms: 1000,
            },
            PlayerClass::Heavy => ClassStats {
                name: "Heavy",
                max_health: 180.0,
                speed: 4.0,
                damage: 20.0,
                size: 55.0,
                fire_cooldown_ms: 2000,
            },
            PlayerClass::Sniper => ClassStats {
                name: "Sniper",
                max_health: 70.0,
                speed: 7.0,
                damage: 35.0,
                size: 35.0,
                fire_cooldown_ms: 800,
            },
            PlayerClass::Speed => ClassStats {
                name: "Speed",
                max_health: 60.0,
                speed: 9.0,
                damage: 10.0,
                size: 30.0,
                fire_cooldown_ms: 500,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcKind {
    Scout,
    Tank,
    Boss,
}

impl NpcKind {
    pub fn speed(self) -> f32 {
        match self {
            NpcKind::Scout => 8.0,
            NpcKind::Tank | NpcKind::Boss => 4.0,
        }
    }

    pub fn max_health(self) -> f32 {
        match self {
            NpcKind::Scout => 100.0,
            NpcKind::Tank => 200.0,
            NpcKind::Boss => 3000.0,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            NpcKind::Scout => 40.0,
            NpcKind::Tank => 50.0,
            NpcKind::Boss => 120.0,
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, NpcKind::Boss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    Health,
    Speed,
    Shield,
}

impl PickupKind {
    /// Maps a uniform roll in `[0, 1)` onto the pickup distribution.
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.35 {
            PickupKind::Coin
        } else if roll < 0.6 {
            PickupKind::Health
        } else if roll < 0.75 {
            PickupKind::Speed
        } else {
            PickupKind::Shield
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Health,
    Damage,
    Mine,
}

impl UpgradeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "health" => Some(UpgradeKind::Health),
            "damage" => Some(UpgradeKind::Damage),
            "mine" => Some(UpgradeKind::Mine),
            _ => None,
        }
    }

    pub fn cost(self) -> u32 {
        match self {
            UpgradeKind::Health | UpgradeKind::Damage => 50,
            UpgradeKind::Mine => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_class_falls_back_to_assault() {
        assert_eq!(PlayerClass::from_tag("dragon"), PlayerClass::Assault);
        assert_eq!(PlayerClass::from_tag(""), PlayerClass::Assault);
    }

    #[test]
    fn test_class_tags_are_stable() {
        for class in [
            PlayerClass::Assault,
            PlayerClass::Heavy,
            PlayerClass::Sniper,
            PlayerClass::Speed,
        ] {
            assert_eq!(PlayerClass::from_tag(class.tag()), class);
        }
    }

    #[test]
    fn test_class_stats_table() {
        let heavy = PlayerClass::Heavy.stats();
        assert_eq!(heavy.max_health, 180.0);
        assert_eq!(heavy.size, 55.0);
        assert_eq!(heavy.fire_cooldown_ms, 2000);

        let sniper = PlayerClass::Sniper.stats();
        assert_eq!(sniper.damage, 35.0);
    }

    #[test]
    fn test_largest_size_is_heavy() {
        assert_eq!(PlayerClass::largest_size(), 55.0);
    }

    #[test]
    fn test_mode_from_tag() {
        assert_eq!(GameMode::from_tag("rescue"), GameMode::Rescue);
        assert_eq!(GameMode::from_tag("normal"), GameMode::Normal);
        assert_eq!(GameMode::from_tag("chaos"), GameMode::Normal);
    }

    #[test]
    fn test_upgrade_tags() {
        assert_eq!(UpgradeKind::from_tag("mine"), Some(UpgradeKind::Mine));
        assert_eq!(UpgradeKind::from_tag("armor"), None);
        assert_eq!(UpgradeKind::Mine.cost(), 30);
        assert_eq!(UpgradeKind::Health.cost(), 50);
    }

    #[test]
    fn test_pickup_distribution_edges() {
        assert_eq!(PickupKind::from_roll(0.0), PickupKind::Coin);
        assert_eq!(PickupKind::from_roll(0.35), PickupKind::Health);
        assert_eq!(PickupKind::from_roll(0.6), PickupKind::Speed);
        assert_eq!(PickupKind::from_roll(0.99), PickupKind::Shield);
    }

    #[test]
    fn test_boss_stats() {
        assert!(NpcKind::Boss.is_boss());
        assert!(!NpcKind::Scout.is_boss());
        assert_eq!(NpcKind::Boss.max_health(), 3000.0);
        assert!(NpcKind::Boss.size() > NpcKind::Tank.size());
    }
}
