use shared::{PlayerClass, PlayerId, PlayerView};

/// Speed multiplier while a speed buff is active.
pub const SPEED_BUFF_FACTOR: f32 = 1.5;

/// Jitter allowance on the fire cooldown.
pub const COOLDOWN_SLACK_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifeState {
    Alive,
    Dead { respawn_at: u64 },
}

/// Authoritative server-side player.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub class: PlayerClass,

    pub max_health: f32,
    pub base_speed: f32,
    pub damage: f32,
    pub size: f32,
    pub fire_cooldown_ms: u64,

    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub coins: u32,
    pub aim_angle: f32,
    pub speed_buff: u32,
    pub shield_buff: u32,
    pub hazard_capacity: u32,
    pub life: LifeState,
    /// Time of the last shot the server accepted.
    pub last_shot_at: Option<u64>,
}

impl Player {
    pub fn new(id: PlayerId, class: PlayerClass, name: String, color: String, x: f32, y: f32) -> Self {
        let stats = class.stats();
        Self {
            id,
            name,
            color,
            class,
            max_health: stats.max_health,
            base_speed: stats.speed,
            damage: stats.damage,
            size: stats.size,
            fire_cooldown_ms: stats.fire_cooldown_ms,
            x,
            y,
            health: stats.max_health,
            coins: 0,
            aim_angle: 0.0,
            speed_buff: 0,
            shield_buff: 0,
            hazard_capacity: 0,
            life: LifeState::Alive,
            last_shot_at: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }

    /// True if the point lies strictly inside the player's hit circle.
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        let (cx, cy) = self.center();
        shared::distance(px, py, cx, cy) < self.size / 2.0
    }

    pub fn speed(&self) -> f32 {
        if self.speed_buff > 0 {
            self.base_speed * SPEED_BUFF_FACTOR
        } else {
            self.base_speed
        }
    }

    /// Applies incoming damage after shields and returns the amount actually taken.
    /// Health never drops below zero.
    pub fn absorb(&mut self, amount: f32) -> f32 {
        let taken = if self.shield_buff > 0 {
            amount / 2.0
        } else {
            amount
        };
        self.health = (self.health - taken).max(0.0);
        taken
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Server-side cooldown check, [`COOLDOWN_SLACK_MS`] looser than the client's.
    pub fn can_fire(&self, now: u64) -> bool {
        match self.last_shot_at {
            Some(last) => {
                now.saturating_sub(last) + COOLDOWN_SLACK_MS >= self.fire_cooldown_ms
            }
            None => true,
        }
    }

    pub fn tick_buffs(&mut self) {
        self.speed_buff = self.speed_buff.saturating_sub(1);
        self.shield_buff = self.shield_buff.saturating_sub(1);
    }

    pub fn to_view(&self) -> PlayerView {
        let (dead, respawn_at) = match self.life {
            LifeState::Alive => (false, 0),
            LifeState::Dead { respawn_at } => (true, respawn_at),
        };
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            class: self.class,
            x: self.x,
            y: self.y,
            size: self.size,
            health: self.health,
            max_health: self.max_health,
            coins: self.coins,
            speed: self.speed(),
            damage: self.damage,
            aim_angle: self.aim_angle,
            hazard_capacity: self.hazard_capacity,
            speed_buff: self.speed_buff,
            shield_buff: self.shield_buff,
            dead,
            respawn_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(1, PlayerClass::Assault, "A".into(), "red".into(), 100.0, 100.0)
    }

    #[test]
    fn test_player_creation_uses_class_stats() {
        let p = Player::new(2, PlayerClass::Heavy, "H".into(), "blue".into(), 0.0, 0.0);
        assert_eq!(p.health, 180.0);
        assert_eq!(p.max_health, 180.0);
        assert_eq!(p.size, 55.0);
        assert!(p.is_alive());
    }

    #[test]
    fn test_absorb_clamps_at_zero() {
        let mut p = player();
        p.health = 20.0;
        assert_eq!(p.absorb(35.0), 35.0);
        assert_eq!(p.health, 0.0);
    }

    #[test]
    fn test_shield_halves_damage() {
        let mut p = player();
        p.shield_buff = 10;
        assert_eq!(p.absorb(40.0), 20.0);
        assert_eq!(p.health, 80.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut p = player();
        p.health = 90.0;
        p.heal(30.0);
        assert_eq!(p.health, 100.0);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut p = player();
        assert!(p.can_fire(0));
        p.last_shot_at = Some(1000);
        assert!(!p.can_fire(1949));
        assert!(p.can_fire(1950));
        assert!(p.can_fire(2000));
    }

    #[test]
    fn test_contains_point_is_strict() {
        let p = player();
        assert!(p.contains_point(120.0, 120.0));
        assert!(!p.contains_point(140.0, 120.0));
    }

    #[test]
    fn test_speed_buff_and_decay() {
        let mut p = player();
        p.speed_buff = 1;
        assert_eq!(p.speed(), 9.0);
        p.tick_buffs();
        assert_eq!(p.speed(), 6.0);
        p.tick_buffs();
        assert_eq!(p.speed_buff, 0);
    }

    #[test]
    fn test_view_reports_death() {
        let mut p = player();
        p.life = LifeState::Dead { respawn_at: 5000 };
        let view = p.to_view();
        assert!(view.dead);
        assert_eq!(view.respawn_at, 5000);
    }
}
