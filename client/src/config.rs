use shared::{GameMode, PlayerClass};
use std::time::Duration;

/// Connection and identity settings for one client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    /// Artificial delay added to each direction, in milliseconds
    pub fake_ping_ms: u64,
    pub name: String,
    pub color: String,
    pub class: PlayerClass,
    pub mode: GameMode,
    pub frame_interval: Duration,
    /// Stop after this long; `None` runs until disconnected
    pub run_for: Option<Duration>,
    /// Seed for the wander bot
    pub seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            fake_ping_ms: 0,
            name: shared::DEFAULT_NAME.to_string(),
            color: "#3498db".to_string(),
            class: PlayerClass::default(),
            mode: GameMode::default(),
            frame_interval: Duration::from_millis(16),
            run_for: None,
            seed: None,
        }
    }
}

impl ClientConfig {
    pub fn join_packet(&self) -> shared::Packet {
        shared::Packet::Join {
            name: self.name.clone(),
            color: self.color.clone(),
            class_tag: self.class.tag().to_string(),
            mode_tag: self.mode.tag().to_string(),
        }
    }
}
