use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::game::{ClientEvent, ClientWorld};
use crate::input::InputSource;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{get_timestamp, Packet};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

/// Large enough for an `Init` packet on a fully populated arena.
const RECV_BUFFER: usize = 64 * 1024;

/// Longest the client stays silent while joined, well inside the server's idle timeout.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// Headless client: one UDP socket, the reconciled world and an input source.
pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    config: ClientConfig,

    world: ClientWorld,
    input: Box<dyn InputSource + Send>,

    ping_ms: u64,
    packets_sent: u64,
    packets_received: u64,
    last_sent: Instant,
}

impl Client {
    pub async fn new(
        config: ClientConfig,
        input: Box<dyn InputSource + Send>,
    ) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = config.server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            config,
            world: ClientWorld::new(),
            input,
            ping_ms: 0,
            packets_sent: 0,
            packets_received: 0,
            last_sent: Instant::now(),
        })
    }

    pub fn world(&self) -> &ClientWorld {
        &self.world
    }

    pub fn ping_ms(&self) -> u64 {
        self.ping_ms
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), ClientError> {
        if self.config.fake_ping_ms > 0 {
            sleep(Duration::from_millis(self.config.fake_ping_ms / 2)).await;
        }

        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        self.packets_sent += 1;
        self.last_sent = Instant::now();
        Ok(())
    }

    async fn handle_packet(&mut self, packet: Packet) -> Result<(), ClientError> {
        let now = get_timestamp();
        self.packets_received += 1;

        if let Packet::StateUpdate { timestamp, .. } = &packet {
            if *timestamp > 0 {
                self.ping_ms = now.saturating_sub(*timestamp);
            }
        }

        self.world.apply_packet(packet, now);

        for event in self.world.take_events() {
            match event {
                ClientEvent::Disconnected { reason } => {
                    return Err(ClientError::Disconnected(reason));
                }
                ClientEvent::BossWarning => info!("Boss warning received"),
                ClientEvent::PlayerDied { x, y, .. } => {
                    debug!("Player died at ({:.0}, {:.0})", x, y)
                }
                ClientEvent::DamageText { .. } => {}
            }
        }
        Ok(())
    }

    async fn run_frame(&mut self) -> Result<(), ClientError> {
        if !self.world.is_joined() {
            return Ok(());
        }
        let snapshot = self.input.sample();
        let output = self.world.frame(&snapshot, get_timestamp());
        for packet in output.packets() {
            self.send_packet(&packet).await?;
        }

        if self.last_sent.elapsed() >= KEEPALIVE_INTERVAL {
            if let Some(packet) = self.world.keepalive() {
                self.send_packet(&packet).await?;
            }
        }
        Ok(())
    }

    /// Joins the configured arena and runs until disconnected or `run_for` elapses.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        info!(
            "Joining '{}' on {} as {} ({})",
            self.config.mode.tag(),
            self.server_addr,
            self.config.name,
            self.config.class.tag()
        );
        let join = self.config.join_packet();
        self.send_packet(&join).await?;

        let mut frame_interval = interval(self.config.frame_interval);
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_interval = interval(Duration::from_secs(5));
        let deadline = self.config.run_for.map(|d| Instant::now() + d);

        let mut buffer = vec![0u8; RECV_BUFFER];

        let result = loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break Ok(());
            }

            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => {
                            if self.config.fake_ping_ms > 0 {
                                sleep(Duration::from_millis(self.config.fake_ping_ms / 2)).await;
                            }

                            match deserialize::<Packet>(&buffer[0..len]) {
                                Ok(packet) => {
                                    if let Err(e) = self.handle_packet(packet).await {
                                        break Err(e);
                                    }
                                }
                                Err(e) => warn!("Failed to deserialize packet: {}", e),
                            }
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                _ = frame_interval.tick() => {
                    if let Err(e) = self.run_frame().await {
                        error!("Error sending input: {}", e);
                    }
                },

                _ = stats_interval.tick() => {
                    debug!(
                        "tick {} ping {}ms sent {} received {} remotes {}",
                        self.world.server_tick,
                        self.ping_ms,
                        self.packets_sent,
                        self.packets_received,
                        self.world.remotes.len()
                    );
                },
            }
        };

        if self.world.is_joined() {
            if let Err(e) = self.send_packet(&Packet::Disconnect).await {
                warn!("Failed to send disconnect: {}", e);
            }
        }

        result
    }
}
