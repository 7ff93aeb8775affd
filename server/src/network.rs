//! UDP gateway between remote peers and the arena actors

use crate::arena::{Arena, Outbound};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gateway::SessionManager;
use crate::scheduler::{spawn_arena, ArenaCommand, ArenaHandle, ArenaOutput};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{GameMode, Packet, PlayerId, MAX_DATAGRAM};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

/// Reasons carried by `Disconnected`.
pub const SERVER_FULL: &str = "Server full";
pub const TIMED_OUT: &str = "Timed out";
pub const NOT_CONNECTED: &str = "Not connected";

/// Messages sent from network tasks to the gateway loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    SessionTimeout {
        id: PlayerId,
        addr: SocketAddr,
        mode: Option<GameMode>,
    },
    Shutdown,
}

/// Gateway that owns the socket, the session table and one actor per arena
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionManager>>,
    arenas: HashMap<GameMode, ArenaHandle>,
    arena_tasks: Vec<JoinHandle<()>>,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    output_rx: Option<mpsc::UnboundedReceiver<ArenaOutput>>,
}

impl Server {
    /// Binds the socket and starts every arena.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let socket = Arc::new(UdpSocket::bind(&config.bind_addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let mut arenas = HashMap::new();
        let mut arena_tasks = Vec::new();
        for mode in GameMode::ALL {
            let arena = Arena::new(config.arena_config(mode));
            let (handle, task) = spawn_arena(
                arena,
                config.tick_duration(),
                config.command_queue,
                output_tx.clone(),
            );
            arenas.insert(mode, handle);
            arena_tasks.push(task);
        }

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionManager::new(
                config.max_clients,
                config.client_timeout,
            ))),
            arenas,
            arena_tasks,
            server_tx,
            server_rx,
            output_rx: Some(output_rx),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Sender that can stop [`Server::run`] from another task.
    pub fn shutdown_sender(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to gateway loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that delivers arena output to the sessions it is addressed to
    fn spawn_network_sender(&mut self) {
        let Some(mut output_rx) = self.output_rx.take() else {
            warn!("Network sender already running");
            return;
        };
        let socket = Arc::clone(&self.socket);
        let sessions = Arc::clone(&self.sessions);

        tokio::spawn(async move {
            while let Some(ArenaOutput { mode, message }) = output_rx.recv().await {
                let (packet, targets) = {
                    let sessions = sessions.read().await;
                    match message {
                        Outbound::Broadcast(packet) => (packet, sessions.addrs_in_mode(mode)),
                        Outbound::To(id, packet) => {
                            // Drop messages from an arena the player already left.
                            let targets = match (sessions.mode_of(id), sessions.addr_of(id)) {
                                (Some(current), Some(addr)) if current == mode => vec![(id, addr)],
                                _ => Vec::new(),
                            };
                            (packet, targets)
                        }
                    }
                };

                if targets.is_empty() {
                    continue;
                }

                let data = match serialize(&packet) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("Failed to encode {} packet: {}", packet.kind(), e);
                        continue;
                    }
                };
                if data.len() > MAX_DATAGRAM {
                    error!(
                        "Dropping {} packet of {} bytes, over the datagram limit",
                        packet.kind(),
                        data.len()
                    );
                    continue;
                }

                for (id, addr) in targets {
                    if let Err(e) = socket.send_to(&data, addr).await {
                        error!("Failed to send {} to session {}: {}", packet.kind(), id, e);
                    }
                }
            }
            info!("Arena output closed, network sender stopping");
        });
    }

    /// Spawns task that monitors session timeouts
    fn spawn_timeout_checker(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut sessions = sessions.write().await;
                    sessions.check_timeouts()
                };

                for (id, addr, mode) in timed_out {
                    info!("Session {} timed out", id);
                    if let Err(e) = server_tx.send(ServerMessage::SessionTimeout { id, addr, mode }) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) -> Result<(), ServerError> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn submit(&self, mode: GameMode, command: ArenaCommand) {
        match self.arenas.get(&mode) {
            Some(handle) => {
                if let Err(e) = handle.submit(command) {
                    warn!("Dropped command: {}", e);
                }
            }
            None => error!("No arena running for mode '{}'", mode.tag()),
        }
    }

    async fn send_disconnected(&self, addr: SocketAddr, reason: &str) {
        let response = Packet::Disconnected {
            reason: reason.to_string(),
        };
        if let Err(e) = self.send_packet(&response, addr).await {
            error!("Failed to send disconnect notice to {}: {}", addr, e);
        }
    }

    /// Session id and arena for the sender of a gameplay packet. Peers without a
    /// session are told so, which lets a client that was timed out rejoin.
    async fn resolve(&self, addr: SocketAddr) -> Option<(PlayerId, GameMode)> {
        let resolved = {
            let mut sessions = self.sessions.write().await;
            sessions.find_by_addr(addr).and_then(|id| {
                sessions.touch(id);
                sessions.mode_of(id).map(|mode| (id, mode))
            })
        };
        if resolved.is_none() {
            debug!("Gameplay packet from {} without a session", addr);
            self.send_disconnected(addr, NOT_CONNECTED).await;
        }
        resolved
    }

    /// Routes one inbound packet to the session table or an arena.
    pub async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Join {
                name,
                color,
                class_tag,
                mode_tag,
            } => {
                let mode = GameMode::from_tag(&mode_tag);

                let (id, previous) = {
                    let mut sessions = self.sessions.write().await;
                    let id = match sessions.find_by_addr(addr) {
                        Some(id) => {
                            sessions.touch(id);
                            Some(id)
                        }
                        None => sessions.add_session(addr),
                    };
                    let previous = id.and_then(|id| sessions.set_mode(id, mode));
                    (id, previous)
                };

                let Some(id) = id else {
                    warn!("Rejecting {}: server full", addr);
                    self.send_disconnected(addr, SERVER_FULL).await;
                    return;
                };

                if let Some(previous) = previous {
                    info!(
                        "Session {} switching from '{}' to '{}'",
                        id,
                        previous.tag(),
                        mode.tag()
                    );
                    self.submit(previous, ArenaCommand::Leave { id });
                }

                self.submit(
                    mode,
                    ArenaCommand::Join {
                        id,
                        name,
                        color,
                        class_tag,
                    },
                );
            }

            Packet::Move { x, y } => {
                if let Some((id, mode)) = self.resolve(addr).await {
                    self.submit(mode, ArenaCommand::Move { id, x, y });
                }
            }

            Packet::Shoot { angle } => {
                if let Some((id, mode)) = self.resolve(addr).await {
                    self.submit(mode, ArenaCommand::Shoot { id, angle });
                }
            }

            Packet::BuyUpgrade { kind } => {
                if let Some((id, mode)) = self.resolve(addr).await {
                    self.submit(mode, ArenaCommand::BuyUpgrade { id, kind });
                }
            }

            Packet::PlaceHazard => {
                if let Some((id, mode)) = self.resolve(addr).await {
                    self.submit(mode, ArenaCommand::PlaceHazard { id });
                }
            }

            Packet::Disconnect => {
                let removed = {
                    let mut sessions = self.sessions.write().await;
                    sessions
                        .find_by_addr(addr)
                        .and_then(|id| sessions.remove_session(id).map(|mode| (id, mode)))
                };
                if let Some((id, Some(mode))) = removed {
                    self.submit(mode, ArenaCommand::Leave { id });
                }
            }

            other => {
                warn!("Unexpected {} packet from client at {}", other.kind(), addr);
            }
        }
    }

    /// Gateway loop. Runs until a shutdown message arrives.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        info!("Server started with {} arenas", self.arenas.len());

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::PacketReceived { packet, addr } => {
                    debug!("{} from {}", packet.kind(), addr);
                    self.handle_packet(packet, addr).await;
                }
                ServerMessage::SessionTimeout { id, addr, mode } => {
                    if let Some(mode) = mode {
                        self.submit(mode, ArenaCommand::Leave { id });
                    }
                    self.send_disconnected(addr, TIMED_OUT).await;
                }
                ServerMessage::Shutdown => break,
            }
        }

        info!("Server shutting down");
        for task in &self.arena_tasks {
            task.abort();
        }
        Ok(())
    }
}
