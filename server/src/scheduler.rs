//! Fixed-rate tick loop, one task per arena.
//!
//! Each arena runs as an actor: its task owns the [`Arena`] and is the only code that
//! mutates it. Input reaches the task as [`ArenaCommand`]s over a bounded channel and
//! is applied at the start of the next tick, so a command can never interleave with a
//! running tick. After each tick the arena's outbox is forwarded to the network
//! sender as [`ArenaOutput`]s without waiting on any socket.

use crate::arena::{Arena, Outbound};
use crate::error::ServerError;
use crate::{combat, items, movement};
use log::{debug, info, warn};
use shared::{get_timestamp, GameMode, Packet, PlayerId};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Upper bound on commands applied in one tick; the rest wait for the next one.
pub const MAX_COMMANDS_PER_TICK: usize = 512;

/// Input for one arena, already resolved to a player id.
#[derive(Debug, Clone)]
pub enum ArenaCommand {
    Join {
        id: PlayerId,
        name: String,
        color: String,
        class_tag: String,
    },
    Move {
        id: PlayerId,
        x: f32,
        y: f32,
    },
    Shoot {
        id: PlayerId,
        angle: f32,
    },
    BuyUpgrade {
        id: PlayerId,
        kind: String,
    },
    PlaceHazard {
        id: PlayerId,
    },
    Leave {
        id: PlayerId,
    },
}

/// A message leaving an arena, tagged with the arena it came from.
#[derive(Debug, Clone)]
pub struct ArenaOutput {
    pub mode: GameMode,
    pub message: Outbound,
}

pub fn apply_command(arena: &mut Arena, command: ArenaCommand, now: u64) {
    match command {
        ArenaCommand::Join {
            id,
            name,
            color,
            class_tag,
        } => {
            arena.add_player(id, &class_tag, &name, &color);
        }
        ArenaCommand::Move { id, x, y } => {
            movement::handle_move(arena, id, x, y);
        }
        ArenaCommand::Shoot { id, angle } => {
            combat::shoot(arena, id, angle, now);
        }
        ArenaCommand::BuyUpgrade { id, kind } => {
            items::buy_upgrade(arena, id, &kind);
        }
        ArenaCommand::PlaceHazard { id } => {
            items::place_hazard(arena, id);
        }
        ArenaCommand::Leave { id } => {
            arena.remove_player(id);
        }
    }
}

/// Advances the arena one tick and queues everything clients should hear about it.
pub fn run_tick(arena: &mut Arena, now: u64) {
    arena.mutate_tick(now);

    if arena.players.is_empty() {
        arena.items_dirty = false;
        arena.hazards_dirty = false;
        return;
    }

    let npcs = match arena.mode() {
        GameMode::Rescue => arena.npc_views(),
        GameMode::Normal => Vec::new(),
    };
    let snapshot = Packet::StateUpdate {
        tick: arena.tick,
        timestamp: now,
        players: arena.player_views(),
        projectiles: arena.projectile_views(),
        npcs,
    };
    arena.broadcast(snapshot);

    if arena.items_dirty {
        arena.items_dirty = false;
        let pickups = arena.pickups.clone();
        arena.broadcast(Packet::ItemsUpdate { pickups });
    }
    if arena.hazards_dirty {
        arena.hazards_dirty = false;
        let hazards = arena.hazards.clone();
        arena.broadcast(Packet::HazardsUpdate { hazards });
    }

    let interval = arena.config.leaderboard_interval.max(1);
    if arena.tick % interval == 0 {
        let entries = arena.leaderboard();
        arena.broadcast(Packet::LeaderboardUpdate { entries });
    }
}

/// Sending half of an arena's command queue.
#[derive(Debug, Clone)]
pub struct ArenaHandle {
    pub mode: GameMode,
    commands: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    /// Queues a command without waiting. A full queue drops the command.
    pub fn submit(&self, command: ArenaCommand) -> Result<(), ServerError> {
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ServerError::QueueFull(self.mode.tag())),
            Err(TrySendError::Closed(_)) => Err(ServerError::ArenaClosed(self.mode.tag())),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Starts the actor task for `arena`.
pub fn spawn_arena(
    arena: Arena,
    tick_duration: Duration,
    queue: usize,
    output: mpsc::UnboundedSender<ArenaOutput>,
) -> (ArenaHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(queue.max(1));
    let handle = ArenaHandle {
        mode: arena.mode(),
        commands: tx,
    };
    let task = tokio::spawn(run_arena(arena, rx, output, tick_duration));
    (handle, task)
}

/// The actor loop. Returns once every command sender is gone or the network side
/// stops listening.
pub async fn run_arena(
    mut arena: Arena,
    mut commands: mpsc::Receiver<ArenaCommand>,
    output: mpsc::UnboundedSender<ArenaOutput>,
    tick_duration: Duration,
) {
    let mode = arena.mode();
    let mut ticker = interval(tick_duration);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately.
    ticker.tick().await;
    let mut last_tick = Instant::now();

    info!("Arena '{}' running at {:?} per tick", mode.tag(), tick_duration);

    loop {
        ticker.tick().await;
        let started = Instant::now();
        let dt = started.duration_since(last_tick);
        last_tick = started;

        let now = get_timestamp();
        let mut applied = 0;
        let mut senders_gone = false;
        while applied < MAX_COMMANDS_PER_TICK {
            match commands.try_recv() {
                Ok(command) => {
                    apply_command(&mut arena, command, now);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    senders_gone = true;
                    break;
                }
            }
        }

        run_tick(&mut arena, now);

        for message in arena.drain_outbound() {
            if output.send(ArenaOutput { mode, message }).is_err() {
                warn!("Arena '{}' output channel closed, stopping", mode.tag());
                return;
            }
        }

        if senders_gone {
            info!("Arena '{}' has no more command senders, stopping", mode.tag());
            return;
        }

        if arena.tick % 60 == 0 && !arena.players.is_empty() {
            debug!(
                "Arena '{}' tick {}: {} players, {} projectiles, {} npcs, {} commands, {:.1}Hz, {:?} busy",
                mode.tag(),
                arena.tick,
                arena.players.len(),
                arena.projectiles.len(),
                arena.npcs.len(),
                applied,
                1.0 / dt.as_secs_f32().max(f32::EPSILON),
                started.elapsed()
            );
        }
    }
}
