//! Validation of client-submitted movement.
//!
//! Clients send absolute positions. A submission farther than
//! [`MAX_MOVE_DISTANCE`] from the authoritative position is never applied; the
//! client gets a correction instead. Accepted moves resolve each axis separately so
//! a player blocked on one axis still slides along the other.

use crate::arena::Arena;
use log::debug;
use shared::{distance, Packet, PlayerId, MAX_MOVE_DISTANCE};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// The move was accepted; the resulting authoritative position.
    Applied { x: f32, y: f32 },
    /// The move was rejected and a correction to this position was queued.
    Corrected { x: f32, y: f32 },
    /// Unknown or dead player.
    Ignored,
}

pub fn handle_move(arena: &mut Arena, id: PlayerId, x: f32, y: f32) -> MoveOutcome {
    let Some(player) = arena.players.get_mut(&id) else {
        return MoveOutcome::Ignored;
    };
    if !player.is_alive() {
        return MoveOutcome::Ignored;
    }

    let (cur_x, cur_y) = (player.x, player.y);
    let plausible = x.is_finite() && y.is_finite() && distance(cur_x, cur_y, x, y) <= MAX_MOVE_DISTANCE;

    if !plausible {
        debug!(
            "Rejected move for player {} to ({}, {}) from ({:.1}, {:.1})",
            id, x, y, cur_x, cur_y
        );
        arena.send_to(id, Packet::Correction { x: cur_x, y: cur_y });
        return MoveOutcome::Corrected { x: cur_x, y: cur_y };
    }

    let map = &arena.map;
    let size = player.size;

    if !map.intersects_obstacle(x, player.y, size) {
        player.x = x;
    }
    if !map.intersects_obstacle(player.x, y, size) {
        player.y = y;
    }
    player.x = map.clamp_axis(player.x, size);
    player.y = map.clamp_axis(player.y, size);

    MoveOutcome::Applied {
        x: player.x,
        y: player.y,
    }
}
