//! Session bookkeeping for the UDP gateway.
//!
//! A session ties a remote address to the player id used inside an arena and
//! remembers which arena that player currently lives in. The gateway only looks
//! players up by id; arenas own their lifetime.

use log::info;
use shared::{GameMode, PlayerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One connected remote peer.
#[derive(Debug)]
pub struct Session {
    /// Session id, also the player id inside the arena
    pub id: PlayerId,
    /// Where replies go
    pub addr: SocketAddr,
    /// Last time any packet arrived from this peer
    pub last_seen: Instant,
    /// Arena the player joined, if any
    pub mode: Option<GameMode>,
}

impl Session {
    pub fn new(id: PlayerId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            mode: None,
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// All live sessions plus the capacity limit.
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    next_session_id: PlayerId,
    max_sessions: usize,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(max_sessions: usize, timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
            timeout,
        }
    }

    /// Registers a new peer. Returns `None` at capacity.
    pub fn add_session(&mut self, addr: SocketAddr) -> Option<PlayerId> {
        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        info!("Session {} opened from {}", id, addr);
        self.sessions.insert(id, Session::new(id, addr));
        Some(id)
    }

    /// Drops a session and returns the arena its player was in.
    pub fn remove_session(&mut self, id: PlayerId) -> Option<Option<GameMode>> {
        self.sessions.remove(&id).map(|session| {
            info!("Session {} closed", session.id);
            session.mode
        })
    }

    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<PlayerId> {
        self.sessions
            .values()
            .find(|session| session.addr == addr)
            .map(|session| session.id)
    }

    /// Records the arena a session's player now belongs to and returns the previous one.
    pub fn set_mode(&mut self, id: PlayerId, mode: GameMode) -> Option<GameMode> {
        self.sessions
            .get_mut(&id)
            .and_then(|session| session.mode.replace(mode))
    }

    pub fn mode_of(&self, id: PlayerId) -> Option<GameMode> {
        self.sessions.get(&id).and_then(|session| session.mode)
    }

    /// Marks the session as alive. Returns false for unknown ids.
    pub fn touch(&mut self, id: PlayerId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Removes idle sessions and returns them with their address and the arena
    /// each was in, so the peer can be told why it was dropped.
    pub fn check_timeouts(&mut self) -> Vec<(PlayerId, SocketAddr, Option<GameMode>)> {
        let timeout = self.timeout;
        let timed_out: Vec<(PlayerId, SocketAddr)> = self
            .sessions
            .values()
            .filter(|session| session.is_timed_out(timeout))
            .map(|session| (session.id, session.addr))
            .collect();

        timed_out
            .into_iter()
            .filter_map(|(id, addr)| self.remove_session(id).map(|mode| (id, addr, mode)))
            .collect()
    }

    pub fn addr_of(&self, id: PlayerId) -> Option<SocketAddr> {
        self.sessions.get(&id).map(|session| session.addr)
    }

    /// Addresses of every session whose player is in `mode`.
    pub fn addrs_in_mode(&self, mode: GameMode) -> Vec<(PlayerId, SocketAddr)> {
        self.sessions
            .values()
            .filter(|session| session.mode == Some(mode))
            .map(|session| (session.id, session.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
