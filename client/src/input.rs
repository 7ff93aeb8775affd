//! Per-frame input sampling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::f32::consts::TAU;

/// Everything the local player asked for during one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Desired movement direction, each axis in `[-1, 1]`
    pub move_x: f32,
    pub move_y: f32,
    /// Aim angle in radians, if the player is aiming anywhere
    pub aim: Option<f32>,
    pub firing: bool,
}

impl InputSnapshot {
    /// Builds a snapshot from held direction keys. Opposite keys cancel out.
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Self {
            move_x: axis(left, right),
            move_y: axis(up, down),
            ..Self::default()
        }
    }

    pub fn aiming(mut self, angle: f32, firing: bool) -> Self {
        self.aim = Some(angle);
        self.firing = firing;
        self
    }

    /// Movement direction scaled to unit length so diagonals are not faster.
    pub fn direction(&self) -> (f32, f32) {
        let x = if self.move_x.is_finite() { self.move_x.clamp(-1.0, 1.0) } else { 0.0 };
        let y = if self.move_y.is_finite() { self.move_y.clamp(-1.0, 1.0) } else { 0.0 };
        let len = (x * x + y * y).sqrt();
        if len > 1.0 {
            (x / len, y / len)
        } else {
            (x, y)
        }
    }
}

/// Source of one [`InputSnapshot`] per frame.
pub trait InputSource {
    fn sample(&mut self) -> InputSnapshot;
}

/// Replays a fixed list of snapshots, then idles.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSnapshot {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Bot input: walks in a random direction for a while, turns, keeps shooting.
pub struct WanderInput {
    rng: StdRng,
    heading: f32,
    frames_left: u32,
}

impl WanderInput {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            heading: 0.0,
            frames_left: 0,
        }
    }
}

impl InputSource for WanderInput {
    fn sample(&mut self) -> InputSnapshot {
        if self.frames_left == 0 {
            self.heading = self.rng.gen_range(0.0..TAU);
            self.frames_left = self.rng.gen_range(30..120);
        }
        self.frames_left -= 1;

        let aim = self.heading + self.rng.gen_range(-0.5..0.5);
        InputSnapshot {
            move_x: self.heading.cos(),
            move_y: self.heading.sin(),
            aim: Some(aim),
            firing: self.rng.gen_bool(0.3),
        }
    }
}
