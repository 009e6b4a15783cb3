//! Playback state machine over mesh instructions.
//!
//! Purpose
//! - Replay a solved fold sequence as per-mesh rigid transforms, the way a
//!   renderer would, without any rendering or event loop.
//!
//! Model
//! - One `Isometry3` per face mesh, identity at the flat sheet.
//! - `step` counts completed instructions. While a step is animating, `active`
//!   holds its index and the angle applied so far.
//! - `advance(dt)` turns the active meshes at `π/2 rad/s × speed` until the
//!   step's angle is reached, then moves `step` by ±1 and enters `Finished`.
//! - Axis positions are read from the current transform of the first mesh that
//!   contains the axis point, so reverse playback undoes rotations exactly.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FoldError, FoldResult};
use crate::geom::lift;
use crate::solver::{FaceMesh, MeshInstruction, SolveOutput};

/// Speed multipliers cycled by `cycle_speed`.
pub const SPEEDS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
/// Base angular speed in rad/s.
pub const ANGULAR_SPEED: f64 = FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Stopped,
    PlayingForward,
    PlayingReverse,
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Debug)]
pub struct Playback {
    meshes: Vec<FaceMesh>,
    instructions: Vec<MeshInstruction>,
    transforms: Vec<Isometry3<f64>>,
    state: PlayState,
    /// Direction to resume in after a pause.
    direction: Direction,
    step: usize,
    active: Option<(usize, f64)>,
    speed_index: usize,
}

impl Playback {
    pub fn new(meshes: Vec<FaceMesh>, instructions: Vec<MeshInstruction>) -> Self {
        let transforms = vec![Isometry3::identity(); meshes.len()];
        Self {
            meshes,
            instructions,
            transforms,
            state: PlayState::Stopped,
            direction: Direction::Forward,
            step: 0,
            active: None,
            speed_index: 1,
        }
    }

    pub fn from_output(out: &SolveOutput) -> Self {
        Self::new(out.meshes.clone(), out.instructions.clone())
    }

    pub fn state(&self) -> PlayState {
        self.state
    }
    /// Number of completed instructions.
    pub fn step(&self) -> usize {
        self.step
    }
    pub fn len(&self) -> usize {
        self.instructions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
    pub fn speed(&self) -> f64 {
        SPEEDS[self.speed_index]
    }
    pub fn transforms(&self) -> &[Isometry3<f64>] {
        &self.transforms
    }
    pub fn meshes(&self) -> &[FaceMesh] {
        &self.meshes
    }

    /// Play in `dir`, or pause if already playing.
    ///
    /// A step paused half-way resumes in its original direction.
    pub fn toggle_play(&mut self, dir: Direction) {
        if matches!(
            self.state,
            PlayState::PlayingForward | PlayState::PlayingReverse
        ) {
            self.state = PlayState::Paused;
            return;
        }
        if !(self.state == PlayState::Paused && self.active.is_some()) {
            self.direction = dir;
        }
        self.state = match self.direction {
            Direction::Forward => PlayState::PlayingForward,
            Direction::Reverse => PlayState::PlayingReverse,
        };
    }

    /// Back to the flat sheet.
    pub fn reset(&mut self) {
        self.transforms.fill(Isometry3::identity());
        self.step = 0;
        self.active = None;
        self.direction = Direction::Forward;
        self.state = PlayState::Stopped;
    }

    pub fn cycle_speed(&mut self) -> f64 {
        self.speed_index = (self.speed_index + 1) % SPEEDS.len();
        self.speed()
    }

    /// Advance the animation by `dt` seconds.
    pub fn advance(&mut self, dt: f64) -> FoldResult<PlayState> {
        let forward = match self.state {
            PlayState::PlayingForward => true,
            PlayState::PlayingReverse => false,
            s => return Ok(s),
        };
        let (index, applied) = match self.active {
            Some(a) => a,
            None if forward && self.step < self.len() => (self.step, 0.0),
            None if !forward && self.step > 0 => {
                let i = self.step - 1;
                (i, self.instructions[i].angle)
            }
            None => {
                self.state = PlayState::Finished;
                return Ok(self.state);
            }
        };
        let target = if forward {
            self.instructions[index].angle
        } else {
            0.0
        };
        let budget = ANGULAR_SPEED * self.speed() * dt.max(0.0);
        let delta = (target - applied).clamp(-budget, budget);
        self.rotate_meshes(index, delta)?;
        let applied = applied + delta;
        if (target - applied).abs() <= 1e-12 {
            self.active = None;
            self.step = if forward { index + 1 } else { index };
            self.state = PlayState::Finished;
            debug!(step = self.step, forward, "playback step finished");
        } else {
            self.active = Some((index, applied));
        }
        Ok(self.state)
    }

    /// Complete the current (or next) instruction instantly.
    pub fn step_forward(&mut self) -> FoldResult<()> {
        let (index, applied) = match self.active {
            Some(a) => a,
            None if self.step < self.len() => (self.step, 0.0),
            None => return Ok(()),
        };
        self.rotate_meshes(index, self.instructions[index].angle - applied)?;
        self.active = None;
        self.step = index + 1;
        self.state = PlayState::Paused;
        Ok(())
    }

    /// Undo the current (or previous) instruction instantly.
    pub fn step_backward(&mut self) -> FoldResult<()> {
        let (index, applied) = match self.active {
            Some(a) => a,
            None if self.step > 0 => (self.step - 1, self.instructions[self.step - 1].angle),
            None => return Ok(()),
        };
        self.rotate_meshes(index, -applied)?;
        self.active = None;
        self.step = index;
        self.state = PlayState::Paused;
        Ok(())
    }

    /// Current world position of a named point (first mesh that contains it).
    pub fn world_point(&self, name: &str) -> Option<Vector3<f64>> {
        self.meshes.iter().enumerate().find_map(|(i, m)| {
            let k = m.names.iter().position(|n| n == name)?;
            let p = self.transforms[i] * Point3::from(lift(m.polygon[k]));
            Some(p.coords)
        })
    }

    fn rotate_meshes(&mut self, index: usize, angle: f64) -> FoldResult<()> {
        if angle == 0.0 {
            return Ok(());
        }
        let ins = &self.instructions[index];
        let locate = |n: &str| {
            self.world_point(n)
                .ok_or_else(|| FoldError::reconciliation(format!("axis point `{n}` is on no mesh")))
        };
        let a0 = locate(&ins.axis[0])?;
        let a1 = locate(&ins.axis[1])?;
        let dir = Unit::try_new(a1 - a0, 1e-12)
            .ok_or_else(|| FoldError::degenerate("playback axis has zero length"))?;
        let rot = UnitQuaternion::from_axis_angle(&dir, angle);
        let iso = Isometry3::from_parts(Translation3::from(a0 - rot * a0), rot);
        for &m in &ins.mesh_ids {
            let t = self.transforms.get_mut(m).ok_or_else(|| {
                FoldError::reconciliation(format!("mesh {m} does not exist"))
            })?;
            *t = iso * *t;
        }
        Ok(())
    }
}
