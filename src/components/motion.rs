//! Horizontal travel of an effect sprite toward the opposing side.
//!
//! A [`Motion`] moves its entity by a fixed number of pixels per tick and
//! reports the first time the entity crosses the boundary in its direction of
//! travel. Crossing is inclusive (`x >= right` / `x <= left`) and is detected
//! in the same tick as the displacement that causes it.
//!
//! Each side has a fired flag, so an entity that lingers past a boundary
//! reports it once per play cycle. [`Motion::start`] clears both flags.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::LeftToRight => 1.0,
            Direction::RightToLeft => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
        }
    }

    /// The boundary this direction travels toward.
    pub fn target_side(self) -> Side {
        match self {
            Direction::LeftToRight => Side::Right,
            Direction::RightToLeft => Side::Left,
        }
    }
}

impl From<bool> for Direction {
    /// `true` is left-to-right.
    fn from(left_to_right: bool) -> Self {
        if left_to_right {
            Direction::LeftToRight
        } else {
            Direction::RightToLeft
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Motion {
    pub direction: Direction,
    /// Pixels per tick; the sign comes from `direction`.
    pub step: f32,
    pub left_boundary: f32,
    pub right_boundary: f32,
    pub active: bool,
    hit_left_fired: bool,
    hit_right_fired: bool,
}

impl Motion {
    /// An inactive motion; call [`Motion::start`] to begin a cycle.
    pub fn new(direction: Direction, step: f32, left_boundary: f32, right_boundary: f32) -> Self {
        Self {
            direction,
            step,
            left_boundary,
            right_boundary,
            active: false,
            hit_left_fired: false,
            hit_right_fired: false,
        }
    }

    pub fn start(&mut self) {
        self.reset();
        self.active = true;
    }

    /// Clear both fired flags.
    pub fn reset(&mut self) {
        self.hit_left_fired = false;
        self.hit_right_fired = false;
    }

    pub fn halt(&mut self) {
        self.active = false;
    }

    /// Signed displacement applied each tick.
    pub fn velocity(&self) -> f32 {
        self.direction.sign() * self.step.abs()
    }

    /// Check `x` against the boundary ahead. Returns the side the first time
    /// it is crossed in this cycle and marks it fired.
    pub fn check_crossing(&mut self, x: f32) -> Option<Side> {
        match self.direction {
            Direction::LeftToRight if x >= self.right_boundary && !self.hit_right_fired => {
                self.hit_right_fired = true;
                Some(Side::Right)
            }
            Direction::RightToLeft if x <= self.left_boundary && !self.hit_left_fired => {
                self.hit_left_fired = true;
                Some(Side::Left)
            }
            _ => None,
        }
    }

    pub fn has_fired(&self, side: Side) -> bool {
        match side {
            Side::Left => self.hit_left_fired,
            Side::Right => self.hit_right_fired,
        }
    }
}
