//! Bicycle-with-trailer kinematic model
//!
//! One micro-step advances the tractor rear axle by a signed arc length
//! and drags the trailer yaw behind it through the hitch. Everything the
//! search simulates, and everything the analytic connector re-propagates,
//! goes through the two functions here so the two stages can never
//! disagree on the motion model.

use serde::Serialize;

use crate::angle;
use crate::config::VehicleConfig;

/// Continuous planner state: tractor rear-axle position, tractor heading,
/// trailer heading. Meters and radians; yaws normalized to (-pi, pi].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub trailer_yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, yaw: f64, trailer_yaw: f64) -> Self {
        Self {
            x,
            y,
            yaw: angle::normalize(yaw),
            trailer_yaw: angle::normalize(trailer_yaw),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.yaw.is_finite() && self.trailer_yaw.is_finite()
    }

    /// Signed hitch angle between tractor and trailer.
    pub fn jackknife_angle(&self) -> f64 {
        angle::diff(self.yaw, self.trailer_yaw)
    }
}

/// Direction of travel for one sampled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// +1.0 forward, -1.0 backward.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Advance the full state by one arc step of signed length `d` with
/// steering angle `steer`. The trailer update uses the pre-step tractor
/// heading, matching the order the position update reads it.
pub fn step(pose: &Pose, d: f64, steer: f64, vehicle: &VehicleConfig) -> Pose {
    Pose {
        x: pose.x + d * pose.yaw.cos(),
        y: pose.y + d * pose.yaw.sin(),
        yaw: angle::normalize(pose.yaw + d / vehicle.wheelbase * steer.tan()),
        trailer_yaw: propagate_trailer(pose.trailer_yaw, pose.yaw, d, vehicle),
    }
}

/// Trailer-only half of the update: the tractor heading is taken as given.
///
/// The analytic goal connector uses this to drag the trailer along a
/// Reeds-Shepp tractor curve whose samples are already fixed.
pub fn propagate_trailer(trailer_yaw: f64, tractor_yaw: f64, d: f64, vehicle: &VehicleConfig) -> f64 {
    angle::normalize(
        trailer_yaw + d / vehicle.trailer_wheelbase * (tractor_yaw - trailer_yaw).sin(),
    )
}
