//! Vehicle and planner parameters
//!
//! All tunables live here with their defaults. The defaults describe a
//! full-size tractor with a single 8 m trailer and reproduce the behavior
//! the scenario tests are written against; callers override fields as
//! needed before invoking [`crate::plan`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Geometry and steering limits of the tractor-trailer combination.
///
/// Lengths in meters, angles in radians. The tractor pose is anchored at
/// the rear axle; the trailer pivots about the hitch point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Tractor wheelbase (rear axle to front axle)
    pub wheelbase: f64,

    /// Tractor body width
    pub width: f64,

    /// Rear axle to front bumper
    pub front_overhang: f64,

    /// Rear axle to rear bumper
    pub rear_overhang: f64,

    /// Rear axle to hitch point. The kinematic model assumes an on-axle
    /// hitch (0.0); the constant exists so the footprint math stays correct
    /// if the hitch is ever moved off the axle.
    pub rear_to_hitch: f64,

    /// Hitch point to trailer axle (the trailer's effective wheelbase)
    pub trailer_wheelbase: f64,

    /// Hitch point to trailer front edge
    pub trailer_front: f64,

    /// Hitch point to trailer rear edge
    pub trailer_back: f64,

    /// Trailer body width
    pub trailer_width: f64,

    /// Maximum steering angle of the tractor front wheels
    pub max_steer: f64,

    /// Maximum allowed |tractor yaw - trailer yaw| before the combination
    /// is considered jackknifed
    pub max_jackknife: f64,

    /// Inflation radius used when rasterizing obstacles into the holonomic
    /// heuristic grid
    pub safety_radius: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            wheelbase: 3.7,
            width: 2.6,
            front_overhang: 4.5,
            rear_overhang: 1.0,
            rear_to_hitch: 0.0,
            trailer_wheelbase: 8.0,
            trailer_front: 1.0,
            trailer_back: 9.0,
            trailer_width: 2.6,
            max_steer: 0.6,
            max_jackknife: 60.0 * PI / 180.0,
            safety_radius: 1.3,
        }
    }
}

impl VehicleConfig {
    /// Minimum turning radius of the tractor at full steering lock.
    pub fn min_turn_radius(&self) -> f64 {
        self.wheelbase / self.max_steer.tan()
    }

    /// Maximum path curvature, `1 / min_turn_radius`.
    pub fn max_curvature(&self) -> f64 {
        self.max_steer.tan() / self.wheelbase
    }
}

/// Search parameters for the hybrid A* planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Vehicle geometry and limits
    pub vehicle: VehicleConfig,

    /// Spatial grid resolution for node identity, meters per cell
    pub xy_resolution: f64,

    /// Angular grid resolution for node identity, radians per bucket
    pub yaw_resolution: f64,

    /// Arc length of one integration micro-step, meters
    pub motion_resolution: f64,

    /// Number of steering candidates across [-max_steer, +max_steer]
    pub n_steer: usize,

    /// Extra cost per meter traveled in reverse
    pub back_cost: f64,

    /// Flat cost of a forward/backward direction switch
    pub switch_back_cost: f64,

    /// Cost per radian of steering change between consecutive edges
    pub steer_change_cost: f64,

    /// Cost per radian of absolute steering angle
    pub steer_cost: f64,

    /// Cost per radian of tractor/trailer yaw divergence at an edge end
    pub jackknife_cost: f64,

    /// Multiplicative heuristic weight; 1.0 is admissible A*, larger
    /// values trade optimality for speed
    pub heuristic_weight: f64,

    /// Tolerance on the trailer yaw at the goal connection
    pub goal_trailer_yaw_tol: f64,

    /// Margin added around the obstacle bounding box when sizing the
    /// heuristic grid; also bounds the search workspace
    pub grid_margin: f64,

    /// Hard cap on node expansions before giving up
    pub max_expansions: usize,

    /// Attempt the analytic goal connection whenever the popped node's
    /// heuristic drops below this distance
    pub analytic_expand_radius: f64,

    /// Also attempt the analytic connection on every n-th pop regardless
    /// of distance, so distant closures stay possible
    pub analytic_expand_interval: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            xy_resolution: 2.0,
            yaw_resolution: 15.0 * PI / 180.0,
            motion_resolution: 0.1,
            n_steer: 20,
            back_cost: 5.0,
            switch_back_cost: 100.0,
            steer_change_cost: 5.0,
            steer_cost: 1.0,
            jackknife_cost: 200.0,
            heuristic_weight: 5.0,
            goal_trailer_yaw_tol: PI / 60.0,
            grid_margin: 5.0,
            max_expansions: 200_000,
            analytic_expand_radius: 20.0,
            analytic_expand_interval: 20,
        }
    }
}

impl PlannerConfig {
    /// Micro-steps per edge, sized so one edge spans roughly a grid
    /// diagonal.
    pub fn steps_per_edge(&self) -> usize {
        ((self.xy_resolution * 1.5 / self.motion_resolution).ceil() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_turn_radius() {
        let v = VehicleConfig::default();
        // wb / tan(0.6) = 3.7 / 0.6841...
        assert!((v.min_turn_radius() - 5.408).abs() < 1e-2);
        assert!((v.max_curvature() * v.min_turn_radius() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_steps_per_edge_spans_grid_diagonal() {
        let cfg = PlannerConfig::default();
        let span = cfg.steps_per_edge() as f64 * cfg.motion_resolution;
        assert!(span >= cfg.xy_resolution * std::f64::consts::SQRT_2);
        assert!(span <= cfg.xy_resolution * 2.0);
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let cfg = PlannerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PlannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n_steer, cfg.n_steer);
        assert_eq!(back.vehicle.wheelbase, cfg.vehicle.wheelbase);
    }
}
