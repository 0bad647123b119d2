//! Towplan: hybrid A* trajectory planner for tractor-trailer vehicles
//!
//! Pipeline of one plan invocation:
//! - Obstacle index - immutable R-tree over the caller's point cloud
//! - Holonomic grid - 2D Dijkstra cost-to-go from the goal (heuristic 1)
//! - Reeds-Shepp - analytic shortest curves (heuristic 2 + goal connector)
//! - Hybrid A* - discrete-cell search over simulated motion primitives
//! - Reconstruction - parent-chain stitching into one dense trajectory
//!
//! Key principle: the expander, the analytic connector and the collision
//! checker all consume the same kinematic model and the same angle
//! normalization, so no stage can accept a state another stage would
//! reject.
//!
//! The planner is single-threaded and synchronous; all mutable state
//! lives inside the plan call. Independent invocations may run in
//! parallel freely.

pub mod angle;
pub mod config;
pub mod error;
pub mod grid;
pub mod kinematics;
pub mod node;
pub mod obstacle;
pub mod path;
pub mod reeds_shepp;
pub mod search;
pub mod vehicle;

pub use config::{PlannerConfig, VehicleConfig};
pub use error::PlanError;
pub use kinematics::{Direction, Pose};
pub use obstacle::ObstacleIndex;
pub use path::{PlanStats, TrailerPath};
pub use reeds_shepp::{RsPath, RsSamples, RsSegment};
pub use vehicle::{check_path, check_pose};

use tracing::info;

/// Plan a kinematically feasible, collision-free trajectory from `start`
/// to `goal` among the given point obstacles.
///
/// Obstacles are two equal-length coordinate arrays; the empty set is
/// legal. Units are meters and radians, yaws normalized internally to
/// (-pi, pi]. On success the returned path starts at the start pose and
/// ends on the goal pose (trailer yaw within
/// [`PlannerConfig::goal_trailer_yaw_tol`]).
pub fn plan(
    start: &Pose,
    goal: &Pose,
    obstacles_x: &[f64],
    obstacles_y: &[f64],
    config: &PlannerConfig,
) -> Result<TrailerPath, PlanError> {
    let index = ObstacleIndex::build(obstacles_x, obstacles_y)?;
    info!(
        obstacles = index.len(),
        sx = start.x,
        sy = start.y,
        gx = goal.x,
        gy = goal.y,
        "planning trailer trajectory"
    );
    let result = search::run(start, goal, &index, config);
    match &result {
        Ok(path) => info!(
            samples = path.len(),
            length = path.total_length(),
            switches = path.switch_count(),
            expansions = path.stats.expansions,
            "plan complete"
        ),
        Err(err) => info!(%err, "plan failed"),
    }
    result
}
