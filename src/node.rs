//! Search node records and their discrete identity
//!
//! Continuous states are aggregated into coarse 4D cells; the cell tuple
//! is the node's identity for open/closed membership. Nodes own the dense
//! micro-step samples of the edge that reached them, so the final path
//! can be stitched from the parent chain without re-simulating anything.

use crate::angle;
use crate::config::PlannerConfig;
use crate::kinematics::{Direction, Pose};

/// Discrete cell key `(ix, iy, iyaw, itrailer_yaw)`.
///
/// Totally ordered so equal-priority heap entries break ties the same way
/// on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub ix: i32,
    pub iy: i32,
    pub iyaw: i32,
    pub itrailer_yaw: i32,
}

impl NodeKey {
    /// Quantize a continuous pose by floor division.
    pub fn from_pose(pose: &Pose, config: &PlannerConfig) -> Self {
        Self {
            ix: (pose.x / config.xy_resolution).floor() as i32,
            iy: (pose.y / config.xy_resolution).floor() as i32,
            iyaw: (angle::normalize(pose.yaw) / config.yaw_resolution).floor() as i32,
            itrailer_yaw: (angle::normalize(pose.trailer_yaw) / config.yaw_resolution).floor()
                as i32,
        }
    }
}

/// One search record: the arriving edge's dense samples plus bookkeeping.
///
/// Invariant: the sample arrays are non-empty and their final element is
/// the node's own continuous pose.
#[derive(Debug, Clone)]
pub struct Node {
    pub key: NodeKey,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub yaws: Vec<f64>,
    pub trailer_yaws: Vec<f64>,
    /// Direction of the step arriving at each sample
    pub directions: Vec<Direction>,
    /// Steering angle held over the arriving edge
    pub steer: f64,
    /// Cost so far
    pub g: f64,
    /// Parent cell, `None` for the root
    pub parent: Option<NodeKey>,
}

impl Node {
    /// Root node sitting at the start pose with an empty edge.
    pub fn root(pose: &Pose, config: &PlannerConfig) -> Self {
        Self {
            key: NodeKey::from_pose(pose, config),
            xs: vec![pose.x],
            ys: vec![pose.y],
            yaws: vec![pose.yaw],
            trailer_yaws: vec![pose.trailer_yaw],
            directions: vec![Direction::Forward],
            steer: 0.0,
            g: 0.0,
            parent: None,
        }
    }

    /// The node's continuous pose, the last sample of its edge.
    pub fn pose(&self) -> Pose {
        let i = self.xs.len() - 1;
        Pose {
            x: self.xs[i],
            y: self.ys[i],
            yaw: self.yaws[i],
            trailer_yaw: self.trailer_yaws[i],
        }
    }

    /// Direction of the last step into this node.
    pub fn arrival_direction(&self) -> Direction {
        self.directions[self.directions.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_key_floor_division() {
        let cfg = PlannerConfig::default();
        let key = NodeKey::from_pose(&Pose::new(3.9, -0.1, 0.0, 0.0), &cfg);
        assert_eq!(key.ix, 1);
        assert_eq!(key.iy, -1);
    }

    #[test]
    fn test_key_yaw_wrap_is_single_bucket() {
        let cfg = PlannerConfig::default();
        // pi and -pi are the same normalized heading, so the same bucket
        let a = NodeKey::from_pose(&Pose::new(0.0, 0.0, PI, PI), &cfg);
        let b = NodeKey::from_pose(&Pose::new(0.0, 0.0, -PI, -PI), &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_root_holds_its_own_pose() {
        let cfg = PlannerConfig::default();
        let pose = Pose::new(1.0, 2.0, 0.5, 0.4);
        let root = Node::root(&pose, &cfg);
        assert_eq!(root.pose(), pose);
        assert!(root.parent.is_none());
        assert_eq!(root.xs.len(), 1);
    }
}
