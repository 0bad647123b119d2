//! Vehicle footprint and swept-volume collision checking
//!
//! The combination is modeled as two oriented rectangles: the tractor body
//! around the rear axle and the trailer body behind the hitch. A pose
//! passes when neither rectangle contains an obstacle point and the hitch
//! angle stays inside the jackknife limit.

use crate::config::VehicleConfig;
use crate::kinematics::Pose;
use crate::obstacle::ObstacleIndex;

/// An oriented rectangle: center, heading, half extents.
#[derive(Debug, Clone, Copy)]
struct BodyRect {
    cx: f64,
    cy: f64,
    yaw: f64,
    half_len: f64,
    half_width: f64,
}

impl BodyRect {
    /// Radius of the smallest circle around the center that contains the
    /// whole rectangle; used to pre-filter the R-tree query.
    fn bounding_radius(&self) -> f64 {
        (self.half_len * self.half_len + self.half_width * self.half_width).sqrt()
    }

    /// True if any of the given obstacle points lies inside the rectangle.
    fn hits_any(&self, obstacles: &ObstacleIndex) -> bool {
        let (sin, cos) = self.yaw.sin_cos();
        for (ox, oy) in obstacles.within_radius(self.cx, self.cy, self.bounding_radius()) {
            let dx = ox - self.cx;
            let dy = oy - self.cy;
            // into the body frame
            let lx = cos * dx + sin * dy;
            let ly = -sin * dx + cos * dy;
            if lx.abs() <= self.half_len && ly.abs() <= self.half_width {
                return true;
            }
        }
        false
    }
}

/// Tractor rectangle at the given pose.
fn tractor_rect(pose: &Pose, vehicle: &VehicleConfig) -> BodyRect {
    // body center sits ahead of the rear axle by half the overhang surplus
    let offset = (vehicle.front_overhang - vehicle.rear_overhang) / 2.0;
    BodyRect {
        cx: pose.x + offset * pose.yaw.cos(),
        cy: pose.y + offset * pose.yaw.sin(),
        yaw: pose.yaw,
        half_len: (vehicle.front_overhang + vehicle.rear_overhang) / 2.0,
        half_width: vehicle.width / 2.0,
    }
}

/// Trailer rectangle at the given pose.
fn trailer_rect(pose: &Pose, vehicle: &VehicleConfig) -> BodyRect {
    let hx = pose.x - vehicle.rear_to_hitch * pose.yaw.cos();
    let hy = pose.y - vehicle.rear_to_hitch * pose.yaw.sin();
    // trailer extends trailer_front ahead of the hitch and trailer_back behind
    let offset = (vehicle.trailer_front - vehicle.trailer_back) / 2.0;
    BodyRect {
        cx: hx + offset * pose.trailer_yaw.cos(),
        cy: hy + offset * pose.trailer_yaw.sin(),
        yaw: pose.trailer_yaw,
        half_len: (vehicle.trailer_front + vehicle.trailer_back) / 2.0,
        half_width: vehicle.trailer_width / 2.0,
    }
}

/// True if the pose is jackknife-feasible and collision-free.
pub fn check_pose(obstacles: &ObstacleIndex, vehicle: &VehicleConfig, pose: &Pose) -> bool {
    if pose.jackknife_angle().abs() > vehicle.max_jackknife {
        return false;
    }
    if obstacles.is_empty() {
        return true;
    }
    if tractor_rect(pose, vehicle).hits_any(obstacles) {
        return false;
    }
    !trailer_rect(pose, vehicle).hits_any(obstacles)
}

/// True iff every pose in the sequence passes [`check_pose`]. Returns at
/// the first failure.
pub fn check_path<'a, I>(obstacles: &ObstacleIndex, vehicle: &VehicleConfig, poses: I) -> bool
where
    I: IntoIterator<Item = &'a Pose>,
{
    poses
        .into_iter()
        .all(|pose| check_pose(obstacles, vehicle, pose))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn index(points: &[(f64, f64)]) -> ObstacleIndex {
        let ox: Vec<f64> = points.iter().map(|p| p.0).collect();
        let oy: Vec<f64> = points.iter().map(|p| p.1).collect();
        ObstacleIndex::build(&ox, &oy).unwrap()
    }

    #[test]
    fn test_open_field_passes() {
        let v = VehicleConfig::default();
        let obstacles = index(&[]);
        assert!(check_pose(&obstacles, &v, &Pose::new(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_point_inside_tractor_body() {
        let v = VehicleConfig::default();
        // tractor spans x in [-1.0, 4.5], y in [-1.3, 1.3] at the origin pose
        let obstacles = index(&[(2.0, 0.5)]);
        assert!(!check_pose(&obstacles, &v, &Pose::new(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_point_inside_trailer_body() {
        let v = VehicleConfig::default();
        // trailer spans x in [-9.0, 1.0] behind the hitch at the origin pose
        let obstacles = index(&[(-6.0, 0.0)]);
        assert!(!check_pose(&obstacles, &v, &Pose::new(0.0, 0.0, 0.0, 0.0)));
        // same point clears once the vehicle moves forward
        assert!(check_pose(&obstacles, &v, &Pose::new(20.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_point_beside_body_passes() {
        let v = VehicleConfig::default();
        let obstacles = index(&[(2.0, 1.5), (-6.0, -1.5)]);
        assert!(check_pose(&obstacles, &v, &Pose::new(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotated_body() {
        let v = VehicleConfig::default();
        // facing +y, the tractor occupies y in [-1.0, 4.5] around x = 0
        let obstacles = index(&[(0.0, 3.0)]);
        let pose = Pose::new(0.0, 0.0, PI / 2.0, PI / 2.0);
        assert!(!check_pose(&obstacles, &v, &pose));
        let beside = index(&[(2.0, 3.0)]);
        assert!(check_pose(&beside, &v, &pose));
    }

    #[test]
    fn test_jackknife_rejected_without_obstacles() {
        let v = VehicleConfig::default();
        let obstacles = index(&[]);
        let pose = Pose::new(0.0, 0.0, 0.0, v.max_jackknife + 0.1);
        assert!(!check_pose(&obstacles, &v, &pose));
    }

    #[test]
    fn test_check_path_short_circuits_on_failure() {
        let v = VehicleConfig::default();
        let obstacles = index(&[(2.0, 0.0)]);
        let good = Pose::new(30.0, 0.0, 0.0, 0.0);
        let bad = Pose::new(0.0, 0.0, 0.0, 0.0);
        assert!(check_path(&obstacles, &v, [good, good].iter()));
        assert!(!check_path(&obstacles, &v, [good, bad].iter()));
    }
}
