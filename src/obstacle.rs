//! Spatial index over the caller-supplied obstacle point cloud
//!
//! Static R-tree built once per plan; the planner only ever issues radius
//! queries against it, so nothing here is mutable after construction.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::PlanError;

/// A single obstacle point in the R-tree.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ObstaclePoint {
    coords: [f64; 2],
}

impl RTreeObject for ObstaclePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for ObstaclePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.coords[0] - point[0];
        let dy = self.coords[1] - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.coords == *point
    }
}

/// Immutable spatial index over obstacle points.
pub struct ObstacleIndex {
    tree: RTree<ObstaclePoint>,
    bounds: Option<(f64, f64, f64, f64)>, // min_x, min_y, max_x, max_y
}

impl ObstacleIndex {
    /// Build the index from parallel coordinate arrays.
    ///
    /// The empty set is legal; mismatched lengths or non-finite
    /// coordinates are not.
    pub fn build(ox: &[f64], oy: &[f64]) -> Result<Self, PlanError> {
        if ox.len() != oy.len() {
            return Err(PlanError::InvalidInput(
                "obstacle coordinate arrays differ in length",
            ));
        }

        let mut points = Vec::with_capacity(ox.len());
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (&x, &y) in ox.iter().zip(oy.iter()) {
            if !x.is_finite() || !y.is_finite() {
                return Err(PlanError::InvalidInput("non-finite obstacle coordinate"));
            }
            points.push(ObstaclePoint { coords: [x, y] });
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }

        Ok(Self {
            tree: RTree::bulk_load(points),
            bounds,
        })
    }

    /// All obstacle points within `radius` of `(cx, cy)`.
    pub fn within_radius(
        &self,
        cx: f64,
        cy: f64,
        radius: f64,
    ) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.tree
            .locate_within_distance([cx, cy], radius * radius)
            .map(|p| (p.coords[0], p.coords[1]))
    }

    /// True if any obstacle lies within `radius` of `(cx, cy)`.
    pub fn any_within_radius(&self, cx: f64, cy: f64, radius: f64) -> bool {
        self.within_radius(cx, cy, radius).next().is_some()
    }

    /// Axis-aligned bounding box of the point cloud, `None` when empty.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
