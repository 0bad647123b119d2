//! Holonomic cost-to-go heuristic grid
//!
//! A 2D Dijkstra from the goal cell over an obstacle-inflated occupancy
//! grid. The stored field is the cost in meters of the cheapest
//! 8-connected holonomic walk to the goal, which lower-bounds what the
//! real vehicle can do among the same obstacles and therefore serves as
//! one of the two admissible heuristic terms.
//!
//! The grid also delimits the search workspace: the bounding box of the
//! obstacles and both terminal poses, inflated by a maneuvering margin.
//! Costs are propagated in integer millimeters and converted once at the
//! end, so relaxation order never depends on float summation quirks.

use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::obstacle::ObstacleIndex;

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// Precomputed cost-to-go field, row-major over `(ix, iy)`.
pub struct HolonomicCostGrid {
    min_x: f64,
    min_y: f64,
    nx: usize,
    ny: usize,
    resolution: f64,
    cost: Vec<f64>,
}

impl HolonomicCostGrid {
    /// Rasterize the obstacles and run Dijkstra from `goal`.
    ///
    /// Fails with [`PlanError::HeuristicUnreachable`] when the goal cell
    /// itself is blocked by an inflated obstacle.
    pub fn build(
        obstacles: &ObstacleIndex,
        start: (f64, f64),
        goal: (f64, f64),
        config: &PlannerConfig,
    ) -> Result<Self, PlanError> {
        let resolution = config.xy_resolution;
        // enough surrounding room for switchback maneuvers even when the
        // obstacle set is empty or hugs the terminal poses
        let margin = config.grid_margin + 3.0 * config.vehicle.min_turn_radius();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = obstacles
            .bounding_box()
            .unwrap_or((start.0, start.1, start.0, start.1));
        for &(px, py) in &[start, goal] {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        min_x -= margin;
        min_y -= margin;
        max_x += margin;
        max_y += margin;

        let nx = ((max_x - min_x) / resolution).ceil() as usize + 1;
        let ny = ((max_y - min_y) / resolution).ceil() as usize + 1;

        let occupied = rasterize(obstacles, min_x, min_y, nx, ny, resolution, config.vehicle.safety_radius);

        let goal_ix = ((goal.0 - min_x) / resolution).floor() as usize;
        let goal_iy = ((goal.1 - min_y) / resolution).floor() as usize;
        let goal_cell = goal_iy * nx + goal_ix;
        if occupied[goal_cell] {
            return Err(PlanError::HeuristicUnreachable);
        }

        // Dijkstra from the goal cell, costs in millimeters
        let orth_mm = (resolution * 1000.0).round() as u64;
        let diag_mm = (resolution * SQRT2 * 1000.0).round() as u64;

        let mut dist = vec![u64::MAX; nx * ny];
        let mut pq: PriorityQueue<usize, Reverse<u64>> = PriorityQueue::new();
        dist[goal_cell] = 0;
        pq.push(goal_cell, Reverse(0));

        let mut settled = 0usize;
        while let Some((cell, Reverse(d))) = pq.pop() {
            if d > dist[cell] {
                continue; // stale entry
            }
            settled += 1;
            let ix = (cell % nx) as isize;
            let iy = (cell / nx) as isize;
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let jx = ix + dx;
                    let jy = iy + dy;
                    if jx < 0 || jy < 0 || jx >= nx as isize || jy >= ny as isize {
                        continue;
                    }
                    let neighbor = jy as usize * nx + jx as usize;
                    if occupied[neighbor] {
                        continue;
                    }
                    let w = if dx != 0 && dy != 0 { diag_mm } else { orth_mm };
                    let nd = d.saturating_add(w);
                    if nd < dist[neighbor] {
                        dist[neighbor] = nd;
                        pq.push(neighbor, Reverse(nd));
                    }
                }
            }
        }

        debug!(
            nx,
            ny,
            settled,
            occupied = occupied.iter().filter(|&&o| o).count(),
            "holonomic heuristic grid built"
        );

        let cost = dist
            .iter()
            .map(|&d| if d == u64::MAX { f64::INFINITY } else { d as f64 / 1000.0 })
            .collect();

        Ok(Self {
            min_x,
            min_y,
            nx,
            ny,
            resolution,
            cost,
        })
    }

    /// Cost-to-go at a world position; +inf outside the grid or in an
    /// unreachable pocket.
    pub fn cost_at(&self, x: f64, y: f64) -> f64 {
        match self.cell_of(x, y) {
            Some(cell) => self.cost[cell],
            None => f64::INFINITY,
        }
    }

    /// True when the position falls inside the workspace the grid covers.
    pub fn in_bounds(&self, x: f64, y: f64) -> bool {
        self.cell_of(x, y).is_some()
    }

    fn cell_of(&self, x: f64, y: f64) -> Option<usize> {
        let fx = (x - self.min_x) / self.resolution;
        let fy = (y - self.min_y) / self.resolution;
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        let ix = fx.floor() as usize;
        let iy = fy.floor() as usize;
        if ix >= self.nx || iy >= self.ny {
            return None;
        }
        Some(iy * self.nx + ix)
    }
}

/// Mark every cell whose center lies within `radius` of an obstacle.
fn rasterize(
    obstacles: &ObstacleIndex,
    min_x: f64,
    min_y: f64,
    nx: usize,
    ny: usize,
    resolution: f64,
    radius: f64,
) -> Vec<bool> {
    let mut occupied = vec![false; nx * ny];
    if obstacles.is_empty() {
        return occupied;
    }
    for iy in 0..ny {
        let cy = min_y + (iy as f64 + 0.5) * resolution;
        for ix in 0..nx {
            let cx = min_x + (ix as f64 + 0.5) * resolution;
            if obstacles.any_within_radius(cx, cy, radius) {
                occupied[iy * nx + ix] = true;
            }
        }
    }
    occupied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;

    fn build_grid(ox: &[f64], oy: &[f64], start: (f64, f64), goal: (f64, f64)) -> HolonomicCostGrid {
        let obstacles = ObstacleIndex::build(ox, oy).unwrap();
        HolonomicCostGrid::build(&obstacles, start, goal, &PlannerConfig::default()).unwrap()
    }

    #[test]
    fn test_goal_cell_costs_zero() {
        let grid = build_grid(&[], &[], (10.0, 0.0), (0.0, 0.0));
        assert_eq!(grid.cost_at(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_open_field_cost_grows_with_distance() {
        let grid = build_grid(&[], &[], (10.0, 0.0), (0.0, 0.0));
        // 5 orthogonal cells at 2 m each
        let c = grid.cost_at(10.0, 0.0);
        assert!((c - 10.0).abs() < 2.0 + 1e-9, "c = {c}");
        // cost lower-bounds never undershoot chebyshev-style distance
        assert!(grid.cost_at(10.0, 0.0) > grid.cost_at(4.0, 0.0));
    }

    #[test]
    fn test_diagonal_uses_sqrt2_steps() {
        let grid = build_grid(&[], &[], (8.0, 8.0), (0.0, 0.0));
        let c = grid.cost_at(8.0, 8.0);
        // 4 diagonal cells at 2*sqrt(2) each
        assert!((c - 8.0 * SQRT2).abs() < 3.0, "c = {c}");
    }

    #[test]
    fn test_wall_forces_detour() {
        // vertical wall at x = 5 with points every 0.5 m, goal left of it
        let mut ox = Vec::new();
        let mut oy = Vec::new();
        let mut y = -20.0;
        while y <= 20.0 {
            ox.push(5.0);
            oy.push(y);
            y += 0.5;
        }
        let grid = build_grid(&ox, &oy, (10.0, 0.0), (0.0, 0.0));
        let direct = 10.0;
        let c = grid.cost_at(10.0, 0.0);
        assert!(c > direct * 2.0, "wall should force a long detour, c = {c}");
    }

    #[test]
    fn test_occupied_goal_cell_is_an_error() {
        let obstacles = ObstacleIndex::build(&[0.0], &[0.0]).unwrap();
        let result =
            HolonomicCostGrid::build(&obstacles, (10.0, 0.0), (0.0, 0.0), &PlannerConfig::default());
        assert!(matches!(result, Err(PlanError::HeuristicUnreachable)));
    }

    #[test]
    fn test_out_of_bounds_is_infinite() {
        let grid = build_grid(&[], &[], (2.0, 0.0), (0.0, 0.0));
        assert_eq!(grid.cost_at(1e6, 0.0), f64::INFINITY);
        assert!(!grid.in_bounds(1e6, 0.0));
        assert!(grid.in_bounds(0.0, 0.0));
    }
}
