//! Hybrid A* search core
//!
//! Continuous states, discrete membership: the open and closed sets are
//! keyed by coarse 4D cells while every edge is simulated at full
//! resolution through the kinematic model. Two admissible heuristic terms
//! (holonomic-with-obstacles grid, Reeds-Shepp-without-obstacles length)
//! are combined by max; the goal is reached through an analytic
//! Reeds-Shepp connection validated against trailer drift, jackknife and
//! collisions.
//!
//! The priority queue is a plain binary heap with lazy invalidation: a
//! re-inserted cell outdates its old entry, and stale entries are skipped
//! when popped (same discipline as a bidirectional CCH query).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::angle;
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::grid::HolonomicCostGrid;
use crate::kinematics::{self, Direction, Pose};
use crate::node::{Node, NodeKey};
use crate::obstacle::ObstacleIndex;
use crate::path::{self, PlanStats, SampledEdge, TrailerPath};
use crate::reeds_shepp;
use crate::vehicle;

/// Open-list entry. Min-heap on f, ties broken toward smaller h (goal
/// preferring), then by cell key so runs are reproducible.
struct HeapEntry {
    f: f64,
    h: f64,
    g: f64,
    key: NodeKey,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.h == other.h && self.key == other.key
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.h.partial_cmp(&self.h).unwrap_or(Ordering::Equal))
            .then_with(|| other.key.cmp(&self.key))
    }
}

/// Plan a trajectory between two fully specified poses.
pub(crate) fn run(
    start: &Pose,
    goal: &Pose,
    obstacles: &ObstacleIndex,
    config: &PlannerConfig,
) -> Result<TrailerPath, PlanError> {
    let start = Pose::new(start.x, start.y, start.yaw, start.trailer_yaw);
    let goal = Pose::new(goal.x, goal.y, goal.yaw, goal.trailer_yaw);
    if !start.is_finite() || !goal.is_finite() {
        return Err(PlanError::InvalidInput("non-finite pose coordinate"));
    }
    if !vehicle::check_pose(obstacles, &config.vehicle, &start) {
        return Err(PlanError::InvalidStart);
    }
    if !vehicle::check_pose(obstacles, &config.vehicle, &goal) {
        return Err(PlanError::InvalidGoal);
    }

    if let Some(path) = trivial_path(&start, &goal, config) {
        info!("start already satisfies the goal tolerances");
        return Ok(path);
    }

    let grid = HolonomicCostGrid::build(obstacles, (start.x, start.y), (goal.x, goal.y), config)?;
    if grid.cost_at(start.x, start.y).is_infinite() {
        return Err(PlanError::HeuristicUnreachable);
    }

    Search {
        obstacles,
        grid,
        goal,
        config,
        steers: steer_candidates(config),
        max_curvature: config.vehicle.max_curvature(),
        stats: PlanStats::default(),
    }
    .run(start)
}

/// Two-sample path when start and goal already coincide within the step
/// and yaw tolerances; the search proper never sees this case.
fn trivial_path(start: &Pose, goal: &Pose, config: &PlannerConfig) -> Option<TrailerPath> {
    let close_enough = (start.x - goal.x).hypot(start.y - goal.y) <= config.motion_resolution
        && angle::diff(start.yaw, goal.yaw).abs() <= config.yaw_resolution
        && angle::diff(start.trailer_yaw, goal.trailer_yaw).abs() <= config.goal_trailer_yaw_tol;
    close_enough.then(|| TrailerPath {
        x: vec![start.x, goal.x],
        y: vec![start.y, goal.y],
        yaw: vec![start.yaw, goal.yaw],
        trailer_yaw: vec![start.trailer_yaw, goal.trailer_yaw],
        direction: vec![Direction::Forward, Direction::Forward],
        stats: PlanStats::default(),
    })
}

/// Uniform steering ladder over [-max_steer, +max_steer]. The candidate
/// nearest zero is snapped to exactly zero so straight motion stays in
/// the primitive set for any `n_steer`.
fn steer_candidates(config: &PlannerConfig) -> Vec<f64> {
    let n = config.n_steer.max(2);
    let max = config.vehicle.max_steer;
    let mut steers: Vec<f64> = (0..n)
        .map(|i| -max + 2.0 * max * i as f64 / (n - 1) as f64)
        .collect();
    let nearest = steers
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap();
    steers[nearest] = 0.0;
    steers
}

struct Search<'a> {
    obstacles: &'a ObstacleIndex,
    grid: HolonomicCostGrid,
    goal: Pose,
    config: &'a PlannerConfig,
    steers: Vec<f64>,
    max_curvature: f64,
    stats: PlanStats,
}

impl Search<'_> {
    fn run(mut self, start: Pose) -> Result<TrailerPath, PlanError> {
        let mut open: FxHashMap<NodeKey, Node> = FxHashMap::default();
        let mut closed: FxHashMap<NodeKey, Node> = FxHashMap::default();
        let mut heap = BinaryHeap::new();

        let root = Node::root(&start, self.config);
        let h0 = self.heuristic(&start);
        heap.push(HeapEntry {
            f: self.config.heuristic_weight * h0,
            h: h0,
            g: 0.0,
            key: root.key,
        });
        open.insert(root.key, root);

        let mut pops = 0usize;
        while let Some(entry) = heap.pop() {
            if closed.contains_key(&entry.key) {
                continue;
            }
            let current_g = match open.get(&entry.key) {
                Some(node) => node.g,
                None => continue,
            };
            if (current_g - entry.g).abs() > 1e-9 {
                continue; // stale entry, a cheaper push superseded it
            }

            if self.stats.expansions >= self.config.max_expansions {
                debug!(expansions = self.stats.expansions, "expansion budget exhausted");
                return Err(PlanError::BudgetExceeded {
                    expansions: self.stats.expansions,
                });
            }

            let Some(node) = open.remove(&entry.key) else {
                continue;
            };

            // throttled analytic goal connection: always near the goal,
            // periodically everywhere else
            let near_goal = entry.h < self.config.analytic_expand_radius;
            let periodic = pops % self.config.analytic_expand_interval.max(1) == 0;
            pops += 1;
            if near_goal || periodic {
                self.stats.analytic_attempts += 1;
                if let Some(tail) = self.analytic_expansion(&node) {
                    info!(
                        expansions = self.stats.expansions,
                        attempts = self.stats.analytic_attempts,
                        "analytic connection reached the goal"
                    );
                    let key = node.key;
                    closed.insert(key, node);
                    return finish(&closed, key, &tail, self.stats);
                }
            }

            self.stats.expansions += 1;
            let successors = self.expand(&node);
            trace!(
                key = ?node.key,
                g = node.g,
                successors = successors.len(),
                "expanded node"
            );
            closed.insert(node.key, node);

            for succ in successors {
                if closed.contains_key(&succ.key) {
                    continue;
                }
                if let Some(existing) = open.get(&succ.key) {
                    if existing.g <= succ.g {
                        continue;
                    }
                }
                let pose = succ.pose();
                let h = self.heuristic(&pose);
                if h.is_infinite() {
                    continue; // holonomically cut off, can never reach the goal
                }
                heap.push(HeapEntry {
                    f: succ.g + self.config.heuristic_weight * h,
                    h,
                    g: succ.g,
                    key: succ.key,
                });
                self.stats.pushed += 1;
                open.insert(succ.key, succ);
            }
        }

        debug!(expansions = self.stats.expansions, "open set exhausted");
        Err(PlanError::SearchExhausted)
    }

    /// max of the two admissible terms; each covers what the other
    /// ignores (obstacles vs. curvature bounds).
    fn heuristic(&self, pose: &Pose) -> f64 {
        let h_holo = self.grid.cost_at(pose.x, pose.y);
        let h_rs = reeds_shepp::shortest_length(
            (pose.x, pose.y, pose.yaw),
            (self.goal.x, self.goal.y, self.goal.yaw),
            self.max_curvature,
        );
        h_holo.max(h_rs)
    }

    /// Simulate every (steer, direction) primitive from the parent and
    /// keep the collision-free ones that leave the parent's cell.
    fn expand(&self, parent: &Node) -> Vec<Node> {
        let n_step = self.config.steps_per_edge();
        let arc = n_step as f64 * self.config.motion_resolution;
        let parent_pose = parent.pose();
        let mut out = Vec::new();

        for &steer in &self.steers {
            for dir in [Direction::Forward, Direction::Backward] {
                let d = dir.sign() * self.config.motion_resolution;

                let mut xs = Vec::with_capacity(n_step + 1);
                let mut ys = Vec::with_capacity(n_step + 1);
                let mut yaws = Vec::with_capacity(n_step + 1);
                let mut trailer_yaws = Vec::with_capacity(n_step + 1);
                xs.push(parent_pose.x);
                ys.push(parent_pose.y);
                yaws.push(parent_pose.yaw);
                trailer_yaws.push(parent_pose.trailer_yaw);

                let mut pose = parent_pose;
                let mut feasible = true;
                for _ in 0..n_step {
                    pose = kinematics::step(&pose, d, steer, &self.config.vehicle);
                    if !self.grid.in_bounds(pose.x, pose.y)
                        || !vehicle::check_pose(self.obstacles, &self.config.vehicle, &pose)
                    {
                        feasible = false;
                        break;
                    }
                    xs.push(pose.x);
                    ys.push(pose.y);
                    yaws.push(pose.yaw);
                    trailer_yaws.push(pose.trailer_yaw);
                }
                if !feasible {
                    continue;
                }

                let key = NodeKey::from_pose(&pose, self.config);
                if key == parent.key {
                    continue; // quantization self-loop
                }

                let mut cost = arc;
                if dir == Direction::Backward {
                    cost += self.config.back_cost * arc;
                }
                if dir != parent.arrival_direction() {
                    cost += self.config.switch_back_cost;
                }
                cost += self.config.steer_change_cost * (steer - parent.steer).abs();
                cost += self.config.steer_cost * steer.abs();
                cost += self.config.jackknife_cost * pose.jackknife_angle().abs();

                out.push(Node {
                    key,
                    xs,
                    ys,
                    yaws,
                    trailer_yaws,
                    directions: vec![dir; n_step + 1],
                    steer,
                    g: parent.g + cost,
                    parent: Some(parent.key),
                });
            }
        }
        out
    }

    /// Try to close the remaining gap with a Reeds-Shepp curve: shortest
    /// candidate first, trailer dragged along the fixed tractor samples,
    /// accepted only when the trailer lands inside the goal tolerance and
    /// every pose checks out.
    fn analytic_expansion(&mut self, node: &Node) -> Option<SampledEdge> {
        let pose = node.pose();
        let from = (pose.x, pose.y, pose.yaw);
        let to = (self.goal.x, self.goal.y, self.goal.yaw);

        for rs_path in reeds_shepp::all_paths(from, to, self.max_curvature) {
            let samples =
                reeds_shepp::sample(&rs_path, from, self.max_curvature, self.config.motion_resolution);
            if samples.len() < 2 {
                self.stats.analytic_rejects += 1;
                continue;
            }

            let mut trailer_yaws = Vec::with_capacity(samples.len());
            trailer_yaws.push(pose.trailer_yaw);
            for i in 1..samples.len() {
                trailer_yaws.push(kinematics::propagate_trailer(
                    trailer_yaws[i - 1],
                    samples.yaws[i - 1],
                    samples.deltas[i],
                    &self.config.vehicle,
                ));
            }

            let terminal_err =
                angle::diff(trailer_yaws[samples.len() - 1], self.goal.trailer_yaw).abs();
            if terminal_err > self.config.goal_trailer_yaw_tol {
                self.stats.analytic_rejects += 1;
                continue;
            }

            let mut feasible = true;
            for i in 1..samples.len() {
                let p = Pose {
                    x: samples.xs[i],
                    y: samples.ys[i],
                    yaw: samples.yaws[i],
                    trailer_yaw: trailer_yaws[i],
                };
                if !vehicle::check_pose(self.obstacles, &self.config.vehicle, &p) {
                    feasible = false;
                    break;
                }
            }
            if !feasible {
                self.stats.analytic_rejects += 1;
                continue;
            }

            return Some(SampledEdge {
                xs: samples.xs,
                ys: samples.ys,
                yaws: samples.yaws,
                trailer_yaws,
                directions: samples.directions,
            });
        }
        None
    }
}

/// Back-trace the parent chain out of the closed set and stitch the full
/// trajectory.
fn finish(
    closed: &FxHashMap<NodeKey, Node>,
    terminal: NodeKey,
    tail: &SampledEdge,
    stats: PlanStats,
) -> Result<TrailerPath, PlanError> {
    let mut chain: Vec<&Node> = Vec::new();
    let mut current = closed
        .get(&terminal)
        .ok_or(PlanError::InternalInvariant("terminal node not in closed set"))?;
    loop {
        chain.push(current);
        match current.parent {
            Some(parent_key) => {
                current = closed
                    .get(&parent_key)
                    .ok_or(PlanError::InternalInvariant("parent missing from closed set"))?;
            }
            None => break,
        }
    }
    chain.reverse();
    path::stitch(&chain, tail, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steer_candidates_include_limits_and_zero() {
        let cfg = PlannerConfig::default();
        let steers = steer_candidates(&cfg);
        assert_eq!(steers.len(), cfg.n_steer);
        assert!((steers[0] + cfg.vehicle.max_steer).abs() < 1e-12);
        assert!((steers[steers.len() - 1] - cfg.vehicle.max_steer).abs() < 1e-12);
        assert!(steers.iter().any(|&s| s == 0.0));
    }

    #[test]
    fn test_heap_orders_by_f_then_h() {
        let key = |i| NodeKey {
            ix: i,
            iy: 0,
            iyaw: 0,
            itrailer_yaw: 0,
        };
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry { f: 2.0, h: 1.0, g: 1.0, key: key(0) });
        heap.push(HeapEntry { f: 1.0, h: 0.9, g: 0.1, key: key(1) });
        heap.push(HeapEntry { f: 1.0, h: 0.2, g: 0.8, key: key(2) });
        assert_eq!(heap.pop().unwrap().key, key(2)); // equal f, smaller h first
        assert_eq!(heap.pop().unwrap().key, key(1));
        assert_eq!(heap.pop().unwrap().key, key(0));
    }

    #[test]
    fn test_expander_is_deterministic() {
        let cfg = PlannerConfig::default();
        let obstacles = ObstacleIndex::build(&[], &[]).unwrap();
        let grid = HolonomicCostGrid::build(&obstacles, (0.0, 0.0), (20.0, 0.0), &cfg).unwrap();
        let search = Search {
            obstacles: &obstacles,
            grid,
            goal: Pose::new(20.0, 0.0, 0.0, 0.0),
            config: &cfg,
            steers: steer_candidates(&cfg),
            max_curvature: cfg.vehicle.max_curvature(),
            stats: PlanStats::default(),
        };
        let root = Node::root(&Pose::new(0.0, 0.0, 0.0, 0.0), &cfg);
        let a = search.expand(&root);
        let b = search.expand(&root);
        assert!(!a.is_empty());
        assert_eq!(a.len(), b.len());
        for (s, t) in a.iter().zip(b.iter()) {
            assert_eq!(s.key, t.key);
            assert_eq!(s.g, t.g);
        }
    }

    #[test]
    fn test_expander_samples_carry_edge_invariant() {
        let cfg = PlannerConfig::default();
        let obstacles = ObstacleIndex::build(&[], &[]).unwrap();
        let grid = HolonomicCostGrid::build(&obstacles, (0.0, 0.0), (20.0, 0.0), &cfg).unwrap();
        let search = Search {
            obstacles: &obstacles,
            grid,
            goal: Pose::new(20.0, 0.0, 0.0, 0.0),
            config: &cfg,
            steers: steer_candidates(&cfg),
            max_curvature: cfg.vehicle.max_curvature(),
            stats: PlanStats::default(),
        };
        let root = Node::root(&Pose::new(0.0, 0.0, 0.0, 0.0), &cfg);
        for succ in search.expand(&root) {
            assert_eq!(succ.xs.len(), cfg.steps_per_edge() + 1);
            let pose = succ.pose();
            assert_eq!(pose.x, *succ.xs.last().unwrap());
            assert_ne!(succ.key, root.key);
            // micro-step spacing bounded by the motion resolution
            for i in 1..succ.xs.len() {
                let chord =
                    (succ.xs[i] - succ.xs[i - 1]).hypot(succ.ys[i] - succ.ys[i - 1]);
                assert!(chord <= cfg.motion_resolution + 1e-9);
            }
        }
    }
}
