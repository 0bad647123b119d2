//! Reeds-Shepp analytic paths
//!
//! Enumerates the shortest bounded-curvature paths between two tractor
//! poses, forward and reverse motion allowed, obstacles ignored. The
//! planner consumes this twice: the shortest length is an admissible
//! heuristic, and the sampled curves are candidate goal connections.
//!
//! All word families are generated in a curvature-normalized frame
//! (turning radius 1) and carried as signed segment lengths; negative
//! length means the segment is driven in reverse. Time-flip and reflect
//! symmetries reduce the 48-word catalog to a handful of base solvers.

use std::f64::consts::PI;

use crate::angle;
use crate::kinematics::Direction;

/// Primitive motion of one path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsSegment {
    Left,
    Straight,
    Right,
}

/// One analytic path: parallel arrays of segment kinds and signed
/// curvature-normalized lengths, plus the metric total length.
#[derive(Debug, Clone)]
pub struct RsPath {
    pub kinds: Vec<RsSegment>,
    pub lengths: Vec<f64>,
    pub total: f64,
}

/// Dense samples of one path, ready for collision checking and trailer
/// propagation. `deltas[i]` is the signed metric arc length of the step
/// arriving at sample `i` (zero for the first sample).
#[derive(Debug, Clone)]
pub struct RsSamples {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub yaws: Vec<f64>,
    pub directions: Vec<Direction>,
    pub deltas: Vec<f64>,
}

impl RsSamples {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Enumerate all analytic path families from `from` to `to`, sorted by
/// ascending metric length. May be empty only for (near-)coincident poses.
pub fn all_paths(from: (f64, f64, f64), to: (f64, f64, f64), max_curvature: f64) -> Vec<RsPath> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let (sin, cos) = from.2.sin_cos();
    let x = (cos * dx + sin * dy) * max_curvature;
    let y = (-sin * dx + cos * dy) * max_curvature;
    let phi = angle::diff(to.2, from.2);

    // coincident poses: every word degenerates to a full turn; report no
    // paths instead so the heuristic reads zero remaining cost
    if x.abs() < 1e-12 && y.abs() < 1e-12 && phi.abs() < 1e-12 {
        return Vec::new();
    }

    let mut paths = Vec::new();
    scs(x, y, phi, max_curvature, &mut paths);
    csc(x, y, phi, max_curvature, &mut paths);
    ccc(x, y, phi, max_curvature, &mut paths);
    cccc(x, y, phi, max_curvature, &mut paths);
    ccsc(x, y, phi, max_curvature, &mut paths);
    ccscc(x, y, phi, max_curvature, &mut paths);

    paths.sort_by(|a, b| a.total.partial_cmp(&b.total).unwrap_or(std::cmp::Ordering::Equal));
    paths
}

/// Metric length of the shortest analytic path. Falls back to the straight
/// line distance when enumeration degenerates (coincident poses).
pub fn shortest_length(from: (f64, f64, f64), to: (f64, f64, f64), max_curvature: f64) -> f64 {
    all_paths(from, to, max_curvature)
        .first()
        .map(|p| p.total)
        .unwrap_or_else(|| (to.0 - from.0).hypot(to.1 - from.1))
}

/// Sample a path at a fixed metric arc step, starting at `from`. Each
/// segment contributes its exact endpoint, so the final sample lands on
/// the analytic target pose.
pub fn sample(path: &RsPath, from: (f64, f64, f64), max_curvature: f64, step: f64) -> RsSamples {
    let first_dir = path
        .lengths
        .iter()
        .find(|l| l.abs() > 1e-12)
        .map(|&l| if l > 0.0 { Direction::Forward } else { Direction::Backward })
        .unwrap_or(Direction::Forward);

    let mut out = RsSamples {
        xs: vec![from.0],
        ys: vec![from.1],
        yaws: vec![angle::normalize(from.2)],
        directions: vec![first_dir],
        deltas: vec![0.0],
    };

    let mut ox = from.0;
    let mut oy = from.1;
    let mut oyaw = from.2;

    for (&kind, &l) in path.kinds.iter().zip(path.lengths.iter()) {
        if l.abs() < 1e-12 {
            continue;
        }
        let dir = if l > 0.0 { Direction::Forward } else { Direction::Backward };
        let d = step * max_curvature * l.signum();

        let mut s = d;
        let mut prev = 0.0;
        while s.abs() < l.abs() - 1e-9 {
            push_sample(&mut out, interpolate(s, kind, max_curvature, ox, oy, oyaw), dir, (s - prev) / max_curvature);
            prev = s;
            s += d;
        }
        let end = interpolate(l, kind, max_curvature, ox, oy, oyaw);
        push_sample(&mut out, end, dir, (l - prev) / max_curvature);
        ox = end.0;
        oy = end.1;
        oyaw = end.2;
    }

    out
}

fn push_sample(out: &mut RsSamples, point: (f64, f64, f64), dir: Direction, delta: f64) {
    out.xs.push(point.0);
    out.ys.push(point.1);
    out.yaws.push(point.2);
    out.directions.push(dir);
    out.deltas.push(delta);
}

/// Position and heading after driving a signed normalized arc `s` of the
/// given segment kind from `(ox, oy, oyaw)`.
fn interpolate(s: f64, kind: RsSegment, max_curvature: f64, ox: f64, oy: f64, oyaw: f64) -> (f64, f64, f64) {
    match kind {
        RsSegment::Straight => (
            ox + s / max_curvature * oyaw.cos(),
            oy + s / max_curvature * oyaw.sin(),
            angle::normalize(oyaw),
        ),
        RsSegment::Left | RsSegment::Right => {
            let ldx = s.sin() / max_curvature;
            let ldy = match kind {
                RsSegment::Left => (1.0 - s.cos()) / max_curvature,
                _ => -(1.0 - s.cos()) / max_curvature,
            };
            let (sin, cos) = oyaw.sin_cos();
            let yaw = match kind {
                RsSegment::Left => oyaw + s,
                _ => oyaw - s,
            };
            (ox + cos * ldx - sin * ldy, oy + sin * ldx + cos * ldy, angle::normalize(yaw))
        }
    }
}

fn polar(x: f64, y: f64) -> (f64, f64) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

/// Append a candidate word unless it is degenerate or a duplicate of an
/// already collected one.
fn add_path(paths: &mut Vec<RsPath>, lengths: &[f64], kinds: &[RsSegment], max_curvature: f64) {
    let total_norm: f64 = lengths.iter().map(|l| l.abs()).sum();
    if total_norm < 1e-9 {
        return;
    }
    for p in paths.iter() {
        if p.kinds == kinds {
            let diff: f64 = p
                .lengths
                .iter()
                .zip(lengths.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            if diff < 1e-6 {
                return;
            }
        }
    }
    paths.push(RsPath {
        kinds: kinds.to_vec(),
        lengths: lengths.to_vec(),
        total: total_norm / max_curvature,
    });
}

// Base solvers. Each returns the segment parameters (t, u, v) in the
// curvature-normalized frame, or None when the family does not reach the
// target configuration.

fn sls(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let phi = angle::normalize(phi);
    if phi > 0.0 && phi < PI * 0.99 && y != 0.0 {
        let xd = -y / phi.tan() + x;
        let t = xd - (phi / 2.0).tan();
        let u = phi;
        let r = ((x - xd) * (x - xd) + y * y).sqrt();
        let v = if y > 0.0 { r - (phi / 2.0).tan() } else { -r - (phi / 2.0).tan() };
        return Some((t, u, v));
    }
    None
}

fn lsl(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u, t) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if t >= 0.0 {
        let v = angle::normalize(phi - t);
        if v >= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

fn lsr(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, t1) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u1 = u1 * u1;
    if u1 >= 4.0 {
        let u = (u1 - 4.0).sqrt();
        let theta = 2.0_f64.atan2(u);
        let t = angle::normalize(t1 + theta);
        let v = angle::normalize(t - phi);
        if t >= 0.0 && v >= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

fn lrl(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, t1) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 <= 4.0 {
        let u = -2.0 * (0.25 * u1).asin();
        let t = angle::normalize(t1 + 0.5 * u + PI);
        let v = angle::normalize(phi - t + u);
        if t >= 0.0 && u <= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

/// Shared tail of the CCCC solvers.
fn tau_omega(u: f64, v: f64, xi: f64, eta: f64, phi: f64) -> (f64, f64) {
    let delta = angle::normalize(u - v);
    let a = u.sin() - delta.sin();
    let b = u.cos() - delta.cos() - 1.0;
    let t1 = (eta * a - xi * b).atan2(xi * a + eta * b);
    let t2 = 2.0 * (delta.cos() - v.cos() - u.cos()) + 3.0;
    let tau = if t2 < 0.0 { angle::normalize(t1 + PI) } else { angle::normalize(t1) };
    (tau, angle::normalize(tau - u + v - phi))
}

fn lrlrn(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = 0.25 * (2.0 + (xi * xi + eta * eta).sqrt());
    if rho <= 1.0 {
        let u = rho.acos();
        let (t, v) = tau_omega(u, -u, xi, eta, phi);
        if t >= 0.0 && v <= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

fn lrlrp(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = (20.0 - xi * xi - eta * eta) / 16.0;
    if (0.0..=1.0).contains(&rho) {
        let u = -rho.acos();
        if u >= -0.5 * PI {
            let (t, v) = tau_omega(u, u, xi, eta, phi);
            if t >= 0.0 && v >= 0.0 {
                return Some((t, u, v));
            }
        }
    }
    None
}

fn lrsl(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (rho, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if rho >= 2.0 {
        let r = (rho * rho - 4.0).sqrt();
        let u = 2.0 - r;
        let t = angle::normalize(theta + r.atan2(-2.0));
        let v = angle::normalize(phi - 0.5 * PI - t);
        if t >= 0.0 && u <= 0.0 && v <= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

fn lrsr(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, theta) = polar(-eta, xi);
    if rho >= 2.0 {
        let t = theta;
        let u = 2.0 - rho;
        let v = angle::normalize(t + 0.5 * PI - phi);
        if t >= 0.0 && u <= 0.0 && v <= 0.0 {
            return Some((t, u, v));
        }
    }
    None
}

fn lrslr(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, _) = polar(xi, eta);
    if rho >= 2.0 {
        let u = 4.0 - (rho * rho - 4.0).sqrt();
        if u <= 0.0 {
            let t = angle::normalize(((4.0 - u) * xi - 2.0 * eta).atan2(-2.0 * xi + (4.0 - u) * eta));
            let v = angle::normalize(t - phi);
            if t >= 0.0 && v >= 0.0 {
                return Some((t, u, v));
            }
        }
    }
    None
}

// Family assemblers: base solver applied under the time-flip
// (x, y, phi) -> (-x, y, -phi), reflect (x, -y, -phi), and
// run-backwards transforms, with segment kinds and length signs adjusted
// accordingly.

use RsSegment::{Left as L, Right as R, Straight as S};

fn scs(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    if let Some((t, u, v)) = sls(x, y, phi) {
        add_path(paths, &[t, u, v], &[S, L, S], maxc);
    }
    if let Some((t, u, v)) = sls(x, -y, -phi) {
        add_path(paths, &[t, u, v], &[S, R, S], maxc);
    }
}

fn csc(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    if let Some((t, u, v)) = lsl(x, y, phi) {
        add_path(paths, &[t, u, v], &[L, S, L], maxc);
    }
    if let Some((t, u, v)) = lsl(-x, y, -phi) {
        add_path(paths, &[-t, -u, -v], &[L, S, L], maxc);
    }
    if let Some((t, u, v)) = lsl(x, -y, -phi) {
        add_path(paths, &[t, u, v], &[R, S, R], maxc);
    }
    if let Some((t, u, v)) = lsl(-x, -y, phi) {
        add_path(paths, &[-t, -u, -v], &[R, S, R], maxc);
    }
    if let Some((t, u, v)) = lsr(x, y, phi) {
        add_path(paths, &[t, u, v], &[L, S, R], maxc);
    }
    if let Some((t, u, v)) = lsr(-x, y, -phi) {
        add_path(paths, &[-t, -u, -v], &[L, S, R], maxc);
    }
    if let Some((t, u, v)) = lsr(x, -y, -phi) {
        add_path(paths, &[t, u, v], &[R, S, L], maxc);
    }
    if let Some((t, u, v)) = lsr(-x, -y, phi) {
        add_path(paths, &[-t, -u, -v], &[R, S, L], maxc);
    }
}

fn ccc(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    if let Some((t, u, v)) = lrl(x, y, phi) {
        add_path(paths, &[t, u, v], &[L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrl(-x, y, -phi) {
        add_path(paths, &[-t, -u, -v], &[L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrl(x, -y, -phi) {
        add_path(paths, &[t, u, v], &[R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrl(-x, -y, phi) {
        add_path(paths, &[-t, -u, -v], &[R, L, R], maxc);
    }

    // run backwards: solve the reversed displacement, emit lengths reversed
    let xb = x * phi.cos() + y * phi.sin();
    let yb = x * phi.sin() - y * phi.cos();
    if let Some((t, u, v)) = lrl(xb, yb, phi) {
        add_path(paths, &[v, u, t], &[L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrl(-xb, yb, -phi) {
        add_path(paths, &[-v, -u, -t], &[L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrl(xb, -yb, -phi) {
        add_path(paths, &[v, u, t], &[R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrl(-xb, -yb, phi) {
        add_path(paths, &[-v, -u, -t], &[R, L, R], maxc);
    }
}

fn cccc(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    if let Some((t, u, v)) = lrlrn(x, y, phi) {
        add_path(paths, &[t, u, -u, v], &[L, R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrlrn(-x, y, -phi) {
        add_path(paths, &[-t, -u, u, -v], &[L, R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrlrn(x, -y, -phi) {
        add_path(paths, &[t, u, -u, v], &[R, L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrlrn(-x, -y, phi) {
        add_path(paths, &[-t, -u, u, -v], &[R, L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrlrp(x, y, phi) {
        add_path(paths, &[t, u, u, v], &[L, R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrlrp(-x, y, -phi) {
        add_path(paths, &[-t, -u, -u, -v], &[L, R, L, R], maxc);
    }
    if let Some((t, u, v)) = lrlrp(x, -y, -phi) {
        add_path(paths, &[t, u, u, v], &[R, L, R, L], maxc);
    }
    if let Some((t, u, v)) = lrlrp(-x, -y, phi) {
        add_path(paths, &[-t, -u, -u, -v], &[R, L, R, L], maxc);
    }
}

fn ccsc(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    let half_pi = 0.5 * PI;
    if let Some((t, u, v)) = lrsl(x, y, phi) {
        add_path(paths, &[t, -half_pi, u, v], &[L, R, S, L], maxc);
    }
    if let Some((t, u, v)) = lrsl(-x, y, -phi) {
        add_path(paths, &[-t, half_pi, -u, -v], &[L, R, S, L], maxc);
    }
    if let Some((t, u, v)) = lrsl(x, -y, -phi) {
        add_path(paths, &[t, -half_pi, u, v], &[R, L, S, R], maxc);
    }
    if let Some((t, u, v)) = lrsl(-x, -y, phi) {
        add_path(paths, &[-t, half_pi, -u, -v], &[R, L, S, R], maxc);
    }
    if let Some((t, u, v)) = lrsr(x, y, phi) {
        add_path(paths, &[t, -half_pi, u, v], &[L, R, S, R], maxc);
    }
    if let Some((t, u, v)) = lrsr(-x, y, -phi) {
        add_path(paths, &[-t, half_pi, -u, -v], &[L, R, S, R], maxc);
    }
    if let Some((t, u, v)) = lrsr(x, -y, -phi) {
        add_path(paths, &[t, -half_pi, u, v], &[R, L, S, L], maxc);
    }
    if let Some((t, u, v)) = lrsr(-x, -y, phi) {
        add_path(paths, &[-t, half_pi, -u, -v], &[R, L, S, L], maxc);
    }

    // run backwards
    let xb = x * phi.cos() + y * phi.sin();
    let yb = x * phi.sin() - y * phi.cos();
    if let Some((t, u, v)) = lrsl(xb, yb, phi) {
        add_path(paths, &[v, u, -half_pi, t], &[L, S, R, L], maxc);
    }
    if let Some((t, u, v)) = lrsl(-xb, yb, -phi) {
        add_path(paths, &[-v, -u, half_pi, -t], &[L, S, R, L], maxc);
    }
    if let Some((t, u, v)) = lrsl(xb, -yb, -phi) {
        add_path(paths, &[v, u, -half_pi, t], &[R, S, L, R], maxc);
    }
    if let Some((t, u, v)) = lrsl(-xb, -yb, phi) {
        add_path(paths, &[-v, -u, half_pi, -t], &[R, S, L, R], maxc);
    }
    if let Some((t, u, v)) = lrsr(xb, yb, phi) {
        add_path(paths, &[v, u, -half_pi, t], &[R, S, R, L], maxc);
    }
    if let Some((t, u, v)) = lrsr(-xb, yb, -phi) {
        add_path(paths, &[-v, -u, half_pi, -t], &[R, S, R, L], maxc);
    }
    if let Some((t, u, v)) = lrsr(xb, -yb, -phi) {
        add_path(paths, &[v, u, -half_pi, t], &[L, S, L, R], maxc);
    }
    if let Some((t, u, v)) = lrsr(-xb, -yb, phi) {
        add_path(paths, &[-v, -u, half_pi, -t], &[L, S, L, R], maxc);
    }
}

fn ccscc(x: f64, y: f64, phi: f64, maxc: f64, paths: &mut Vec<RsPath>) {
    let half_pi = 0.5 * PI;
    if let Some((t, u, v)) = lrslr(x, y, phi) {
        add_path(paths, &[t, -half_pi, u, -half_pi, v], &[L, R, S, L, R], maxc);
    }
    if let Some((t, u, v)) = lrslr(-x, y, -phi) {
        add_path(paths, &[-t, half_pi, -u, half_pi, -v], &[L, R, S, L, R], maxc);
    }
    if let Some((t, u, v)) = lrslr(x, -y, -phi) {
        add_path(paths, &[t, -half_pi, u, -half_pi, v], &[R, L, S, R, L], maxc);
    }
    if let Some((t, u, v)) = lrslr(-x, -y, phi) {
        add_path(paths, &[-t, half_pi, -u, half_pi, -v], &[R, L, S, R, L], maxc);
    }
}
