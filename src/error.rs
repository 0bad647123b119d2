//! Error types for planning operations
//!
//! Typed errors (`thiserror`) at the library surface; callers that want
//! context chains can wrap these in `anyhow` at the application boundary.

use thiserror::Error;

/// Main error type for plan invocations.
///
/// The first five variants are user-facing outcomes: the request itself was
/// malformed or no trajectory exists under the given budget. The last one
/// signals a broken internal contract and is a bug in the planner, never a
/// property of the input.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Obstacle arrays of different lengths, or a non-finite coordinate
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Start pose collides with an obstacle or exceeds the jackknife limit
    #[error("start pose is in collision or jackknifed")]
    InvalidStart,

    /// Goal pose collides with an obstacle or exceeds the jackknife limit
    #[error("goal pose is in collision or jackknifed")]
    InvalidGoal,

    /// Goal cell is occupied, or the start is cut off from the goal in the
    /// holonomic cost-to-go grid
    #[error("goal is unreachable in the holonomic heuristic grid")]
    HeuristicUnreachable,

    /// Open set emptied without reaching the goal
    #[error("search exhausted without finding a path")]
    SearchExhausted,

    /// Node-expansion budget reached before a path was found
    #[error("expansion budget exceeded after {expansions} expansions")]
    BudgetExceeded { expansions: usize },

    /// Detected contract violation; aborts the plan call
    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}
