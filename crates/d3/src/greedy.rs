//! First-fit greedy placement with rotation search.
//!
//! Block instances are processed in the order given. For each instance the
//! orientations are tried in enumeration order, and for each orientation the
//! origins are scanned with x slowest and z fastest. The first fitting
//! `(orientation, origin)` pair is committed. Orientation is the outer loop, so
//! an earlier orientation that fits anywhere beats a later one that would fit
//! closer to the origin.
//!
//! When an instance fits nowhere the [`FailurePolicy`] decides what happens:
//! [`FailurePolicy::StopOnFirstFailure`] (the default) gives up on every later
//! instance, [`FailurePolicy::SkipAndContinue`] moves on to the next one.

use crate::boundary::Container;
use crate::geometry::BlockInstance;
use crate::occupancy::OccupancyGrid;
use u_cubepack_core::solver::FailurePolicy;
use u_cubepack_core::Placement;

/// Greedy scan options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyConfig {
    /// Behaviour on the first instance that fits nowhere.
    pub failure_policy: FailurePolicy,
    /// Whether rotated orientations are tried.
    pub allow_rotation: bool,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::StopOnFirstFailure,
            allow_rotation: true,
        }
    }
}

impl GreedyConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enables or disables rotation.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }
}

/// Output of a greedy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GreedyOutcome {
    /// Committed placements, in commit order.
    pub placements: Vec<Placement>,
    /// Indices (into the input slice) of placed instances.
    pub placed: Vec<usize>,
    /// Indices of instances left out, including those never attempted.
    pub unplaced: Vec<usize>,
    /// Index of the first instance that fit nowhere.
    pub first_failure: Option<usize>,
}

/// Finds the first fitting orientation and origin for one instance.
fn place_one(
    grid: &OccupancyGrid,
    instance: &BlockInstance,
    allow_rotation: bool,
) -> Option<(usize, [u32; 3], [u32; 3])> {
    instance
        .orientations(allow_rotation)
        .into_iter()
        .enumerate()
        .find_map(|(idx, dims)| grid.first_fit(dims).map(|origin| (idx, origin, dims)))
}

/// Runs the greedy heuristic on an empty grid.
pub fn run_greedy(
    container: &Container,
    instances: &[BlockInstance],
    config: &GreedyConfig,
) -> GreedyOutcome {
    let mut grid = OccupancyGrid::new(container);
    run_greedy_on_grid(&mut grid, instances, config)
}

/// Runs the greedy heuristic on a grid that may already hold placements.
pub fn run_greedy_on_grid(
    grid: &mut OccupancyGrid,
    instances: &[BlockInstance],
    config: &GreedyConfig,
) -> GreedyOutcome {
    let mut outcome = GreedyOutcome::default();

    for (i, instance) in instances.iter().enumerate() {
        match place_one(grid, instance, config.allow_rotation) {
            Some((orientation_index, origin, dims)) => {
                grid.commit(origin, dims);
                outcome.placements.push(Placement::new(
                    instance.block_id.clone(),
                    instance.instance,
                    origin,
                    dims,
                    orientation_index,
                ));
                outcome.placed.push(i);
            }
            None => {
                outcome.first_failure.get_or_insert(i);
                match config.failure_policy {
                    FailurePolicy::StopOnFirstFailure => {
                        log::debug!(
                            "greedy stopped at instance {} of '{}': {} instances not attempted",
                            i,
                            instance.block_id,
                            instances.len() - i - 1
                        );
                        outcome.unplaced.extend(i..instances.len());
                        break;
                    }
                    FailurePolicy::SkipAndContinue => outcome.unplaced.push(i),
                }
            }
        }
    }

    outcome
}
