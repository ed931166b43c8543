//! Warm-start combiner.
//!
//! A partial solution from a faster strategy is replayed into a fresh grid.
//! Each warm placement must fit (in bounds, no collision with earlier accepted
//! ones) and must match a requested instance that is still unplaced: the
//! first such instance in order whose allowed orientations include the
//! placement's box. Anything else is dropped. The greedy heuristic then runs
//! over the instances left unclaimed, on the partially filled grid.
//!
//! The output starts with the accepted warm placements, so it is never shorter
//! than the accepted warm start.

use crate::boundary::Container;
use crate::geometry::BlockInstance;
use crate::greedy::{run_greedy_on_grid, GreedyConfig};
use crate::occupancy::OccupancyGrid;
use u_cubepack_core::geometry::Dims;
use u_cubepack_core::Placement;

/// Output of a combine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HybridOutcome {
    /// Accepted warm placements followed by greedy placements.
    pub placements: Vec<Placement>,
    /// Warm placements accepted.
    pub warm_accepted: usize,
    /// Warm placements out of bounds or colliding.
    pub warm_rejected: usize,
    /// Warm placements that fit but matched no unplaced instance.
    pub warm_unmatched: usize,
    /// Placements added by the greedy pass.
    pub greedy_added: usize,
    /// Indices (into the instance list) left unplaced.
    pub unplaced: Vec<usize>,
}

/// Finds the first unclaimed instance that can take the given box.
///
/// Returns the instance index and the orientation index of `dims` in that
/// instance's orientation list.
pub fn claim_instance(
    instances: &[BlockInstance],
    claimed: &[bool],
    dims: Dims,
    allow_rotation: bool,
) -> Option<(usize, usize)> {
    instances
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed[*i])
        .find_map(|(i, inst)| {
            inst.orientations(allow_rotation)
                .iter()
                .position(|&o| o == dims)
                .map(|o| (i, o))
        })
}

/// Catalog placements mapped onto requested instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Placements that claimed an instance, relabelled with its id and index.
    pub placements: Vec<Placement>,
    /// Placements that matched no unclaimed instance.
    pub unmatched: usize,
    /// Indices (into the instance list) left unclaimed.
    pub unplaced: Vec<usize>,
}

/// Maps catalog placements onto requested instances, in placement order.
///
/// Each placement claims the first unclaimed instance that can take its box
/// and is relabelled as that instance. Placements beyond the request are
/// dropped, so the output never holds more boxes than instances.
pub fn assign_instances(
    instances: &[BlockInstance],
    placements: &[Placement],
    allow_rotation: bool,
) -> Assignment {
    let mut claimed = vec![false; instances.len()];
    let mut assignment = Assignment::default();
    for p in placements {
        let Some((i, orientation_index)) =
            claim_instance(instances, &claimed, p.dims, allow_rotation)
        else {
            assignment.unmatched += 1;
            continue;
        };
        claimed[i] = true;
        assignment.placements.push(Placement::new(
            instances[i].block_id.clone(),
            instances[i].instance,
            p.origin,
            p.dims,
            orientation_index,
        ));
    }
    assignment.unplaced = (0..instances.len()).filter(|&i| !claimed[i]).collect();
    assignment
}

/// Replays `warm` into a fresh grid and fills the rest greedily.
pub fn combine(
    container: &Container,
    instances: &[BlockInstance],
    warm: &[Placement],
    config: &GreedyConfig,
) -> HybridOutcome {
    let mut grid = OccupancyGrid::new(container);
    let mut claimed = vec![false; instances.len()];
    let mut outcome = HybridOutcome::default();

    for p in warm {
        if !grid.fits(p.origin, p.dims) {
            outcome.warm_rejected += 1;
            continue;
        }
        let Some((i, orientation_index)) =
            claim_instance(instances, &claimed, p.dims, config.allow_rotation)
        else {
            outcome.warm_unmatched += 1;
            continue;
        };
        grid.commit(p.origin, p.dims);
        claimed[i] = true;
        outcome.placements.push(Placement::new(
            instances[i].block_id.clone(),
            instances[i].instance,
            p.origin,
            p.dims,
            orientation_index,
        ));
    }
    outcome.warm_accepted = outcome.placements.len();

    if outcome.warm_rejected > 0 || outcome.warm_unmatched > 0 {
        log::warn!(
            "warm start: {} accepted, {} out of bounds or colliding, {} unmatched",
            outcome.warm_accepted,
            outcome.warm_rejected,
            outcome.warm_unmatched
        );
    }

    let remaining_index: Vec<usize> = (0..instances.len()).filter(|&i| !claimed[i]).collect();
    let remaining: Vec<BlockInstance> = remaining_index
        .iter()
        .map(|&i| instances[i].clone())
        .collect();

    let greedy = run_greedy_on_grid(&mut grid, &remaining, config);
    outcome.greedy_added = greedy.placements.len();
    outcome.placements.extend(greedy.placements);
    outcome.unplaced = greedy.unplaced.iter().map(|&k| remaining_index[k]).collect();

    log::debug!(
        "hybrid: {} warm + {} greedy placements, {} instances unplaced",
        outcome.warm_accepted,
        outcome.greedy_added,
        outcome.unplaced.len()
    );
    outcome
}
