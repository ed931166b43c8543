//! Exact 0/1 placement model.
//!
//! Every in-bounds `(origin, orientation)` pair over the catalog is a binary
//! candidate. The model maximizes the selected weight (count or volume) subject
//! to each unit cell being covered by at most one selected candidate. The
//! per-cell form keeps the constraint count at the container volume instead of
//! growing with the square of the candidate count.
//!
//! Two backends solve the same model:
//!
//! - [`ExactBackend::BranchAndBound`]: depth-first search over cells in scan
//!   order. At the first undecided cell it either places a candidate anchored
//!   there or leaves the cell empty. Once every earlier cell is decided, no
//!   other candidate can cover the cell, so this enumeration is complete.
//! - [`ExactBackend::Milp`]: HiGHS through `good_lp` (requires the `milp`
//!   feature).
//!
//! Both honour the time limit and the relative gap. A run that hits the time
//! limit reports [`SolutionStatus::Timeout`](u_cubepack_core::SolutionStatus),
//! and [`ExactResult::has_solution`] tells an incumbent apart from none at all.
//!
//! # Example
//!
//! ```
//! use u_cubepack_core::exact::ExactConfig;
//! use u_cubepack_d3::exact_solver::solve_exact;
//! use u_cubepack_d3::orientation::catalog_from_dims;
//! use u_cubepack_d3::Container;
//!
//! let container = Container::new(3, 4, 5).unwrap();
//! let catalog = catalog_from_dims(&[[1, 1, 2], [2, 1, 1], [1, 2, 1]]);
//! let solution = solve_exact(&container, &catalog, &ExactConfig::default()).unwrap();
//! assert_eq!(solution.placements.len(), 30);
//! ```

use crate::boundary::Container;
use crate::occupancy::{audit, OccupancyGrid};
use crate::orientation::CatalogEntry;
use std::time::{Duration, Instant};
use u_cubepack_core::exact::{ExactBackend, ExactConfig, ExactObjective, ExactResult};
use u_cubepack_core::geometry::{Boundary, Dims};
use u_cubepack_core::{Error, Placement, Result};

#[cfg(feature = "milp")]
use good_lp::{
    constraint, solvers::highs::highs, variable, Expression, ProblemVariables, Solution,
    SolverModel, Variable,
};

/// Nodes between deadline checks in the branch-and-bound search.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// One binary variable of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Box origin.
    pub origin: Dims,
    /// Index into the catalog.
    pub orientation: usize,
    /// Objective coefficient.
    pub weight: f64,
}

/// The candidate list of an exact model plus the lookup tables its backends need.
#[derive(Debug, Clone)]
pub struct ExactModel<'a> {
    container: Container,
    catalog: &'a [CatalogEntry],
    objective: ExactObjective,
    candidates: Vec<Candidate>,
    /// Candidates whose origin is the given cell: heaviest first, then smallest.
    anchored: Vec<Vec<usize>>,
    /// Best objective weight per covered cell among fitting orientations.
    cell_ratio: f64,
}

impl<'a> ExactModel<'a> {
    /// Enumerates every in-bounds candidate.
    ///
    /// Returns [`Error::ConfigError`] when the model would exceed
    /// `max_candidates` variables.
    pub fn build(
        container: &Container,
        catalog: &'a [CatalogEntry],
        objective: ExactObjective,
        max_candidates: usize,
    ) -> Result<Self> {
        let [w, d, h] = container.dimensions();
        let positions = |dims: Dims| -> u64 {
            if dims[0] > w || dims[1] > d || dims[2] > h {
                0
            } else {
                (w - dims[0] + 1) as u64 * (d - dims[1] + 1) as u64 * (h - dims[2] + 1) as u64
            }
        };
        let total: u64 = catalog.iter().map(|e| positions(e.dims)).sum();
        if total > max_candidates as u64 {
            return Err(Error::ConfigError(format!(
                "Exact model for container {:?} has {} candidates, limit is {}",
                container.dimensions(),
                total,
                max_candidates
            )));
        }

        let grid = OccupancyGrid::new(container);
        let mut candidates = Vec::with_capacity(total as usize);
        let mut anchored = vec![Vec::new(); container.cell_count()];
        for (orientation, entry) in catalog.iter().enumerate() {
            if positions(entry.dims) == 0 {
                continue;
            }
            let weight = objective.weight(entry.volume());
            for x in 0..=w - entry.dims[0] {
                for y in 0..=d - entry.dims[1] {
                    for z in 0..=h - entry.dims[2] {
                        anchored[grid.index(x, y, z)].push(candidates.len());
                        candidates.push(Candidate {
                            origin: [x, y, z],
                            orientation,
                            weight,
                        });
                    }
                }
            }
        }
        let size = |j: usize| catalog[candidates[j].orientation].volume();
        for list in &mut anchored {
            list.sort_by(|&a, &b| {
                candidates[b]
                    .weight
                    .total_cmp(&candidates[a].weight)
                    .then(size(a).cmp(&size(b)))
            });
        }
        let cell_ratio = catalog
            .iter()
            .filter(|e| positions(e.dims) > 0)
            .map(|e| objective.weight(e.volume()) / e.volume() as f64)
            .fold(0.0_f64, f64::max);

        log::debug!(
            "exact model: {} candidates over {} cells, {} orientations",
            candidates.len(),
            container.cell_count(),
            catalog.len()
        );

        Ok(Self {
            container: *container,
            catalog,
            objective,
            candidates,
            anchored,
            cell_ratio,
        })
    }

    /// Returns the candidates in enumeration order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns the number of candidates.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Returns the objective.
    pub fn objective(&self) -> ExactObjective {
        self.objective
    }

    /// Returns the oriented dimensions of a candidate.
    pub fn dims(&self, candidate: usize) -> Dims {
        self.catalog[self.candidates[candidate].orientation].dims
    }

    /// For every cell, the candidates covering it. One row per constraint.
    pub fn cell_cover(&self) -> Vec<Vec<usize>> {
        let grid = OccupancyGrid::new(&self.container);
        let mut cover = vec![Vec::new(); self.container.cell_count()];
        for (j, c) in self.candidates.iter().enumerate() {
            let dims = self.dims(j);
            for x in c.origin[0]..c.origin[0] + dims[0] {
                for y in c.origin[1]..c.origin[1] + dims[1] {
                    for z in c.origin[2]..c.origin[2] + dims[2] {
                        cover[grid.index(x, y, z)].push(j);
                    }
                }
            }
        }
        cover
    }

    /// Upper bound on the objective over `free_cells` empty cells.
    fn bound_for_free_cells(&self, free_cells: usize) -> f64 {
        // Both objectives have integral weights.
        (free_cells as f64 * self.cell_ratio + 1e-9).floor()
    }

    fn placements(&self, selected: &[usize]) -> Vec<Placement> {
        selected
            .iter()
            .enumerate()
            .map(|(seq, &j)| {
                let c = &self.candidates[j];
                let entry = &self.catalog[c.orientation];
                Placement::new(entry.block_id.clone(), seq, c.origin, entry.dims, c.orientation)
            })
            .collect()
    }

    #[cfg(feature = "milp")]
    fn weight_of(&self, selected: &[usize]) -> f64 {
        selected.iter().map(|&j| self.candidates[j].weight).sum()
    }
}

/// Placements selected by an exact backend, with the solver outcome.
#[derive(Debug, Clone)]
pub struct ExactSolution {
    /// Selected placements. Empty when [`ExactResult::has_solution`] is false.
    pub placements: Vec<Placement>,
    /// Status, objective, bound and statistics.
    pub result: ExactResult,
}

impl ExactSolution {
    /// A solution with no placements.
    pub fn empty(result: ExactResult) -> Self {
        Self {
            placements: Vec::new(),
            result,
        }
    }
}

/// Builds and solves the exact model with the configured backend.
pub fn solve_exact(
    container: &Container,
    catalog: &[CatalogEntry],
    config: &ExactConfig,
) -> Result<ExactSolution> {
    let start = Instant::now();
    config.validate()?;
    let model = ExactModel::build(container, catalog, config.objective, config.max_candidates)?;

    if model.candidate_count() == 0 {
        log::debug!("exact model has no candidates; empty solution is optimal");
        return Ok(ExactSolution::empty(ExactResult::optimal(0.0)));
    }

    let deadline = config
        .time_limit_secs()
        .map(|_| start + Duration::from_millis(config.time_limit_ms));

    let solution = match config.backend {
        ExactBackend::BranchAndBound => branch_and_bound(&model, config.gap_tolerance, deadline),
        ExactBackend::Milp => solve_milp(&model, config, start)?,
    };

    log::info!(
        "exact solve ({:?}): {} with {} placements in {} ms",
        config.backend,
        solution.result.status,
        solution.placements.len(),
        start.elapsed().as_millis()
    );
    Ok(solution)
}

/// Returns true if the HiGHS backend is compiled in.
pub fn is_milp_available() -> bool {
    cfg!(feature = "milp")
}

/// What a search frame has applied to the grid.
#[derive(Debug, Clone, Copy)]
enum Branch {
    Placed(usize),
    Blocked,
}

#[derive(Debug)]
struct Frame {
    cell: usize,
    next_option: usize,
    applied: Option<Branch>,
}

/// Depth-first branch-and-bound over cells.
///
/// The search is iterative so deep grids do not grow the call stack.
pub(crate) fn branch_and_bound(
    model: &ExactModel<'_>,
    gap_tolerance: f64,
    deadline: Option<Instant>,
) -> ExactSolution {
    let mut grid = OccupancyGrid::new(&model.container);
    let root_bound = model.bound_for_free_cells(grid.free_count());

    let mut chosen: Vec<usize> = Vec::new();
    let mut chosen_weight = 0.0;
    let mut best: Option<(Vec<usize>, f64)> = None;
    let mut stack: Vec<Frame> = Vec::new();
    let mut nodes: u64 = 0;
    let mut timed_out = false;
    let mut gap_pruned = false;

    // Each pass of the outer loop enters a node.
    'search: loop {
        if nodes % DEADLINE_CHECK_INTERVAL == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
            timed_out = true;
            break;
        }
        nodes += 1;

        let bound = chosen_weight + model.bound_for_free_cells(grid.free_count());
        let prune = match &best {
            Some((_, best_weight)) if bound <= *best_weight + 1e-9 => true,
            Some((_, best_weight)) if *best_weight >= bound * (1.0 - gap_tolerance) - 1e-9 => {
                gap_pruned = true;
                true
            }
            _ => false,
        };

        if !prune {
            let from = stack.last().map_or(0, |f| f.cell + 1);
            match grid.next_free_cell(from) {
                Some(cell) => stack.push(Frame {
                    cell,
                    next_option: 0,
                    applied: None,
                }),
                None => {
                    if best.as_ref().map_or(true, |(_, w)| chosen_weight > *w) {
                        best = Some((chosen.clone(), chosen_weight));
                    }
                }
            }
        }

        // Advance the deepest frame that still has an option; pop the rest.
        while let Some(frame) = stack.last_mut() {
            match frame.applied.take() {
                Some(Branch::Placed(j)) => {
                    grid.release(model.candidates[j].origin, model.dims(j));
                    chosen.pop();
                    chosen_weight -= model.candidates[j].weight;
                }
                Some(Branch::Blocked) => grid.unblock_cell(frame.cell),
                None => {}
            }

            let options = &model.anchored[frame.cell];
            while frame.next_option < options.len() {
                let j = options[frame.next_option];
                frame.next_option += 1;
                let origin = model.candidates[j].origin;
                let dims = model.dims(j);
                if grid.fits(origin, dims) {
                    grid.commit(origin, dims);
                    chosen.push(j);
                    chosen_weight += model.candidates[j].weight;
                    frame.applied = Some(Branch::Placed(j));
                    continue 'search;
                }
            }
            if frame.next_option == options.len() {
                frame.next_option += 1;
                grid.block_cell(frame.cell);
                frame.applied = Some(Branch::Blocked);
                continue 'search;
            }
            stack.pop();
        }
        break;
    }

    let candidates = model.candidate_count();
    let result = match (&best, timed_out) {
        (Some((_, weight)), true) => ExactResult::timeout(Some(*weight), root_bound),
        (None, true) => ExactResult::timeout(None, root_bound),
        (Some((_, weight)), false) if gap_pruned && gap_tolerance > 0.0 => {
            let bound = (*weight / (1.0 - gap_tolerance)).min(root_bound);
            ExactResult::optimal_within_gap(*weight, bound)
        }
        (Some((_, weight)), false) => ExactResult::optimal(*weight),
        (None, false) => ExactResult::error("search finished without visiting a leaf"),
    }
    .with_stats(nodes, candidates);

    let placements = best.map(|(sel, _)| model.placements(&sel)).unwrap_or_default();
    debug_assert!(audit(&model.container, &placements).is_ok());

    log::debug!(
        "branch-and-bound: {} nodes, objective {}, root bound {}",
        nodes,
        result.objective_value,
        root_bound
    );
    ExactSolution { placements, result }
}

/// Solves the model with HiGHS.
#[cfg(feature = "milp")]
fn solve_milp(
    model: &ExactModel<'_>,
    config: &ExactConfig,
    start: Instant,
) -> Result<ExactSolution> {
    let mut vars = ProblemVariables::new();
    let x: Vec<Variable> = (0..model.candidate_count())
        .map(|j| vars.add(variable().binary().name(format!("x_{}", j))))
        .collect();

    let objective: Expression = model
        .candidates
        .iter()
        .zip(&x)
        .map(|(c, &v)| c.weight * v)
        .sum();

    let mut problem = vars
        .maximise(objective)
        .using(highs)
        .set_option("mip_rel_gap", config.gap_tolerance)
        .set_option("output_flag", config.verbosity > 0);
    if let Some(secs) = config.time_limit_secs() {
        problem = problem.set_option("time_limit", secs);
    }

    // At most one selected box per cell
    for cover in model.cell_cover() {
        if cover.len() > 1 {
            let sum: Expression = cover.iter().map(|&j| Expression::from(x[j])).sum();
            problem = problem.with(constraint!(sum <= 1.0));
        }
    }

    log::info!(
        "Solving MILP with {} variables over {} cells",
        model.candidate_count(),
        model.container.cell_count()
    );

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(good_lp::ResolutionError::Infeasible) => {
            return Ok(ExactSolution::empty(
                ExactResult::infeasible().with_stats(0, model.candidate_count()),
            ));
        }
        Err(e) => {
            log::error!("MILP solver error: {:?}", e);
            return Err(Error::SolverError(e.to_string()));
        }
    };

    // Replay the selection; the engine's output is not trusted blindly.
    let mut grid = OccupancyGrid::new(&model.container);
    let mut selected = Vec::new();
    let mut rejected = 0usize;
    for (j, &v) in x.iter().enumerate() {
        if solution.value(v) > 0.5 {
            if grid.try_commit(model.candidates[j].origin, model.dims(j)) {
                selected.push(j);
            } else {
                rejected += 1;
            }
        }
    }
    if rejected > 0 {
        log::warn!("MILP selection had {} conflicting boxes, dropped", rejected);
    }

    let objective = model.weight_of(&selected);
    let root_bound = model.bound_for_free_cells(model.container.cell_count());
    let hit_limit = config.time_limit_ms > 0
        && start.elapsed() >= Duration::from_millis(config.time_limit_ms);

    // With at least one candidate the optimum is positive, so an empty
    // selection at the time limit means no incumbent was found.
    let result = if hit_limit {
        ExactResult::timeout((!selected.is_empty()).then_some(objective), root_bound)
    } else if rejected > 0 {
        ExactResult::feasible(objective, root_bound)
    } else if config.gap_tolerance > 0.0 {
        ExactResult::optimal_within_gap(
            objective,
            (objective / (1.0 - config.gap_tolerance)).min(root_bound),
        )
    } else {
        ExactResult::optimal(objective)
    }
    .with_stats(0, model.candidate_count());

    let placements = if result.has_solution() {
        model.placements(&selected)
    } else {
        Vec::new()
    };
    Ok(ExactSolution { placements, result })
}

#[cfg(not(feature = "milp"))]
fn solve_milp(
    _model: &ExactModel<'_>,
    _config: &ExactConfig,
    _start: Instant,
) -> Result<ExactSolution> {
    log::warn!("MILP backend not available (compile with 'milp' feature)");
    Err(Error::ConfigError(
        "the MILP backend requires the 'milp' feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::catalog_from_dims;
    use u_cubepack_core::SolutionStatus;

    fn dominoes() -> Vec<CatalogEntry> {
        catalog_from_dims(&[[1, 1, 2], [2, 1, 1], [1, 2, 1]])
    }

    #[test]
    fn test_model_candidates() {
        let container = Container::new(3, 4, 5).unwrap();
        let catalog = dominoes();
        let model = ExactModel::build(&container, &catalog, ExactObjective::Count, 10_000).unwrap();
        // 3*4*4 + 2*4*5 + 3*3*5
        assert_eq!(model.candidate_count(), 48 + 40 + 45);
        let cover = model.cell_cover();
        assert_eq!(cover.len(), 60);
        // corner cell: one box per orientation
        assert_eq!(cover[0].len(), 3);
    }

    #[test]
    fn test_candidate_limit() {
        let container = Container::new(3, 4, 5).unwrap();
        let catalog = dominoes();
        let err = ExactModel::build(&container, &catalog, ExactObjective::Count, 100).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_domino_tiling_is_optimal() {
        let container = Container::new(3, 4, 5).unwrap();
        let solution = solve_exact(&container, &dominoes(), &ExactConfig::default()).unwrap();
        assert_eq!(solution.placements.len(), 30);
        assert_eq!(solution.result.status, SolutionStatus::Optimal);
        assert_eq!(solution.result.objective_value, 30.0);
        assert!(audit(&container, &solution.placements).is_ok());
    }

    #[test]
    fn test_no_candidates_is_zero_optimum() {
        let container = Container::new(1, 1, 1).unwrap();
        let catalog = catalog_from_dims(&[[2, 1, 1], [1, 2, 1], [1, 1, 2]]);
        let solution = solve_exact(&container, &catalog, &ExactConfig::default()).unwrap();
        assert!(solution.placements.is_empty());
        assert_eq!(solution.result.status, SolutionStatus::Optimal);
        assert!(solution.result.has_solution());
    }

    #[test]
    fn test_expired_deadline_reports_timeout_without_solution() {
        let container = Container::new(3, 4, 5).unwrap();
        let catalog = dominoes();
        let model = ExactModel::build(&container, &catalog, ExactObjective::Count, 10_000).unwrap();
        let solution = branch_and_bound(&model, 0.0, Some(Instant::now()));
        assert_eq!(solution.result.status, SolutionStatus::Timeout);
        assert!(!solution.result.has_solution());
        assert!(solution.placements.is_empty());
    }

    #[test]
    fn test_odd_volume_leaves_one_cell() {
        // 3x3x1 has 9 cells: at most 4 dominoes
        let container = Container::new(3, 3, 1).unwrap();
        let solution = solve_exact(&container, &dominoes(), &ExactConfig::default()).unwrap();
        assert_eq!(solution.placements.len(), 4);
        assert!(solution.result.is_optimal);
    }

    #[test]
    fn test_volume_objective_prefers_large_boxes() {
        let container = Container::new(2, 2, 2).unwrap();
        let catalog = catalog_from_dims(&[[1, 1, 1], [2, 2, 2]]);
        let count = solve_exact(&container, &catalog, &ExactConfig::default()).unwrap();
        assert_eq!(count.placements.len(), 8);

        let config = ExactConfig::default().with_objective(ExactObjective::Volume);
        let by_volume = solve_exact(&container, &catalog, &config).unwrap();
        assert_eq!(by_volume.result.objective_value, 8.0);
        assert!(audit(&container, &by_volume.placements).is_ok());
    }

    #[test]
    fn test_gap_tolerance_stops_early() {
        let container = Container::new(4, 4, 3).unwrap();
        let config = ExactConfig::default().with_gap_tolerance(0.5);
        let solution = solve_exact(&container, &dominoes(), &config).unwrap();
        assert!(solution.result.has_solution());
        assert!(solution.result.objective_value >= 12.0);
        assert!(audit(&container, &solution.placements).is_ok());
    }

    #[cfg(not(feature = "milp"))]
    #[test]
    fn test_milp_backend_requires_feature() {
        let container = Container::new(2, 2, 2).unwrap();
        let config = ExactConfig::default().with_backend(ExactBackend::Milp);
        assert!(solve_exact(&container, &dominoes(), &config).is_err());
        assert!(!is_milp_available());
    }

    #[cfg(feature = "milp")]
    #[test]
    fn test_milp_domino_tiling() {
        let container = Container::new(3, 4, 5).unwrap();
        let config = ExactConfig::default().with_backend(ExactBackend::Milp);
        let solution = solve_exact(&container, &dominoes(), &config).unwrap();
        assert_eq!(solution.placements.len(), 30);
        assert!(audit(&container, &solution.placements).is_ok());
    }
}
