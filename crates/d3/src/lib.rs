//! # U-Cubepack 3D
//!
//! Axis-aligned placement of rectangular blocks into a rectangular container
//! on an integer unit-cell grid.
//!
//! ## Features
//!
//! - Up to 6 orientations per block, deduplicated for repeated edge lengths
//! - Dense occupancy grid with a strict fit-before-commit contract
//! - Placement strategies: greedy first-fit, stochastic population with
//!   parallel scoring, exact per-cell 0/1 model (built-in branch-and-bound or
//!   HiGHS), and hybrids that warm-start the greedy pass
//! - Volume-based capacity bounds and up-front unplaceable detection
//!
//! ## Quick Start
//!
//! ```rust
//! use u_cubepack_d3::{BlockType, Container, Packer3D, Solver};
//!
//! let container = Container::new(30, 40, 50).unwrap();
//! let blocks = vec![BlockType::new("crate", 9, 7, 10).with_quantity(5)];
//!
//! let result = Packer3D::default_config().solve(&blocks, &container).unwrap();
//! assert_eq!(result.placements.len(), 5);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialization of containers, blocks and results
//! - `milp`: HiGHS backend for the exact model (via `good_lp`)

pub mod boundary;
pub mod capacity;
pub mod exact_solver;
pub mod geometry;
pub mod greedy;
pub mod hybrid;
pub mod occupancy;
pub mod orientation;
pub mod packer;
pub mod stochastic;

// Re-exports
pub use boundary::Container;
pub use capacity::CapacityEstimate;
pub use exact_solver::{solve_exact, ExactSolution};
pub use geometry::{BlockInstance, BlockType};
pub use greedy::{GreedyConfig, GreedyOutcome};
pub use hybrid::HybridOutcome;
pub use occupancy::{audit, AuditFailure, OccupancyGrid};
pub use orientation::CatalogEntry;
pub use packer::{verify_solution, Packer3D};
pub use stochastic::StochasticOutcome;
pub use u_cubepack_core::{
    Config, Error, ExactBackend, ExactConfig, ExactObjective, ExactResult, FailurePolicy,
    Placement, Result, SearchOrder, SolutionStatus, SolveResult, Solver, Strategy,
};
