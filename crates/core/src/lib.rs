//! # U-Cubepack Core
//!
//! Core traits and abstractions for the U-Cubepack 3D placement engine.
//!
//! This crate provides the foundational types shared by the placement
//! strategies and the tooling built on top of them.
//!
//! ## Core Components
//!
//! - **Geometry traits**: [`Geometry`], [`Boundary`] over integer unit cells
//! - **Solver trait**: [`Solver`] - Common interface for all placement strategies
//! - **Population framework**: [`PopulationRunner`], [`PopulationProblem`] -
//!   random population with parallel fitness evaluation
//! - **Exact solver types**: [`ExactConfig`], [`ExactResult`], [`SolutionStatus`]
//! - **Results**: [`Placement`], [`SolveResult`], [`SolveSummary`]
//!
//! ## Placement Strategies
//!
//! The [`Strategy`] enum defines available algorithms:
//!
//! | Strategy | Speed | Quality | Description |
//! |----------|-------|---------|-------------|
//! | `Greedy` | Fast | Basic | First-fit scan with rotation search |
//! | `Stochastic` | Fast | Low | Random population, parallel scoring, collision filter |
//! | `Exact` | Slow | Optimal | Per-cell 0/1 assignment model |
//! | `HybridStochastic` | Fast | Good | Stochastic warm start + greedy fill |
//! | `HybridExact` | Medium | High | Time-limited exact warm start + greedy fill |
//!
//! ## Configuration
//!
//! ```rust
//! use u_cubepack_core::{Config, SearchOrder, Strategy};
//!
//! let config = Config::new()
//!     .with_strategy(Strategy::HybridStochastic)
//!     .with_search_order(SearchOrder::VolumeDescending)
//!     .with_population_size(200)
//!     .with_seed(42);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod exact;
pub mod geometry;
pub mod placement;
pub mod population;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Axis, Error, Result};
pub use exact::{ExactBackend, ExactConfig, ExactObjective, ExactResult, SolutionStatus};
pub use geometry::{Boundary, Dims, Geometry, GeometryId};
pub use placement::{Placement, PlacementStats};
pub use population::{PopulationConfig, PopulationProblem, PopulationResult, PopulationRunner};
pub use result::{SolveResult, SolveSummary};
pub use solver::{Config, FailurePolicy, SearchOrder, Solver, Strategy};
