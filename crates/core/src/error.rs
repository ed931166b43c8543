//! Error types for U-Cubepack.

use thiserror::Error;

/// Result type alias for U-Cubepack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Container axis, used to report which direction a block cannot fit along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Width (x).
    X,
    /// Depth (y).
    Y,
    /// Height (z).
    Z,
}

impl Axis {
    /// All axes in x, y, z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis in an `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x (width)"),
            Axis::Y => write!(f, "y (depth)"),
            Axis::Z => write!(f, "z (height)"),
        }
    }
}

/// Errors that can occur while validating or solving a placement problem.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid block specification.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid container specification.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A block that cannot fit the container in any orientation.
    #[error(
        "Block '{block}' {dimensions:?} cannot be placed: no orientation fits along axis {axis} (container length {container_length})"
    )]
    Unplaceable {
        /// Block identifier.
        block: String,
        /// Declared block dimensions.
        dimensions: [u32; 3],
        /// Container axis that is too short.
        axis: Axis,
        /// Length of the container along `axis`.
        container_length: u32,
    },

    /// The external MILP engine failed.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Serialization error.
    #[cfg(feature = "serde")]
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error reports an infeasible single block.
    pub fn is_unplaceable(&self) -> bool {
        matches!(self, Error::Unplaceable { .. })
    }
}
