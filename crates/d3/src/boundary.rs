//! 3D container type.

use u_cubepack_core::geometry::{volume, Boundary, Dims};
use u_cubepack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular container with integer dimensions.
///
/// Coordinates range over `[0, width) × [0, depth) × [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Container {
    /// Dimensions (width, depth, height).
    dimensions: Dims,
}

impl Container {
    /// Creates a validated container.
    pub fn new(width: u32, depth: u32, height: u32) -> Result<Self> {
        let container = Self {
            dimensions: [width, depth, height],
        };
        container.validate()?;
        Ok(container)
    }

    /// Creates a container from a dimension triple.
    pub fn from_dims(dims: Dims) -> Result<Self> {
        Self::new(dims[0], dims[1], dims[2])
    }

    /// Returns the width (x extent).
    pub fn width(&self) -> u32 {
        self.dimensions[0]
    }

    /// Returns the depth (y extent).
    pub fn depth(&self) -> u32 {
        self.dimensions[1]
    }

    /// Returns the height (z extent).
    pub fn height(&self) -> u32 {
        self.dimensions[2]
    }

    /// Returns the number of unit cells.
    pub fn cell_count(&self) -> usize {
        volume(self.dimensions) as usize
    }
}

impl Boundary for Container {
    fn dimensions(&self) -> Dims {
        self.dimensions
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return Err(Error::InvalidBoundary(format!(
                "All dimensions must be positive, got {:?}",
                self.dimensions
            )));
        }
        let cells = volume(self.dimensions);
        if usize::try_from(cells).is_err() {
            return Err(Error::InvalidBoundary(format!(
                "Container {:?} has {} cells, more than this platform can index",
                self.dimensions, cells
            )));
        }
        Ok(())
    }
}
