//! Core geometry traits and types.
//!
//! All lengths are integer unit-cell counts. A box with origin `(x, y, z)` and
//! edge lengths `(lx, ly, lz)` covers the half-open cell range
//! `[x, x + lx) × [y, y + ly) × [z, z + lz)`.

use crate::Result;

/// Unique identifier for a geometry.
pub type GeometryId = String;

/// Edge lengths or coordinates as an `[x, y, z]` triple.
pub type Dims = [u32; 3];

/// Volume of a box with the given edge lengths.
#[inline]
pub fn volume(dims: Dims) -> u64 {
    dims[0] as u64 * dims[1] as u64 * dims[2] as u64
}

/// Returns the edge lengths sorted ascending.
#[inline]
pub fn sorted_dims(dims: Dims) -> Dims {
    let mut sorted = dims;
    sorted.sort_unstable();
    sorted
}

/// Returns true if `a` is a permutation of `b`.
pub fn is_permutation_of(a: Dims, b: Dims) -> bool {
    sorted_dims(a) == sorted_dims(b)
}

/// Trait for blocks that can be packed.
pub trait Geometry: Clone + Send + Sync {
    /// Returns the unique identifier for this geometry.
    fn id(&self) -> &GeometryId;

    /// Returns the number of identical instances to place.
    fn quantity(&self) -> usize;

    /// Returns the declared (un-rotated) edge lengths.
    fn dimensions(&self) -> Dims;

    /// Returns the volume of a single instance.
    fn measure(&self) -> u64 {
        volume(self.dimensions())
    }

    /// Validates the geometry and returns an error if invalid.
    fn validate(&self) -> Result<()>;

    /// Returns whether axis-aligned rotations may be used.
    fn allow_rotation(&self) -> bool {
        true
    }
}

/// Trait for containers that geometries are packed into.
pub trait Boundary: Clone + Send + Sync {
    /// Returns the container edge lengths.
    fn dimensions(&self) -> Dims;

    /// Returns the container volume.
    fn measure(&self) -> u64 {
        volume(self.dimensions())
    }

    /// Validates the boundary and returns an error if invalid.
    fn validate(&self) -> Result<()>;

    /// Returns true if a box at `origin` with edge lengths `dims` stays inside.
    fn contains_box(&self, origin: Dims, dims: Dims) -> bool {
        let bounds = self.dimensions();
        (0..3).all(|axis| origin[axis] as u64 + dims[axis] as u64 <= bounds[axis] as u64)
    }
}
