//! Axis-aligned orientations of a box.
//!
//! A box with edge lengths `(a, b, c)` can be laid down in at most six ways,
//! one per permutation of its edges. Permutations that produce the same triple
//! are the same orientation, so a cube has 1, a box with two equal edges has 3,
//! and a box with three distinct edges has 6.

use u_cubepack_core::geometry::{volume, Dims, GeometryId};

/// Axis permutations in enumeration order. Entry `(i, j, k)` maps the
/// declared edges `[d0, d1, d2]` to `[di, dj, dk]`.
pub const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2], // Original
    [0, 2, 1], // Rotated 90° around X
    [1, 0, 2], // Rotated 90° around Z
    [1, 2, 0], // Rotated 90° around X then Z
    [2, 0, 1], // Rotated 90° around Y
    [2, 1, 0], // Rotated 90° around Y then X
];

/// Applies one of [`PERMUTATIONS`] to a triple.
#[inline]
pub fn permute(dims: Dims, permutation: [usize; 3]) -> Dims {
    [
        dims[permutation[0]],
        dims[permutation[1]],
        dims[permutation[2]],
    ]
}

/// Returns the distinct orientations of a box, first occurrence first.
///
/// The declared orientation is always at index 0.
pub fn orientations(dims: Dims) -> Vec<Dims> {
    let mut out: Vec<Dims> = Vec::with_capacity(6);
    for permutation in PERMUTATIONS {
        let oriented = permute(dims, permutation);
        if !out.contains(&oriented) {
            out.push(oriented);
        }
    }
    out
}

/// One distinct shape offered to the catalog-driven strategies, labelled with
/// the block type it was first derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Block type the orientation came from.
    pub block_id: GeometryId,
    /// Oriented edge lengths.
    pub dims: Dims,
}

impl CatalogEntry {
    /// Creates a catalog entry.
    pub fn new(block_id: impl Into<GeometryId>, dims: Dims) -> Self {
        Self {
            block_id: block_id.into(),
            dims,
        }
    }

    /// Returns the box volume.
    pub fn volume(&self) -> u64 {
        volume(self.dims)
    }
}

/// Wraps bare orientation triples as catalog entries labelled
/// `orientation-<index>`.
pub fn catalog_from_dims(dims: &[Dims]) -> Vec<CatalogEntry> {
    dims.iter()
        .enumerate()
        .map(|(i, &d)| CatalogEntry::new(format!("orientation-{}", i), d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cubepack_core::geometry::is_permutation_of;

    #[test]
    fn test_orientation_counts() {
        assert_eq!(orientations([2, 2, 2]).len(), 1);
        assert_eq!(orientations([1, 1, 2]).len(), 3);
        assert_eq!(orientations([2, 1, 2]).len(), 3);
        assert_eq!(orientations([1, 2, 3]).len(), 6);
    }

    #[test]
    fn test_orientations_are_permutations() {
        let dims = [9, 7, 10];
        for o in orientations(dims) {
            assert!(is_permutation_of(o, dims));
        }
    }

    #[test]
    fn test_declared_orientation_first_and_stable() {
        let a = orientations([1, 1, 2]);
        assert_eq!(a, vec![[1, 1, 2], [1, 2, 1], [2, 1, 1]]);
        assert_eq!(a, orientations([1, 1, 2]));
    }

    #[test]
    fn test_catalog_from_dims() {
        let catalog = catalog_from_dims(&[[1, 1, 2], [2, 1, 1]]);
        assert_eq!(catalog[1].block_id, "orientation-1");
        assert_eq!(catalog[1].volume(), 2);
    }
}
