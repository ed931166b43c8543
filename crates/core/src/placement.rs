//! Placement representation for positioned blocks.

use crate::geometry::{volume, Dims, GeometryId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One block instance committed at an origin with a chosen orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// The ID of the placed block type.
    pub block_id: GeometryId,

    /// Instance index (0-based) among the copies of the block type.
    pub instance: usize,

    /// Corner of the box closest to the container origin.
    pub origin: Dims,

    /// Edge lengths after rotation.
    pub dims: Dims,

    /// Index of the orientation in the block's (or catalog's) orientation list.
    pub orientation_index: usize,
}

impl Placement {
    /// Creates a new placement.
    pub fn new(
        block_id: impl Into<GeometryId>,
        instance: usize,
        origin: Dims,
        dims: Dims,
        orientation_index: usize,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            instance,
            origin,
            dims,
            orientation_index,
        }
    }

    /// Returns the x coordinate.
    pub fn x(&self) -> u32 {
        self.origin[0]
    }

    /// Returns the y coordinate.
    pub fn y(&self) -> u32 {
        self.origin[1]
    }

    /// Returns the z coordinate.
    pub fn z(&self) -> u32 {
        self.origin[2]
    }

    /// Returns the exclusive upper corner.
    pub fn max_corner(&self) -> [u64; 3] {
        [
            self.origin[0] as u64 + self.dims[0] as u64,
            self.origin[1] as u64 + self.dims[1] as u64,
            self.origin[2] as u64 + self.dims[2] as u64,
        ]
    }

    /// Returns the box volume.
    pub fn volume(&self) -> u64 {
        volume(self.dims)
    }

    /// Returns true if the two boxes share at least one unit cell.
    pub fn overlaps(&self, other: &Placement) -> bool {
        let a_max = self.max_corner();
        let b_max = other.max_corner();
        (0..3).all(|axis| {
            (self.origin[axis] as u64) < b_max[axis] && (other.origin[axis] as u64) < a_max[axis]
        })
    }
}

/// Aggregate statistics over a placement list.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementStats {
    /// Number of placements.
    pub count: usize,
    /// Sum of placed box volumes.
    pub total_volume: u64,
    /// Number of placements that use a non-identity orientation.
    pub rotated: usize,
    /// Highest occupied z coordinate (exclusive).
    pub max_height: u64,
}

impl PlacementStats {
    /// Computes statistics from placements.
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut stats = Self {
            count: placements.len(),
            ..Default::default()
        };
        for p in placements {
            stats.total_volume += p.volume();
            if p.orientation_index != 0 {
                stats.rotated += 1;
            }
            stats.max_height = stats.max_height.max(p.max_corner()[2]);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_touching_faces() {
        let a = Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0);
        let b = Placement::new("B", 0, [2, 0, 0], [2, 2, 2], 0);
        let c = Placement::new("C", 0, [1, 1, 1], [2, 2, 2], 0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_placement_stats() {
        let placements = vec![
            Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0),
            Placement::new("A", 1, [0, 0, 2], [2, 1, 4], 3),
        ];
        let stats = PlacementStats::from_placements(&placements);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_volume, 16);
        assert_eq!(stats.rotated, 1);
        assert_eq!(stats.max_height, 6);
    }
}
