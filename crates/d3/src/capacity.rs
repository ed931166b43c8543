//! Volume-based capacity estimates and up-front feasibility checks.
//!
//! A block fits the container in some orientation exactly when its sorted
//! edges are componentwise no longer than the container's sorted edges.
//! Blocks failing this can be reported before any search starts.

use crate::boundary::Container;
use crate::geometry::BlockType;
use crate::orientation::CatalogEntry;
use u_cubepack_core::geometry::{sorted_dims, volume, Boundary, Dims, Geometry, GeometryId};
use u_cubepack_core::{Axis, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bounds on what any strategy can place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapacityEstimate {
    /// Largest `k` such that the `k` smallest placeable instances fit by volume.
    pub count_upper_bound: usize,
    /// Placeable instance volume, capped at the container volume.
    pub volume_upper_bound: u64,
    /// Instances that fit the container in at least one orientation.
    pub placeable_instances: usize,
    /// Block types that fit in no allowed orientation.
    pub unplaceable: Vec<GeometryId>,
}

/// Returns the container axis a box cannot fit along, if any.
///
/// With rotation the check pairs sorted edges; the reported axis is the
/// container axis of the rank where the pairing fails.
pub fn blocking_axis(dims: Dims, container: Dims, allow_rotation: bool) -> Option<Axis> {
    if !allow_rotation {
        return Axis::ALL
            .into_iter()
            .find(|axis| dims[axis.index()] > container[axis.index()]);
    }

    let block = sorted_dims(dims);
    let mut ranked = Axis::ALL;
    ranked.sort_by_key(|axis| container[axis.index()]);
    (0..3)
        .find(|&rank| block[rank] > container[ranked[rank].index()])
        .map(|rank| ranked[rank])
}

/// Returns true if the box fits the container in some allowed orientation.
pub fn fits_some_orientation(dims: Dims, container: Dims, allow_rotation: bool) -> bool {
    blocking_axis(dims, container, allow_rotation).is_none()
}

/// Returns true if the block type fits the container in some orientation it allows.
pub fn is_placeable(block: &BlockType, container: &Container, allow_rotation: bool) -> bool {
    fits_some_orientation(
        block.dimensions(),
        container.dimensions(),
        allow_rotation && block.is_rotatable(),
    )
}

/// Fails with [`Error::Unplaceable`] naming the block and the blocking axis.
pub fn ensure_placeable(
    block: &BlockType,
    container: &Container,
    allow_rotation: bool,
) -> Result<()> {
    let c = container.dimensions();
    match blocking_axis(block.dimensions(), c, allow_rotation && block.is_rotatable()) {
        None => Ok(()),
        Some(axis) => Err(Error::Unplaceable {
            block: block.id().clone(),
            dimensions: block.dimensions(),
            axis,
            container_length: c[axis.index()],
        }),
    }
}

/// Computes volume bounds over the requested instances.
pub fn estimate(
    blocks: &[BlockType],
    container: &Container,
    allow_rotation: bool,
) -> CapacityEstimate {
    let c = container.dimensions();
    let container_volume = volume(c);
    let mut volumes: Vec<u64> = Vec::new();
    let mut unplaceable = Vec::new();

    for block in blocks {
        if is_placeable(block, container, allow_rotation) {
            volumes.extend(std::iter::repeat(block.measure()).take(block.quantity()));
        } else {
            unplaceable.push(block.id().clone());
        }
    }

    volumes.sort_unstable();
    let mut used = 0u64;
    let mut count = 0usize;
    for v in &volumes {
        if used + v > container_volume {
            break;
        }
        used += v;
        count += 1;
    }

    CapacityEstimate {
        count_upper_bound: count,
        volume_upper_bound: volumes.iter().sum::<u64>().min(container_volume),
        placeable_instances: volumes.len(),
        unplaceable,
    }
}

/// Bounds the number of boxes any selection from the catalog can hold:
/// `floor(container volume / smallest fitting catalog volume)`.
pub fn catalog_upper_bound(catalog: &[CatalogEntry], container: &Container) -> usize {
    catalog
        .iter()
        .filter(|e| container.contains_box([0, 0, 0], e.dims))
        .map(|e| e.volume())
        .min()
        .map_or(0, |v| (container.measure() / v) as usize)
}
