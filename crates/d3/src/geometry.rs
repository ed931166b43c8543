//! Block types and block instances.

use crate::orientation::{orientations, CatalogEntry};
use u_cubepack_core::geometry::{volume, Dims, Geometry, GeometryId};
use u_cubepack_core::solver::SearchOrder;
use u_cubepack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular block type to be packed, with a repetition count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockType {
    /// Unique identifier.
    id: GeometryId,

    /// Declared edge lengths (lx, ly, lz).
    dimensions: Dims,

    /// Number of copies to place.
    quantity: usize,

    /// Whether the block may be laid down in any axis-aligned orientation.
    rotatable: bool,
}

impl BlockType {
    /// Creates a new block type with the given ID and dimensions.
    pub fn new(id: impl Into<GeometryId>, lx: u32, ly: u32, lz: u32) -> Self {
        Self {
            id: id.into(),
            dimensions: [lx, ly, lz],
            quantity: 1,
            rotatable: true,
        }
    }

    /// Creates a block type from a dimension triple.
    pub fn from_dims(id: impl Into<GeometryId>, dims: Dims) -> Self {
        Self::new(id, dims[0], dims[1], dims[2])
    }

    /// Sets the quantity to place.
    pub fn with_quantity(mut self, n: usize) -> Self {
        self.quantity = n;
        self
    }

    /// Sets whether rotation is allowed.
    pub fn with_rotation(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Returns whether rotation is allowed.
    pub fn is_rotatable(&self) -> bool {
        self.rotatable
    }

    /// Returns the allowed orientations, declared orientation first.
    pub fn allowed_orientations(&self) -> Vec<Dims> {
        if self.rotatable {
            orientations(self.dimensions)
        } else {
            vec![self.dimensions]
        }
    }
}

impl Geometry for BlockType {
    fn id(&self) -> &GeometryId {
        &self.id
    }

    fn quantity(&self) -> usize {
        self.quantity
    }

    fn dimensions(&self) -> Dims {
        self.dimensions
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for '{}' must be positive, got {:?}",
                self.id, self.dimensions
            )));
        }

        if self.quantity == 0 {
            return Err(Error::InvalidGeometry(format!(
                "Quantity for '{}' must be at least 1",
                self.id
            )));
        }

        Ok(())
    }

    fn allow_rotation(&self) -> bool {
        self.rotatable
    }
}

/// Builds one block type per triple from a flat per-instance list.
///
/// IDs are `block-<index>`.
pub fn blocks_from_triples(triples: &[Dims]) -> Vec<BlockType> {
    triples
        .iter()
        .enumerate()
        .map(|(i, &dims)| BlockType::from_dims(format!("block-{}", i), dims))
        .collect()
}

/// Builds the deduplicated orientation catalog of a request.
///
/// Each distinct oriented shape appears once, labelled with the first block
/// type that produced it. Per-block rotation flags are honoured.
pub fn block_catalog(blocks: &[BlockType], allow_rotation: bool) -> Vec<CatalogEntry> {
    let mut catalog: Vec<CatalogEntry> = Vec::new();
    for block in blocks {
        let shapes = if allow_rotation {
            block.allowed_orientations()
        } else {
            vec![block.dimensions]
        };
        for dims in shapes {
            if !catalog.iter().any(|e| e.dims == dims) {
                catalog.push(CatalogEntry::new(block.id.clone(), dims));
            }
        }
    }
    catalog
}

/// One physical block to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInstance {
    /// ID of the block type.
    pub block_id: GeometryId,
    /// Index of the block type in the request.
    pub block_index: usize,
    /// Instance number within the block type's quantity.
    pub instance: usize,
    /// Declared edge lengths.
    pub dimensions: Dims,
    /// Whether rotation is allowed.
    pub rotatable: bool,
}

impl BlockInstance {
    /// Creates a rotatable instance, mostly for tests and callers without block types.
    pub fn new(block_id: impl Into<GeometryId>, instance: usize, dimensions: Dims) -> Self {
        Self {
            block_id: block_id.into(),
            block_index: 0,
            instance,
            dimensions,
            rotatable: true,
        }
    }

    /// Returns the instance volume.
    pub fn volume(&self) -> u64 {
        volume(self.dimensions)
    }

    /// Returns the orientations tried for this instance.
    pub fn orientations(&self, allow_rotation: bool) -> Vec<Dims> {
        if allow_rotation && self.rotatable {
            orientations(self.dimensions)
        } else {
            vec![self.dimensions]
        }
    }
}

/// Expands block types into per-instance entries, preserving request order.
pub fn expand_instances(blocks: &[BlockType]) -> Vec<BlockInstance> {
    let mut instances = Vec::with_capacity(blocks.iter().map(|b| b.quantity()).sum());
    for (block_index, block) in blocks.iter().enumerate() {
        for instance in 0..block.quantity() {
            instances.push(BlockInstance {
                block_id: block.id().clone(),
                block_index,
                instance,
                dimensions: block.dimensions(),
                rotatable: block.is_rotatable(),
            });
        }
    }
    instances
}

/// Applies a search order to instances. The sort is stable.
pub fn sort_instances(instances: &mut [BlockInstance], order: SearchOrder) {
    match order {
        SearchOrder::AsGiven => {}
        SearchOrder::VolumeDescending => {
            instances.sort_by(|a, b| b.volume().cmp(&a.volume()));
        }
        SearchOrder::VolumeAscending => {
            instances.sort_by(|a, b| a.volume().cmp(&b.volume()));
        }
    }
}
