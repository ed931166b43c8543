//! JSON problem and solution files.
//!
//! A problem file holds a container and the requested blocks, either as
//! named block types or as a flat list of per-instance triples:
//!
//! ```json
//! { "container": [30, 40, 50], "blocks": [{ "id": "crate", "dimensions": [9, 7, 10], "quantity": 5 }] }
//! { "container": [3, 4, 5], "blocks": [[1, 1, 2], [1, 1, 2]] }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use u_cubepack_core::{Boundary, Dims, Placement};
use u_cubepack_d3::geometry::blocks_from_triples;
use u_cubepack_d3::{BlockType, Container};

use crate::dataset3d::Dataset3D;

/// One named block type in a problem file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    /// Block type identifier.
    pub id: String,
    /// Declared edge lengths.
    pub dimensions: Dims,
    /// Number of instances (default 1).
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    /// Whether the block may be rotated (default true).
    #[serde(default = "default_rotatable")]
    pub rotatable: bool,
}

fn default_quantity() -> usize {
    1
}

fn default_rotatable() -> bool {
    true
}

/// Requested blocks in either supported layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockList {
    /// Named block types with quantities.
    Typed(Vec<BlockSpec>),
    /// One triple per instance.
    Triples(Vec<Dims>),
}

/// A placement problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFile {
    /// Container edge lengths.
    pub container: Dims,
    /// Requested blocks.
    pub blocks: BlockList,
}

impl ProblemFile {
    /// Validated container.
    pub fn container(&self) -> Result<Container> {
        Container::from_dims(self.container).context("invalid container")
    }

    /// Block types for the packer.
    pub fn to_blocks(&self) -> Vec<BlockType> {
        match &self.blocks {
            BlockList::Typed(specs) => specs
                .iter()
                .map(|s| {
                    BlockType::from_dims(s.id.clone(), s.dimensions)
                        .with_quantity(s.quantity)
                        .with_rotation(s.rotatable)
                })
                .collect(),
            BlockList::Triples(triples) => blocks_from_triples(triples),
        }
    }

    /// Builds a problem file from a generated dataset.
    pub fn from_dataset(dataset: &Dataset3D) -> Self {
        let specs = dataset
            .items
            .iter()
            .map(|item| BlockSpec {
                id: format!("item-{}", item.id),
                dimensions: item.dimensions,
                quantity: item.quantity,
                rotatable: item.rotatable,
            })
            .collect();
        Self {
            container: dataset.container,
            blocks: BlockList::Typed(specs),
        }
    }
}

/// A solution: the container and the committed placements, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionFile {
    /// Container edge lengths.
    pub container: Dims,
    /// Committed placements.
    pub placements: Vec<Placement>,
}

impl SolutionFile {
    /// Records placements for the given container.
    pub fn new(container: &Container, placements: Vec<Placement>) -> Self {
        Self {
            container: container.dimensions(),
            placements,
        }
    }

    /// Validated container.
    pub fn container(&self) -> Result<Container> {
        Container::from_dims(self.container).context("invalid container")
    }
}

/// Reads a JSON file into `T`.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes `value` as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Loads a problem file, rejecting one with no blocks.
pub fn load_problem(path: impl AsRef<Path>) -> Result<ProblemFile> {
    let problem: ProblemFile = load_json(path)?;
    let empty = match &problem.blocks {
        BlockList::Typed(specs) => specs.is_empty(),
        BlockList::Triples(triples) => triples.is_empty(),
    };
    if empty {
        bail!("problem file lists no blocks");
    }
    Ok(problem)
}

/// Loads a solution file.
pub fn load_solution(path: impl AsRef<Path>) -> Result<SolutionFile> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cubepack_core::Geometry;
    use u_cubepack_d3::{verify_solution, Packer3D, Solver};

    #[test]
    fn test_parse_typed_blocks() {
        let json = r#"{"container":[30,40,50],"blocks":[{"id":"crate","dimensions":[9,7,10],"quantity":5}]}"#;
        let problem: ProblemFile = serde_json::from_str(json).unwrap();
        let blocks = problem.to_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].quantity(), 5);
        assert!(blocks[0].is_rotatable());
    }

    #[test]
    fn test_parse_triples() {
        let json = r#"{"container":[3,4,5],"blocks":[[1,1,2],[2,1,1]]}"#;
        let problem: ProblemFile = serde_json::from_str(json).unwrap();
        assert_eq!(problem.blocks, BlockList::Triples(vec![[1, 1, 2], [2, 1, 1]]));
        let blocks = problem.to_blocks();
        assert_eq!(blocks[1].id(), "block-1");
    }

    #[test]
    fn test_zero_container_is_rejected() {
        let problem = ProblemFile {
            container: [0, 4, 5],
            blocks: BlockList::Triples(vec![[1, 1, 1]]),
        };
        assert!(problem.container().is_err());
    }

    #[test]
    fn test_solution_round_trip_still_fits() {
        let container = Container::new(30, 40, 50).unwrap();
        let blocks = vec![BlockType::new("crate", 9, 7, 10).with_quantity(5)];
        let result = Packer3D::default_config().solve(&blocks, &container).unwrap();

        let file = SolutionFile::new(&container, result.placements.clone());
        let json = serde_json::to_string(&file).unwrap();
        let reloaded: SolutionFile = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded, file);
        let container = reloaded.container().unwrap();
        assert!(verify_solution(&container, &reloaded.placements).is_ok());
    }
}
