//! 3D benchmark dataset types and generators.
//!
//! Based on Martello, Pisinger, Vigo (2000) instance generation methodology,
//! with every edge drawn as an integer number of unit cells.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use u_cubepack_d3::BlockType;

/// Information about a 3D benchmark dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset3DInfo {
    /// Dataset name
    pub name: String,
    /// Instance class (MPV1-5, BW6-8)
    pub instance_class: InstanceClass,
    /// Number of item types
    pub num_items: usize,
    /// Number of requested instances (sum of quantities)
    pub num_instances: usize,
    /// Container dimensions (width, depth, height)
    pub container: [u32; 3],
}

/// A 3D placement benchmark dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset3D {
    /// Dataset name
    pub name: String,
    /// Instance class
    pub instance_class: InstanceClass,
    /// Items to be placed
    pub items: Vec<Item3D>,
    /// Container dimensions (width, depth, height)
    pub container: [u32; 3],
}

impl Dataset3D {
    /// Returns dataset information.
    pub fn info(&self) -> Dataset3DInfo {
        Dataset3DInfo {
            name: self.name.clone(),
            instance_class: self.instance_class,
            num_items: self.items.len(),
            num_instances: self.instance_count(),
            container: self.container,
        }
    }

    /// Total number of requested instances.
    pub fn instance_count(&self) -> usize {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Total volume of all requested instances.
    pub fn total_item_volume(&self) -> u64 {
        self.items.iter().map(|i| i.volume()).sum()
    }

    /// Container volume in unit cells.
    pub fn container_volume(&self) -> u64 {
        self.container.iter().map(|&d| d as u64).product()
    }

    /// Converts the items into block types for the packer.
    pub fn to_blocks(&self) -> Vec<BlockType> {
        self.items.iter().map(Item3D::to_block).collect()
    }
}

/// A 3D item (box) to be placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item3D {
    /// Item ID
    pub id: usize,
    /// Dimensions (lx, ly, lz)
    pub dimensions: [u32; 3],
    /// Quantity (demand)
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    /// Whether any axis-aligned orientation is allowed
    #[serde(default = "default_rotatable")]
    pub rotatable: bool,
}

fn default_quantity() -> usize {
    1
}

fn default_rotatable() -> bool {
    true
}

impl Item3D {
    /// Creates a new item.
    pub fn new(id: usize, lx: u32, ly: u32, lz: u32) -> Self {
        Self {
            id,
            dimensions: [lx, ly, lz],
            quantity: 1,
            rotatable: true,
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets whether the item may be rotated.
    pub fn with_rotation(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Volume of all copies.
    pub fn volume(&self) -> u64 {
        self.dimensions.iter().map(|&d| d as u64).product::<u64>() * self.quantity as u64
    }

    /// Block type for the packer, named `item-<id>`.
    pub fn to_block(&self) -> BlockType {
        BlockType::from_dims(format!("item-{}", self.id), self.dimensions)
            .with_quantity(self.quantity)
            .with_rotation(self.rotatable)
    }
}

/// Instance class based on MPV (Martello-Pisinger-Vigo) methodology.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstanceClass {
    /// Type 1: Small width, large depth and height
    /// w: [1, W/2], d: [2D/3, D], h: [2H/3, H]
    MPV1,
    /// Type 2: Large width, small depth, large height
    MPV2,
    /// Type 3: Large width and depth, small height
    MPV3,
    /// Type 4: Medium-sized items (upper half of each dimension)
    MPV4,
    /// Type 5: Small items (lower half of each dimension)
    MPV5,
    /// Type 6: Berkey-Wang uniform [1, 10]
    BW6,
    /// Type 7: Berkey-Wang uniform [1, 35]
    BW7,
    /// Type 8: Berkey-Wang uniform [1, 100]
    BW8,
    /// Uniform [1, W] on every edge
    Custom,
}

impl InstanceClass {
    /// Returns a string identifier for the class.
    pub fn id(&self) -> &'static str {
        match self {
            InstanceClass::MPV1 => "MPV1",
            InstanceClass::MPV2 => "MPV2",
            InstanceClass::MPV3 => "MPV3",
            InstanceClass::MPV4 => "MPV4",
            InstanceClass::MPV5 => "MPV5",
            InstanceClass::BW6 => "BW6",
            InstanceClass::BW7 => "BW7",
            InstanceClass::BW8 => "BW8",
            InstanceClass::Custom => "Custom",
        }
    }

    /// Parses a class identifier, ignoring case.
    pub fn from_id(id: &str) -> Option<InstanceClass> {
        Self::all_standard()
            .into_iter()
            .chain(std::iter::once(InstanceClass::Custom))
            .find(|c| c.id().eq_ignore_ascii_case(id))
    }

    /// All standard instance classes.
    pub fn all_standard() -> Vec<InstanceClass> {
        vec![
            InstanceClass::MPV1,
            InstanceClass::MPV2,
            InstanceClass::MPV3,
            InstanceClass::MPV4,
            InstanceClass::MPV5,
            InstanceClass::BW6,
            InstanceClass::BW7,
            InstanceClass::BW8,
        ]
    }
}

/// Edge-length band, as fractions of the bin edge.
#[derive(Clone, Copy)]
enum Band {
    Small,
    Large,
    Upper,
    Fixed(u32),
    Full,
}

/// 3D instance generator following MPV methodology.
pub struct InstanceGenerator {
    bin_dim: u32,
    seed: Option<u64>,
}

impl InstanceGenerator {
    /// Creates a new generator with the given (cubic) bin edge.
    pub fn new(bin_dim: u32) -> Self {
        Self {
            bin_dim: bin_dim.max(1),
            seed: None,
        }
    }

    /// Creates a generator with the default bin edge (20).
    pub fn default_bin() -> Self {
        Self::new(20)
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generates an instance of the specified class.
    pub fn generate(&self, class: InstanceClass, num_items: usize) -> Dataset3D {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(thread_rng()),
        };

        let items: Vec<Item3D> = (0..num_items)
            .map(|id| self.generate_item(class, id, &mut rng))
            .collect();

        Dataset3D {
            name: format!("{}_{}_n{}", class.id(), self.bin_dim, num_items),
            instance_class: class,
            items,
            container: [self.bin_dim; 3],
        }
    }

    /// Inclusive integer range of a band, clamped to `[1, bin]`.
    fn range(&self, band: Band) -> (u32, u32) {
        let bin = self.bin_dim;
        let (lo, hi) = match band {
            Band::Small => (1, bin / 2),
            Band::Large => ((2 * bin + 2) / 3, bin),
            Band::Upper => ((bin + 1) / 2, bin),
            Band::Fixed(max) => (1, max),
            Band::Full => (1, bin),
        };
        let hi = hi.clamp(1, bin);
        (lo.clamp(1, hi), hi)
    }

    fn draw(&self, band: Band, rng: &mut dyn RngCore) -> u32 {
        let (lo, hi) = self.range(band);
        rng.gen_range(lo..=hi)
    }

    /// Generates a single item based on class constraints.
    fn generate_item(&self, class: InstanceClass, id: usize, rng: &mut dyn RngCore) -> Item3D {
        use Band::*;
        let bands = match class {
            InstanceClass::MPV1 => [Small, Large, Large],
            InstanceClass::MPV2 => [Large, Small, Large],
            InstanceClass::MPV3 => [Large, Large, Small],
            InstanceClass::MPV4 => [Upper, Upper, Upper],
            InstanceClass::MPV5 => [Small, Small, Small],
            InstanceClass::BW6 => [Fixed(10); 3],
            InstanceClass::BW7 => [Fixed(35); 3],
            InstanceClass::BW8 => [Fixed(100); 3],
            InstanceClass::Custom => [Full; 3],
        };

        let w = self.draw(bands[0], rng);
        let d = self.draw(bands[1], rng);
        let h = self.draw(bands[2], rng);
        Item3D::new(id, w, d, h)
    }

    /// Generates a batch of instances for all standard classes.
    pub fn generate_batch(&self, num_items: usize, instances_per_class: usize) -> Vec<Dataset3D> {
        let mut datasets = Vec::new();

        for class in InstanceClass::all_standard() {
            for i in 0..instances_per_class {
                let gen = InstanceGenerator::new(self.bin_dim).with_seed(i as u64 * 12345 + 1);
                let mut dataset = gen.generate(class, num_items);
                dataset.name = format!("{}_{}_n{}_i{}", class.id(), self.bin_dim, num_items, i + 1);
                datasets.push(dataset);
            }
        }

        datasets
    }
}

impl Default for InstanceGenerator {
    fn default() -> Self {
        Self::default_bin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cubepack_core::Geometry;

    #[test]
    fn test_generate_mpv1() {
        let gen = InstanceGenerator::new(30).with_seed(42);
        let dataset = gen.generate(InstanceClass::MPV1, 10);

        assert_eq!(dataset.items.len(), 10);
        assert_eq!(dataset.container, [30, 30, 30]);

        for item in &dataset.items {
            let [w, d, h] = item.dimensions;
            assert!((1..=15).contains(&w));
            assert!((20..=30).contains(&d));
            assert!((20..=30).contains(&h));
        }
    }

    #[test]
    fn test_berkey_wang_clamped_to_bin() {
        let gen = InstanceGenerator::new(6).with_seed(7);
        let dataset = gen.generate(InstanceClass::BW8, 40);
        for item in &dataset.items {
            assert!(item.dimensions.iter().all(|&e| (1..=6).contains(&e)));
        }
    }

    #[test]
    fn test_tiny_bin_never_produces_empty_range() {
        let gen = InstanceGenerator::new(1).with_seed(0);
        for class in InstanceClass::all_standard() {
            let dataset = gen.generate(class, 3);
            assert!(dataset.items.iter().all(|i| i.dimensions == [1, 1, 1]));
        }
    }

    #[test]
    fn test_generate_batch() {
        let datasets = InstanceGenerator::new(20).generate_batch(10, 2);

        // 8 classes * 2 instances each = 16 datasets
        assert_eq!(datasets.len(), 16);
        assert_eq!(datasets[0].name, "MPV1_20_n10_i1");
    }

    #[test]
    fn test_deterministic_generation() {
        let ds1 = InstanceGenerator::new(20).with_seed(12345).generate(InstanceClass::MPV1, 5);
        let ds2 = InstanceGenerator::new(20).with_seed(12345).generate(InstanceClass::MPV1, 5);

        for (item1, item2) in ds1.items.iter().zip(ds2.items.iter()) {
            assert_eq!(item1.dimensions, item2.dimensions);
        }
    }

    #[test]
    fn test_to_blocks_keeps_quantity_and_rotation() {
        let dataset = Dataset3D {
            name: "manual".to_string(),
            instance_class: InstanceClass::Custom,
            items: vec![
                Item3D::new(0, 2, 3, 4).with_quantity(3),
                Item3D::new(1, 1, 1, 5).with_rotation(false),
            ],
            container: [10, 10, 10],
        };

        let blocks = dataset.to_blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].quantity(), 3);
        assert!(!blocks[1].is_rotatable());
        assert_eq!(dataset.instance_count(), 4);
        assert_eq!(dataset.total_item_volume(), 3 * 24 + 5);
        assert_eq!(InstanceClass::from_id("bw7"), Some(InstanceClass::BW7));
    }
}
