//! Dense per-cell occupancy grid.
//!
//! Cells are stored with z varying fastest, then y, then x, which matches the
//! greedy scan order so the innermost loops walk contiguous memory.

use crate::boundary::Container;
use u_cubepack_core::geometry::{Boundary, Dims};
use u_cubepack_core::Placement;

/// Occupied/free flag for every unit cell of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    dims: Dims,
    cells: Vec<bool>,
    occupied: usize,
}

impl OccupancyGrid {
    /// Creates an empty grid for the container.
    pub fn new(container: &Container) -> Self {
        Self {
            dims: container.dimensions(),
            cells: vec![false; container.cell_count()],
            occupied: 0,
        }
    }

    /// Returns the container dimensions.
    pub fn dimensions(&self) -> Dims {
        self.dims
    }

    /// Returns the number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Returns the number of free cells.
    pub fn free_count(&self) -> usize {
        self.cells.len() - self.occupied
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32, z: u32) -> usize {
        (x as usize * self.dims[1] as usize + y as usize) * self.dims[2] as usize + z as usize
    }

    /// Returns true if the cell is occupied. Cells outside the container count
    /// as occupied.
    pub fn is_occupied(&self, cell: Dims) -> bool {
        if (0..3).any(|axis| cell[axis] >= self.dims[axis]) {
            return true;
        }
        self.cells[self.index(cell[0], cell[1], cell[2])]
    }

    /// Returns true if the box lies within the container bounds.
    #[inline]
    pub fn in_bounds(&self, origin: Dims, dims: Dims) -> bool {
        (0..3).all(|axis| origin[axis] as u64 + dims[axis] as u64 <= self.dims[axis] as u64)
    }

    /// Returns true iff the box is in bounds and every cell it covers is free.
    pub fn fits(&self, origin: Dims, dims: Dims) -> bool {
        if !self.in_bounds(origin, dims) {
            return false;
        }
        let [x0, y0, z0] = origin;
        let lz = dims[2] as usize;
        for x in x0..x0 + dims[0] {
            for y in y0..y0 + dims[1] {
                let base = self.index(x, y, z0);
                if self.cells[base..base + lz].iter().any(|&c| c) {
                    return false;
                }
            }
        }
        true
    }

    fn fill(&mut self, origin: Dims, dims: Dims, value: bool) {
        let [x0, y0, z0] = origin;
        let lz = dims[2] as usize;
        for x in x0..x0 + dims[0] {
            for y in y0..y0 + dims[1] {
                let base = self.index(x, y, z0);
                self.cells[base..base + lz].fill(value);
            }
        }
        let n = dims[0] as usize * dims[1] as usize * lz;
        if value {
            self.occupied += n;
        } else {
            self.occupied -= n;
        }
    }

    /// Marks every cell of the box occupied.
    ///
    /// # Panics
    /// Panics if the box does not fit. Callers must check [`fits`](Self::fits)
    /// first; committing over an occupied or out-of-bounds cell is a logic error.
    pub fn commit(&mut self, origin: Dims, dims: Dims) {
        assert!(
            self.fits(origin, dims),
            "commit of box {:?} at {:?} without a successful fit",
            dims,
            origin
        );
        self.fill(origin, dims, true);
    }

    /// Commits the box if it fits. Returns whether it was committed.
    pub fn try_commit(&mut self, origin: Dims, dims: Dims) -> bool {
        if self.fits(origin, dims) {
            self.fill(origin, dims, true);
            true
        } else {
            false
        }
    }

    /// Commits a placement's box. Same contract as [`commit`](Self::commit).
    pub fn commit_placement(&mut self, placement: &Placement) {
        self.commit(placement.origin, placement.dims);
    }

    /// Frees a previously committed box. Only the exact search backtracks.
    pub(crate) fn release(&mut self, origin: Dims, dims: Dims) {
        debug_assert!(self.in_bounds(origin, dims));
        self.fill(origin, dims, false);
    }

    /// Marks a single free cell occupied without placing anything on it.
    pub(crate) fn block_cell(&mut self, cell: usize) {
        debug_assert!(!self.cells[cell]);
        self.cells[cell] = true;
        self.occupied += 1;
    }

    /// Undoes [`block_cell`](Self::block_cell).
    pub(crate) fn unblock_cell(&mut self, cell: usize) {
        debug_assert!(self.cells[cell]);
        self.cells[cell] = false;
        self.occupied -= 1;
    }

    /// Returns the first free cell index at or after `from`.
    pub(crate) fn next_free_cell(&self, from: usize) -> Option<usize> {
        self.cells[from.min(self.cells.len())..]
            .iter()
            .position(|&c| !c)
            .map(|offset| from + offset)
    }

    /// Converts a linear cell index back to coordinates.
    pub(crate) fn cell_coords(&self, cell: usize) -> Dims {
        let dz = self.dims[2] as usize;
        let dy = self.dims[1] as usize;
        let z = cell % dz;
        let y = (cell / dz) % dy;
        let x = cell / (dz * dy);
        [x as u32, y as u32, z as u32]
    }

    /// Finds the first origin in `(x, y, z)` lexicographic order (z fastest)
    /// where the box fits.
    pub fn first_fit(&self, dims: Dims) -> Option<Dims> {
        if (0..3).any(|axis| dims[axis] > self.dims[axis]) {
            return None;
        }
        for x in 0..=self.dims[0] - dims[0] {
            for y in 0..=self.dims[1] - dims[1] {
                for z in 0..=self.dims[2] - dims[2] {
                    if self.fits([x, y, z], dims) {
                        return Some([x, y, z]);
                    }
                }
            }
        }
        None
    }
}

/// Why a placement list failed an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFailure {
    /// Placement `index` leaves the container.
    OutOfBounds {
        /// Position in the placement list.
        index: usize,
    },
    /// Placement `index` shares a cell with an earlier placement.
    Overlap {
        /// Position in the placement list.
        index: usize,
    },
}

impl AuditFailure {
    /// Position of the offending placement.
    pub fn index(&self) -> usize {
        match *self {
            AuditFailure::OutOfBounds { index } | AuditFailure::Overlap { index } => index,
        }
    }
}

impl std::fmt::Display for AuditFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditFailure::OutOfBounds { index } => {
                write!(f, "placement {} lies outside the container", index)
            }
            AuditFailure::Overlap { index } => {
                write!(f, "placement {} overlaps an earlier placement", index)
            }
        }
    }
}

/// Replays placements into a fresh grid, checking each fit before commit.
pub fn audit(container: &Container, placements: &[Placement]) -> Result<(), AuditFailure> {
    let mut grid = OccupancyGrid::new(container);
    for (index, p) in placements.iter().enumerate() {
        if !grid.in_bounds(p.origin, p.dims) {
            return Err(AuditFailure::OutOfBounds { index });
        }
        if !grid.try_commit(p.origin, p.dims) {
            return Err(AuditFailure::Overlap { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(w: u32, d: u32, h: u32) -> Container {
        Container::new(w, d, h).unwrap()
    }

    #[test]
    fn test_fits_and_commit() {
        let mut grid = OccupancyGrid::new(&container(4, 4, 4));
        assert!(grid.fits([0, 0, 0], [2, 2, 2]));
        grid.commit([0, 0, 0], [2, 2, 2]);
        assert_eq!(grid.occupied_count(), 8);
        assert!(!grid.fits([1, 1, 1], [2, 2, 2]));
        assert!(grid.fits([2, 0, 0], [2, 2, 2]));
        assert!(!grid.fits([3, 0, 0], [2, 1, 1]));
        assert!(grid.is_occupied([1, 1, 1]));
        assert!(!grid.is_occupied([2, 2, 2]));
        assert!(grid.is_occupied([4, 0, 0]));
    }

    #[test]
    #[should_panic(expected = "without a successful fit")]
    fn test_commit_without_fit_panics() {
        let mut grid = OccupancyGrid::new(&container(2, 2, 2));
        grid.commit([0, 0, 0], [2, 2, 2]);
        grid.commit([1, 1, 1], [1, 1, 1]);
    }

    #[test]
    #[should_panic]
    fn test_commit_out_of_bounds_panics() {
        let mut grid = OccupancyGrid::new(&container(2, 2, 2));
        grid.commit([1, 0, 0], [2, 1, 1]);
    }

    #[test]
    fn test_first_fit_scan_order() {
        let mut grid = OccupancyGrid::new(&container(2, 2, 3));
        grid.commit([0, 0, 0], [1, 1, 1]);
        // z varies fastest
        assert_eq!(grid.first_fit([1, 1, 1]), Some([0, 0, 1]));
        assert_eq!(grid.first_fit([1, 1, 3]), Some([0, 1, 0]));
        assert_eq!(grid.first_fit([3, 1, 1]), None);
    }

    #[test]
    fn test_release_and_cells() {
        let mut grid = OccupancyGrid::new(&container(3, 4, 5));
        grid.commit([0, 0, 0], [1, 1, 2]);
        assert_eq!(grid.next_free_cell(0), Some(2));
        grid.block_cell(2);
        assert_eq!(grid.next_free_cell(0), Some(3));
        grid.unblock_cell(2);
        grid.release([0, 0, 0], [1, 1, 2]);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.cell_coords(grid.index(2, 3, 4)), [2, 3, 4]);
        assert_eq!(grid.cell_coords(7), [0, 1, 2]);
    }

    #[test]
    fn test_audit() {
        let c = container(4, 4, 4);
        let ok = vec![
            Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0),
            Placement::new("A", 1, [2, 0, 0], [2, 2, 2], 0),
        ];
        assert!(audit(&c, &ok).is_ok());

        let overlap = vec![
            Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0),
            Placement::new("A", 1, [1, 0, 0], [2, 2, 2], 0),
        ];
        assert_eq!(audit(&c, &overlap), Err(AuditFailure::Overlap { index: 1 }));

        let outside = vec![Placement::new("A", 0, [3, 0, 0], [2, 2, 2], 0)];
        assert_eq!(
            audit(&c, &outside),
            Err(AuditFailure::OutOfBounds { index: 0 })
        );
    }
}
