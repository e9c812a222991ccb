//! Uniform-grid spatial hash for neighbor search.
//!
//! The grid is unbounded: cells are keyed by integer coordinates obtained by
//! flooring `position / cell_size`, so particles outside the nominal domain
//! (or at negative coordinates) still hash to a valid cell. Buckets hold
//! slot indices into the simulator's particle arena, never particle data.

use std::collections::HashMap;

use glam::DVec2;

use crate::particle::Particle;

/// Integer cell coordinate `(i, j)`.
pub type CellCoord = (i64, i64);

/// Uniform-grid spatial hash with 3x3 block neighbor queries.
///
/// Cell size should equal the smoothing radius so that every particle
/// closer than one smoothing radius lies in the 3x3 block of cells around
/// the query position.
#[derive(Debug, Clone)]
pub struct NeighborGrid {
    cell_size: f64,
    cells: HashMap<CellCoord, Vec<usize>>,
    entries: usize,
}

impl NeighborGrid {
    /// Create an empty grid with the given cell size.
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be finite and positive, got {cell_size}"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: 0,
        }
    }

    /// Edge length of a grid cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Change the cell size. Membership is dropped, since entries inserted
    /// under the old size would hash to the wrong cells.
    pub fn set_cell_size(&mut self, cell_size: f64) {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be finite and positive, got {cell_size}"
        );
        self.clear();
        self.cell_size = cell_size;
    }

    /// Remove every entry from every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries = 0;
    }

    /// Number of entries across all cells (duplicates counted).
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Return `true` if no particle is registered.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Map a position to its cell with element-wise floor division.
    #[inline]
    pub fn cell_of(&self, position: DVec2) -> CellCoord {
        let cell = (position / self.cell_size).floor();
        (cell.x as i64, cell.y as i64)
    }

    /// Indices stored in `cell`, in insertion order.
    pub fn bucket(&self, cell: CellCoord) -> &[usize] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append particle `index` to the bucket of the cell containing
    /// `position`. Inserting the same index twice without a `clear`
    /// registers it twice.
    pub fn insert(&mut self, index: usize, position: DVec2) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(index);
        self.entries += 1;
    }

    /// Clear the grid and insert every particle at its current position, in
    /// arena order.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.clear();
        for (i, p) in particles.iter().enumerate() {
            self.insert(i, p.position);
        }
    }

    /// Invoke `f(j, r_vec, r)` for every registered particle `j` with
    /// `r = |position - x_j| < radius`, where `r_vec = position - x_j`.
    ///
    /// Visits exactly the 3x3 block of cells around `cell_of(position)`,
    /// x offset outer and y offset inner, bucket order within each cell.
    /// A particle located at `position` itself is reported with `r = 0`.
    /// `radius` must not exceed the cell size.
    pub fn for_each_neighbor<F>(&self, position: DVec2, radius: f64, particles: &[Particle], mut f: F)
    where
        F: FnMut(usize, DVec2, f64),
    {
        debug_assert!(
            radius <= self.cell_size,
            "query radius {radius} exceeds cell size {}",
            self.cell_size
        );
        let (ci, cj) = self.cell_of(position);

        for di in -1i64..=1 {
            // saturated cells at the i64 edge have no neighbor past the edge
            let Some(ni) = ci.checked_add(di) else {
                continue;
            };
            for dj in -1i64..=1 {
                let Some(nj) = cj.checked_add(dj) else {
                    continue;
                };
                let Some(bucket) = self.cells.get(&(ni, nj)) else {
                    continue;
                };
                for &j in bucket {
                    let r_vec = position - particles[j].position;
                    let r = r_vec.length();
                    if r < radius {
                        f(j, r_vec, r);
                    }
                }
            }
        }
    }

    /// Indices of all particles strictly closer than `radius` to `position`.
    ///
    /// Same visiting order as [`NeighborGrid::for_each_neighbor`]; the result
    /// is not sorted by distance.
    pub fn neighbors(&self, position: DVec2, radius: f64, particles: &[Particle]) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_neighbor(position, radius, particles, |j, _, _| out.push(j));
        out
    }
}
