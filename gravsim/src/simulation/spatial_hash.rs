//! Uniform-grid spatial hash for broad-phase collision queries
//!
//! Bodies are bucketed by `floor(x / cell_size), floor(y / cell_size)`. A
//! neighbourhood query walks the 3x3 block of cells around a position, so
//! any pair closer than `cell_size` is guaranteed to be reported.
//!
//! Buckets hold registry indices and the whole grid is rebuilt every step.

use std::collections::HashMap;

use crate::simulation::error::{require_positive, SimResult};
use crate::simulation::states::{Body, NVec2};

pub type CellKey = (i32, i32);

#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    grid: HashMap<CellKey, Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> SimResult<Self> {
        Ok(Self {
            cell_size: require_positive("cell_size", cell_size)?,
            grid: HashMap::new(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Change the cell size. Existing entries are dropped since their keys
    /// no longer mean anything.
    pub fn set_cell_size(&mut self, cell_size: f64) -> SimResult<()> {
        self.cell_size = require_positive("cell_size", cell_size)?;
        self.clear();
        Ok(())
    }

    pub fn cell_hash(&self, position: &NVec2) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Append body `index` to the bucket of the cell containing `position`
    pub fn insert(&mut self, index: usize, position: &NVec2) {
        let key = self.cell_hash(position);
        self.grid.entry(key).or_default().push(index);
    }

    /// Clear, then insert every body of the registry in order
    pub fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        for (i, b) in bodies.iter().enumerate() {
            self.insert(i, &b.x);
        }
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.grid.len()
    }

    /// Bodies in the cell of `position`, in insertion order
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.grid.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every body in the 3x3 block of cells around `position`.
    ///
    /// Cells are visited `dx` outer, `dy` inner over `-1..=1`; within a cell
    /// bodies come back in insertion order.
    pub fn neighbors(&self, position: &NVec2) -> Vec<usize> {
        let mut out = Vec::new();
        self.neighbors_into(position, &mut out);
        out
    }

    /// [`SpatialHash::neighbors`] into a caller-owned buffer, which is
    /// cleared first.
    pub fn neighbors_into(&self, position: &NVec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_hash(position);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(bucket) = self.grid.get(&key) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }
}
