use std::collections::HashMap;

use glam::DVec2;

use crate::geom::{MapPoint, WeightedPoint};

/// Largest cell index magnitude where `floor(x / cell)` is still an exact
/// integer in f64 (2^53).
const MAX_EXACT_CELL: f64 = 9_007_199_254_740_992.0;

/// Identifies one square bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey {
    /// Grid cell `(floor(x / size), floor(y / size))`.
    Grid(i64, i64),
    /// Cells are finer than f64 can index; the point is its own bin.
    Exact(MapPoint),
}

/// Running totals for one bin.
#[derive(Debug, Clone, Copy)]
pub struct BinAccumulator {
    pub weight: f64,
    pub count: usize,
    /// Weighted mean position so far. Kept as a mean rather than a sum of
    /// `p * w` so it stays inside the hull of the bin's points.
    mean: DVec2,
}

impl BinAccumulator {
    fn new(p: &WeightedPoint) -> Self {
        Self {
            weight: p.weight,
            count: 1,
            mean: p.position.to_dvec2(),
        }
    }

    fn add(&mut self, p: &WeightedPoint) {
        let pos = p.position.to_dvec2();
        self.weight += p.weight;
        self.count += 1;
        let f = p.weight / self.weight;
        // Rounding can push a convex combination a hair outside its ends.
        self.mean = (self.mean * (1.0 - f) + pos * f).clamp(self.mean.min(pos), self.mean.max(pos));
    }

    /// Weighted centroid. A single-point bin returns the point unchanged.
    pub fn centroid(&self) -> MapPoint {
        self.mean.into()
    }
}

/// Square-cell grid anchored at the plane origin, so two grids with the same
/// cell size always agree on where cell edges are. An infinite cell size
/// puts every point in cell (0, 0).
///
/// Unlike a fixed-table spatial hash, cells are keyed directly and only
/// non-empty cells are stored.
pub struct BinGrid {
    cell_size: f64,
    inv_cell_size: f64,
    /// Cells too small to index; every point bins by exact position.
    exact_only: bool,
    bins: HashMap<CellKey, BinAccumulator>,
}

impl BinGrid {
    pub fn new(cell_size: f64) -> Self {
        let inv_cell_size = 1.0 / cell_size;
        Self {
            cell_size,
            inv_cell_size,
            exact_only: !(cell_size > 0.0 && inv_cell_size.is_finite()),
            bins: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        self.bins.clear(); // Keeps allocation.
    }

    /// Add a point's weight to its bin.
    pub fn insert(&mut self, p: &WeightedPoint) {
        let key = self.cell_key(p.position);
        self.bins
            .entry(key)
            .and_modify(|bin| bin.add(p))
            .or_insert_with(|| BinAccumulator::new(p));
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Non-empty bins, in no particular order.
    pub fn bins(&self) -> impl Iterator<Item = (&CellKey, &BinAccumulator)> {
        self.bins.iter()
    }

    pub fn cell_key(&self, pos: MapPoint) -> CellKey {
        match self.cell_coords(pos) {
            Some((cx, cy)) => CellKey::Grid(cx, cy),
            None => CellKey::Exact(pos),
        }
    }

    /// Integer cell coordinates, or `None` when they fall outside the range
    /// f64 can index exactly.
    pub fn cell_coords(&self, pos: MapPoint) -> Option<(i64, i64)> {
        if self.exact_only {
            return None;
        }
        let cx = (pos.x * self.inv_cell_size).floor();
        let cy = (pos.y * self.inv_cell_size).floor();
        if cx.abs() < MAX_EXACT_CELL && cy.abs() < MAX_EXACT_CELL {
            // `as` maps -0.0 to 0.
            Some((cx as i64, cy as i64))
        } else {
            None
        }
    }
}
