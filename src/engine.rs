use std::collections::BTreeMap;

use crate::config::HeatConfig;
use crate::error::{HeatError, Result};
use crate::geom::{HeatSample, MapPoint, MapRect};
use crate::spatial::BinGrid;
use crate::store::Dataset;

/// Scale-aware aggregation over a dataset snapshot.
///
/// Bins are squares of edge `base_cell_size / scale` anchored at the plane
/// origin, so panning over overlapping rectangles keeps bin edges fixed.
/// Each non-empty bin contributes one entry: its total weight, placed at the
/// weighted centroid of its points.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatQueryEngine {
    config: HeatConfig,
}

impl HeatQueryEngine {
    pub fn new(config: HeatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HeatConfig {
        &self.config
    }

    /// Bin edge length for `scale`.
    pub fn bin_size(&self, scale: f64) -> Result<f64> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(HeatError::InvalidScale(scale));
        }
        Ok(self.config.base_cell_size / scale)
    }

    /// Heat inside `rect` at `scale`, as representative position → intensity.
    ///
    /// Points within the configured margin outside `rect` are included so
    /// bins straddling the edge are not cut short.
    pub fn query(
        &self,
        dataset: &Dataset,
        rect: &MapRect,
        scale: f64,
    ) -> Result<BTreeMap<MapPoint, f64>> {
        let bin_size = self.bin_size(scale)?;
        if rect.is_empty() || dataset.is_empty() {
            return Ok(BTreeMap::new());
        }

        let lookup = rect.expanded(self.config.margin_for(bin_size));
        let mut grid = BinGrid::new(bin_size);
        let mut candidates = 0usize;
        for p in dataset.iter_within(&lookup) {
            grid.insert(p);
            candidates += 1;
        }

        let mut out = BTreeMap::new();
        for (_, bin) in grid.bins() {
            // Distinct bins essentially never round to the same centroid, but
            // if they do the weight must still be counted.
            *out.entry(bin.centroid()).or_insert(0.0) += bin.weight;
        }

        log::trace!(
            "Heat query {:?} @ scale {}: bin {:.4}, {} candidates -> {} bins",
            rect,
            scale,
            bin_size,
            candidates,
            out.len()
        );
        Ok(out)
    }
}

/// Rescale intensities into [0, 1] by the largest one.
pub fn normalize(heat: &BTreeMap<MapPoint, f64>) -> BTreeMap<MapPoint, f64> {
    let max = heat.values().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return BTreeMap::new();
    }
    heat.iter().map(|(p, v)| (*p, (v / max).clamp(0.0, 1.0))).collect()
}

/// Ordered view of a query result.
pub fn samples(heat: &BTreeMap<MapPoint, f64>) -> Vec<HeatSample> {
    heat.iter()
        .map(|(position, intensity)| HeatSample {
            position: *position,
            intensity: *intensity,
        })
        .collect()
}
