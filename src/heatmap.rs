//! Heat overlay: the object a map host holds on to.
//! Owns the point store and answers windowed heat queries for rendering.

use std::collections::BTreeMap;

use crate::config::HeatConfig;
use crate::engine::{self, HeatQueryEngine};
use crate::error::Result;
use crate::geom::{MapPoint, MapRect};
use crate::store::{DatasetStats, PointStore};

/// A heat overlay over one replaceable set of weighted points.
///
/// All methods take `&self`: replacing the data swaps an immutable snapshot,
/// so an overlay can sit behind an `Arc` and be queried from any thread while
/// another thread calls [`Self::set_data`].
pub struct HeatMap {
    store: PointStore,
    engine: HeatQueryEngine,
}

impl HeatMap {
    /// Overlay with the default aggregation policy.
    pub fn new(data: impl IntoIterator<Item = (MapPoint, f64)>) -> Result<Self> {
        Self::with_config(data, HeatConfig::default())
    }

    pub fn with_config(
        data: impl IntoIterator<Item = (MapPoint, f64)>,
        config: HeatConfig,
    ) -> Result<Self> {
        let engine = HeatQueryEngine::new(config)?;
        let store = PointStore::new(data)?;
        log::info!(
            "Heat overlay ready: {} points, base cell {}",
            store.len(),
            config.base_cell_size
        );
        Ok(Self { store, engine })
    }

    /// Replace every point. Results already handed out are unaffected; on
    /// error the current data stays.
    pub fn set_data(&self, data: impl IntoIterator<Item = (MapPoint, f64)>) -> Result<()> {
        self.store.replace(data)
    }

    pub fn bounding_rect(&self) -> MapRect {
        self.store.bounding_rect()
    }

    /// Centre of the bounding rect; where the host anchors the overlay.
    pub fn center(&self) -> MapPoint {
        self.bounding_rect().center()
    }

    /// Whether any heat could show up inside `rect`.
    pub fn intersects(&self, rect: &MapRect) -> bool {
        let data = self.store.snapshot();
        !data.is_empty() && data.bounding_rect().intersects(rect)
    }

    /// Position → intensity for `rect` at `scale`, aggregated so the number of
    /// entries tracks on-screen resolution rather than raw point count.
    pub fn points_with_heat_in_rect(
        &self,
        rect: &MapRect,
        scale: f64,
    ) -> Result<BTreeMap<MapPoint, f64>> {
        let data = self.store.snapshot();
        self.engine.query(&data, rect, scale)
    }

    /// Same as [`Self::points_with_heat_in_rect`], intensities scaled into [0, 1].
    pub fn normalized_heat_in_rect(
        &self,
        rect: &MapRect,
        scale: f64,
    ) -> Result<BTreeMap<MapPoint, f64>> {
        Ok(engine::normalize(&self.points_with_heat_in_rect(rect, scale)?))
    }

    pub fn stats(&self) -> DatasetStats {
        self.store.stats()
    }

    pub fn config(&self) -> &HeatConfig {
        self.engine.config()
    }
}
