use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{HeatError, Result};
use crate::geom::{MapPoint, MapRect, WeightedPoint};

/// Summary numbers computed once per dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatasetStats {
    pub count: usize,
    pub total_weight: f64,
    pub max_weight: f64,
}

/// Immutable, validated point set. Shared with readers through an `Arc`;
/// never mutated after construction.
#[derive(Debug, Default)]
pub struct Dataset {
    /// Sorted by `MapPoint` order (x, then y).
    points: Vec<WeightedPoint>,
    bounds: MapRect,
    stats: DatasetStats,
}

impl Dataset {
    /// Validate and snapshot `data`. A repeated position keeps the last
    /// weight seen.
    pub fn build(data: impl IntoIterator<Item = (MapPoint, f64)>) -> Result<Self> {
        let mut unique: BTreeMap<MapPoint, f64> = BTreeMap::new();
        for (position, weight) in data {
            if !position.is_finite() {
                return Err(HeatError::InvalidPosition {
                    x: position.x,
                    y: position.y,
                });
            }
            if !(weight.is_finite() && weight > 0.0) {
                return Err(HeatError::InvalidWeight {
                    x: position.x,
                    y: position.y,
                    weight,
                });
            }
            unique.insert(position, weight);
        }

        let points: Vec<WeightedPoint> = unique
            .into_iter()
            .map(|(position, weight)| WeightedPoint { position, weight })
            .collect();
        let bounds = MapRect::bounding(points.iter().map(|p| p.position)).unwrap_or(MapRect::ZERO);
        let stats = DatasetStats {
            count: points.len(),
            total_weight: points.iter().map(|p| p.weight).sum(),
            max_weight: points.iter().map(|p| p.weight).fold(0.0, f64::max),
        };

        Ok(Self {
            points,
            bounds,
            stats,
        })
    }

    pub fn bounding_rect(&self) -> MapRect {
        self.bounds
    }

    pub fn stats(&self) -> DatasetStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, in position order.
    pub fn points(&self) -> &[WeightedPoint] {
        &self.points
    }

    /// Every point inside `rect` (edges inclusive), in position order.
    pub fn points_within(&self, rect: &MapRect) -> Vec<WeightedPoint> {
        self.iter_within(rect).copied().collect()
    }

    pub(crate) fn iter_within<'a>(
        &'a self,
        rect: &MapRect,
    ) -> impl Iterator<Item = &'a WeightedPoint> + 'a {
        let (min, max) = (rect.min(), rect.max());
        let start = self.points.partition_point(|p| p.position.x < min.x);
        let end = self.points.partition_point(|p| p.position.x <= max.x);
        let rect = *rect;
        self.points[start..end.max(start)]
            .iter()
            .filter(move |p| rect.contains(p.position))
    }
}

/// Owner of the current dataset. Readers clone the `Arc` under a short read
/// lock and work on that snapshot; `replace` swaps in a fully built one.
#[derive(Debug)]
pub struct PointStore {
    current: RwLock<Arc<Dataset>>,
}

impl PointStore {
    pub fn new(data: impl IntoIterator<Item = (MapPoint, f64)>) -> Result<Self> {
        let dataset = Dataset::build(data)?;
        log::debug!(
            "Point store created with {} points, bounds {:?}",
            dataset.len(),
            dataset.bounding_rect()
        );
        Ok(Self {
            current: RwLock::new(Arc::new(dataset)),
        })
    }

    pub fn empty() -> Self {
        Self {
            current: RwLock::new(Arc::new(Dataset::default())),
        }
    }

    /// Swap the whole dataset. On error the previous contents stay in place.
    pub fn replace(&self, data: impl IntoIterator<Item = (MapPoint, f64)>) -> Result<()> {
        let dataset = Arc::new(Dataset::build(data)?);
        log::debug!(
            "Point store replaced: {} points, bounds {:?}",
            dataset.len(),
            dataset.bounding_rect()
        );
        // Only an Arc assignment happens under the lock, so a poisoned guard
        // still holds a whole dataset.
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = dataset;
        Ok(())
    }

    /// The dataset as of now. Later replacements do not affect it.
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn bounding_rect(&self) -> MapRect {
        self.snapshot().bounding_rect()
    }

    pub fn points_within(&self, rect: &MapRect) -> Vec<WeightedPoint> {
        self.snapshot().points_within(rect)
    }

    pub fn stats(&self) -> DatasetStats {
        self.snapshot().stats()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl Default for PointStore {
    fn default() -> Self {
        Self::empty()
    }
}
