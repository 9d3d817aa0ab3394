//! Scale-aware heat aggregation over weighted planar points.
//!
//! A [`HeatMap`] owns a validated point set and answers windowed queries:
//! for a visible rectangle and a zoom scale it returns a reduced
//! position → intensity mapping whose size follows on-screen resolution,
//! not the number of raw points.

pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod geom;
pub mod heatmap;
pub mod spatial;
pub mod store;

pub use config::{HeatConfig, DEFAULT_BASE_CELL_SIZE};
pub use engine::HeatQueryEngine;
pub use error::{HeatError, Result};
pub use geom::{HeatSample, MapPoint, MapRect, WeightedPoint};
pub use heatmap::HeatMap;
pub use store::{Dataset, DatasetStats, PointStore};
