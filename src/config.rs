use crate::error::{HeatError, Result};

/// Bin edge length at scale 1, in planar units.
pub const DEFAULT_BASE_CELL_SIZE: f64 = 64.0;

/// Aggregation policy for heat queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatConfig {
    /// Bin edge at scale 1. The edge used for a query is `base_cell_size / scale`.
    pub base_cell_size: f64,
    /// Extra planar distance added around each query rectangle before point
    /// lookup. `None` means one bin width at the query's scale.
    pub query_margin: Option<f64>,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            base_cell_size: DEFAULT_BASE_CELL_SIZE,
            query_margin: None,
        }
    }
}

impl HeatConfig {
    pub fn with_base_cell_size(mut self, base_cell_size: f64) -> Self {
        self.base_cell_size = base_cell_size;
        self
    }

    /// Fixed margin in planar units. Zero turns edge smoothing off.
    pub fn with_query_margin(mut self, margin: f64) -> Self {
        self.query_margin = Some(margin);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_cell_size.is_finite() && self.base_cell_size > 0.0) {
            return Err(HeatError::InvalidConfig(format!(
                "base_cell_size must be positive and finite, got {}",
                self.base_cell_size
            )));
        }
        if let Some(margin) = self.query_margin {
            if !(margin.is_finite() && margin >= 0.0) {
                return Err(HeatError::InvalidConfig(format!(
                    "query_margin must be non-negative and finite, got {margin}"
                )));
            }
        }
        Ok(())
    }

    /// Margin for a query whose bins are `bin_size` wide.
    pub fn margin_for(&self, bin_size: f64) -> f64 {
        self.query_margin.unwrap_or(bin_size)
    }
}
