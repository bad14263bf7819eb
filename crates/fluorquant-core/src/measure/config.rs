use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PRECISION;

use super::table::Statistic;

/// Which statistics appear in the result table, and how they are printed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementConfig {
    #[serde(default = "enabled")]
    pub area: bool,
    #[serde(default = "enabled")]
    pub mean: bool,
    #[serde(default = "enabled")]
    pub min: bool,
    #[serde(default = "enabled")]
    pub max: bool,
    #[serde(default = "enabled")]
    pub integrated_density: bool,
    #[serde(default = "enabled")]
    pub raw_integrated_density: bool,
    /// Decimal places in the rendered table.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn enabled() -> bool {
    true
}
fn default_precision() -> usize {
    DEFAULT_PRECISION
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            area: true,
            mean: true,
            min: true,
            max: true,
            integrated_density: true,
            raw_integrated_density: true,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl MeasurementConfig {
    /// Enabled statistics in column order.
    pub fn statistics(&self) -> Vec<Statistic> {
        [
            (self.area, Statistic::Area),
            (self.mean, Statistic::Mean),
            (self.min, Statistic::Min),
            (self.max, Statistic::Max),
            (self.integrated_density, Statistic::IntegratedDensity),
            (self.raw_integrated_density, Statistic::RawIntegratedDensity),
        ]
        .into_iter()
        .filter_map(|(on, stat)| on.then_some(stat))
        .collect()
    }
}
