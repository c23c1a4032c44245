/// Configuration for step grouping.
#[derive(Debug, Clone, Copy)]
pub struct GroupingConfig {
    /// Clustering distance as a percentage of the timeline duration (2.0 means 2%)
    pub grouping_factor_percent: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            grouping_factor_percent: 2.0,
        }
    }
}

impl GroupingConfig {
    pub fn new(grouping_factor_percent: f64) -> Self {
        Self {
            grouping_factor_percent,
        }
    }

    /// Factor with negative and NaN values mapped to zero.
    pub fn effective_factor(&self) -> f64 {
        if self.grouping_factor_percent.is_finite() && self.grouping_factor_percent > 0.0 {
            self.grouping_factor_percent
        } else {
            0.0
        }
    }

    /// Distance under which two segment starts end up in the same cluster.
    pub fn threshold(&self, total_duration: f64) -> f64 {
        total_duration * self.effective_factor() / 100.0
    }
}
