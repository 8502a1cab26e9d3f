use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    /// Smoothing rate per second.
    pub rate: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self { rate: 1.5 }
    }
}

/// Exponentially smoothed danger signal handed to presentation collaborators.
#[derive(Debug, Clone)]
pub struct TensionAggregator {
    config: TensionConfig,
    value: f32,
}

impl TensionAggregator {
    pub fn new(config: TensionConfig) -> Self {
        Self { config, value: 0.0 }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Move toward `raw` and return the new value, always in `[0, 1]`.
    ///
    /// A non-finite `raw` or `dt` leaves the value unchanged.
    pub fn update(&mut self, dt: f32, raw: f32) -> f32 {
        if !raw.is_finite() || !dt.is_finite() {
            return self.value;
        }
        let raw = raw.clamp(0.0, 1.0);
        let k = (dt.max(0.0) * self.config.rate).min(1.0);
        self.value = (self.value + (raw - self.value) * k).clamp(0.0, 1.0);
        self.value
    }
}

impl Default for TensionAggregator {
    fn default() -> Self {
        Self::new(TensionConfig::default())
    }
}
