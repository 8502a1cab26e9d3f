use ashfield_input::LocomotionConfig;
use ashfield_kernel::{LayoutConfig, Span};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::ClockConfig;
use crate::nav::NavConfig;
use crate::session::SessionConfig;
use crate::stalker::StalkerConfig;
use crate::tension::TensionConfig;

/// Errors from loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every tunable of a run. Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub layout: LayoutConfig,
    pub nav: NavConfig,
    pub locomotion: LocomotionConfig,
    pub stalker: StalkerConfig,
    pub tension: TensionConfig,
    pub session: SessionConfig,
    pub clock: ClockConfig,
}

impl GameConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        positive("layout.ground_half_size", l.ground_half_size)?;
        if !(l.bounds_fraction > 0.0 && l.bounds_fraction <= 1.0) {
            return Err(invalid("layout.bounds_fraction", "must be in (0, 1]"));
        }
        for (field, span) in [
            ("layout.building_width", l.building_width),
            ("layout.building_depth", l.building_depth),
            ("layout.building_height", l.building_height),
            ("layout.forest_radius", l.forest_radius),
            ("layout.trunk_height", l.trunk_height),
            ("layout.crown_radius", l.crown_radius),
            ("layout.crown_height", l.crown_height),
        ] {
            positive_span(field, span)?;
        }
        if l.window_count_min > l.window_count_max {
            return Err(invalid("layout.window_count_min", "exceeds window_count_max"));
        }
        probability("layout.lamp_chance", l.lamp_chance)?;
        probability("layout.trunk_collider_chance", l.trunk_collider_chance)?;
        positive("layout.trunk_radius", l.trunk_radius)?;
        positive("layout.deep_zone_radius", l.deep_zone_radius)?;

        positive("nav.player_radius", self.nav.player_radius)?;
        positive("nav.eye_height", self.nav.eye_height)?;

        let m = &self.locomotion;
        positive("locomotion.walk_speed", m.walk_speed)?;
        positive("locomotion.run_speed", m.run_speed)?;
        non_negative("locomotion.acceleration", m.acceleration)?;
        non_negative("locomotion.drag", m.drag)?;

        let s = &self.stalker;
        positive("stalker.agent_radius", s.agent_radius)?;
        positive("stalker.reference_range", s.reference_range)?;
        positive("stalker.visibility_range", s.visibility_range)?;
        non_negative("stalker.catch_threshold", s.catch_threshold)?;
        positive("stalker.far_threshold", s.far_threshold)?;
        positive_span(
            "stalker.warp_radius",
            Span::new(s.warp_radius_min, s.warp_radius_max),
        )?;
        non_negative("stalker.warp_interval_min", s.warp_interval_min)?;
        for (field, p) in [
            ("stalker.base_warp_chance", s.base_warp_chance),
            ("stalker.glimpse_chance", s.glimpse_chance),
            ("stalker.catch_reprieve_chance", s.catch_reprieve_chance),
            ("stalker.anger_increment", s.anger_increment),
        ] {
            probability(field, p)?;
        }
        non_negative("stalker.anger_decay_rate", s.anger_decay_rate)?;
        non_negative("stalker.dormant_decay", s.dormant_decay)?;
        if s.warp_attempts == 0 {
            return Err(invalid("stalker.warp_attempts", "must be at least 1"));
        }

        non_negative("tension.rate", self.tension.rate)?;
        positive("session.interact_range", self.session.interact_range)?;
        positive("session.beacon_range", self.session.beacon_range)?;
        if let Some(delay) = self.session.appearance_delay {
            non_negative("session.appearance_delay", delay)?;
        }
        if self.session.collision_passes == 0 {
            return Err(invalid("session.collision_passes", "must be at least 1"));
        }
        positive("clock.max_step", self.clock.max_step)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {v}"),
        })
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be non-negative, got {v}"),
        })
    }
}

fn probability(field: &'static str, p: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be in [0, 1], got {p}"),
        })
    }
}

fn positive_span(field: &'static str, span: Span) -> Result<(), ConfigError> {
    if span.is_ordered() && span.min > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("needs 0 < min <= max, got {}..{}", span.min, span.max),
        })
    }
}
