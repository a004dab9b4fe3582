//! Combined configuration for both sides of the protocol
//!
//! Every section and field is optional in the JSON source; missing values
//! take their defaults.
//!
//! ```rust
//! use stride_simulation::StrideConfig;
//!
//! let config = StrideConfig::from_json_str(r#"{
//!     "predictor": { "sprint": { "duration_seconds": 2.0 } },
//!     "authority": { "position_tolerance": 0.5 }
//! }"#).unwrap();
//!
//! assert_eq!(config.predictor.sprint.duration_seconds, 2.0);
//! assert_eq!(config.predictor.sprint.recharge_seconds, 5.0);
//! assert_eq!(config.authority.position_tolerance, 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::ability::SprintConfig;
use crate::authority::AuthorityConfig;
use crate::movement::WalkConfig;
use crate::predictor::PredictorConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrideConfig {
    pub predictor: PredictorConfig,
    pub authority: AuthorityConfig,
    pub walk: WalkConfig,
}

impl StrideConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StrideConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects tunables no simulation can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sprint("predictor.sprint", &self.predictor.sprint)?;
        validate_sprint("authority.sprint", &self.authority.sprint)?;

        let merge = &self.predictor.merge;
        non_negative("predictor.merge.max_combined_delta", merge.max_combined_delta)?;
        non_negative("predictor.merge.acceleration_tolerance", merge.acceleration_tolerance)?;

        non_negative("authority.position_tolerance", self.authority.position_tolerance)?;
        if !(self.authority.max_delta_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "authority.max_delta_time must be positive, got {}",
                self.authority.max_delta_time
            )));
        }

        if merge.max_combined_delta > self.authority.max_delta_time {
            return Err(ConfigError::Invalid(format!(
                "predictor.merge.max_combined_delta ({}) exceeds authority.max_delta_time ({}); merged moves would be rejected",
                merge.max_combined_delta, self.authority.max_delta_time
            )));
        }

        non_negative("walk.max_walk_speed", self.walk.max_walk_speed)?;
        non_negative("walk.max_acceleration", self.walk.max_acceleration)?;
        non_negative("walk.braking_deceleration", self.walk.braking_deceleration)?;
        non_negative("walk.jump_z_velocity", self.walk.jump_z_velocity)?;
        non_negative("walk.gravity", self.walk.gravity)?;

        Ok(())
    }
}

fn validate_sprint(section: &str, sprint: &SprintConfig) -> Result<(), ConfigError> {
    non_negative(&format!("{section}.speed"), sprint.speed)?;
    non_negative(&format!("{section}.acceleration"), sprint.acceleration)?;
    non_negative(&format!("{section}.duration_seconds"), sprint.duration_seconds)?;
    non_negative(&format!("{section}.recharge_seconds"), sprint.recharge_seconds)
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be non-negative, got {value}"
        )))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
