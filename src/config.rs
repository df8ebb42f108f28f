//! Service configuration.

use boneweave_animation::{AnimationModifier, LoopMode};
use boneweave_core::errors::{BoneError, Result};
use serde::{Deserialize, Serialize};

/// Tunables for a [`ModelService`](crate::ModelService).
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Passed to the tracker's `force_update` after a visible change.
    pub immediate_refresh: bool,
    /// Log rejected operations at `warn` level.
    pub log_rejections: bool,
    /// Playback speed of requests that do not set one.
    pub default_speed: f32,
    /// Blend-in window, in ticks, of requests that do not set one.
    pub default_blend_in_ticks: u32,
    pub default_loop_mode: LoopMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            immediate_refresh: true,
            log_rejections: true,
            default_speed: 1.0,
            default_blend_in_ticks: 1,
            default_loop_mode: LoopMode::PlayOnce,
        }
    }
}

impl ServiceConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BoneError::invalid_payload("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.default_modifier().map(|_| ())
    }

    /// A modifier carrying the configured defaults.
    pub fn default_modifier(&self) -> Result<AnimationModifier> {
        AnimationModifier::builder()
            .loop_mode(self.default_loop_mode)
            .speed(self.default_speed)
            .blend_in_ticks(self.default_blend_in_ticks)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(ServiceConfig::from_json_str("{}").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = ServiceConfig::from_json_str(
            r#"{ "immediate_refresh": false, "default_loop_mode": "loop", "default_speed": 2.0 }"#,
        )
        .unwrap();
        assert!(!config.immediate_refresh);
        assert_eq!(config.default_loop_mode, LoopMode::Loop);
        let modifier = config.default_modifier().unwrap();
        assert!((modifier.speed() - 2.0).abs() < f32::EPSILON);
        assert_eq!(modifier.blend_in_ticks(), 1);
    }

    #[test]
    fn loop_mode_accepts_command_keywords() {
        for (text, expected) in [
            ("once", LoopMode::PlayOnce),
            ("play_once", LoopMode::PlayOnce),
            ("hold", LoopMode::HoldOnLast),
            ("hold_on_last", LoopMode::HoldOnLast),
        ] {
            let config =
                ServiceConfig::from_json_str(&format!(r#"{{ "default_loop_mode": "{text}" }}"#))
                    .unwrap();
            assert_eq!(config.default_loop_mode, expected);
            assert_eq!(text.parse::<LoopMode>().unwrap(), expected);
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(ServiceConfig::from_json_str(r#"{ "default_speed": 0.0 }"#).is_err());
        assert!(ServiceConfig::from_json_str(r#"{ "refresh": true }"#).is_err());
        assert!(ServiceConfig::from_json_str("not json").is_err());
    }
}
