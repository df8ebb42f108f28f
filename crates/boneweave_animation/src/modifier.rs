//! Playback parameters for one animation layer.

use std::fmt;
use std::str::FromStr;

use boneweave_core::errors::{BoneError, Result};
use boneweave_core::ObserverId;
use serde::{Deserialize, Serialize};

/// What happens when a layer reaches the end of its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play the clip once, then release the bones to whatever else governs them.
    #[default]
    #[serde(alias = "once")]
    PlayOnce,
    /// Repeat until explicitly stopped.
    Loop,
    /// Play once and freeze on the final frame until stopped or overridden.
    #[serde(alias = "hold")]
    HoldOnLast,
}

impl LoopMode {
    /// Maps a front-end keyword to a loop mode. Anything unrecognised plays once.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        keyword.parse().unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayOnce => "once",
            Self::Loop => "loop",
            Self::HoldOnLast => "hold",
        }
    }
}

impl FromStr for LoopMode {
    type Err = BoneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" | "play_once" => Ok(Self::PlayOnce),
            "loop" => Ok(Self::Loop),
            "hold" | "hold_on_last" => Ok(Self::HoldOnLast),
            other => Err(BoneError::invalid_payload(
                "loop",
                format!("'{other}' is not one of once, loop, hold"),
            )),
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated playback parameters for an `animate` request.
///
/// Built through [`AnimationModifier::builder`]; a modifier that exists always
/// has a finite, positive speed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationModifier {
    loop_mode: LoopMode,
    speed: f32,
    blend_in_ticks: u32,
    observer: Option<ObserverId>,
}

impl Default for AnimationModifier {
    fn default() -> Self {
        Self {
            loop_mode: LoopMode::PlayOnce,
            speed: 1.0,
            blend_in_ticks: 0,
            observer: None,
        }
    }
}

impl AnimationModifier {
    #[must_use]
    pub fn builder() -> AnimationModifierBuilder {
        AnimationModifierBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    #[must_use]
    pub fn blend_in_ticks(&self) -> u32 {
        self.blend_in_ticks
    }

    /// The single viewer this layer is scoped to, if any.
    #[inline]
    #[must_use]
    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    /// Copy of this modifier scoped to one observer.
    #[must_use]
    pub fn for_observer(&self, observer: ObserverId) -> Self {
        Self {
            observer: Some(observer),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationModifierBuilder {
    inner: AnimationModifier,
}

impl AnimationModifierBuilder {
    #[must_use]
    pub fn loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.inner.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: f32) -> Self {
        self.inner.speed = speed;
        self
    }

    #[must_use]
    pub fn blend_in_ticks(mut self, ticks: u32) -> Self {
        self.inner.blend_in_ticks = ticks;
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Option<ObserverId>) -> Self {
        self.inner.observer = observer;
        self
    }

    pub fn build(self) -> Result<AnimationModifier> {
        let speed = self.inner.speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(BoneError::invalid_payload(
                "speed",
                format!("playback speed must be a positive number, got {speed}"),
            ));
        }
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_parsing_is_lenient() {
        assert_eq!(LoopMode::from_keyword("loop"), LoopMode::Loop);
        assert_eq!(LoopMode::from_keyword(" HOLD "), LoopMode::HoldOnLast);
        assert_eq!(LoopMode::from_keyword("bounce"), LoopMode::PlayOnce);
        assert!("bounce".parse::<LoopMode>().is_err());
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        assert!(AnimationModifier::builder().speed(0.0).build().is_err());
        assert!(AnimationModifier::builder().speed(-1.0).build().is_err());
        assert!(AnimationModifier::builder().speed(f32::NAN).build().is_err());
        assert!(AnimationModifier::builder().speed(0.5).build().is_ok());
    }

    #[test]
    fn for_observer_keeps_other_fields() {
        let base = AnimationModifier::builder()
            .loop_mode(LoopMode::Loop)
            .speed(2.0)
            .blend_in_ticks(5)
            .build()
            .unwrap();
        let observer = ObserverId::new_v4();
        let scoped = base.for_observer(observer);
        assert_eq!(scoped.observer(), Some(observer));
        assert_eq!(scoped.loop_mode(), LoopMode::Loop);
        assert!((scoped.speed() - 2.0).abs() < f32::EPSILON);
        assert_eq!(scoped.blend_in_ticks(), 5);
    }
}
