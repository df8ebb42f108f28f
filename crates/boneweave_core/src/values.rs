//! Overlay value types.
//!
//! Plain values written into a bone's overlay state and handed to the external
//! renderer. Each constructor validates its range so that a value that exists
//! is always representable on the renderer side.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{BoneError, Result};

// ============================================================================
// Color
// ============================================================================

/// A packed `0xRRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Color(u32);

impl Color {
    pub const WHITE: Self = Self(0x00FF_FFFF);
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Validates a packed integer color.
    pub fn from_packed(value: i64) -> Result<Self> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| {
                BoneError::invalid_payload(
                    "color",
                    format!("{value} is outside 0..={:#08X}", Self::MAX),
                )
            })
    }

    #[inline]
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Color {
    type Error = BoneError;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_packed(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

// ============================================================================
// Brightness
// ============================================================================

/// Block and sky light override, each in `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LightLevels")]
pub struct Brightness {
    block: u8,
    sky: u8,
}

/// Unchecked wire form of [`Brightness`].
#[derive(Deserialize)]
struct LightLevels {
    block: i64,
    sky: i64,
}

impl TryFrom<LightLevels> for Brightness {
    type Error = BoneError;

    fn try_from(levels: LightLevels) -> Result<Self> {
        Self::new(levels.block, levels.sky)
    }
}

impl Brightness {
    pub const MAX_LEVEL: i64 = 15;

    pub fn new(block: i64, sky: i64) -> Result<Self> {
        let level = |name: &str, v: i64| {
            u8::try_from(v)
                .ok()
                .filter(|v| i64::from(*v) <= Self::MAX_LEVEL)
                .ok_or_else(|| {
                    BoneError::invalid_payload(
                        "brightness",
                        format!("{name} light {v} is outside 0..={}", Self::MAX_LEVEL),
                    )
                })
        };
        Ok(Self {
            block: level("block", block)?,
            sky: level("sky", sky)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn block(&self) -> u8 {
        self.block
    }

    #[inline]
    #[must_use]
    pub fn sky(&self) -> u8 {
        self.sky
    }
}

// ============================================================================
// Billboard
// ============================================================================

/// How a bone's display faces its viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Billboard {
    #[default]
    Fixed,
    Vertical,
    Horizontal,
    Center,
}

impl Billboard {
    pub const ALL: [Self; 4] = [Self::Fixed, Self::Vertical, Self::Horizontal, Self::Center];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Center => "center",
        }
    }
}

impl FromStr for Billboard {
    type Err = BoneError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BoneError::invalid_payload(
                    "billboard",
                    format!("'{s}' is not one of fixed, vertical, horizontal, center"),
                )
            })
    }
}

// ============================================================================
// Items
// ============================================================================

/// Opaque description of an item the renderer can display on a bone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_model_data: Option<i32>,
}

impl ItemStack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            custom_model_data: None,
        }
    }

    #[must_use]
    pub fn with_model_data(mut self, data: i32) -> Self {
        self.custom_model_data = Some(data);
        self
    }

    /// The empty item a bone shows when nothing is attached.
    pub fn air() -> Self {
        Self::new("air")
    }
}

/// Item shown by a bone, with its placement.
///
/// Each overlay setter replaces exactly one field and keeps the others.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTransform {
    /// Position of the item relative to the bone pivot.
    pub position: Vec3,
    /// Additional local offset.
    pub offset: Vec3,
    pub scale: Vec3,
    pub item: ItemStack,
}

impl ItemTransform {
    #[must_use]
    pub fn new(item: ItemStack) -> Self {
        Self {
            position: Vec3::ZERO,
            offset: Vec3::ZERO,
            scale: Vec3::ONE,
            item,
        }
    }

    #[must_use]
    pub fn with_item(&self, item: ItemStack) -> Self {
        Self {
            item,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_offset(&self, offset: Vec3) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_scale(&self, scale: Vec3) -> Self {
        Self {
            scale,
            ..self.clone()
        }
    }
}

// ============================================================================
// Player limbs
// ============================================================================

/// Part of a player skin that can be mapped onto a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerLimb {
    Head,
    Body,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl PlayerLimb {
    pub const ALL: [Self; 6] = [
        Self::Head,
        Self::Body,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::LeftLeg => "left_leg",
            Self::RightLeg => "right_leg",
        }
    }
}

impl FromStr for PlayerLimb {
    type Err = BoneError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|limb| limb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BoneError::invalid_payload("part", format!("invalid part name '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_range_is_enforced() {
        assert_eq!(Color::from_packed(0xFF0000).unwrap().packed(), 0xFF0000);
        assert!(Color::from_packed(-1).is_err());
        assert!(Color::from_packed(0x0100_0000).is_err());
        assert_eq!(Color::from_rgb(0x12, 0x34, 0x56).packed(), 0x12_3456);
        assert_eq!(Color::from_rgb(255, 0, 0).to_string(), "#FF0000");
    }

    #[test]
    fn brightness_levels_are_bounded() {
        let b = Brightness::new(15, 0).unwrap();
        assert_eq!((b.block(), b.sky()), (15, 0));
        assert!(Brightness::new(16, 0).is_err());
        assert!(Brightness::new(0, -1).is_err());
    }

    #[test]
    fn deserialized_brightness_is_bounded() {
        let b: Brightness = serde_json::from_str(r#"{ "block": 12, "sky": 3 }"#).unwrap();
        assert_eq!(b, Brightness::new(12, 3).unwrap());
        assert!(serde_json::from_str::<Brightness>(r#"{ "block": 200, "sky": 99 }"#).is_err());
        assert!(serde_json::from_str::<Brightness>(r#"{ "block": -1, "sky": 0 }"#).is_err());

        let text = serde_json::to_string(&b).unwrap();
        assert_eq!(serde_json::from_str::<Brightness>(&text).unwrap(), b);
    }

    #[test]
    fn billboard_parses_case_insensitively() {
        assert_eq!("CENTER".parse::<Billboard>().unwrap(), Billboard::Center);
        assert_eq!(" vertical ".parse::<Billboard>().unwrap(), Billboard::Vertical);
        assert!("sideways".parse::<Billboard>().is_err());
    }

    #[test]
    fn item_transform_setters_touch_one_field() {
        let base = ItemTransform::new(ItemStack::new("stone"));
        let moved = base.with_offset(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(moved.item, base.item);
        assert_eq!(moved.scale, base.scale);
        assert_eq!(moved.offset, Vec3::Y);

        let swapped = moved.with_item(ItemStack::new("diamond_sword"));
        assert_eq!(swapped.offset, Vec3::Y);
        assert_eq!(swapped.item.id, "diamond_sword");
    }

    #[test]
    fn limb_names() {
        assert_eq!("right_arm".parse::<PlayerLimb>().unwrap(), PlayerLimb::RightArm);
        assert!("tail".parse::<PlayerLimb>().is_err());
    }
}
