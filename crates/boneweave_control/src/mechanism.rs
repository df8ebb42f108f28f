//! The closed mechanism vocabulary.
//!
//! Each [`Mechanism`] variant carries an already-validated value, so applying
//! one never fails on shape. Parsing a raw [`Payload`] into a `Mechanism` is
//! the only place a malformed value can be rejected, which keeps a call
//! all-or-nothing: nothing touches the controller until parsing succeeded.

use std::fmt;

use boneweave_core::errors::{BoneError, Result};
use boneweave_core::{Billboard, Brightness, Color, ItemStack, ObserverId};
use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::controller::BoneController;
use crate::payload::Payload;

/// Observer list of a per-player `visible` call.
pub type Observers = SmallVec<[ObserverId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismKind {
    Tint,
    Visible,
    Item,
    Offset,
    Scale,
    Rotate,
    InterpolationDuration,
    Glow,
    GlowColor,
    Brightness,
    ViewRange,
    ShadowRadius,
    Billboard,
}

impl MechanismKind {
    pub const ALL: [Self; 13] = [
        Self::Tint,
        Self::Visible,
        Self::Item,
        Self::Offset,
        Self::Scale,
        Self::Rotate,
        Self::InterpolationDuration,
        Self::Glow,
        Self::GlowColor,
        Self::Brightness,
        Self::ViewRange,
        Self::ShadowRadius,
        Self::Billboard,
    ];

    /// Front-end name of this mechanism.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tint => "tint",
            Self::Visible => "visible",
            Self::Item => "item",
            Self::Offset => "offset",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::InterpolationDuration => "interpolation_duration",
            Self::Glow => "glow",
            Self::GlowColor => "glow_color",
            Self::Brightness => "brightness",
            Self::ViewRange => "view_range",
            Self::ShadowRadius => "shadow_radius",
            Self::Billboard => "billboard",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Validates `payload` for this mechanism.
    pub fn parse(self, payload: &Payload) -> Result<Mechanism> {
        let name = self.name();
        Ok(match self {
            Self::Tint => Mechanism::Tint(Color::from_packed(payload.as_int(name)?).map_err(rename(name))?),
            Self::Visible => parse_visible(payload)?,
            Self::Item => Mechanism::Item(match payload {
                Payload::Item(item) => item.clone(),
                Payload::Text(id) if !id.trim().is_empty() => ItemStack::new(id.trim()),
                other => {
                    return Err(BoneError::invalid_payload(
                        name,
                        format!("expected item, got {}", other.type_name()),
                    ));
                }
            }),
            Self::Offset => Mechanism::Offset(payload.as_vector(name)?),
            Self::Scale => Mechanism::Scale(payload.as_vector(name)?),
            Self::Rotate => Mechanism::Rotate(payload.as_quaternion(name)?),
            Self::InterpolationDuration => Mechanism::InterpolationDuration(payload.as_ticks(name)?),
            Self::Glow => Mechanism::Glow(payload.as_bool(name)?),
            Self::GlowColor => {
                Mechanism::GlowColor(Color::from_packed(payload.as_int(name)?).map_err(rename(name))?)
            }
            Self::Brightness => {
                let items = payload.as_list(name)?;
                let [block, sky] = items else {
                    return Err(BoneError::invalid_payload(
                        name,
                        format!("expected a list of 2 integers, got {} elements", items.len()),
                    ));
                };
                Mechanism::Brightness(Brightness::new(block.as_int(name)?, sky.as_int(name)?)?)
            }
            Self::ViewRange => Mechanism::ViewRange(payload.as_float(name)?),
            Self::ShadowRadius => Mechanism::ShadowRadius(payload.as_float(name)?),
            Self::Billboard => Mechanism::Billboard(match payload {
                Payload::Text(mode) => mode.parse()?,
                other => {
                    return Err(BoneError::invalid_payload(
                        name,
                        format!("expected text, got {}", other.type_name()),
                    ));
                }
            }),
        })
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One validated overlay mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mechanism {
    Tint(Color),
    /// Global when `observers` is empty, per-observer otherwise.
    Visible {
        visible: bool,
        observers: Observers,
    },
    Item(ItemStack),
    Offset(Vec3),
    Scale(Vec3),
    Rotate(Quat),
    InterpolationDuration(u32),
    Glow(bool),
    GlowColor(Color),
    Brightness(Brightness),
    ViewRange(f32),
    ShadowRadius(f32),
    Billboard(Billboard),
}

impl Mechanism {
    #[must_use]
    pub fn kind(&self) -> MechanismKind {
        match self {
            Self::Tint(_) => MechanismKind::Tint,
            Self::Visible { .. } => MechanismKind::Visible,
            Self::Item(_) => MechanismKind::Item,
            Self::Offset(_) => MechanismKind::Offset,
            Self::Scale(_) => MechanismKind::Scale,
            Self::Rotate(_) => MechanismKind::Rotate,
            Self::InterpolationDuration(_) => MechanismKind::InterpolationDuration,
            Self::Glow(_) => MechanismKind::Glow,
            Self::GlowColor(_) => MechanismKind::GlowColor,
            Self::Brightness(_) => MechanismKind::Brightness,
            Self::ViewRange(_) => MechanismKind::ViewRange,
            Self::ShadowRadius(_) => MechanismKind::ShadowRadius,
            Self::Billboard(_) => MechanismKind::Billboard,
        }
    }

    /// Applies this mutation through the matching controller setter.
    ///
    /// Returns whether the renderer reported a change.
    pub fn apply(self, controller: &BoneController) -> Result<bool> {
        match self {
            Self::Tint(color) => Ok(controller.set_tint(color)),
            Self::Visible { visible, observers } => controller.set_visible_for(visible, &observers),
            Self::Item(item) => Ok(controller.set_item(item)),
            Self::Offset(offset) => controller.set_offset(offset),
            Self::Scale(scale) => controller.set_scale(scale),
            Self::Rotate(rotation) => controller.set_rotation(rotation),
            Self::InterpolationDuration(ticks) => Ok(controller.set_interpolation_duration(ticks)),
            Self::Glow(glow) => Ok(controller.set_glow(glow)),
            Self::GlowColor(color) => Ok(controller.set_glow_color(color)),
            Self::Brightness(brightness) => Ok(controller.set_brightness(brightness)),
            Self::ViewRange(range) => controller.set_view_range(range),
            Self::ShadowRadius(radius) => controller.set_shadow_radius(radius),
            Self::Billboard(mode) => Ok(controller.set_billboard(mode)),
        }
    }
}

/// `visible` takes a boolean, or a list of one boolean followed by observers.
fn parse_visible(payload: &Payload) -> Result<Mechanism> {
    const NAME: &str = "visible";
    match payload {
        Payload::List(items) => {
            let Some((first, rest)) = items.split_first() else {
                return Err(BoneError::invalid_payload(
                    NAME,
                    "expected [boolean, observers...], got an empty list",
                ));
            };
            let visible = first.as_bool(NAME)?;
            let observers = rest
                .iter()
                .map(|item| item.as_observer(NAME))
                .collect::<Result<Observers>>()?;
            Ok(Mechanism::Visible { visible, observers })
        }
        other => Ok(Mechanism::Visible {
            visible: other.as_bool(NAME)?,
            observers: Observers::new(),
        }),
    }
}

/// Re-labels a value-type error with the mechanism it was parsed for.
fn rename(mechanism: &'static str) -> impl Fn(BoneError) -> BoneError {
    move |err| match err {
        BoneError::InvalidPayload { reason, .. } => BoneError::invalid_payload(mechanism, reason),
        other => other,
    }
}
