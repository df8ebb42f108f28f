use boneweave_core::{Billboard, Brightness, Color, ItemTransform};
use glam::Quat;

/// Overlay state of one bone, owned by exactly one [`BoneController`].
///
/// Scalar fields stay `None` until first set, meaning "whatever the renderer's
/// static definition says". Per-observer visibility is deliberately absent: it
/// is a transient packet-level override, not state.
///
/// [`BoneController`]: crate::controller::BoneController
#[derive(Debug, Clone, PartialEq)]
pub struct BoneState {
    /// Extra rotation composed onto the animation rotation. Replaced wholesale
    /// on each `rotate`, never accumulated.
    pub custom_rotation: Quat,
    pub item: ItemTransform,
    pub visible: Option<bool>,
    pub interpolation_ticks: Option<u32>,
    pub tint: Option<Color>,
    pub glow: Option<bool>,
    pub glow_color: Option<Color>,
    pub brightness: Option<Brightness>,
    pub view_range: Option<f32>,
    pub shadow_radius: Option<f32>,
    pub billboard: Option<Billboard>,
}

impl BoneState {
    #[must_use]
    pub fn new(item: ItemTransform) -> Self {
        Self {
            custom_rotation: Quat::IDENTITY,
            item,
            visible: None,
            interpolation_ticks: None,
            tint: None,
            glow: None,
            glow_color: None,
            brightness: None,
            view_range: None,
            shadow_radius: None,
            billboard: None,
        }
    }
}
