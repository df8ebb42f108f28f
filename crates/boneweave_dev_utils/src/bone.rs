use std::sync::Arc;

use boneweave_core::{
    Billboard, Brightness, Color, ItemStack, ItemTransform, PlayerLimb,
};
use boneweave_host::{HitBox, ModelDisplay, RenderedBone, RotationModifier, SkinData};
use glam::{Quat, Vec3};
use parking_lot::Mutex;

use crate::capabilities::{MockDisplay, MockHitBox};

/// Values last applied to a [`MockBone`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedState {
    pub visible: bool,
    pub item: ItemTransform,
    pub tint: Option<Color>,
    pub move_duration: Option<u32>,
    pub glow: bool,
    pub glow_color: Option<Color>,
    pub brightness: Option<Brightness>,
    pub billboard: Billboard,
    pub skin: Option<(PlayerLimb, SkinData)>,
}

impl AppliedState {
    fn initial(item: &ItemTransform) -> Self {
        Self {
            visible: true,
            item: item.clone(),
            tint: None,
            move_duration: None,
            glow: false,
            glow_color: None,
            brightness: None,
            billboard: Billboard::Fixed,
            skin: None,
        }
    }
}

/// In-memory bone whose setters report a change only when the value differs.
pub struct MockBone {
    name: String,
    default_item: ItemTransform,
    applied: Mutex<AppliedState>,
    modifiers: Mutex<Vec<RotationModifier>>,
    hit_box: Option<Arc<MockHitBox>>,
    display: Option<Arc<MockDisplay>>,
    position: Vec3,
    rotation: Vec3,
}

impl MockBone {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let default_item = ItemTransform::new(ItemStack::new("paper").with_model_data(1));
        Self {
            name: name.into(),
            applied: Mutex::new(AppliedState::initial(&default_item)),
            default_item,
            modifiers: Mutex::new(Vec::new()),
            hit_box: None,
            display: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn with_hit_box(mut self, hit_box: MockHitBox) -> Self {
        self.hit_box = Some(Arc::new(hit_box));
        self
    }

    #[must_use]
    pub fn with_display(mut self) -> Self {
        self.display = Some(Arc::new(MockDisplay::new(self.name.clone())));
        self
    }

    #[must_use]
    pub fn at(mut self, position: Vec3, rotation: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn applied(&self) -> AppliedState {
        self.applied.lock().clone()
    }

    /// Restores the static definition, as an animation loop restart does.
    pub fn reset(&self) {
        *self.applied.lock() = AppliedState::initial(&self.default_item);
    }

    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.modifiers.lock().len()
    }

    /// Runs `animated` through every registered rotation modifier in order.
    #[must_use]
    pub fn evaluate_rotation(&self, animated: Quat) -> Quat {
        self.modifiers
            .lock()
            .iter()
            .fold(animated, |rotation, modifier| modifier(rotation))
    }

    #[must_use]
    pub fn mock_display(&self) -> Option<Arc<MockDisplay>> {
        self.display.clone()
    }

    #[must_use]
    pub fn mock_hit_box(&self) -> Option<Arc<MockHitBox>> {
        self.hit_box.clone()
    }

    fn swap<T: PartialEq>(slot: &mut T, value: T) -> bool {
        if *slot == value {
            false
        } else {
            *slot = value;
            true
        }
    }
}

impl RenderedBone for MockBone {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_item(&self) -> ItemTransform {
        self.default_item.clone()
    }

    fn tint(&self, color: Color) -> bool {
        Self::swap(&mut self.applied.lock().tint, Some(color))
    }

    fn toggle_part(&self, visible: bool) -> bool {
        Self::swap(&mut self.applied.lock().visible, visible)
    }

    fn item_stack(&self, transform: &ItemTransform) -> bool {
        Self::swap(&mut self.applied.lock().item, transform.clone())
    }

    fn move_duration(&self, ticks: u32) -> bool {
        Self::swap(&mut self.applied.lock().move_duration, Some(ticks))
    }

    fn glow(&self, glow: bool) -> bool {
        Self::swap(&mut self.applied.lock().glow, glow)
    }

    fn glow_color(&self, color: Color) -> bool {
        Self::swap(&mut self.applied.lock().glow_color, Some(color))
    }

    fn brightness(&self, brightness: Brightness) -> bool {
        Self::swap(&mut self.applied.lock().brightness, Some(brightness))
    }

    fn billboard(&self, mode: Billboard) -> bool {
        Self::swap(&mut self.applied.lock().billboard, mode)
    }

    fn apply_skin(&self, limb: PlayerLimb, skin: &SkinData) -> bool {
        Self::swap(&mut self.applied.lock().skin, Some((limb, skin.clone())))
    }

    fn add_rotation_modifier(&self, modifier: RotationModifier) {
        self.modifiers.lock().push(modifier);
    }

    fn hit_box(&self) -> Option<Arc<dyn HitBox>> {
        self.hit_box.clone().map(|h| h as Arc<dyn HitBox>)
    }

    fn display(&self) -> Option<Arc<dyn ModelDisplay>> {
        self.display.clone().map(|d| d as Arc<dyn ModelDisplay>)
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn world_rotation(&self) -> Vec3 {
        self.rotation
    }
}

impl std::fmt::Debug for MockBone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBone")
            .field("name", &self.name)
            .field("applied", &*self.applied.lock())
            .field("modifiers", &self.modifier_count())
            .finish_non_exhaustive()
    }
}
