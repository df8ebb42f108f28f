use std::any::Any;
use std::sync::Arc;

use boneweave_core::{
    Billboard, Brightness, Color, EntityId, ItemTransform, ObserverId, PlayerLimb,
};
use glam::{Quat, Vec3};

use crate::skin::SkinData;

/// Composes the animation-computed rotation with an extra rotation.
///
/// Registered once per bone controller and evaluated by the renderer on every
/// pose update.
pub type RotationModifier = Box<dyn Fn(Quat) -> Quat + Send + Sync>;

/// Renderer-defined packet. The core only moves packets between a display
/// and a bundler and never inspects them.
pub type Packet = Box<dyn Any + Send>;

/// Packets collected for delivery to a chosen set of observers.
pub trait PacketBundler: Send {
    fn push(&mut self, packet: Packet);

    /// Sends everything bundled so far to one observer.
    fn send(&self, observer: ObserverId);

    fn is_empty(&self) -> bool;
}

/// The display entity backing a visible bone.
pub trait ModelDisplay: Send + Sync {
    fn is_invisible(&self) -> bool;

    /// Bundles the packets that spawn this display.
    fn spawn(&self, bundler: &mut dyn PacketBundler);

    /// Bundles the packets that remove this display.
    fn remove(&self, bundler: &mut dyn PacketBundler);

    fn set_view_range(&self, range: f32);

    fn set_shadow_radius(&self, radius: f32);

    /// Bundles the entity-data fields changed since the last send.
    fn send_dirty_data(&self, bundler: &mut dyn PacketBundler);
}

/// Seat behaviour of a bone configured as mountable.
pub trait HitBox: Send + Sync {
    /// Whether the seat currently accepts a rider.
    fn can_mount(&self) -> bool;

    fn mount(&self, actor: EntityId);

    fn dismount(&self, actor: EntityId);

    fn dismount_all(&self);

    fn passengers(&self) -> Vec<EntityId>;
}

/// One bone of an attached model, as the renderer exposes it.
pub trait RenderedBone: Send + Sync {
    fn name(&self) -> &str;

    /// Item placement from the model's static definition.
    fn default_item(&self) -> ItemTransform;

    fn tint(&self, color: Color) -> bool;

    fn toggle_part(&self, visible: bool) -> bool;

    fn item_stack(&self, transform: &ItemTransform) -> bool;

    fn move_duration(&self, ticks: u32) -> bool;

    fn glow(&self, glow: bool) -> bool;

    fn glow_color(&self, color: Color) -> bool;

    fn brightness(&self, brightness: Brightness) -> bool;

    fn billboard(&self, mode: Billboard) -> bool;

    /// Maps a player skin part onto this bone.
    fn apply_skin(&self, limb: PlayerLimb, skin: &SkinData) -> bool;

    fn add_rotation_modifier(&self, modifier: RotationModifier);

    fn hit_box(&self) -> Option<Arc<dyn HitBox>>;

    fn display(&self) -> Option<Arc<dyn ModelDisplay>>;

    fn world_position(&self) -> Vec3;

    /// World rotation as Euler angles in radians.
    fn world_rotation(&self) -> Vec3;
}
