//! In-memory host for Boneweave tests and demos.
//!
//! Implements every capability trait of `boneweave_host` with inspectable
//! state: bones record the last applied values and their rotation modifiers,
//! trackers count refreshes and log packets per observer, and the registry
//! fires closure listeners on [`MockRegistry::close`].

pub mod bone;
pub mod capabilities;
pub mod executor;
pub mod registry;
pub mod skin;
pub mod tracker;

use std::sync::Arc;

use boneweave_core::EntityId;
use glam::Vec3;

pub use bone::{AppliedState, MockBone};
pub use capabilities::{DisplayPacket, MockDisplay, MockHitBox, PacketLog, RecordingBundler};
pub use executor::{DiscardingExecutor, QueuedExecutor};
pub use registry::{LimbCall, MockRegistry};
pub use skin::StaticSkinResolver;
pub use tracker::{MockTracker, MockTrackerBuilder};

/// Initializes `env_logger` for tests. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Bone names of the [`robot`] fixture.
pub const ROBOT_BONES: [&str; 6] = ["body", "head", "left_leg", "right_leg", "right_arm", "p_seat"];

/// A `robot` model on a fresh entity.
///
/// `head` and `right_arm` have displays, `p_seat` is a one-place seat, and the
/// clips are `walk` (20 ticks), `wave` (10) and `idle` (40).
#[must_use]
pub fn robot() -> (EntityId, Arc<MockTracker>) {
    let entity = EntityId::new_v4();
    let tracker = MockTracker::builder(entity, "robot")
        .bone(MockBone::new("body"))
        .bone(MockBone::new("head").with_display().at(Vec3::new(0.0, 1.8, 0.0), Vec3::ZERO))
        .bone(MockBone::new("left_leg"))
        .bone(MockBone::new("right_leg"))
        .bone(MockBone::new("right_arm").with_display())
        .bone(MockBone::new("p_seat").with_hit_box(MockHitBox::default()))
        .clip("walk", 20)
        .clip("wave", 10)
        .clip("idle", 40)
        .build();
    (entity, tracker)
}

/// A registry with one [`robot`] attached and `player_limbs` registered as a
/// limb model.
#[must_use]
pub fn robot_registry() -> (Arc<MockRegistry>, EntityId, Arc<MockTracker>) {
    let registry = Arc::new(MockRegistry::new().with_limb_model("player_limbs"));
    let (entity, tracker) = robot();
    registry.attach(Arc::clone(&tracker));
    (registry, entity, tracker)
}
