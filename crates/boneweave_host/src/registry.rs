use std::sync::Arc;

use boneweave_animation::AnimationModifier;
use boneweave_core::EntityId;

use crate::tracker::ModelTracker;

/// Callback fired with `(entity, model)` when a model instance closes.
pub type ClosedListener = Box<dyn Fn(EntityId, &str) + Send + Sync>;

/// Subscription handle for a [`ClosedListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Entry point into the external model engine.
pub trait ModelRegistry: Send + Sync {
    fn tracker(&self, entity: EntityId, model: &str) -> Option<Arc<dyn ModelTracker>>;

    fn trackers(&self, entity: EntityId) -> Vec<Arc<dyn ModelTracker>>;

    /// Registers a listener for model-instance closure.
    fn on_instance_closed(&self, listener: ClosedListener) -> ListenerId;

    /// Unregisters a listener. Unknown ids are ignored.
    fn remove_closed_listener(&self, id: ListenerId);

    /// Names of the models usable as player limb animators.
    fn limb_models(&self) -> Vec<String>;

    /// Plays a limb animation directly on a player.
    fn animate_limb(
        &self,
        player: EntityId,
        model: &str,
        animation: &str,
        modifier: &AnimationModifier,
    ) -> bool;
}
