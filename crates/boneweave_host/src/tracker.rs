use std::sync::Arc;

use boneweave_animation::{AnimationModifier, BoneFilter, RunningAnimation};
use boneweave_core::{EntityId, ObserverId};

use crate::bone::{PacketBundler, RenderedBone};

/// One model instance attached to one entity.
pub trait ModelTracker: Send + Sync {
    fn entity(&self) -> EntityId;

    fn name(&self) -> &str;

    fn bone(&self, name: &str) -> Option<Arc<dyn RenderedBone>>;

    fn bones(&self) -> Vec<Arc<dyn RenderedBone>>;

    /// Re-sends the current visual state to all viewers.
    fn force_update(&self, immediate: bool);

    /// Starts `animation` on the bones selected by `filter`.
    ///
    /// Layers started on disjoint or partially overlapping selections run
    /// independently. Returns `false` if the animation is unknown or nothing
    /// was selected.
    fn animate(&self, filter: &BoneFilter, animation: &str, modifier: &AnimationModifier) -> bool;

    /// Stops `animation` on exactly the bones selected by `filter`.
    fn stop_animation(&self, filter: &BoneFilter, animation: &str) -> bool;

    fn running_animation(&self) -> Option<RunningAnimation>;

    fn animations(&self) -> Vec<String>;

    /// Clip length in ticks.
    fn animation_length(&self, animation: &str) -> Option<u32>;

    fn create_bundler(&self) -> Box<dyn PacketBundler>;

    /// Observers currently receiving this model.
    fn viewers(&self) -> Vec<ObserverId>;

    /// Stops showing this model to one observer.
    fn hide(&self, observer: ObserverId);
}
