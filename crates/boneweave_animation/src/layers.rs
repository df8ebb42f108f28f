//! Concurrent animation layers.
//!
//! [`AnimationLayers`] is the reference implementation of the layering
//! contract a model tracker exposes through `animate` / `stop_animation`:
//!
//! - A layer is identified by `(animation name, resolved bone set, observer scope)`.
//!   Starting the same animation on the same bones for the same scope replaces
//!   that layer; anything else stacks a new one.
//! - Stopping an animation removes exactly the matching bones from every layer
//!   of that name. A layer left without bones is dropped.
//! - Per-bone queries are keyed by `(bone, observer)` so an observer-scoped
//!   layer is only visible to its observer.
//!
//! Bone and animation names are interned into a rodeo owned by the table.
//! Only names of layers that actually started are interned, and the rodeo is
//! dropped whenever the table runs empty, so lookups with unknown names never
//! grow it.
//!
//! Blending overlapping layers into a final pose is the renderer's job.

use std::sync::Arc;

use boneweave_core::ObserverId;
use lasso::{Rodeo, Spur};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::filter::BoneFilter;
use crate::modifier::{AnimationModifier, LoopMode};
use crate::playhead::{Playhead, PlayheadEvent};

/// Name and loop mode of the most recently started layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningAnimation {
    pub name: String,
    pub loop_mode: LoopMode,
}

/// One running animation restricted to a bone subset.
#[derive(Debug, Clone)]
pub struct ActiveLayer {
    name: Arc<str>,
    animation: Spur,
    bones: FxHashSet<Spur>,
    modifier: AnimationModifier,
    playhead: Playhead,
}

impl ActiveLayer {
    #[must_use]
    pub fn animation(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn observer(&self) -> Option<ObserverId> {
        self.modifier.observer()
    }

    #[must_use]
    pub fn modifier(&self) -> &AnimationModifier {
        &self.modifier
    }

    #[must_use]
    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn visible_to(&self, observer: Option<ObserverId>) -> bool {
        match self.modifier.observer() {
            None => true,
            scoped => scoped == observer,
        }
    }
}

/// Layer event reported by [`AnimationLayers::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEvent {
    pub animation: String,
    pub observer: Option<ObserverId>,
    pub event: PlayheadEvent,
}

/// The set of layers currently playing on one model instance.
#[derive(Debug, Default)]
pub struct AnimationLayers {
    layers: Vec<ActiveLayer>,
    names: Rodeo,
}

impl AnimationLayers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `animation` on the bones of `bones` selected by `filter`.
    ///
    /// Returns `false` when the filter selects no bone.
    pub fn animate<'a, I>(
        &mut self,
        bones: I,
        filter: &BoneFilter,
        animation: &str,
        length_ticks: u32,
        modifier: &AnimationModifier,
    ) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let selected = filter.select(bones);
        if selected.is_empty() {
            log::debug!("Animation '{animation}' selects no bones, not started");
            return false;
        }

        let name = Arc::<str>::from(animation);
        let animation = self.names.get_or_intern(animation);
        let selected: FxHashSet<Spur> = selected
            .into_iter()
            .map(|bone| self.names.get_or_intern(bone))
            .collect();
        let observer = modifier.observer();
        let before = self.layers.len();
        self.layers.retain(|layer| {
            !(layer.animation == animation
                && layer.modifier.observer() == observer
                && layer.bones == selected)
        });
        if self.layers.len() != before {
            log::debug!("Replacing layer '{name}' on {} bones", selected.len());
        }

        self.layers.push(ActiveLayer {
            name,
            animation,
            bones: selected,
            modifier: modifier.clone(),
            playhead: Playhead::new(length_ticks, modifier),
        });
        true
    }

    /// Stops `animation` on the bones selected by `filter`, in every observer scope.
    ///
    /// Returns `true` if at least one bone stopped.
    pub fn stop<'a, I>(&mut self, bones: I, filter: &BoneFilter, animation: &str) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(animation) = self.names.get(animation) else {
            return false;
        };
        let selected: FxHashSet<Spur> = filter
            .select(bones)
            .into_iter()
            .filter_map(|bone| self.names.get(bone))
            .collect();

        let mut stopped = false;
        for layer in self.layers.iter_mut().filter(|l| l.animation == animation) {
            let before = layer.bones.len();
            layer.bones.retain(|bone| !selected.contains(bone));
            stopped |= layer.bones.len() != before;
        }
        self.layers.retain(|layer| !layer.bones.is_empty());
        self.release_names();
        stopped
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.release_names();
    }

    /// Advances every layer by `dt` ticks and drops finished play-once layers.
    pub fn update(&mut self, dt: f32) -> SmallVec<[LayerEvent; 4]> {
        let mut events = SmallVec::new();
        for layer in &mut self.layers {
            let event = layer.playhead.update(dt);
            if matches!(event, PlayheadEvent::Wrapped | PlayheadEvent::Finished) {
                events.push(LayerEvent {
                    animation: layer.animation().to_string(),
                    observer: layer.observer(),
                    event,
                });
            }
        }
        self.layers.retain(|layer| !layer.playhead.is_finished());
        self.release_names();
        events
    }

    /// Layers that drive `bone` as seen by `observer` (`None` is the global view).
    pub fn layers_for<'s>(
        &'s self,
        bone: &str,
        observer: Option<ObserverId>,
    ) -> impl Iterator<Item = &'s ActiveLayer> + 's {
        let bone = self.names.get(bone);
        self.layers.iter().filter(move |layer| {
            bone.is_some_and(|sym| layer.bones.contains(&sym)) && layer.visible_to(observer)
        })
    }

    #[must_use]
    pub fn is_playing(&self, animation: &str, bone: &str) -> bool {
        let (Some(animation), Some(bone)) = (self.names.get(animation), self.names.get(bone))
        else {
            return false;
        };
        self.layers
            .iter()
            .any(|layer| layer.animation == animation && layer.bones.contains(&bone))
    }

    /// The most recently started layer, if any.
    #[must_use]
    pub fn running(&self) -> Option<RunningAnimation> {
        self.layers.last().map(|layer| RunningAnimation {
            name: layer.animation().to_string(),
            loop_mode: layer.modifier.loop_mode(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveLayer> {
        self.layers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of distinct bone and animation names currently interned.
    #[must_use]
    pub fn interned_names(&self) -> usize {
        self.names.len()
    }

    fn release_names(&mut self) {
        if self.layers.is_empty() && !self.names.is_empty() {
            self.names = Rodeo::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOT: [&str; 5] = ["body", "head", "left_leg", "right_leg", "right_arm"];

    fn modifier(loop_mode: LoopMode) -> AnimationModifier {
        AnimationModifier::builder()
            .loop_mode(loop_mode)
            .build()
            .unwrap()
    }

    #[test]
    fn disjoint_layers_stop_independently() {
        let mut layers = AnimationLayers::new();
        let legs = BoneFilter::names(["left_leg", "right_leg"]);
        let arm = BoneFilter::names(["right_arm"]);

        assert!(layers.animate(ROBOT, &legs, "walk", 20, &modifier(LoopMode::Loop)));
        assert!(layers.animate(ROBOT, &arm, "wave", 10, &modifier(LoopMode::PlayOnce)));
        assert_eq!(layers.len(), 2);

        assert!(layers.stop(ROBOT, &legs, "walk"));
        assert!(!layers.is_playing("walk", "left_leg"));
        assert!(layers.is_playing("wave", "right_arm"));
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn same_animation_same_bones_replaces() {
        let mut layers = AnimationLayers::new();
        let legs = BoneFilter::names(["left_leg", "right_leg"]);
        let same_legs = BoneFilter::custom(|bone| bone.ends_with("_leg"));

        layers.animate(ROBOT, &legs, "walk", 20, &modifier(LoopMode::Loop));
        layers.animate(ROBOT, &same_legs, "walk", 20, &modifier(LoopMode::HoldOnLast));

        assert_eq!(layers.len(), 1);
        assert_eq!(
            layers.running().unwrap().loop_mode,
            LoopMode::HoldOnLast
        );
    }

    #[test]
    fn different_animation_on_overlap_stacks() {
        let mut layers = AnimationLayers::new();
        layers.animate(ROBOT, &BoneFilter::all(), "idle", 40, &modifier(LoopMode::Loop));
        layers.animate(
            ROBOT,
            &BoneFilter::names(["right_arm"]),
            "wave",
            10,
            &modifier(LoopMode::PlayOnce),
        );
        assert_eq!(layers.layers_for("right_arm", None).count(), 2);
        assert_eq!(layers.layers_for("head", None).count(), 1);
    }

    #[test]
    fn partial_stop_keeps_remaining_bones() {
        let mut layers = AnimationLayers::new();
        layers.animate(
            ROBOT,
            &BoneFilter::names(["left_leg", "right_leg"]),
            "walk",
            20,
            &modifier(LoopMode::Loop),
        );
        assert!(layers.stop(ROBOT, &BoneFilter::names(["left_leg"]), "walk"));
        assert!(layers.is_playing("walk", "right_leg"));
        assert!(!layers.is_playing("walk", "left_leg"));
        assert!(!layers.stop(ROBOT, &BoneFilter::names(["left_leg"]), "walk"));
    }

    #[test]
    fn observer_scoped_layer_is_keyed_by_observer() {
        let mut layers = AnimationLayers::new();
        let alice = ObserverId::new_v4();
        let bob = ObserverId::new_v4();
        let wave = modifier(LoopMode::Loop);

        layers.animate(ROBOT, &BoneFilter::names(["right_arm"]), "wave", 10, &wave.for_observer(alice));
        layers.animate(ROBOT, &BoneFilter::names(["right_arm"]), "wave", 10, &wave.for_observer(bob));

        assert_eq!(layers.len(), 2);
        assert_eq!(layers.layers_for("right_arm", Some(alice)).count(), 1);
        assert_eq!(layers.layers_for("right_arm", None).count(), 0);
    }

    #[test]
    fn empty_selection_is_not_applied() {
        let mut layers = AnimationLayers::new();
        assert!(!layers.animate(
            ROBOT,
            &BoneFilter::names(["tail"]),
            "wag",
            10,
            &modifier(LoopMode::Loop)
        ));
        assert!(layers.is_empty());
        assert!(!layers.stop(ROBOT, &BoneFilter::all(), "never_started_animation"));
    }

    #[test]
    fn lookups_never_intern_names() {
        let mut layers = AnimationLayers::new();
        let walk = modifier(LoopMode::Loop);
        layers.animate(ROBOT, &BoneFilter::names(["left_leg", "ghost"]), "walk", 20, &walk);
        // "walk" plus the one live bone selected.
        assert_eq!(layers.interned_names(), 2);

        for i in 0..100 {
            let ghost = format!("ghost_{i}");
            assert!(!layers.is_playing(&ghost, &ghost));
            assert!(!layers.stop(ROBOT, &BoneFilter::names([ghost.as_str()]), &ghost));
            assert_eq!(layers.layers_for(&ghost, None).count(), 0);
        }
        assert!(!layers.animate(ROBOT, &BoneFilter::names(["tail"]), "wag", 10, &walk));
        assert_eq!(layers.interned_names(), 2);
    }

    #[test]
    fn names_are_released_when_the_table_empties() {
        let mut layers = AnimationLayers::new();
        layers.animate(ROBOT, &BoneFilter::all(), "idle", 40, &modifier(LoopMode::Loop));
        layers.animate(ROBOT, &BoneFilter::names(["right_arm"]), "wave", 5, &modifier(LoopMode::PlayOnce));
        assert_eq!(layers.interned_names(), ROBOT.len() + 2);

        assert!(layers.stop(ROBOT, &BoneFilter::all(), "idle"));
        assert!(layers.interned_names() > 0);

        // The play-once layer finishing empties the table.
        layers.update(6.0);
        assert!(layers.is_empty());
        assert_eq!(layers.interned_names(), 0);

        layers.animate(ROBOT, &BoneFilter::names(["head"]), "idle", 40, &modifier(LoopMode::Loop));
        layers.clear();
        assert_eq!(layers.interned_names(), 0);
    }

    #[test]
    fn finished_play_once_layers_are_released() {
        let mut layers = AnimationLayers::new();
        layers.animate(ROBOT, &BoneFilter::names(["right_arm"]), "wave", 5, &modifier(LoopMode::PlayOnce));
        layers.animate(ROBOT, &BoneFilter::names(["left_leg"]), "kick", 5, &modifier(LoopMode::Loop));

        let events = layers.update(6.0);
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.animation == "wave" && e.event == PlayheadEvent::Finished));
        assert!(events.iter().any(|e| e.animation == "kick" && e.event == PlayheadEvent::Wrapped));
        assert!(!layers.is_playing("wave", "right_arm"));
        assert!(layers.is_playing("kick", "left_leg"));
    }
}
