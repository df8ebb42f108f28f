use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use boneweave_animation::{
    AnimationLayers, AnimationModifier, BoneFilter, LayerEvent, RunningAnimation,
};
use boneweave_core::{EntityId, ObserverId};
use boneweave_host::{ModelTracker, PacketBundler, RenderedBone};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::bone::MockBone;
use crate::capabilities::{PacketLog, RecordingBundler};

/// In-memory model instance.
///
/// Animation requests run through a real [`AnimationLayers`] stack. Refreshes
/// are counted and every bundled packet is recorded per observer.
pub struct MockTracker {
    entity: EntityId,
    name: String,
    bones: RwLock<Vec<Arc<MockBone>>>,
    clips: FxHashMap<String, u32>,
    layers: Mutex<AnimationLayers>,
    refreshes: AtomicUsize,
    packets: Arc<PacketLog>,
    viewers: Mutex<Vec<ObserverId>>,
    hidden: Mutex<Vec<ObserverId>>,
}

impl MockTracker {
    #[must_use]
    pub fn builder(entity: EntityId, name: impl Into<String>) -> MockTrackerBuilder {
        MockTrackerBuilder {
            entity,
            name: name.into(),
            bones: Vec::new(),
            clips: FxHashMap::default(),
            viewers: Vec::new(),
        }
    }

    #[must_use]
    pub fn mock_bone(&self, name: &str) -> Option<Arc<MockBone>> {
        self.bones.read().iter().find(|b| b.name() == name).cloned()
    }

    /// Replaces a bone with a fresh handle, as a model reload would.
    pub fn replace_bone(&self, bone: MockBone) -> Arc<MockBone> {
        let bone = Arc::new(bone);
        let mut bones = self.bones.write();
        bones.retain(|b| b.name() != bone.name());
        bones.push(Arc::clone(&bone));
        bone
    }

    /// Number of `force_update` calls received so far.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn packets(&self) -> &PacketLog {
        &self.packets
    }

    pub fn add_viewer(&self, observer: ObserverId) {
        self.viewers.lock().push(observer);
    }

    #[must_use]
    pub fn hidden_from(&self) -> Vec<ObserverId> {
        self.hidden.lock().clone()
    }

    /// Runs `f` against the live layer stack.
    pub fn with_layers<R>(&self, f: impl FnOnce(&AnimationLayers) -> R) -> R {
        f(&self.layers.lock())
    }

    /// Advances every layer by `dt` ticks.
    pub fn tick(&self, dt: f32) -> SmallVec<[LayerEvent; 4]> {
        self.layers.lock().update(dt)
    }

    fn bone_names(&self) -> Vec<String> {
        self.bones
            .read()
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    }
}

impl ModelTracker for MockTracker {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bone(&self, name: &str) -> Option<Arc<dyn RenderedBone>> {
        self.mock_bone(name).map(|b| b as Arc<dyn RenderedBone>)
    }

    fn bones(&self) -> Vec<Arc<dyn RenderedBone>> {
        self.bones
            .read()
            .iter()
            .map(|b| Arc::clone(b) as Arc<dyn RenderedBone>)
            .collect()
    }

    fn force_update(&self, _immediate: bool) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn animate(&self, filter: &BoneFilter, animation: &str, modifier: &AnimationModifier) -> bool {
        let Some(length) = self.clips.get(animation).copied() else {
            return false;
        };
        let names = self.bone_names();
        self.layers.lock().animate(
            names.iter().map(String::as_str),
            filter,
            animation,
            length,
            modifier,
        )
    }

    fn stop_animation(&self, filter: &BoneFilter, animation: &str) -> bool {
        let names = self.bone_names();
        self.layers
            .lock()
            .stop(names.iter().map(String::as_str), filter, animation)
    }

    fn running_animation(&self) -> Option<RunningAnimation> {
        self.layers.lock().running()
    }

    fn animations(&self) -> Vec<String> {
        let mut names: Vec<_> = self.clips.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn animation_length(&self, animation: &str) -> Option<u32> {
        self.clips.get(animation).copied()
    }

    fn create_bundler(&self) -> Box<dyn PacketBundler> {
        Box::new(RecordingBundler::new(Arc::clone(&self.packets)))
    }

    fn viewers(&self) -> Vec<ObserverId> {
        self.viewers.lock().clone()
    }

    fn hide(&self, observer: ObserverId) {
        self.hidden.lock().push(observer);
    }
}

impl std::fmt::Debug for MockTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTracker")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .field("refreshes", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

pub struct MockTrackerBuilder {
    entity: EntityId,
    name: String,
    bones: Vec<Arc<MockBone>>,
    clips: FxHashMap<String, u32>,
    viewers: Vec<ObserverId>,
}

impl MockTrackerBuilder {
    #[must_use]
    pub fn bone(mut self, bone: MockBone) -> Self {
        self.bones.push(Arc::new(bone));
        self
    }

    /// Adds an animation clip of `length` ticks.
    #[must_use]
    pub fn clip(mut self, name: impl Into<String>, length: u32) -> Self {
        self.clips.insert(name.into(), length);
        self
    }

    #[must_use]
    pub fn viewer(mut self, observer: ObserverId) -> Self {
        self.viewers.push(observer);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<MockTracker> {
        Arc::new(MockTracker {
            entity: self.entity,
            name: self.name,
            bones: RwLock::new(self.bones),
            clips: self.clips,
            layers: Mutex::new(AnimationLayers::new()),
            refreshes: AtomicUsize::new(0),
            packets: Arc::new(PacketLog::default()),
            viewers: Mutex::new(self.viewers),
            hidden: Mutex::new(Vec::new()),
        })
    }
}
