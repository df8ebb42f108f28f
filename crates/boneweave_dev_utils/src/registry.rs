use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use boneweave_animation::AnimationModifier;
use boneweave_core::EntityId;
use boneweave_host::{ClosedListener, ListenerId, ModelRegistry, ModelTracker};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::tracker::MockTracker;

/// A limb animation played through [`ModelRegistry::animate_limb`].
#[derive(Debug, Clone, PartialEq)]
pub struct LimbCall {
    pub player: EntityId,
    pub model: String,
    pub animation: String,
    pub modifier: AnimationModifier,
}

/// In-memory model registry.
#[derive(Default)]
pub struct MockRegistry {
    trackers: RwLock<FxHashMap<(EntityId, String), Arc<MockTracker>>>,
    listeners: Mutex<Vec<(ListenerId, ClosedListener)>>,
    next_listener: AtomicU64,
    limb_models: Vec<String>,
    limb_calls: Mutex<Vec<LimbCall>>,
}

impl MockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limb_model(mut self, model: impl Into<String>) -> Self {
        self.limb_models.push(model.into());
        self
    }

    pub fn attach(&self, tracker: Arc<MockTracker>) {
        let key = (tracker.entity(), tracker.name().to_string());
        self.trackers.write().insert(key, tracker);
    }

    /// Detaches a model instance and notifies closure listeners.
    pub fn close(&self, entity: EntityId, model: &str) -> bool {
        let removed = self
            .trackers
            .write()
            .remove(&(entity, model.to_string()))
            .is_some();
        if removed {
            log::debug!("Closing model '{model}' on {entity}");
            for (_, listener) in self.listeners.lock().iter() {
                listener(entity, model);
            }
        }
        removed
    }

    #[must_use]
    pub fn mock_tracker(&self, entity: EntityId, model: &str) -> Option<Arc<MockTracker>> {
        self.trackers.read().get(&(entity, model.to_string())).cloned()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    #[must_use]
    pub fn limb_calls(&self) -> Vec<LimbCall> {
        self.limb_calls.lock().clone()
    }
}

impl ModelRegistry for MockRegistry {
    fn tracker(&self, entity: EntityId, model: &str) -> Option<Arc<dyn ModelTracker>> {
        self.mock_tracker(entity, model)
            .map(|t| t as Arc<dyn ModelTracker>)
    }

    fn trackers(&self, entity: EntityId) -> Vec<Arc<dyn ModelTracker>> {
        self.trackers
            .read()
            .iter()
            .filter(|((owner, _), _)| *owner == entity)
            .map(|(_, t)| Arc::clone(t) as Arc<dyn ModelTracker>)
            .collect()
    }

    fn on_instance_closed(&self, listener: ClosedListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_closed_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }

    fn limb_models(&self) -> Vec<String> {
        self.limb_models.clone()
    }

    fn animate_limb(
        &self,
        player: EntityId,
        model: &str,
        animation: &str,
        modifier: &AnimationModifier,
    ) -> bool {
        if !self.limb_models.iter().any(|m| m == model) {
            return false;
        }
        self.limb_calls.lock().push(LimbCall {
            player,
            model: model.to_string(),
            animation: animation.to_string(),
            modifier: modifier.clone(),
        });
        true
    }
}

impl std::fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRegistry")
            .field("trackers", &self.trackers.read().len())
            .field("limb_models", &self.limb_models)
            .finish_non_exhaustive()
    }
}
