//! Controller Cache
//!
//! Memoizes one [`BoneController`] per [`BoneKey`]. The cache is an explicit
//! instance; the root service owns one and subscribes it to model-instance
//! closure.
//!
//! # Concurrency
//!
//! Lookups take a read lock. A miss upgrades to the write lock and re-checks
//! through the entry API, so two concurrent first lookups of the same key
//! construct exactly one controller. Controller construction registers a
//! rotation modifier on the renderer, which is why it happens under the write
//! lock rather than optimistically outside it.

use std::sync::Arc;

use boneweave_core::errors::{BoneError, Result};
use boneweave_core::{BoneKey, EntityId, ModelKey};
use boneweave_host::{ModelRegistry, ModelTracker, RenderedBone};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::controller::BoneController;

pub struct ControllerCache {
    controllers: RwLock<FxHashMap<BoneKey, Arc<BoneController>>>,
    immediate_refresh: bool,
}

impl Default for ControllerCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ControllerCache {
    /// `immediate_refresh` is forwarded to every controller's tracker refresh.
    #[must_use]
    pub fn new(immediate_refresh: bool) -> Self {
        Self {
            controllers: RwLock::new(FxHashMap::default()),
            immediate_refresh,
        }
    }

    /// Returns the controller for `key`, creating it on first access.
    ///
    /// Fails with [`BoneError::NotApplicable`] when the model instance or bone
    /// cannot be resolved right now. A cached controller whose bone handle
    /// no longer matches the live one is replaced.
    pub fn resolve(&self, registry: &dyn ModelRegistry, key: &BoneKey) -> Result<Arc<BoneController>> {
        let (tracker, bone) = resolve_handles(registry, key)?;

        {
            let controllers = self.controllers.read();
            if let Some(controller) = controllers.get(key)
                && controller.wraps(&bone)
            {
                return Ok(Arc::clone(controller));
            }
        }

        let mut controllers = self.controllers.write();
        match controllers.get(key) {
            Some(existing) if existing.wraps(&bone) => return Ok(Arc::clone(existing)),
            Some(_) => log::debug!("Bone handle for {key} changed, rebuilding controller"),
            None => {}
        }
        let controller = Arc::new(BoneController::new(
            key.clone(),
            tracker,
            bone,
            self.immediate_refresh,
        ));
        controllers.insert(key.clone(), Arc::clone(&controller));
        Ok(controller)
    }

    /// Returns the cached controller for `key` without creating one.
    #[must_use]
    pub fn get(&self, key: &BoneKey) -> Option<Arc<BoneController>> {
        self.controllers.read().get(key).cloned()
    }

    /// Removes every controller of the `(entity, model)` instance.
    ///
    /// Returns the number of controllers removed.
    pub fn evict(&self, entity: EntityId, model: &str) -> usize {
        match ModelKey::new(entity, model) {
            Ok(model) => self.evict_model(&model),
            // A name that cannot form a key was never cached.
            Err(_) => 0,
        }
    }

    pub fn evict_model(&self, model: &ModelKey) -> usize {
        let mut controllers = self.controllers.write();
        let before = controllers.len();
        controllers.retain(|key, _| !key.belongs_to(model));
        let removed = before - controllers.len();
        if removed > 0 {
            log::debug!(
                "Evicted {removed} bone controllers of '{}' on {}",
                model.model(),
                model.entity()
            );
        }
        removed
    }

    /// Cached controllers of one model instance.
    #[must_use]
    pub fn controllers_of(&self, model: &ModelKey) -> Vec<Arc<BoneController>> {
        self.controllers
            .read()
            .iter()
            .filter(|(key, _)| key.belongs_to(model))
            .map(|(_, controller)| Arc::clone(controller))
            .collect()
    }

    /// Drops every controller. Used on full shutdown.
    pub fn clear_all(&self) {
        let mut controllers = self.controllers.write();
        log::debug!("Clearing {} bone controllers", controllers.len());
        controllers.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.read().is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<BoneKey> {
        self.controllers.read().keys().cloned().collect()
    }
}

fn resolve_handles(
    registry: &dyn ModelRegistry,
    key: &BoneKey,
) -> Result<(Arc<dyn ModelTracker>, Arc<dyn RenderedBone>)> {
    let tracker = registry.tracker(key.entity(), key.model()).ok_or_else(|| {
        BoneError::not_applicable(format!(
            "model '{}' on entity {}",
            key.model(),
            key.entity()
        ))
    })?;
    let bone = tracker
        .bone(key.bone())
        .ok_or_else(|| BoneError::not_applicable(format!("bone '{}' of '{}'", key.bone(), key.model())))?;
    Ok((tracker, bone))
}

impl std::fmt::Debug for ControllerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerCache")
            .field("len", &self.len())
            .field("immediate_refresh", &self.immediate_refresh)
            .finish()
    }
}
