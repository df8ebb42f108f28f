//! Model Service
//!
//! [`ModelService`] is the entry point front-ends talk to. It owns the
//! controller cache and the mechanism dispatcher, resolves entities through
//! the injected [`ModelRegistry`], and schedules renderer work that follows an
//! asynchronous step onto the injected [`MainContext`].
//!
//! # Lifecycle
//!
//! Construction subscribes the cache to model-instance closure, so a closed
//! instance's controllers are evicted without caller involvement. The
//! subscription holds the cache weakly and is removed from the registry when
//! the service is dropped.
//!
//! # Errors
//!
//! Every operation returns [`BoneError`] on rejection. Rejections are ordinary
//! outcomes (an entity despawned, a script passed a bad value) and are logged
//! at `warn` level when [`ServiceConfig::log_rejections`] is set.

use std::sync::Arc;

use boneweave_animation::{AnimationModifier, BoneFilter, LoopMode, RunningAnimation};
use boneweave_control::{BoneController, ControllerCache, MechanismDispatcher, Payload};
use boneweave_core::errors::{BoneError, Result};
use boneweave_core::{BoneKey, EntityId, MainContext, ModelKey, ObserverId, PlayerLimb};
use boneweave_host::{ListenerId, ModelRegistry, ModelTracker, SkinResolver};
use futures::channel::oneshot;
use glam::Vec3;

use crate::config::ServiceConfig;

pub struct ModelService {
    registry: Arc<dyn ModelRegistry>,
    main: Arc<dyn MainContext>,
    skins: Option<Arc<dyn SkinResolver>>,
    cache: Arc<ControllerCache>,
    dispatcher: MechanismDispatcher,
    config: ServiceConfig,
    closed_listener: ListenerId,
}

impl ModelService {
    /// Creates a service and subscribes its cache to instance closure.
    pub fn new(
        registry: Arc<dyn ModelRegistry>,
        main: Arc<dyn MainContext>,
        config: ServiceConfig,
    ) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(ControllerCache::new(config.immediate_refresh));
        let weak = Arc::downgrade(&cache);
        let closed_listener =
            registry.on_instance_closed(Box::new(move |entity: EntityId, model: &str| {
                if let Some(cache) = weak.upgrade() {
                    cache.evict(entity, model);
                }
            }));

        log::info!(
            "Model service started (immediate refresh: {})",
            config.immediate_refresh
        );
        Ok(Self {
            registry,
            main,
            skins: None,
            cache,
            dispatcher: MechanismDispatcher::new(),
            config,
            closed_listener,
        })
    }

    /// Sets the resolver used by [`apply_skin_part`](Self::apply_skin_part).
    #[must_use]
    pub fn with_skin_resolver(mut self, resolver: Arc<dyn SkinResolver>) -> Self {
        self.skins = Some(resolver);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ControllerCache {
        &self.cache
    }

    #[must_use]
    pub fn mechanism_names(&self) -> Vec<&'static str> {
        self.dispatcher.names()
    }

    /// A modifier carrying the configured defaults, to start builders from.
    pub fn default_modifier(&self) -> Result<AnimationModifier> {
        self.config.default_modifier()
    }

    // ========================================================================
    // Controllers & mechanisms
    // ========================================================================

    pub fn resolve_controller(
        &self,
        entity: EntityId,
        model: &str,
        bone: &str,
    ) -> Result<Arc<BoneController>> {
        let key = BoneKey::new(entity, model, bone).map_err(|e| self.reject(e))?;
        self.controller(&key)
    }

    pub fn controller(&self, key: &BoneKey) -> Result<Arc<BoneController>> {
        self.cache
            .resolve(self.registry.as_ref(), key)
            .map_err(|e| self.reject(e))
    }

    /// Applies one named mechanism to a resolved controller.
    pub fn dispatch_mechanism(
        &self,
        controller: &BoneController,
        name: &str,
        payload: &Payload,
    ) -> Result<bool> {
        self.dispatcher
            .dispatch(controller, name, payload)
            .map_err(|e| self.reject(e))
    }

    /// Resolves `key` and applies one named mechanism to it.
    pub fn adjust_bone(&self, key: &BoneKey, name: &str, payload: &Payload) -> Result<bool> {
        let controller = self.controller(key)?;
        self.dispatch_mechanism(&controller, name, payload)
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Starts `animation` on the bones selected by `filter`.
    ///
    /// `Ok(false)` means the tracker did not apply it (unknown animation or
    /// empty selection).
    pub fn start_animation(
        &self,
        entity: EntityId,
        model: &str,
        animation: &str,
        filter: &BoneFilter,
        modifier: &AnimationModifier,
    ) -> Result<bool> {
        let tracker = self.tracker(entity, model)?;
        let applied = tracker.animate(filter, animation, modifier);
        if applied {
            log::debug!(
                "Started '{animation}' on '{model}' ({}, speed {})",
                modifier.loop_mode(),
                modifier.speed()
            );
        } else if self.config.log_rejections {
            log::warn!("Animation '{animation}' was not applied to '{model}' on {entity}");
        }
        Ok(applied)
    }

    pub fn stop_animation(
        &self,
        entity: EntityId,
        model: &str,
        animation: &str,
        filter: &BoneFilter,
    ) -> Result<bool> {
        let tracker = self.tracker(entity, model)?;
        Ok(tracker.stop_animation(filter, animation))
    }

    /// Starts `animation` on the bones selected by `filter`, once per observer.
    ///
    /// Each observer gets its own scoped layer. With no observers a single
    /// global layer is started. Returns the number of layers applied.
    pub fn play_animation_for(
        &self,
        entity: EntityId,
        model: &str,
        animation: &str,
        filter: &BoneFilter,
        modifier: &AnimationModifier,
        observers: &[ObserverId],
    ) -> Result<usize> {
        let tracker = self.tracker(entity, model)?;
        if observers.is_empty() {
            return Ok(usize::from(tracker.animate(filter, animation, modifier)));
        }
        Ok(observers
            .iter()
            .filter(|observer| tracker.animate(filter, animation, &modifier.for_observer(**observer)))
            .count())
    }

    /// Re-sends the overlays of every cached controller of one model instance.
    ///
    /// Hosts call this when a looping layer wraps ([`PlayheadEvent::Wrapped`])
    /// and the renderer has restored the bones' base state. Returns the number
    /// of controllers re-applied.
    ///
    /// [`PlayheadEvent::Wrapped`]: boneweave_animation::PlayheadEvent::Wrapped
    pub fn reapply_overlays(&self, entity: EntityId, model: &str) -> Result<usize> {
        let instance = ModelKey::new(entity, model).map_err(|e| self.reject(e))?;
        self.tracker(entity, model)?;
        let controllers = self.cache.controllers_of(&instance);
        for controller in &controllers {
            controller.reapply();
        }
        log::debug!(
            "Re-applied overlays of {} bones of '{model}' on {entity}",
            controllers.len()
        );
        Ok(controllers.len())
    }

    /// Plays a limb animation on a player.
    ///
    /// `model` must be a registered limb model. When `hide_from` is set, all
    /// of the player's models are hidden from that observer, whether or not
    /// the animation started.
    pub fn play_limb_animation(
        &self,
        player: EntityId,
        model: &str,
        animation: &str,
        loop_mode: LoopMode,
        hide_from: Option<ObserverId>,
    ) -> Result<bool> {
        if !self.registry.limb_models().iter().any(|m| m == model) {
            return Err(self.reject(BoneError::not_applicable(format!("limb model '{model}'"))));
        }
        let modifier = AnimationModifier::builder()
            .loop_mode(loop_mode)
            .speed(self.config.default_speed)
            .build()?;
        let played = self.registry.animate_limb(player, model, animation, &modifier);
        if !played && self.config.log_rejections {
            log::warn!("Limb animation '{animation}' of '{model}' did not start on {player}");
        }

        if let Some(observer) = hide_from {
            let trackers = self.registry.trackers(player);
            if trackers.is_empty() && self.config.log_rejections {
                log::warn!("Player {player} has no models to hide");
            }
            for tracker in trackers {
                tracker.hide(observer);
            }
        }
        Ok(played)
    }

    // ========================================================================
    // Seats
    // ========================================================================

    pub fn mount(&self, controller: &BoneController, actor: EntityId) -> Result<()> {
        controller.mount(actor).map_err(|e| self.reject(e))
    }

    pub fn dismount(&self, controller: &BoneController, actor: EntityId) -> Result<()> {
        controller.dismount(actor).map_err(|e| self.reject(e))
    }

    pub fn dismount_all(&self, controller: &BoneController) -> Result<()> {
        controller.dismount_all().map_err(|e| self.reject(e))
    }

    // ========================================================================
    // Skin parts
    // ========================================================================

    /// Maps `limb` of `source`'s skin onto the bone at `key`.
    ///
    /// The skin is resolved without touching any controller. The mapping
    /// itself runs on the main context, re-resolving the bone first: if the
    /// model closed in the meantime the result is `NotApplicable`.
    pub async fn apply_skin_part(
        &self,
        key: BoneKey,
        limb: PlayerLimb,
        source: EntityId,
    ) -> Result<bool> {
        let resolver = self
            .skins
            .clone()
            .ok_or_else(|| self.reject(BoneError::not_applicable("skin resolver")))?;

        let skin = resolver.resolve(source).await.map_err(|reason| {
            self.reject(BoneError::transient(format!(
                "skin of {source} could not be loaded: {reason}"
            )))
        })?;

        let (tx, rx) = oneshot::channel();
        let registry = Arc::clone(&self.registry);
        let cache = Arc::clone(&self.cache);
        let target = key.clone();
        self.main.execute(Box::new(move || {
            let outcome = cache
                .resolve(registry.as_ref(), &target)
                .and_then(|controller| controller.apply_skin(limb, &skin));
            let _ = tx.send(outcome);
        }));

        let outcome = rx
            .await
            .map_err(|_| BoneError::transient("main context dropped the skin continuation"))
            .and_then(|outcome| outcome);
        if outcome.is_ok() {
            log::debug!("Applied {} skin part of {source} to {key}", limb.as_str());
        }
        outcome.map_err(|e| self.reject(e))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn bone_world_position(&self, entity: EntityId, model: &str, bone: &str) -> Option<Vec3> {
        self.lookup(entity, model, bone).map(|c| c.world_position())
    }

    /// World rotation as Euler angles in radians.
    #[must_use]
    pub fn bone_world_rotation(&self, entity: EntityId, model: &str, bone: &str) -> Option<Vec3> {
        self.lookup(entity, model, bone).map(|c| c.world_rotation())
    }

    /// `false` when the bone cannot be resolved.
    #[must_use]
    pub fn is_bone_visible(&self, entity: EntityId, model: &str, bone: &str) -> bool {
        self.lookup(entity, model, bone)
            .is_some_and(|c| c.is_visible())
    }

    pub fn model_bones(&self, entity: EntityId, model: &str) -> Result<Vec<BoneKey>> {
        let tracker = self.tracker(entity, model)?;
        tracker
            .bones()
            .iter()
            .map(|bone| BoneKey::new(entity, model, bone.name()))
            .collect()
    }

    pub fn model_animations(&self, entity: EntityId, model: &str) -> Result<Vec<String>> {
        Ok(self.tracker(entity, model)?.animations())
    }

    /// Clip length in ticks.
    pub fn animation_duration(
        &self,
        entity: EntityId,
        model: &str,
        animation: &str,
    ) -> Result<Option<u32>> {
        Ok(self.tracker(entity, model)?.animation_length(animation))
    }

    pub fn running_animation(
        &self,
        entity: EntityId,
        model: &str,
    ) -> Result<Option<RunningAnimation>> {
        Ok(self.tracker(entity, model)?.running_animation())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Evicts every controller of a closed model instance.
    ///
    /// Closure reported through the registry already does this; the method
    /// exists for hosts that learn about closure some other way.
    pub fn on_instance_closed(&self, entity: EntityId, model: &str) -> usize {
        self.cache.evict(entity, model)
    }

    /// Drops every cached controller.
    pub fn shutdown(&self) {
        self.cache.clear_all();
        log::info!("Model service shut down");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn tracker(&self, entity: EntityId, model: &str) -> Result<Arc<dyn ModelTracker>> {
        self.registry.tracker(entity, model).ok_or_else(|| {
            self.reject(BoneError::not_applicable(format!(
                "model '{model}' on entity {entity}"
            )))
        })
    }

    /// Quiet lookup for getters, where an unresolvable bone is not an error.
    fn lookup(&self, entity: EntityId, model: &str, bone: &str) -> Option<Arc<BoneController>> {
        let key = BoneKey::new(entity, model, bone).ok()?;
        self.cache.resolve(self.registry.as_ref(), &key).ok()
    }

    fn reject(&self, err: BoneError) -> BoneError {
        if self.config.log_rejections {
            log::warn!("{err}");
        }
        err
    }
}

impl Drop for ModelService {
    fn drop(&mut self) {
        self.registry.remove_closed_listener(self.closed_listener);
    }
}

impl std::fmt::Debug for ModelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelService")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
