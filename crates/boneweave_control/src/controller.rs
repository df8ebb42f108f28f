//! Bone Controller
//!
//! A [`BoneController`] owns the overlay state of one bone and the handles it
//! needs to push that state to the renderer. Every setter follows the same
//! sequence:
//!
//! 1. validate the input (floats must be finite, ranges non-negative, ...)
//! 2. write the field into [`BoneState`]
//! 3. ask the bone handle to apply the visual change
//! 4. if the handle reports a real change, force a tracker refresh
//!
//! Step 4 is what makes repeated idempotent calls free: setting the same tint
//! twice refreshes viewers once.
//!
//! # Rotation
//!
//! Custom rotation is not written into the bone's static transform. At
//! construction the controller registers one rotation modifier that reads a
//! shared cell on every pose evaluation. `set_rotation` only swaps the value in
//! that cell; there is no re-registration path.

use std::sync::Arc;

use boneweave_core::errors::{BoneError, Result};
use boneweave_core::{
    Billboard, BoneKey, Brightness, Color, EntityId, ItemStack, ObserverId, PlayerLimb,
};
use boneweave_host::{HitBox, ModelDisplay, ModelTracker, RenderedBone, SkinData};
use glam::{Quat, Vec3};
use parking_lot::{Mutex, RwLock};

use crate::state::BoneState;

pub struct BoneController {
    key: BoneKey,
    tracker: Arc<dyn ModelTracker>,
    bone: Arc<dyn RenderedBone>,
    rotation: Arc<RwLock<Quat>>,
    state: Mutex<BoneState>,
    immediate_refresh: bool,
}

impl BoneController {
    /// Wraps a resolved bone and registers its rotation modifier.
    pub fn new(
        key: BoneKey,
        tracker: Arc<dyn ModelTracker>,
        bone: Arc<dyn RenderedBone>,
        immediate_refresh: bool,
    ) -> Self {
        let rotation = Arc::new(RwLock::new(Quat::IDENTITY));
        let cell = Arc::clone(&rotation);
        bone.add_rotation_modifier(Box::new(move |animated: Quat| animated * *cell.read()));

        let state = Mutex::new(BoneState::new(bone.default_item()));
        log::debug!("Created bone controller for {key}");

        Self {
            key,
            tracker,
            bone,
            rotation,
            state,
            immediate_refresh,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn key(&self) -> &BoneKey {
        &self.key
    }

    /// Snapshot of the current overlay state.
    #[must_use]
    pub fn state(&self) -> BoneState {
        self.state.lock().clone()
    }

    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.bone.world_position()
    }

    /// World rotation as Euler angles in radians.
    #[must_use]
    pub fn world_rotation(&self) -> Vec3 {
        self.bone.world_rotation()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.bone.display().is_some_and(|d| !d.is_invisible())
    }

    /// Whether this controller still wraps `bone`.
    #[must_use]
    pub fn wraps(&self, bone: &Arc<dyn RenderedBone>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.bone), Arc::as_ptr(bone))
    }

    pub fn passengers(&self) -> Result<Vec<EntityId>> {
        Ok(self.hit_box()?.passengers())
    }

    // ========================================================================
    // Overlay setters
    // ========================================================================

    /// Replaces the custom rotation. The quaternion is normalized first.
    pub fn set_rotation(&self, rotation: Quat) -> Result<bool> {
        if !rotation.is_finite() || rotation.length_squared() <= f32::EPSILON {
            return Err(BoneError::invalid_payload(
                "rotate",
                format!("{rotation} is not a usable rotation"),
            ));
        }
        let rotation = rotation.normalize();

        let changed = {
            let mut state = self.state.lock();
            let changed = state.custom_rotation != rotation;
            state.custom_rotation = rotation;
            *self.rotation.write() = rotation;
            changed
        };
        if changed {
            self.refresh();
        }
        Ok(changed)
    }

    pub fn set_tint(&self, color: Color) -> bool {
        self.commit(|s| s.tint = Some(color), |bone| bone.tint(color))
    }

    /// Global visibility toggle.
    pub fn set_visible(&self, visible: bool) -> bool {
        self.commit(|s| s.visible = Some(visible), |bone| bone.toggle_part(visible))
    }

    /// Shows or hides this bone for the listed observers only.
    ///
    /// This is a packet-level side channel: it is not recorded in
    /// [`BoneState`] and is lost when an observer reloads the model. With no
    /// observers it falls back to [`set_visible`](Self::set_visible).
    pub fn set_visible_for(&self, visible: bool, observers: &[ObserverId]) -> Result<bool> {
        if observers.is_empty() {
            return Ok(self.set_visible(visible));
        }
        let display = self.display()?;

        let mut bundler = self.tracker.create_bundler();
        if visible {
            display.spawn(bundler.as_mut());
        } else {
            display.remove(bundler.as_mut());
        }
        for observer in observers {
            bundler.send(*observer);
        }
        Ok(true)
    }

    pub fn set_item(&self, item: ItemStack) -> bool {
        self.update_item(|s| s.item = s.item.with_item(item))
    }

    pub fn set_offset(&self, offset: Vec3) -> Result<bool> {
        ensure_finite("offset", offset)?;
        Ok(self.update_item(|s| s.item = s.item.with_offset(offset)))
    }

    pub fn set_scale(&self, scale: Vec3) -> Result<bool> {
        ensure_finite("scale", scale)?;
        Ok(self.update_item(|s| s.item = s.item.with_scale(scale)))
    }

    pub fn set_interpolation_duration(&self, ticks: u32) -> bool {
        self.commit(
            |s| s.interpolation_ticks = Some(ticks),
            |bone| bone.move_duration(ticks),
        )
    }

    pub fn set_glow(&self, glow: bool) -> bool {
        self.commit(|s| s.glow = Some(glow), |bone| bone.glow(glow))
    }

    pub fn set_glow_color(&self, color: Color) -> bool {
        self.commit(|s| s.glow_color = Some(color), |bone| bone.glow_color(color))
    }

    pub fn set_brightness(&self, brightness: Brightness) -> bool {
        self.commit(
            |s| s.brightness = Some(brightness),
            |bone| bone.brightness(brightness),
        )
    }

    pub fn set_billboard(&self, mode: Billboard) -> bool {
        self.commit(|s| s.billboard = Some(mode), |bone| bone.billboard(mode))
    }

    /// Sets the display view range and broadcasts it to current viewers.
    pub fn set_view_range(&self, range: f32) -> Result<bool> {
        ensure_non_negative("view_range", range)?;
        let display = self.display()?;
        {
            let mut state = self.state.lock();
            if state.view_range == Some(range) {
                return Ok(false);
            }
            state.view_range = Some(range);
            display.set_view_range(range);
        }
        self.broadcast_dirty(display.as_ref());
        Ok(true)
    }

    pub fn set_shadow_radius(&self, radius: f32) -> Result<bool> {
        ensure_non_negative("shadow_radius", radius)?;
        let display = self.display()?;
        {
            let mut state = self.state.lock();
            if state.shadow_radius == Some(radius) {
                return Ok(false);
            }
            state.shadow_radius = Some(radius);
            display.set_shadow_radius(radius);
        }
        self.broadcast_dirty(display.as_ref());
        Ok(true)
    }

    /// Maps a resolved player skin part onto this bone.
    pub fn apply_skin(&self, limb: PlayerLimb, skin: &SkinData) -> Result<bool> {
        self.display()?;
        let changed = {
            let _state = self.state.lock();
            self.bone.apply_skin(limb, skin)
        };
        // The item mapper changed even when the texture is identical.
        self.refresh();
        Ok(changed)
    }

    /// Re-sends every field this overlay has set, then refreshes once.
    ///
    /// Used after an animation loop resets the bone's base transform.
    pub fn reapply(&self) -> bool {
        let changed = {
            let state = self.state.lock();
            let bone = self.bone.as_ref();
            let mut changed = bone.item_stack(&state.item);
            if let Some(visible) = state.visible {
                changed |= bone.toggle_part(visible);
            }
            if let Some(color) = state.tint {
                changed |= bone.tint(color);
            }
            if let Some(ticks) = state.interpolation_ticks {
                changed |= bone.move_duration(ticks);
            }
            if let Some(glow) = state.glow {
                changed |= bone.glow(glow);
            }
            if let Some(color) = state.glow_color {
                changed |= bone.glow_color(color);
            }
            if let Some(brightness) = state.brightness {
                changed |= bone.brightness(brightness);
            }
            if let Some(mode) = state.billboard {
                changed |= bone.billboard(mode);
            }
            changed
        };
        self.refresh();
        changed
    }

    // ========================================================================
    // Seats
    // ========================================================================

    pub fn mount(&self, actor: EntityId) -> Result<()> {
        let hit_box = self.hit_box()?;
        if !hit_box.can_mount() {
            return Err(BoneError::capability_absent("free seat", self.key.bone()));
        }
        hit_box.mount(actor);
        Ok(())
    }

    pub fn dismount(&self, actor: EntityId) -> Result<()> {
        self.hit_box()?.dismount(actor);
        Ok(())
    }

    pub fn dismount_all(&self) -> Result<()> {
        self.hit_box()?.dismount_all();
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn commit(
        &self,
        write: impl FnOnce(&mut BoneState),
        push: impl FnOnce(&dyn RenderedBone) -> bool,
    ) -> bool {
        let changed = {
            let mut state = self.state.lock();
            write(&mut state);
            push(self.bone.as_ref())
        };
        if changed {
            self.refresh();
        }
        changed
    }

    fn update_item(&self, write: impl FnOnce(&mut BoneState)) -> bool {
        let changed = {
            let mut state = self.state.lock();
            write(&mut state);
            self.bone.item_stack(&state.item)
        };
        if changed {
            self.refresh();
        }
        changed
    }

    fn refresh(&self) {
        self.tracker.force_update(self.immediate_refresh);
    }

    fn broadcast_dirty(&self, display: &dyn ModelDisplay) {
        let mut bundler = self.tracker.create_bundler();
        display.send_dirty_data(bundler.as_mut());
        if bundler.is_empty() {
            return;
        }
        for viewer in self.tracker.viewers() {
            bundler.send(viewer);
        }
    }

    fn display(&self) -> Result<Arc<dyn ModelDisplay>> {
        self.bone
            .display()
            .ok_or_else(|| BoneError::capability_absent("display", self.key.bone()))
    }

    fn hit_box(&self) -> Result<Arc<dyn HitBox>> {
        self.bone
            .hit_box()
            .ok_or_else(|| BoneError::capability_absent("hit-box", self.key.bone()))
    }
}

impl std::fmt::Debug for BoneController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoneController")
            .field("key", &self.key)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

fn ensure_finite(mechanism: &str, v: Vec3) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(BoneError::invalid_payload(
            mechanism,
            format!("{v} has non-finite components"),
        ))
    }
}

fn ensure_non_negative(mechanism: &str, v: f32) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(BoneError::invalid_payload(
            mechanism,
            format!("expected a non-negative number, got {v}"),
        ))
    }
}
