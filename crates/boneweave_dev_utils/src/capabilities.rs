use std::sync::Arc;

use boneweave_core::{EntityId, ObserverId};
use boneweave_host::{HitBox, ModelDisplay, Packet, PacketBundler};
use parking_lot::Mutex;

// ============================================================================
// Packets
// ============================================================================

/// Packet kinds emitted by [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayPacket {
    Spawn { bone: String },
    Remove { bone: String },
    EntityData { bone: String },
}

/// Every packet delivered by a tracker's bundlers, in send order.
#[derive(Debug, Default)]
pub struct PacketLog {
    sent: Mutex<Vec<(ObserverId, DisplayPacket)>>,
}

impl PacketLog {
    #[must_use]
    pub fn sent(&self) -> Vec<(ObserverId, DisplayPacket)> {
        self.sent.lock().clone()
    }

    #[must_use]
    pub fn for_observer(&self, observer: ObserverId) -> Vec<DisplayPacket> {
        self.sent
            .lock()
            .iter()
            .filter(|(to, _)| *to == observer)
            .map(|(_, packet)| packet.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

/// Bundler that writes into a shared [`PacketLog`] on `send`.
pub struct RecordingBundler {
    packets: Vec<DisplayPacket>,
    log: Arc<PacketLog>,
}

impl RecordingBundler {
    #[must_use]
    pub fn new(log: Arc<PacketLog>) -> Self {
        Self {
            packets: Vec::new(),
            log,
        }
    }
}

impl PacketBundler for RecordingBundler {
    fn push(&mut self, packet: Packet) {
        match packet.downcast::<DisplayPacket>() {
            Ok(packet) => self.packets.push(*packet),
            Err(_) => log::warn!("RecordingBundler ignored a foreign packet type"),
        }
    }

    fn send(&self, observer: ObserverId) {
        let mut sent = self.log.sent.lock();
        sent.extend(self.packets.iter().map(|p| (observer, p.clone())));
    }

    fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

// ============================================================================
// Display
// ============================================================================

#[derive(Debug)]
pub struct MockDisplay {
    bone: String,
    inner: Mutex<DisplayState>,
}

#[derive(Debug, Default)]
struct DisplayState {
    invisible: bool,
    view_range: f32,
    shadow_radius: f32,
    dirty: bool,
}

impl MockDisplay {
    #[must_use]
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            inner: Mutex::new(DisplayState {
                view_range: 1.0,
                ..DisplayState::default()
            }),
        }
    }

    pub fn set_invisible(&self, invisible: bool) {
        self.inner.lock().invisible = invisible;
    }

    #[must_use]
    pub fn view_range(&self) -> f32 {
        self.inner.lock().view_range
    }

    #[must_use]
    pub fn shadow_radius(&self) -> f32 {
        self.inner.lock().shadow_radius
    }
}

impl ModelDisplay for MockDisplay {
    fn is_invisible(&self) -> bool {
        self.inner.lock().invisible
    }

    fn spawn(&self, bundler: &mut dyn PacketBundler) {
        bundler.push(Box::new(DisplayPacket::Spawn {
            bone: self.bone.clone(),
        }));
    }

    fn remove(&self, bundler: &mut dyn PacketBundler) {
        bundler.push(Box::new(DisplayPacket::Remove {
            bone: self.bone.clone(),
        }));
    }

    fn set_view_range(&self, range: f32) {
        let mut inner = self.inner.lock();
        inner.view_range = range;
        inner.dirty = true;
    }

    fn set_shadow_radius(&self, radius: f32) {
        let mut inner = self.inner.lock();
        inner.shadow_radius = radius;
        inner.dirty = true;
    }

    fn send_dirty_data(&self, bundler: &mut dyn PacketBundler) {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.dirty) {
            bundler.push(Box::new(DisplayPacket::EntityData {
                bone: self.bone.clone(),
            }));
        }
    }
}

// ============================================================================
// Hit-box
// ============================================================================

/// A seat with a fixed number of places.
#[derive(Debug)]
pub struct MockHitBox {
    capacity: usize,
    passengers: Mutex<Vec<EntityId>>,
}

impl Default for MockHitBox {
    fn default() -> Self {
        Self::with_capacity(1)
    }
}

impl MockHitBox {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            passengers: Mutex::new(Vec::new()),
        }
    }
}

impl HitBox for MockHitBox {
    fn can_mount(&self) -> bool {
        self.passengers.lock().len() < self.capacity
    }

    fn mount(&self, actor: EntityId) {
        let mut passengers = self.passengers.lock();
        if !passengers.contains(&actor) {
            passengers.push(actor);
        }
    }

    fn dismount(&self, actor: EntityId) {
        self.passengers.lock().retain(|p| *p != actor);
    }

    fn dismount_all(&self) {
        self.passengers.lock().clear();
    }

    fn passengers(&self) -> Vec<EntityId> {
        self.passengers.lock().clone()
    }
}
