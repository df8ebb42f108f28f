//! Per-bone overlay control for Boneweave.
//!
//! - [`BoneController`]: overlay state of one bone plus the setters that push it
//!   to the renderer
//! - [`ControllerCache`]: one controller per bone key, evicted on model close
//! - [`MechanismDispatcher`]: name + payload routing onto controller setters

pub mod cache;
pub mod controller;
pub mod dispatcher;
pub mod mechanism;
pub mod payload;
pub mod state;

pub use cache::ControllerCache;
pub use controller::BoneController;
pub use dispatcher::MechanismDispatcher;
pub use mechanism::{Mechanism, MechanismKind, Observers};
pub use payload::{Payload, TICKS_PER_SECOND};
pub use state::BoneState;
