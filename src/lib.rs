//! Boneweave
//!
//! Persistent per-bone overlays and concurrent animation layers for skeletal
//! models rendered by an external engine.
//!
//! The external engine plugs in through the capability traits re-exported from
//! [`host`]. Front-ends talk to a [`ModelService`]:
//!
//! ```rust,ignore
//! use boneweave::{ModelService, Payload, ServiceConfig};
//!
//! let service = ModelService::new(registry, main_context, ServiceConfig::default())?;
//! let head = service.resolve_controller(entity, "robot", "head")?;
//! service.dispatch_mechanism(&head, "tint", &Payload::Int(0xFF0000))?;
//! ```

pub mod config;
pub mod service;

pub use boneweave_animation as animation;
pub use boneweave_control as control;
pub use boneweave_host as host;

pub use boneweave_animation::{AnimationModifier, BoneFilter, LoopMode, RunningAnimation};
pub use boneweave_control::{
    BoneController, BoneState, ControllerCache, Mechanism, MechanismDispatcher, MechanismKind,
    Payload,
};
pub use boneweave_core::{
    Billboard, BoneError, BoneKey, Brightness, Color, EntityId, ErrorKind, Immediate,
    ItemStack, MainContext, ModelKey, ObserverId, PlayerLimb, Result,
};
pub use config::ServiceConfig;
pub use service::ModelService;
