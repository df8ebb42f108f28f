//! Renderer Capability Interfaces
//!
//! Boneweave does not render anything. Bone transforms, packet transmission,
//! hit-boxes and skin resolution belong to an external model engine, which
//! plugs in by implementing the traits in this crate:
//!
//! - [`ModelRegistry`]: resolves entities to attached model trackers and
//!   reports model-instance closure
//! - [`ModelTracker`]: one attached model; owns bones, refreshes and animation layers
//! - [`RenderedBone`]: per-bone visual capabilities
//! - [`HitBox`] / [`ModelDisplay`]: optional per-bone capabilities
//! - [`PacketBundler`]: targeted packet delivery to individual observers
//! - [`SkinResolver`]: asynchronous appearance lookup
//!
//! Every method that mutates a visual property returns `true` only when the
//! value actually changed, which lets callers skip redundant refreshes.

pub mod bone;
pub mod registry;
pub mod skin;
pub mod tracker;

pub use bone::{HitBox, ModelDisplay, Packet, PacketBundler, RenderedBone, RotationModifier};
pub use registry::{ClosedListener, ListenerId, ModelRegistry};
pub use skin::{SkinData, SkinResolver};
pub use tracker::ModelTracker;
