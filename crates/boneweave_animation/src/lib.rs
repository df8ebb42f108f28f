//! Animation layering for Boneweave.
//!
//! Bone predicates, validated playback modifiers, and a layer stack that lets
//! several named animations run concurrently on disjoint or overlapping bone
//! subsets of one model, optionally scoped to a single observer.

pub mod filter;
pub mod layers;
pub mod modifier;
pub mod playhead;

pub use filter::BoneFilter;
pub use layers::{ActiveLayer, AnimationLayers, LayerEvent, RunningAnimation};
pub use modifier::{AnimationModifier, AnimationModifierBuilder, LoopMode};
pub use playhead::{Playhead, PlayheadEvent};
