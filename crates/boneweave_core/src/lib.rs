//! Foundational types shared by every Boneweave crate: bone identity, overlay
//! values, the error taxonomy and the main-context executor seam.

pub mod errors;
pub mod executor;
pub mod key;
pub mod values;

pub use errors::{BoneError, ErrorKind, Result};
pub use executor::{Immediate, MainContext, Task};
pub use key::{BoneKey, ModelKey};
pub use values::{Billboard, Brightness, Color, ItemStack, ItemTransform, PlayerLimb};

/// Identity of an entity in the host world.
pub type EntityId = uuid::Uuid;

/// Identity of a viewing party (a player client).
pub type ObserverId = uuid::Uuid;
