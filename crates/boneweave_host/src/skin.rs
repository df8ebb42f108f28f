use boneweave_core::EntityId;
use futures::future::BoxFuture;

/// Resolved skin of a player, ready to be mapped onto bones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinData {
    pub owner: EntityId,
    pub texture: String,
    pub slim: bool,
}

/// Asynchronous skin lookup, usually backed by a remote profile service.
pub trait SkinResolver: Send + Sync {
    /// Resolves the skin of `player`. Errors carry a human-readable reason.
    fn resolve(&self, player: EntityId) -> BoxFuture<'static, Result<SkinData, String>>;
}
