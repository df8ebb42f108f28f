use std::sync::atomic::{AtomicUsize, Ordering};

use boneweave_core::EntityId;
use boneweave_host::{SkinData, SkinResolver};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::BoxFuture;

/// Resolver returning a fixed outcome for every player.
///
/// With `threaded` set, the outcome is produced on a spawned worker thread
/// and delivered through a oneshot channel.
#[derive(Debug)]
pub struct StaticSkinResolver {
    outcome: Result<String, String>,
    threaded: bool,
    calls: AtomicUsize,
}

impl StaticSkinResolver {
    /// Resolves every player to a skin with the given texture.
    #[must_use]
    pub fn texture(texture: impl Into<String>) -> Self {
        Self {
            outcome: Ok(texture.into()),
            threaded: false,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            threaded: false,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn threaded(mut self) -> Self {
        self.threaded = true;
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SkinResolver for StaticSkinResolver {
    fn resolve(&self, player: EntityId) -> BoxFuture<'static, Result<SkinData, String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone().map(|texture| SkinData {
            owner: player,
            texture,
            slim: false,
        });

        if !self.threaded {
            return futures::future::ready(outcome).boxed();
        }

        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let _ = tx.send(outcome);
        });
        async move {
            rx.await
                .unwrap_or_else(|_| Err("skin worker exited".to_string()))
        }
        .boxed()
    }
}
