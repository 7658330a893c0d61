//! One-at-a-time sequencing of asynchronous LOD transitions.
//!
//! Every scheduled transition first awaits the one scheduled before it, so
//! for a given scheduler at most one transition runs at a time and they run
//! in the order they were issued. Transitions are spawned on a local
//! (single-threaded) executor and suspend cooperatively; schedulers of
//! different nodes share the executor but never wait on each other.

use std::future::Future;

use futures::executor::LocalSpawner;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use futures::task::LocalSpawnExt;
use tracing::{trace, warn};

/// Handle to the most recently scheduled transition.
#[derive(Clone)]
pub struct PendingTransition {
    id: u64,
    done: Shared<LocalBoxFuture<'static, ()>>,
}

impl PendingTransition {
    /// Sequence number of the transition within its scheduler, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the transition has run to completion.
    pub fn is_complete(&self) -> bool {
        self.done.peek().is_some()
    }

    /// Future resolving when the transition has completed.
    pub fn wait(&self) -> Shared<LocalBoxFuture<'static, ()>> {
        self.done.clone()
    }
}

/// Chains transitions so each waits for its predecessor.
pub struct TransitionScheduler {
    spawner: LocalSpawner,
    last: Option<PendingTransition>,
    scheduled: u64,
}

impl TransitionScheduler {
    /// Create a scheduler whose transitions are spawned on `spawner`.
    pub fn new(spawner: LocalSpawner) -> Self {
        Self {
            spawner,
            last: None,
            scheduled: 0,
        }
    }

    /// Queue `work` behind the previous transition and spawn it.
    ///
    /// `work` must be lazy (an `async` block): nothing in it runs before the
    /// previous transition has finished.
    pub fn schedule<F>(&mut self, work: F) -> PendingTransition
    where
        F: Future<Output = ()> + 'static,
    {
        self.release_completed();
        let previous = self.last.take();
        self.scheduled += 1;
        let id = self.scheduled;

        let done = async move {
            if let Some(previous) = previous {
                previous.done.await;
            }
            work.await;
            trace!(transition = id, "transition finished");
        }
        .boxed_local()
        .shared();

        let pending = PendingTransition { id, done };
        if let Err(err) = self.spawner.spawn_local(pending.done.clone()) {
            warn!(transition = id, %err, "failed to spawn transition, executor is shut down");
        }
        self.last = Some(pending.clone());
        pending
    }

    /// The most recently scheduled transition, if it has not been released.
    pub fn last(&self) -> Option<&PendingTransition> {
        self.last.as_ref()
    }

    /// Whether a scheduled transition has yet to complete.
    pub fn is_in_flight(&self) -> bool {
        self.last.as_ref().is_some_and(|p| !p.is_complete())
    }

    /// Total number of transitions scheduled so far.
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Drop the handle of a transition that has already finished.
    pub fn release_completed(&mut self) {
        if self.last.as_ref().is_some_and(PendingTransition::is_complete) {
            self.last = None;
        }
    }
}
