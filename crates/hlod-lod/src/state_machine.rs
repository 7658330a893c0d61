//! Visibility state of one HLOD node and the transitions between its
//! high and low representations.

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use tracing::debug;

use crate::controller::{ControllerHandle, WeakControllerHandle};
use crate::scheduler::TransitionScheduler;

/// Which representation of a node is (or is becoming) visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityState {
    /// High-detail representation.
    High,
    /// Low-detail representation.
    Low,
    /// Neither representation.
    #[default]
    Cull,
}

/// Owns the visibility state of a node and drives its representation
/// controllers through chained transitions.
///
/// `show_high` and `show_low` change state immediately and schedule a
/// transition that loads the incoming representation, shows it, then hides
/// the outgoing one. `hide` acts synchronously and invalidates every
/// transition issued before it; an invalidated transition skips its
/// show/hide steps when it resumes.
pub struct LodStateMachine {
    current: VisibilityState,
    high: WeakControllerHandle,
    low: WeakControllerHandle,
    scheduler: TransitionScheduler,
    /// Bumped by `hide`; transitions compare against the value they were issued under.
    generation: Rc<Cell<u64>>,
}

impl LodStateMachine {
    /// The controllers stay owned by the caller; the state machine keeps weak handles.
    pub fn new(high: &ControllerHandle, low: &ControllerHandle, spawner: LocalSpawner) -> Self {
        Self {
            current: VisibilityState::Cull,
            high: Rc::downgrade(high),
            low: Rc::downgrade(low),
            scheduler: TransitionScheduler::new(spawner),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Current visibility state. Updated immediately, ahead of any pending transition.
    pub fn current(&self) -> VisibilityState {
        self.current
    }

    /// Scheduler that sequences this machine's transitions.
    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    /// Whether a scheduled transition is still running or waiting.
    pub fn is_transitioning(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    /// Enable both controllers; the low container is active, the high one inactive.
    pub fn enable(&self) {
        let Some((high, low)) = self.controllers() else {
            return;
        };
        high.borrow_mut().enable();
        low.borrow_mut().enable();

        high.borrow_mut().set_active(false);
        low.borrow_mut().set_active(true);
    }

    /// Disable both controllers and fall back to the high container.
    pub fn disable(&self) {
        let Some((high, low)) = self.controllers() else {
            return;
        };
        high.borrow_mut().disable();
        low.borrow_mut().disable();

        high.borrow_mut().set_active(true);
        low.borrow_mut().set_active(false);
    }

    /// Switch to the high representation.
    ///
    /// High is only ever entered from Low: from Cull a Low transition is
    /// scheduled first, so the low representation is the visible baseline
    /// while the high one loads.
    pub fn show_high(&mut self) {
        if self.current == VisibilityState::High {
            return;
        }
        if self.current != VisibilityState::Low {
            self.show_low();
        }

        self.current = VisibilityState::High;
        self.schedule_switch(self.high.clone(), self.low.clone(), VisibilityState::High);
    }

    /// Switch to the low representation.
    pub fn show_low(&mut self) {
        if self.current == VisibilityState::Low {
            return;
        }

        self.current = VisibilityState::Low;
        self.schedule_switch(self.low.clone(), self.high.clone(), VisibilityState::Low);
    }

    /// Hide both representations right away.
    pub fn hide(&mut self) {
        if self.current == VisibilityState::Cull {
            return;
        }

        self.generation.set(self.generation.get() + 1);
        if let Some(high) = self.high.upgrade() {
            high.borrow_mut().hide();
        }
        if let Some(low) = self.low.upgrade() {
            low.borrow_mut().hide();
        }
        debug!(from = ?self.current, "culled");
        self.current = VisibilityState::Cull;
    }

    fn controllers(&self) -> Option<(ControllerHandle, ControllerHandle)> {
        Some((self.high.upgrade()?, self.low.upgrade()?))
    }

    fn schedule_switch(
        &mut self,
        show: WeakControllerHandle,
        hide: WeakControllerHandle,
        target: VisibilityState,
    ) {
        let generation = Rc::clone(&self.generation);
        let issued = generation.get();

        let pending = self.scheduler.schedule(async move {
            if generation.get() != issued {
                debug!(to = ?target, "transition superseded before load");
                return;
            }
            let Some(incoming) = show.upgrade() else {
                return;
            };
            let load = incoming.borrow_mut().load();
            drop(incoming);
            load.await;

            if generation.get() != issued {
                debug!(to = ?target, "transition superseded during load");
                return;
            }
            if let Some(show) = show.upgrade() {
                show.borrow_mut().show();
            }
            if let Some(hide) = hide.upgrade() {
                hide.borrow_mut().hide();
            }
        });
        debug!(transition = pending.id(), to = ?target, "transition scheduled");
    }
}
