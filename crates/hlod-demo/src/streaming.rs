//! Simulated streaming: loads complete a fixed number of frames after they start.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::FutureExt;
use hlod_lod::{ControllerHandle, LoadFuture, RepresentationController};
use tracing::trace;

#[derive(Default)]
struct ClockState {
    frame: u64,
    waiting: Vec<(u64, oneshot::Sender<()>)>,
}

/// Frame counter that releases loads when they come due.
#[derive(Clone, Default)]
pub struct LoadClock {
    state: Rc<RefCell<ClockState>>,
}

impl LoadClock {
    /// Advance one frame and complete every load that is due.
    pub fn tick(&self) {
        let mut state = self.state.borrow_mut();
        state.frame += 1;
        let now = state.frame;
        let (due, waiting): (Vec<_>, Vec<_>) =
            state.waiting.drain(..).partition(|(at, _)| *at <= now);
        state.waiting = waiting;
        drop(state);

        for (_, tx) in due {
            let _ = tx.send(());
        }
    }

    /// Loads started but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.state.borrow().waiting.len()
    }

    fn schedule(&self, latency: u64) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.borrow_mut();
        let due = state.frame + latency;
        state.waiting.push((due, tx));
        rx
    }
}

/// Controller whose content takes `latency` frames to become resident.
/// Once loaded it stays resident.
pub struct DelayedController {
    name: String,
    clock: LoadClock,
    latency: u64,
    resident: Rc<RefCell<bool>>,
    enabled: bool,
    active: bool,
    visible: bool,
}

impl DelayedController {
    /// Create a controller that loads through `clock`.
    pub fn new(name: impl Into<String>, clock: LoadClock, latency: u64) -> Self {
        Self {
            name: name.into(),
            clock,
            latency,
            resident: Rc::new(RefCell::new(false)),
            enabled: false,
            active: false,
            visible: false,
        }
    }

    /// Wrap in a shared handle.
    pub fn into_handle(self) -> ControllerHandle {
        Rc::new(RefCell::new(self))
    }

    /// Whether the content is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl RepresentationController for DelayedController {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn load(&mut self) -> LoadFuture {
        if *self.resident.borrow() {
            return futures::future::ready(()).boxed_local();
        }
        trace!(root = %self.name, enabled = self.enabled, latency = self.latency, "load started");
        let rx = self.clock.schedule(self.latency);
        let resident = Rc::clone(&self.resident);
        let name = self.name.clone();
        async move {
            let _ = rx.await;
            *resident.borrow_mut() = true;
            trace!(root = %name, "content resident");
        }
        .boxed_local()
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
