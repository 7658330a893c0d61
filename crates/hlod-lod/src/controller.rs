//! Contract between the LOD state machine and the objects that own a
//! representation's content.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture};

/// Completion of a representation load. Resolves once the content is resident.
pub type LoadFuture = LocalBoxFuture<'static, ()>;

/// Shared handle to a controller. The scene hierarchy holds the strong side.
pub type ControllerHandle = Rc<RefCell<dyn RepresentationController>>;

/// Non-owning handle held by the state machine and its transitions.
pub type WeakControllerHandle = Weak<RefCell<dyn RepresentationController>>;

/// Drives one representation (high or low) of an HLOD node.
///
/// `load` must not be called while another borrow of the controller is held;
/// the returned future is awaited with no borrow outstanding.
pub trait RepresentationController {
    /// Turn on whatever the controller needs to stream its content.
    fn enable(&mut self);

    fn disable(&mut self);

    /// Start bringing the content in. The future may resolve immediately.
    fn load(&mut self) -> LoadFuture;

    /// Make the loaded content visible.
    fn show(&mut self);

    fn hide(&mut self);

    /// Activation flag of the container the representation lives under.
    fn set_active(&mut self, active: bool);

    fn is_active(&self) -> bool;
}

/// Controller for content that is always resident: loads complete immediately.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResidentController {
    enabled: bool,
    active: bool,
    visible: bool,
    loads: u32,
}

impl ResidentController {
    /// Create a controller with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle.
    pub fn into_handle(self) -> ControllerHandle {
        Rc::new(RefCell::new(self))
    }

    /// Whether `enable` was called more recently than `disable`.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the content is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of loads requested so far.
    pub fn load_count(&self) -> u32 {
        self.loads
    }
}

impl RepresentationController for ResidentController {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn load(&mut self) -> LoadFuture {
        self.loads += 1;
        future::ready(()).boxed_local()
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

#[cfg(test)]
pub(crate) mod testing {
    //! Recording controller whose loads complete only when the test says so.

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use futures::channel::oneshot;
    use futures::future::{self, FutureExt};

    use super::{ControllerHandle, LoadFuture, RepresentationController};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Op {
        Enable,
        Disable,
        Load,
        Show,
        Hide,
        Active(bool),
    }

    pub type EventLog = Rc<RefCell<Vec<(&'static str, Op)>>>;

    pub struct RecordingController {
        name: &'static str,
        log: EventLog,
        gated: bool,
        pending: VecDeque<oneshot::Sender<()>>,
        pub visible: bool,
        pub active: bool,
    }

    impl RecordingController {
        pub fn new(name: &'static str, log: &EventLog, gated: bool) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                name,
                log: Rc::clone(log),
                gated,
                pending: VecDeque::new(),
                visible: false,
                active: false,
            }))
        }

        /// Complete the oldest outstanding load. Returns false if none was waiting.
        pub fn finish_load(&mut self) -> bool {
            match self.pending.pop_front() {
                Some(tx) => tx.send(()).is_ok(),
                None => false,
            }
        }

        pub fn pending_loads(&self) -> usize {
            self.pending.len()
        }

        fn record(&self, op: Op) {
            self.log.borrow_mut().push((self.name, op));
        }
    }

    impl RepresentationController for RecordingController {
        fn enable(&mut self) {
            self.record(Op::Enable);
        }

        fn disable(&mut self) {
            self.record(Op::Disable);
        }

        fn load(&mut self) -> LoadFuture {
            self.record(Op::Load);
            if !self.gated {
                return future::ready(()).boxed_local();
            }
            let (tx, rx) = oneshot::channel();
            self.pending.push_back(tx);
            async move {
                let _ = rx.await;
            }
            .boxed_local()
        }

        fn show(&mut self) {
            self.visible = true;
            self.record(Op::Show);
        }

        fn hide(&mut self) {
            self.visible = false;
            self.record(Op::Hide);
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
            self.record(Op::Active(active));
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    pub fn handle(controller: &Rc<RefCell<RecordingController>>) -> ControllerHandle {
        controller.clone()
    }

    pub fn new_log() -> EventLog {
        Rc::new(RefCell::new(Vec::new()))
    }
}
