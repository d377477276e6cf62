//! Hot-module-replacement hooks.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Host-provided hot-update context for one module instance.
pub trait HotContext {
    /// Run `callback` before this module instance is replaced.
    fn dispose(&self, callback: Box<dyn FnOnce()>);

    /// Declare that the module can be replaced in place.
    fn accept(&self);
}

/// Hot context kept by a host across re-evaluations of one module.
///
/// Calling [`HotSlot::replace`] runs the disposers registered by the outgoing
/// instance before the new one is instantiated.
#[derive(Default)]
pub struct HotSlot {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    accepted: Cell<bool>,
}

impl HotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted.get()
    }

    /// Run and clear pending disposers. Returns how many ran.
    pub fn replace(&self) -> usize {
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        let count = disposers.len();
        for dispose in disposers {
            dispose();
        }
        self.accepted.set(false);
        count
    }
}

impl HotContext for HotSlot {
    fn dispose(&self, callback: Box<dyn FnOnce()>) {
        self.disposers.borrow_mut().push(callback);
    }

    fn accept(&self) {
        self.accepted.set(true);
    }
}

impl fmt::Debug for HotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotSlot")
            .field("disposers", &self.disposers.borrow().len())
            .field("accepted", &self.accepted.get())
            .finish()
    }
}
