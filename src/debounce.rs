use std::cell::Cell;
use std::rc::Rc;

use crate::page::{Page, TimerId};

/// Coalesces a burst of calls into one action run after a quiet period.
///
/// Each call cancels the pending timer before arming a new one, so only the
/// last action of a burst ever runs.
pub struct Debouncer<P: Page> {
    page: Rc<P>,
    delay_ms: u32,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl<P: Page + 'static> Debouncer<P> {
    pub fn new(page: Rc<P>, delay_ms: u32) -> Self {
        Self {
            page,
            delay_ms,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn call(&self, action: impl FnOnce() + 'static) {
        self.cancel();

        let pending = Rc::clone(&self.pending);
        let id = self.page.set_timeout(
            self.delay_ms,
            Box::new(move || {
                pending.set(None);
                action();
            }),
        );
        self.pending.set(id);
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.page.clear_timeout(id);
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
