use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::page::TimerId;

/// Owns the callback handle of every armed timer until it is cleared or has run.
///
/// A handle is never dropped from inside its own invocation: fired entries
/// are only swept on the next `arm`.
pub struct TimerSlots<T> {
    slots: RefCell<HashMap<TimerId, (T, Rc<Cell<bool>>)>>,
}

impl<T> TimerSlots<T> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Flag the callback sets once it has finished running.
    pub fn fired_flag() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(false))
    }

    pub fn arm(&self, id: TimerId, handle: T, fired: Rc<Cell<bool>>) {
        self.sweep();
        self.slots.borrow_mut().insert(id, (handle, fired));
    }

    pub fn release(&self, id: TimerId) -> Option<T> {
        self.slots.borrow_mut().remove(&id).map(|(handle, _)| handle)
    }

    fn sweep(&self) {
        let fired: Vec<TimerId> = self
            .slots
            .borrow()
            .iter()
            .filter(|(_, (_, fired))| fired.get())
            .map(|(id, _)| *id)
            .collect();
        for id in fired {
            drop(self.release(id));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }
}
