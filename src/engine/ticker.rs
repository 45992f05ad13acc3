//! Explicit per-frame scheduler.
//!
//! Widgets register once when they are mounted. The ticker only keeps a weak
//! handle, so dropping a widget also takes it off the schedule.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub trait Tick {
    fn tick(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Ticker {
    listeners: Vec<(ListenerId, Weak<RefCell<dyn Tick>>)>,
    next_id: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<T: Tick + 'static>(&mut self, listener: &Rc<RefCell<T>>) -> ListenerId {
        let listener: Rc<RefCell<dyn Tick>> = listener.clone();
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::downgrade(&listener)));
        id
    }

    /// Returns false when `id` was not (or no longer) registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    /// Call every live listener once, in registration order.
    pub fn tick(&mut self) {
        self.listeners.retain(|(_, listener)| listener.strong_count() > 0);
        let live: Vec<Rc<RefCell<dyn Tick>>> = self
            .listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect();
        for listener in live {
            match listener.try_borrow_mut() {
                Ok(mut listener) => listener.tick(),
                // already borrowed further up the stack, skip this frame
                Err(_) => log::warn!("ticker: listener busy, skipped"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
