//! One-shot-safe notification that an editing engine is ready
//!
//! Listeners subscribed before the engine mounts are called when it does;
//! listeners subscribed afterwards are called immediately. Either way a
//! listener never misses the current engine.

use std::fmt;

/// Details passed to mount listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEvent {
    /// Name reported by the engine
    pub engine: String,
    /// 1 for the first mount, incremented on every remount
    pub generation: u32,
}

type Listener = Box<dyn FnMut(&MountEvent)>;

#[derive(Default)]
pub struct MountSignal {
    listeners: Vec<Listener>,
    current: Option<MountEvent>,
    generation: u32,
}

impl MountSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called for every future mount, and right
    /// away if an engine is already mounted.
    pub fn subscribe(&mut self, listener: impl FnMut(&MountEvent) + 'static) {
        let mut listener: Listener = Box::new(listener);
        if let Some(event) = &self.current {
            listener(event);
        }
        self.listeners.push(listener);
    }

    pub(crate) fn mounted(&mut self, engine: &str) {
        self.generation += 1;
        let event = MountEvent {
            engine: engine.to_string(),
            generation: self.generation,
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.current = Some(event);
    }

    pub(crate) fn unmounted(&mut self) {
        self.current = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for MountSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountSignal")
            .field("listeners", &self.listeners.len())
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listener_before_and_after_mount() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signal = MountSignal::new();

        let early = Rc::clone(&seen);
        signal.subscribe(move |e| early.borrow_mut().push(("early", e.generation)));
        assert!(seen.borrow().is_empty());

        signal.mounted("memory");
        let late = Rc::clone(&seen);
        signal.subscribe(move |e| late.borrow_mut().push(("late", e.generation)));

        assert_eq!(*seen.borrow(), vec![("early", 1), ("late", 1)]);
    }

    #[test]
    fn test_remount_notifies_again() {
        let count = Rc::new(RefCell::new(0));
        let mut signal = MountSignal::new();
        let c = Rc::clone(&count);
        signal.subscribe(move |_| *c.borrow_mut() += 1);

        signal.mounted("memory");
        signal.unmounted();
        assert!(!signal.is_mounted());
        signal.mounted("memory");
        assert_eq!(*count.borrow(), 2);
    }
}
