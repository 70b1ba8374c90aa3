//! Bounded FIFO of raw key events.

use heapless::Deque;

use crate::event::KeyboardEvent;
use crate::timer::Instant;

/// A FIFO of key events in arrival order.
///
/// Besides normal FIFO use, events can be put back at the front, which is how the
/// tap/hold resolver replays the keys it held back while it was undecided.
#[derive(Debug, Default)]
pub struct EventQueue<const N: usize> {
    events: Deque<KeyboardEvent, N>,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self { events: Deque::new() }
    }

    /// Append an event, handing it back if the queue is full
    pub fn push(&mut self, event: KeyboardEvent) -> Result<(), KeyboardEvent> {
        self.events.push_back(event)
    }

    /// Put an event back in front of everything else
    pub fn push_front(&mut self, event: KeyboardEvent) -> Result<(), KeyboardEvent> {
        self.events.push_front(event)
    }

    pub fn pop_front(&mut self) -> Option<KeyboardEvent> {
        self.events.pop_front()
    }

    /// The `i`-th event from the front
    pub fn peek(&self, i: usize) -> Option<&KeyboardEvent> {
        self.events.get(i)
    }

    /// Pop every event that happened at or before `t`, in order
    pub fn drain_until(&mut self, t: Instant) -> DrainUntil<'_, N> {
        DrainUntil { queue: self, until: t }
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyboardEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Iterator returned by [`EventQueue::drain_until`]
pub struct DrainUntil<'q, const N: usize> {
    queue: &'q mut EventQueue<N>,
    until: Instant,
}

impl<const N: usize> Iterator for DrainUntil<'_, N> {
    type Item = KeyboardEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.queue.events.front() {
            Some(e) if self.until.has_reached(e.time) => self.queue.events.pop_front(),
            _ => None,
        }
    }
}
