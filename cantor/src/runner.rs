//! The main loop of the firmware.

use heapless::spsc::Consumer;

use crate::event::KeyboardEvent;
use crate::event_queue::EventQueue;
use crate::hid::{HidReporter, HidWriter};
use crate::keyboard::{Keyboard, PlatformCommand};
use crate::timer::Instant;

/// Capacity of the queue of raw events waiting for the keyboard
pub const RAW_EVENT_QUEUE_SIZE: usize = 32;

/// Moves raw events from the matrix into the keyboard and reports out to the host.
///
/// The matrix side owns the `Producer` of the ring and may run in an interrupt, everything
/// else runs in [`KeyboardRunner::poll`] on the main loop.
pub struct KeyboardRunner<'c, 'k, W: HidWriter, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    events: Consumer<'c, KeyboardEvent>,
    queue: EventQueue<RAW_EVENT_QUEUE_SIZE>,
    keyboard: Keyboard<'k, ROW, COL, NUM_LAYER>,
    reporter: HidReporter<W>,
}

impl<'c, 'k, W: HidWriter, const ROW: usize, const COL: usize, const NUM_LAYER: usize>
    KeyboardRunner<'c, 'k, W, ROW, COL, NUM_LAYER>
{
    pub fn new(
        events: Consumer<'c, KeyboardEvent>,
        keyboard: Keyboard<'k, ROW, COL, NUM_LAYER>,
        reporter: HidReporter<W>,
    ) -> Self {
        Self {
            events,
            queue: EventQueue::new(),
            keyboard,
            reporter,
        }
    }

    pub fn keyboard(&self) -> &Keyboard<'k, ROW, COL, NUM_LAYER> {
        &self.keyboard
    }

    pub fn reporter(&self) -> &HidReporter<W> {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut HidReporter<W> {
        &mut self.reporter
    }

    /// One iteration of the main loop at time `now`
    pub fn poll(&mut self, now: Instant) -> Option<PlatformCommand> {
        while !self.queue.is_full() {
            let Some(event) = self.events.dequeue() else {
                break;
            };
            // Can't fail, there is room
            let _ = self.queue.push(event);
        }
        if self.queue.is_full() && self.events.ready() {
            error!("Event queue full, events stay in the ring");
        }

        for event in self.queue.drain_until(now) {
            self.keyboard.process(event);
        }
        self.keyboard.tick(now);
        self.reporter.flush(&mut self.keyboard, now);

        self.keyboard.take_platform_command()
    }
}
