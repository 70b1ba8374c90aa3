//! Millisecond time base of the engine.
//!
//! The clock is a free running 32-bit millisecond counter supplied by the platform,
//! so every comparison goes through wrapping arithmetic.

use core::ops::{Add, Sub};

/// A point in time, in milliseconds since an arbitrary epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u32);

impl Instant {
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Whether `self` is at or after `deadline`, correct across wrap as long as the two are
    /// less than 2^31 ms apart.
    pub const fn has_reached(self, deadline: Instant) -> bool {
        (self.0.wrapping_sub(deadline.0) as i32) >= 0
    }

    /// Time passed since `earlier`, zero if `earlier` is actually in the future
    pub const fn duration_since(self, earlier: Instant) -> Duration {
        let diff = self.0.wrapping_sub(earlier.0);
        if (diff as i32) < 0 { Duration(0) } else { Duration(diff) }
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0.wrapping_add(rhs.0))
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.duration_since(rhs)
    }
}

/// A span of time in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duration(u32);

impl Duration {
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn from_secs(s: u32) -> Self {
        Self(s * 1000)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }
}

/// A one-shot deadline. The engine polls it; nothing fires on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer to expire `timeout` after `start`, replacing any previous deadline
    pub fn start(&mut self, start: Instant, timeout: Duration) {
        self.deadline = Some(start + timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Armed and not yet expired at `now`
    pub fn is_running(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(d) if !now.has_reached(d))
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(d) if now.has_reached(d))
    }

    /// Disarm and return true if the deadline has passed at `now`
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        if self.is_expired(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
