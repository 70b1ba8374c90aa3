//! Types and traits for getting HID reports to the host.

use serde::Serialize;
use usbd_hid::descriptor::{AsInputReport, MediaKeyboardReport, SystemControlReport};

use crate::config::HID_WATCHDOG;
use crate::descriptor::KeyboardReport;
use crate::timer::{Duration, Instant};

#[derive(Serialize)]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
    /// Media keyboard report
    MediaKeyboardReport(MediaKeyboardReport),
    /// System control report
    SystemControlReport(SystemControlReport),
}

impl AsInputReport for Report {}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// The endpoint didn't take the report, try again later
    EndpointBusy,
    /// The host hasn't configured the device, or suspended it
    Disabled,
    ReportSerializeError,
    BufferOverflow,
}

/// The transport that carries reports to the host, USB in practice.
pub trait HidWriter {
    /// Write a report to the host, return the number of bytes written if success.
    fn write_report(&mut self, report: &Report) -> Result<usize, HidError>;
}

/// Source of reports waiting to be sent, in order
pub trait ReportSource {
    fn pop_report(&mut self) -> Option<Report>;
}

/// Sends queued reports through a [`HidWriter`].
///
/// A failed write is retried once on the next poll before anything newer is sent.
/// If the retry fails too the report is dropped. Dropping a keyboard report can leave a key
/// stuck on the host, so once nothing has been sent for a while an all-released report is
/// written.
pub struct HidReporter<W: HidWriter> {
    writer: W,
    retry: Option<Report>,
    /// A keyboard report was dropped and no keyboard report made it through since
    lost_since: Option<Instant>,
    last_emission: Option<Instant>,
    watchdog: Duration,
}

impl<W: HidWriter> HidReporter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_watchdog(writer, HID_WATCHDOG)
    }

    pub fn with_watchdog(writer: W, watchdog: Duration) -> Self {
        Self {
            writer,
            retry: None,
            lost_since: None,
            last_emission: None,
            watchdog,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Key state on the host may be wrong because a keyboard report was dropped
    pub fn is_state_lost(&self) -> bool {
        self.lost_since.is_some()
    }

    /// Send everything `source` has, stopping at the first failed write
    pub fn flush<S: ReportSource>(&mut self, source: &mut S, now: Instant) {
        if let Some(report) = self.retry.take() {
            match self.writer.write_report(&report) {
                Ok(_) => self.sent(&report, now),
                Err(e) => {
                    warn!("Dropping report after retry: {:?}", e);
                    if matches!(report, Report::KeyboardReport(_)) && self.lost_since.is_none() {
                        self.lost_since = Some(now);
                    }
                    // The failed retry used this iteration
                    return;
                }
            }
        }

        while let Some(report) = source.pop_report() {
            match self.writer.write_report(&report) {
                Ok(_) => self.sent(&report, now),
                Err(e) => {
                    debug!("Report write failed, retry next time: {:?}", e);
                    self.retry = Some(report);
                    return;
                }
            }
        }

        self.check_watchdog(now);
    }

    fn sent(&mut self, report: &Report, now: Instant) {
        self.last_emission = Some(now);
        if matches!(report, Report::KeyboardReport(_)) {
            // Every keyboard report carries the full key state
            self.lost_since = None;
        }
    }

    fn check_watchdog(&mut self, now: Instant) {
        let Some(lost) = self.lost_since else {
            return;
        };
        let quiet_since = match self.last_emission {
            Some(t) if t.has_reached(lost) => t,
            _ => lost,
        };
        if !now.has_reached(quiet_since + self.watchdog) {
            return;
        }
        let release = Report::KeyboardReport(KeyboardReport::default());
        match self.writer.write_report(&release) {
            Ok(_) => {
                info!("Watchdog released all keys");
                self.sent(&release, now);
            }
            Err(e) => error!("Watchdog failed to release keys: {:?}", e),
        }
    }
}
