use std::time::Instant;

use chrono::Local;
use serde::Serialize;

use crate::channel::channel_key;
use crate::config::TimeDisplay;

/// One reconstructed measurement: a relative timestamp from the session
/// epoch, an independently taken wall-clock stamp, and positional channel
/// values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Seconds since the session epoch, monotonically non-decreasing within
    /// a session.
    pub relative_s: f64,
    /// 24-hour `HH:MM:SS`, second resolution, read from the wall clock at
    /// acceptance. Absolute and relative stamps can drift sub-second
    /// relative to each other; that is accepted behavior.
    pub wall_clock: String,
    /// Values by channel index. May be shorter than the registered channel
    /// set; missing indices are simply absent for this sample.
    pub values: Vec<f64>,
}

impl Sample {
    /// Value for channel index `i`, if this sample carried that field.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Key of the `i`-th field of this sample.
    pub fn key_at(&self, index: usize) -> Option<String> {
        (index < self.values.len()).then(|| channel_key(index))
    }

    /// Time label for display under the given mode.
    pub fn time_label(&self, mode: TimeDisplay) -> String {
        match mode {
            TimeDisplay::Relative => format!("{:.3}", self.relative_s),
            TimeDisplay::Absolute => self.wall_clock.clone(),
        }
    }
}

/// Stamps parsed fields into a `Sample`.
///
/// `relative_s` is derived from `now` against the session epoch; the
/// wall-clock string is read independently, so the two clocks are not
/// required to agree sub-second.
pub fn stamp(values: Vec<f64>, epoch: Instant, now: Instant) -> Sample {
    Sample {
        relative_s: now.saturating_duration_since(epoch).as_secs_f64(),
        wall_clock: Local::now().format("%H:%M:%S").to_string(),
        values,
    }
}
