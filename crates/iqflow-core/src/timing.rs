//! Device timestamps for received bursts
//!
//! SDR hardware stamps the first sample of each burst with a reading of its
//! free-running device clock, split UHD-style into whole seconds plus a
//! fractional part. Downstream alignment code works in integer ticks at a
//! fixed resolution, so [`TimeSpec`] carries the split representation and
//! converts on demand.

use serde::{Deserialize, Serialize};

/// Microsecond tick rate used for burst timestamps throughout the data-plane.
pub const TICKS_PER_SECOND: u64 = 1_000_000;

/// A device clock reading: whole seconds since the device's time origin plus
/// a fractional-second remainder in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpec {
    /// Whole seconds since the device time origin.
    full_secs: i64,
    /// Fractional seconds, always in `[0, 1)`.
    frac_secs: f64,
}

impl TimeSpec {
    /// Create a time spec, normalizing the fractional part into `[0, 1)`.
    pub fn new(full_secs: i64, frac_secs: f64) -> Self {
        let carry = frac_secs.floor();
        Self {
            full_secs: full_secs + carry as i64,
            frac_secs: frac_secs - carry,
        }
    }

    /// Create a time spec from fractional seconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(0, secs)
    }

    /// Create a time spec from integer ticks at the given rate.
    pub fn from_ticks(ticks: u64, ticks_per_second: u64) -> Self {
        Self {
            full_secs: (ticks / ticks_per_second) as i64,
            frac_secs: (ticks % ticks_per_second) as f64 / ticks_per_second as f64,
        }
    }

    /// Whole seconds since the device time origin.
    #[inline]
    pub fn full_secs(&self) -> i64 {
        self.full_secs
    }

    /// Fractional-second remainder in `[0, 1)`.
    #[inline]
    pub fn frac_secs(&self) -> f64 {
        self.frac_secs
    }

    /// Convert to integer ticks at the given rate, rounding the fractional
    /// part. Readings before the time origin clamp to 0.
    pub fn to_ticks(&self, ticks_per_second: u64) -> u64 {
        if self.full_secs < 0 {
            return 0;
        }
        let whole = self.full_secs as u64 * ticks_per_second;
        let frac = (self.frac_secs * ticks_per_second as f64).round() as u64;
        whole + frac
    }

    /// Convert to microsecond ticks, the data-plane's timestamp unit.
    #[inline]
    pub fn to_micros(&self) -> u64 {
        self.to_ticks(TICKS_PER_SECOND)
    }

    /// Total seconds as a float.
    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        self.full_secs as f64 + self.frac_secs
    }
}
