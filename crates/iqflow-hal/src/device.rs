//! Radio device contract and error taxonomy
//!
//! The data-plane treats the radio as an external collaborator behind the
//! [`RadioDevice`] trait: it only needs a channel count, the ability to
//! create receive/transmit streaming capabilities bound to a set of
//! channels, blocking burst primitives with a timeout, and a free-running
//! device clock settable to an absolute time. Discovery, tuning, and clock
//! source selection belong to the surrounding application, not to this
//! layer.
//!
//! Every burst-level hardware condition surfaces as its own [`SdrError`]
//! variant so callers can apply different recovery policies (retry on
//! overflow, abort on broken chain) instead of pattern-matching one
//! collapsed failure. [`SdrError::code`] additionally assigns each variant
//! a distinct negative integer, so the whole outcome space fits in a plain
//! return value across a foreign-function boundary.

use std::collections::TryReserveError;
use std::time::Duration;

use iqflow_core::timing::TimeSpec;
use iqflow_core::types::IQSample;

/// Stream direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDirection {
    /// Receive stream
    Rx,
    /// Transmit stream
    Tx,
}

/// Sample format on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// 32-bit float I/Q (the data-plane's native format, `fc32`)
    #[default]
    ComplexFloat32,
    /// 16-bit signed integer I/Q
    ComplexInt16,
    /// 8-bit signed integer I/Q
    ComplexInt8,
}

/// Result type for data-plane operations.
pub type SdrResult<T> = Result<T, SdrError>;

/// Errors that can occur while creating handles or streaming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdrError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("hardware error: {0}")]
    HardwareError(String),

    #[error("native float width is not 4 bytes; refusing to stream")]
    UnsupportedFloatWidth,

    #[error("channel count mismatch: stream is bound to {bound} channels, caller expected {expected}")]
    ChannelCountMismatch { bound: usize, expected: usize },

    #[error("device call timed out with no progress")]
    Timeout,

    #[error("stream command arrived at the device too late")]
    LateCommand,

    #[error("broken chain: device expected another stream command")]
    BrokenChain,

    #[error("receive overflow: device dropped samples")]
    Overflow,

    #[error("multi-channel burst alignment failed")]
    AlignmentError,

    #[error("malformed packet from device")]
    BadPacket,

    #[error("unrecognized device status code {0}")]
    UnknownDeviceStatus(i32),

    #[error("device reported success but made no progress")]
    ZeroProgressInconsistency,

    #[error("receive burst carried no time specification")]
    MissingTimestamp,

    #[error("receive burst was flagged out of sequence")]
    OutOfSequence,

    #[error("sample buffer allocation failed")]
    ResourceExhaustion,
}

impl SdrError {
    /// Distinct negative outcome code for each variant, for callers on the
    /// other side of a foreign-function boundary.
    pub fn code(&self) -> i32 {
        match self {
            SdrError::UnsupportedFloatWidth => -2,
            SdrError::ChannelCountMismatch { .. } => -3,
            SdrError::Timeout => -4,
            SdrError::LateCommand => -5,
            SdrError::BrokenChain => -6,
            SdrError::Overflow => -7,
            SdrError::AlignmentError => -8,
            SdrError::BadPacket => -9,
            SdrError::UnknownDeviceStatus(_) => -10,
            SdrError::ZeroProgressInconsistency => -11,
            SdrError::MissingTimestamp => -12,
            SdrError::OutOfSequence => -13,
            SdrError::ResourceExhaustion => -14,
            SdrError::DeviceNotFound(_) => -15,
            SdrError::ConfigError(_) => -16,
            SdrError::HardwareError(_) => -17,
        }
    }
}

impl From<TryReserveError> for SdrError {
    fn from(_: TryReserveError) -> Self {
        SdrError::ResourceExhaustion
    }
}

/// Burst-level status reported by the device with each blocking call.
///
/// A closed set: drivers must fold any vendor code outside it into
/// [`BurstStatus::Unknown`] rather than inventing new meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstStatus {
    /// No error; the burst made progress.
    #[default]
    None,
    /// No samples moved within the allotted time.
    Timeout,
    /// A stream command reached the device after its scheduled time.
    LateCommand,
    /// The device expected another stream command.
    BrokenChain,
    /// Receive ring overflowed; samples were dropped.
    Overflow,
    /// Multi-channel alignment failed.
    Alignment,
    /// A packet failed validation.
    BadPacket,
    /// A vendor status code outside the known set.
    Unknown(i32),
}

impl BurstStatus {
    /// Decode a burst status into an outcome: only [`BurstStatus::None`]
    /// lets a streaming loop continue.
    pub fn into_result(self) -> SdrResult<()> {
        match self {
            BurstStatus::None => Ok(()),
            BurstStatus::Timeout => Err(SdrError::Timeout),
            BurstStatus::LateCommand => Err(SdrError::LateCommand),
            BurstStatus::BrokenChain => Err(SdrError::BrokenChain),
            BurstStatus::Overflow => Err(SdrError::Overflow),
            BurstStatus::Alignment => Err(SdrError::AlignmentError),
            BurstStatus::BadPacket => Err(SdrError::BadPacket),
            BurstStatus::Unknown(code) => Err(SdrError::UnknownDeviceStatus(code)),
        }
    }
}

/// One receive burst: what a single blocking call delivered.
#[derive(Debug, Clone, Copy)]
pub struct RxBurst {
    /// Samples written per channel.
    pub samples: usize,
    /// Burst-level status.
    pub status: BurstStatus,
    /// Device clock reading for the first sample, when the device stamped
    /// the burst.
    pub time_spec: Option<TimeSpec>,
    /// True when the device flagged the burst as reordered.
    pub out_of_sequence: bool,
}

/// One transmit burst: what a single blocking call accepted.
#[derive(Debug, Clone, Copy)]
pub struct TxBurst {
    /// Samples the device accepted.
    pub samples: usize,
    /// Burst-level status.
    pub status: BurstStatus,
}

/// The radio device collaborator.
///
/// One exclusively-owned handle per configured device; all streaming
/// capabilities are created from it.
pub trait RadioDevice: Send {
    /// Device name/description.
    fn name(&self) -> &str;

    /// Number of channels available in the given direction.
    fn channel_count(&self, direction: StreamDirection) -> usize;

    /// Create a receive capability bound to the given channel indices.
    fn create_rx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn RxBurstStream>>;

    /// Create a transmit capability bound to the given channel indices.
    fn create_tx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn TxBurstStream>>;

    /// Immediately reset the free-running device clock to `seconds`.
    fn set_time_now(&mut self, seconds: f64) -> SdrResult<()>;
}

/// A receive streaming capability bound to a fixed channel set.
///
/// Not safe for concurrent use: at most one in-flight call per capability.
pub trait RxBurstStream: Send {
    /// Number of channels this capability is bound to.
    fn channel_count(&self) -> usize;

    /// Issue a "start continuous streaming, start immediately" command.
    fn start_continuous(&mut self) -> SdrResult<()>;

    /// One blocking receive: fill at most `max_samples` samples into each
    /// per-channel view, waiting up to `timeout`.
    ///
    /// Hardware conditions are reported in the returned burst's status, not
    /// as an `Err`; the caller decodes them via
    /// [`BurstStatus::into_result`].
    fn recv(
        &mut self,
        buffers: &mut [&mut [IQSample]],
        max_samples: usize,
        timeout: Duration,
    ) -> RxBurst;
}

/// A transmit streaming capability bound to a fixed channel set.
pub trait TxBurstStream: Send {
    /// Number of channels this capability is bound to.
    fn channel_count(&self) -> usize;

    /// One blocking send: offer at most `max_samples` samples from
    /// `buffer`, waiting up to `timeout` for the device to accept them.
    fn send(&mut self, buffer: &[IQSample], max_samples: usize, timeout: Duration) -> TxBurst;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_none_continues() {
        assert!(BurstStatus::None.into_result().is_ok());
        assert_eq!(BurstStatus::Timeout.into_result(), Err(SdrError::Timeout));
        assert_eq!(BurstStatus::Overflow.into_result(), Err(SdrError::Overflow));
        assert_eq!(
            BurstStatus::Unknown(99).into_result(),
            Err(SdrError::UnknownDeviceStatus(99))
        );
    }

    #[test]
    fn test_each_status_maps_to_its_own_outcome() {
        let statuses = [
            BurstStatus::Timeout,
            BurstStatus::LateCommand,
            BurstStatus::BrokenChain,
            BurstStatus::Overflow,
            BurstStatus::Alignment,
            BurstStatus::BadPacket,
            BurstStatus::Unknown(0),
        ];
        let mut codes: Vec<i32> = statuses
            .iter()
            .map(|s| s.into_result().unwrap_err().code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), statuses.len());
    }

    #[test]
    fn test_outcome_codes_are_negative_and_distinct() {
        let errors = [
            SdrError::UnsupportedFloatWidth,
            SdrError::ChannelCountMismatch {
                bound: 2,
                expected: 1,
            },
            SdrError::Timeout,
            SdrError::LateCommand,
            SdrError::BrokenChain,
            SdrError::Overflow,
            SdrError::AlignmentError,
            SdrError::BadPacket,
            SdrError::UnknownDeviceStatus(5),
            SdrError::ZeroProgressInconsistency,
            SdrError::MissingTimestamp,
            SdrError::OutOfSequence,
            SdrError::ResourceExhaustion,
            SdrError::DeviceNotFound("x".into()),
            SdrError::ConfigError("x".into()),
            SdrError::HardwareError("x".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_alloc_failure_converts() {
        let mut v: Vec<IQSample> = Vec::new();
        let err = v.try_reserve_exact(usize::MAX).unwrap_err();
        assert_eq!(SdrError::from(err), SdrError::ResourceExhaustion);
    }
}
