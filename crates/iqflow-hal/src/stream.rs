//! Stream handles and the blocking receive/transmit loops
//!
//! A stream handle binds a streaming capability of the radio to an ordered
//! channel set fixed at creation, and owns one grow-only sample buffer that
//! is reused across calls. The loops drive the device's blocking burst
//! primitives until a request is fully satisfied, decode every burst's
//! status, and abort on the first failure. A timeout inside a loop is
//! fatal to that call and never silently retried; retry policy belongs to
//! the surrounding application.
//!
//! Handles are single-threaded by construction (`&mut self` on every
//! streaming call); distinct handles may be driven from distinct threads.

use std::time::Duration;

use tracing::{info, trace};

use iqflow_core::buffer::SampleBuffer;
use iqflow_core::interleave;
use iqflow_core::types::sample_layout_is_wire_compatible;

use crate::device::{
    RadioDevice, RxBurstStream, SampleFormat, SdrError, SdrResult, StreamDirection, TxBurstStream,
};

/// Per-call timeout for one blocking receive.
///
/// Long enough that a single call's timeout is distinguishable from genuine
/// link silence.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-call timeout for one blocking send.
///
/// Shorter than the receive timeout: a stalled transmit consumer should be
/// detected quickly.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// A receive stream bound to every receive channel of a device.
///
/// Dropping the handle releases its buffer and its binding to the device;
/// a handle that never streamed holds no storage and drops as a no-op.
pub struct RxStreamHandle {
    stream: Box<dyn RxBurstStream>,
    channels: usize,
    buffer: SampleBuffer,
    total_samples: u64,
}

impl RxStreamHandle {
    /// Bind a receive stream to channels `0..C-1` of `device` and start
    /// continuous streaming immediately.
    ///
    /// The handle's sample buffer starts empty and is allocated lazily on
    /// first use.
    pub fn open(device: &mut dyn RadioDevice) -> SdrResult<Self> {
        let count = device.channel_count(StreamDirection::Rx);
        if count == 0 {
            return Err(SdrError::ConfigError(
                "device exposes no receive channels".to_string(),
            ));
        }
        let channels: Vec<usize> = (0..count).collect();
        let mut stream = device.create_rx_stream(&channels, SampleFormat::ComplexFloat32)?;
        stream.start_continuous()?;

        info!("receive stream bound to {} channels on {}", count, device.name());

        Ok(Self {
            stream,
            channels: count,
            buffer: SampleBuffer::new(),
            total_samples: 0,
        })
    }

    /// Number of channels this handle was created with.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Total samples (per channel) delivered to callers so far.
    #[inline]
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Receive exactly `num_samples` samples per channel into `dst`.
    ///
    /// On success returns the device timestamp (microsecond ticks since the
    /// device time origin) of the first sample of the first burst. `dst` is
    /// filled in the flat layout: channel `c`, sample `i` occupies positions
    /// `c*2*num_samples + 2*i` (real) and `+1` (imaginary), channels
    /// concatenated in ascending index order.
    ///
    /// `expected_channels` must equal the channel count the handle was
    /// created with; a mismatch fails before any device call. Any burst
    /// error aborts the whole call; `dst` contents are unspecified after a
    /// failure.
    ///
    /// # Panics
    /// Panics if `dst` holds fewer than
    /// `2 * num_samples * expected_channels` values.
    pub fn receive(
        &mut self,
        dst: &mut [f32],
        num_samples: usize,
        expected_channels: usize,
    ) -> SdrResult<u64> {
        if !sample_layout_is_wire_compatible() {
            return Err(SdrError::UnsupportedFloatWidth);
        }
        if expected_channels != self.channels {
            return Err(SdrError::ChannelCountMismatch {
                bound: self.channels,
                expected: expected_channels,
            });
        }
        assert!(
            dst.len() >= 2 * num_samples * self.channels,
            "destination holds {} values, need {}",
            dst.len(),
            2 * num_samples * self.channels
        );

        let storage = self.buffer.ensure_capacity(num_samples * self.channels)?;

        let mut received = 0usize;
        let mut first_ticks: Option<u64> = None;
        while received < num_samples {
            let mut views =
                interleave::channel_views_from(storage, num_samples, self.channels, received);
            let burst = self
                .stream
                .recv(&mut views, num_samples - received, RECV_TIMEOUT);

            burst.status.into_result()?;
            if burst.samples == 0 {
                // The primitive must never report success with zero progress.
                return Err(SdrError::ZeroProgressInconsistency);
            }
            let time_spec = burst.time_spec.ok_or(SdrError::MissingTimestamp)?;
            if burst.out_of_sequence {
                return Err(SdrError::OutOfSequence);
            }

            // The result timestamp is the first burst's; continuity of later
            // bursts is guaranteed by the discontinuity checks above.
            if first_ticks.is_none() {
                first_ticks = Some(time_spec.to_micros());
            }

            received += burst.samples;
            trace!(
                "rx burst: {} samples, cursor {}/{}",
                burst.samples,
                received,
                num_samples
            );
        }

        interleave::flatten_out(storage, dst, num_samples, self.channels);
        self.total_samples += num_samples as u64;

        Ok(first_ticks.unwrap_or(0))
    }
}

/// A transmit stream bound to every transmit channel of a device.
///
/// Transmission is request-driven; no start command is issued at creation.
/// Only single-channel transmission is supported: a handle bound to more
/// than one channel rejects every send.
pub struct TxStreamHandle {
    stream: Box<dyn TxBurstStream>,
    channels: usize,
    buffer: SampleBuffer,
    total_samples: u64,
}

impl TxStreamHandle {
    /// Bind a transmit stream to channels `0..C-1` of `device`.
    pub fn open(device: &mut dyn RadioDevice) -> SdrResult<Self> {
        let count = device.channel_count(StreamDirection::Tx);
        if count == 0 {
            return Err(SdrError::ConfigError(
                "device exposes no transmit channels".to_string(),
            ));
        }
        let channels: Vec<usize> = (0..count).collect();
        let stream = device.create_tx_stream(&channels, SampleFormat::ComplexFloat32)?;

        info!("transmit stream bound to {} channels on {}", count, device.name());

        Ok(Self {
            stream,
            channels: count,
            buffer: SampleBuffer::new(),
            total_samples: 0,
        })
    }

    /// Number of channels this handle was created with.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Total samples accepted by the device so far.
    #[inline]
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Transmit `num_samples` samples from the flat `src` layout
    /// (positions `2*i`/`2*i+1` are the real/imaginary parts of sample
    /// `i`).
    ///
    /// Fails with [`SdrError::ChannelCountMismatch`] before any device call
    /// unless the handle is bound to exactly one channel. A send call that
    /// accepts nothing within its timeout aborts with
    /// [`SdrError::Timeout`].
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `2 * num_samples` values.
    pub fn transmit(&mut self, src: &[f32], num_samples: usize) -> SdrResult<()> {
        if !sample_layout_is_wire_compatible() {
            return Err(SdrError::UnsupportedFloatWidth);
        }
        if self.channels != 1 {
            return Err(SdrError::ChannelCountMismatch {
                bound: self.channels,
                expected: 1,
            });
        }
        assert!(
            src.len() >= 2 * num_samples,
            "source holds {} values, need {}",
            src.len(),
            2 * num_samples
        );

        let storage = self.buffer.ensure_capacity(num_samples)?;
        interleave::flatten_in(src, storage, num_samples);

        let mut sent = 0usize;
        while sent < num_samples {
            let burst = self
                .stream
                .send(&storage[sent..num_samples], num_samples - sent, SEND_TIMEOUT);

            burst.status.into_result()?;
            if burst.samples == 0 {
                // Timed out before the device accepted anything.
                return Err(SdrError::Timeout);
            }

            sent += burst.samples;
            trace!("tx burst: {} samples, cursor {}/{}", burst.samples, sent, num_samples);
        }

        self.total_samples += num_samples as u64;
        Ok(())
    }
}
