//! Scripted software radio
//!
//! A pure-software [`RadioDevice`] for tests and development without
//! hardware. Receive behavior is driven by a burst script: each entry
//! describes what the next blocking call delivers (sample count, status,
//! timestamp, ordering flag). With an empty script every call is satisfied
//! in full with a timestamp derived from the device clock and the stream's
//! sample position.
//!
//! Sample content is a deterministic per-channel ramp, so tests can verify
//! layout and burst-boundary continuity against [`SimRadio::sample_value`].
//! A per-channel signal can be injected to override the ramp.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use iqflow_core::timing::{TimeSpec, TICKS_PER_SECOND};
use iqflow_core::types::IQSample;

use crate::device::{
    BurstStatus, RadioDevice, RxBurst, RxBurstStream, SampleFormat, SdrError, SdrResult,
    StreamDirection, TxBurst, TxBurstStream,
};

/// Simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of receive channels
    pub rx_channels: usize,
    /// Number of transmit channels
    pub tx_channels: usize,
    /// Sample rate in Hz (drives derived timestamps)
    pub sample_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rx_channels: 1,
            tx_channels: 1,
            sample_rate: 1_000_000.0,
        }
    }
}

/// Timestamp behavior of a scripted receive burst.
#[derive(Debug, Clone, Copy)]
enum SimTime {
    /// Derive from the device clock and the stream's sample position.
    Derived,
    /// Stamp with a fixed tick count.
    Ticks(u64),
    /// Omit the time specification entirely.
    Missing,
}

/// One scripted receive burst.
#[derive(Debug, Clone, Copy)]
pub struct SimBurst {
    samples: usize,
    status: BurstStatus,
    time: SimTime,
    out_of_sequence: bool,
}

impl SimBurst {
    /// A burst that delivers `samples` samples per channel with no error.
    pub fn delivered(samples: usize) -> Self {
        Self {
            samples,
            status: BurstStatus::None,
            time: SimTime::Derived,
            out_of_sequence: false,
        }
    }

    /// A burst that delivers nothing and reports `status`.
    pub fn failed(status: BurstStatus) -> Self {
        Self {
            samples: 0,
            status,
            time: SimTime::Derived,
            out_of_sequence: false,
        }
    }

    /// Stamp the burst with a fixed microsecond tick count.
    pub fn at_ticks(mut self, ticks: u64) -> Self {
        self.time = SimTime::Ticks(ticks);
        self
    }

    /// Omit the time specification.
    pub fn without_timestamp(mut self) -> Self {
        self.time = SimTime::Missing;
        self
    }

    /// Flag the burst as out of sequence.
    pub fn reordered(mut self) -> Self {
        self.out_of_sequence = true;
        self
    }
}

/// One scripted transmit response.
#[derive(Debug, Clone, Copy)]
pub struct SimTxAccept {
    accept: Option<usize>,
    status: BurstStatus,
}

impl SimTxAccept {
    /// Accept at most `samples` of whatever is offered.
    pub fn accept(samples: usize) -> Self {
        Self {
            accept: Some(samples),
            status: BurstStatus::None,
        }
    }

    /// Accept nothing within the call's timeout.
    pub fn stall() -> Self {
        Self {
            accept: Some(0),
            status: BurstStatus::None,
        }
    }

    /// Accept nothing and report `status`.
    pub fn failed(status: BurstStatus) -> Self {
        Self {
            accept: Some(0),
            status,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    device_time: f64,
    rx_script: VecDeque<SimBurst>,
    tx_script: VecDeque<SimTxAccept>,
    injected: HashMap<usize, Vec<IQSample>>,
    transmitted: Vec<IQSample>,
    rx_calls: u64,
    tx_calls: u64,
    tx_offers: Vec<usize>,
    rx_started: bool,
}

/// A software radio device with scriptable burst behavior.
pub struct SimRadio {
    config: SimConfig,
    state: Arc<Mutex<SimState>>,
}

impl SimRadio {
    /// Create a simulator.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// A one-receive-channel, one-transmit-channel simulator.
    pub fn single_channel() -> Self {
        Self::new(SimConfig::default())
    }

    /// Queue a scripted receive burst. Scripted bursts are consumed in
    /// order; once the script runs dry, calls are satisfied in full.
    pub fn push_rx_burst(&mut self, burst: SimBurst) {
        self.state.lock().unwrap().rx_script.push_back(burst);
    }

    /// Queue a scripted transmit response.
    pub fn push_tx_accept(&mut self, accept: SimTxAccept) {
        self.state.lock().unwrap().tx_script.push_back(accept);
    }

    /// Override the ramp for one channel; indices beyond the injected
    /// signal fall back to the ramp.
    pub fn inject_signal(&mut self, channel: usize, signal: Vec<IQSample>) {
        self.state.lock().unwrap().injected.insert(channel, signal);
    }

    /// The sample the simulator produces for `channel` at global sample
    /// `index`.
    pub fn sample_value(&self, channel: usize, index: u64) -> IQSample {
        sample_at(&self.state.lock().unwrap(), channel, index)
    }

    /// Number of blocking receive calls issued so far.
    pub fn rx_calls(&self) -> u64 {
        self.state.lock().unwrap().rx_calls
    }

    /// Number of blocking send calls issued so far.
    pub fn tx_calls(&self) -> u64 {
        self.state.lock().unwrap().tx_calls
    }

    /// The `max_samples` argument of every send call, in order.
    pub fn tx_offer_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().tx_offers.clone()
    }

    /// Every sample the device has accepted for transmission.
    pub fn transmitted(&self) -> Vec<IQSample> {
        self.state.lock().unwrap().transmitted.clone()
    }

    /// True once a receive stream has been started.
    pub fn rx_started(&self) -> bool {
        self.state.lock().unwrap().rx_started
    }

    /// Current device clock reading in seconds.
    pub fn device_time(&self) -> f64 {
        self.state.lock().unwrap().device_time
    }
}

fn sample_at(state: &SimState, channel: usize, index: u64) -> IQSample {
    if let Some(signal) = state.injected.get(&channel) {
        if let Some(sample) = signal.get(index as usize) {
            return *sample;
        }
    }
    // Per-channel ramp: distinguishable across channels and monotonic
    // within one, so burst-boundary continuity is checkable.
    IQSample::new(channel as f32 * 1_000.0 + index as f32, -(index as f32))
}

impl RadioDevice for SimRadio {
    fn name(&self) -> &str {
        "iqflow software simulator"
    }

    fn channel_count(&self, direction: StreamDirection) -> usize {
        match direction {
            StreamDirection::Rx => self.config.rx_channels,
            StreamDirection::Tx => self.config.tx_channels,
        }
    }

    fn create_rx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn RxBurstStream>> {
        check_binding(channels, self.config.rx_channels, format)?;
        debug!("simulator rx stream bound to channels {:?}", channels);
        Ok(Box::new(SimRxStream {
            state: Arc::clone(&self.state),
            channels: channels.to_vec(),
            sample_rate: self.config.sample_rate,
            position: 0,
            started: false,
        }))
    }

    fn create_tx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn TxBurstStream>> {
        check_binding(channels, self.config.tx_channels, format)?;
        debug!("simulator tx stream bound to channels {:?}", channels);
        Ok(Box::new(SimTxStream {
            state: Arc::clone(&self.state),
            channels: channels.to_vec(),
        }))
    }

    fn set_time_now(&mut self, seconds: f64) -> SdrResult<()> {
        self.state.lock().unwrap().device_time = seconds;
        Ok(())
    }
}

fn check_binding(channels: &[usize], available: usize, format: SampleFormat) -> SdrResult<()> {
    if format != SampleFormat::ComplexFloat32 {
        return Err(SdrError::ConfigError(format!(
            "simulator only streams ComplexFloat32, got {:?}",
            format
        )));
    }
    if channels.is_empty() || channels.iter().any(|&c| c >= available) {
        return Err(SdrError::ConfigError(format!(
            "invalid channel binding {:?}, device has {} channels",
            channels, available
        )));
    }
    Ok(())
}

struct SimRxStream {
    state: Arc<Mutex<SimState>>,
    channels: Vec<usize>,
    sample_rate: f64,
    /// Global sample index of the next sample this stream will deliver.
    position: u64,
    started: bool,
}

impl RxBurstStream for SimRxStream {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn start_continuous(&mut self) -> SdrResult<()> {
        self.started = true;
        self.state.lock().unwrap().rx_started = true;
        Ok(())
    }

    fn recv(
        &mut self,
        buffers: &mut [&mut [IQSample]],
        max_samples: usize,
        _timeout: Duration,
    ) -> RxBurst {
        let mut state = self.state.lock().unwrap();
        state.rx_calls += 1;

        // No stream command issued yet: nothing arrives, as on hardware.
        if !self.started {
            return RxBurst {
                samples: 0,
                status: BurstStatus::Timeout,
                time_spec: None,
                out_of_sequence: false,
            };
        }

        let script = state.rx_script.pop_front();
        let burst = script.unwrap_or_else(|| SimBurst::delivered(max_samples));
        let n = burst.samples.min(max_samples);

        for (view, &chan) in buffers.iter_mut().zip(self.channels.iter()) {
            for i in 0..n {
                view[i] = sample_at(&state, chan, self.position + i as u64);
            }
        }

        let time_spec = match burst.time {
            SimTime::Derived => Some(TimeSpec::from_secs_f64(
                state.device_time + self.position as f64 / self.sample_rate,
            )),
            SimTime::Ticks(ticks) => Some(TimeSpec::from_ticks(ticks, TICKS_PER_SECOND)),
            SimTime::Missing => None,
        };

        self.position += n as u64;

        RxBurst {
            samples: n,
            status: burst.status,
            time_spec,
            out_of_sequence: burst.out_of_sequence,
        }
    }
}

struct SimTxStream {
    state: Arc<Mutex<SimState>>,
    channels: Vec<usize>,
}

impl TxBurstStream for SimTxStream {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn send(&mut self, buffer: &[IQSample], max_samples: usize, _timeout: Duration) -> TxBurst {
        let mut state = self.state.lock().unwrap();
        state.tx_calls += 1;
        state.tx_offers.push(max_samples);

        let script = state.tx_script.pop_front();
        let offered = buffer.len().min(max_samples);
        let (n, status) = match script {
            Some(entry) => (entry.accept.unwrap_or(offered).min(offered), entry.status),
            None => (offered, BurstStatus::None),
        };

        state.transmitted.extend_from_slice(&buffer[..n]);

        TxBurst { samples: n, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recv_satisfies_request_in_full() {
        let mut radio = SimRadio::single_channel();
        let mut stream = radio
            .create_rx_stream(&[0], SampleFormat::ComplexFloat32)
            .unwrap();
        stream.start_continuous().unwrap();

        let mut buf = vec![IQSample::new(0.0, 0.0); 16];
        let mut views: Vec<&mut [IQSample]> = vec![&mut buf[..]];
        let burst = stream.recv(&mut views, 16, Duration::from_secs(1));

        assert_eq!(burst.samples, 16);
        assert_eq!(burst.status, BurstStatus::None);
        assert!(burst.time_spec.is_some());
        assert!(!burst.out_of_sequence);
    }

    #[test]
    fn test_ramp_continues_across_bursts() {
        let mut radio = SimRadio::single_channel();
        radio.push_rx_burst(SimBurst::delivered(3));
        let mut stream = radio
            .create_rx_stream(&[0], SampleFormat::ComplexFloat32)
            .unwrap();
        stream.start_continuous().unwrap();

        let mut buf = vec![IQSample::new(0.0, 0.0); 6];
        {
            let mut views: Vec<&mut [IQSample]> = vec![&mut buf[..]];
            let first = stream.recv(&mut views, 6, Duration::from_secs(1));
            assert_eq!(first.samples, 3);
        }
        let mut views: Vec<&mut [IQSample]> = vec![&mut buf[3..]];
        stream.recv(&mut views, 3, Duration::from_secs(1));

        for (i, sample) in buf.iter().enumerate() {
            assert_eq!(*sample, radio.sample_value(0, i as u64));
        }
    }

    #[test]
    fn test_derived_timestamp_tracks_position_and_device_time() {
        let mut radio = SimRadio::single_channel();
        radio.set_time_now(2.0).unwrap();
        radio.push_rx_burst(SimBurst::delivered(500));
        let mut stream = radio
            .create_rx_stream(&[0], SampleFormat::ComplexFloat32)
            .unwrap();
        stream.start_continuous().unwrap();

        let mut buf = vec![IQSample::new(0.0, 0.0); 1000];
        {
            let mut views: Vec<&mut [IQSample]> = vec![&mut buf[..]];
            let first = stream.recv(&mut views, 1000, Duration::from_secs(1));
            let ticks = first.time_spec.unwrap().to_micros();
            assert_eq!(ticks, 2_000_000);
        }
        let mut views: Vec<&mut [IQSample]> = vec![&mut buf[500..]];
        let second = stream.recv(&mut views, 500, Duration::from_secs(1));
        // 500 samples at 1 MS/s = 500 µs past the base time.
        assert_eq!(second.time_spec.unwrap().to_micros(), 2_000_500);
    }

    #[test]
    fn test_injected_signal_overrides_ramp() {
        let mut radio = SimRadio::single_channel();
        radio.inject_signal(0, vec![IQSample::new(9.0, -9.0)]);
        assert_eq!(radio.sample_value(0, 0), IQSample::new(9.0, -9.0));
        // Past the injected extent, the ramp resumes.
        assert_eq!(radio.sample_value(0, 1), IQSample::new(1.0, -1.0));
    }

    #[test]
    fn test_rejects_out_of_range_binding() {
        let mut radio = SimRadio::single_channel();
        let err = radio
            .create_rx_stream(&[0, 1], SampleFormat::ComplexFloat32)
            .err()
            .unwrap();
        assert!(matches!(err, SdrError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_non_float_format() {
        let mut radio = SimRadio::single_channel();
        let err = radio
            .create_rx_stream(&[0], SampleFormat::ComplexInt16)
            .err()
            .unwrap();
        assert!(matches!(err, SdrError::ConfigError(_)));
    }

    #[test]
    fn test_recv_before_start_times_out() {
        let mut radio = SimRadio::single_channel();
        let mut stream = radio
            .create_rx_stream(&[0], SampleFormat::ComplexFloat32)
            .unwrap();

        let mut buf = vec![IQSample::new(0.0, 0.0); 4];
        let mut views: Vec<&mut [IQSample]> = vec![&mut buf[..]];
        let burst = stream.recv(&mut views, 4, Duration::from_secs(1));
        assert_eq!(burst.samples, 0);
        assert_eq!(burst.status, BurstStatus::Timeout);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rx_channels, config.rx_channels);
        assert_eq!(back.tx_channels, config.tx_channels);
        assert_eq!(back.sample_rate, config.sample_rate);
    }

    #[test]
    fn test_tx_accept_cap_applies() {
        let mut radio = SimRadio::single_channel();
        radio.push_tx_accept(SimTxAccept::accept(2));
        let mut stream = radio
            .create_tx_stream(&[0], SampleFormat::ComplexFloat32)
            .unwrap();

        let data = vec![IQSample::new(1.0, 0.0); 5];
        let burst = stream.send(&data, 5, Duration::from_millis(100));
        assert_eq!(burst.samples, 2);
        assert_eq!(radio.transmitted().len(), 2);
    }
}
