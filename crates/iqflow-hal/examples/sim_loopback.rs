//! Stream against the software simulator: receive a block of samples,
//! then transmit part of it back.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p iqflow-hal --example sim_loopback
//! ```

use iqflow_hal::device::RadioDevice;
use iqflow_hal::rt::elevate_thread_priority;
use iqflow_hal::simulator::SimRadio;
use iqflow_hal::stream::{RxStreamHandle, TxStreamHandle};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = elevate_thread_priority() {
        warn!("running without realtime scheduling: {}", err);
    }

    let mut radio = SimRadio::single_channel();
    radio.set_time_now(0.0)?;

    let mut rx = RxStreamHandle::open(&mut radio)?;
    let num_samples = 4096;
    let mut samples = vec![0.0f32; 2 * num_samples];
    let ticks = rx.receive(&mut samples, num_samples, 1)?;
    info!(
        "received {} samples, first sample at {} µs, value ({}, {})",
        num_samples, ticks, samples[0], samples[1]
    );

    let mut tx = TxStreamHandle::open(&mut radio)?;
    let block = 1024;
    tx.transmit(&samples[..2 * block], block)?;
    info!(
        "transmitted {} samples back, device saw {} total",
        block,
        radio.transmitted().len()
    );

    Ok(())
}
