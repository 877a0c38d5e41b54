//! # iqflow-hal
//!
//! The radio-facing half of the iqflow SDR streaming data-plane: the
//! device collaborator contract, stream handles, and the blocking
//! receive/transmit loops that move complex baseband samples between a
//! radio and an application.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Application                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │        RxStreamHandle::receive / TxStreamHandle::transmit   │
//! │   (buffer reuse, partial-burst retries, status decoding,    │
//! │    first-burst timestamp, channel (de)interleaving)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │         RadioDevice / RxBurstStream / TxBurstStream         │
//! ├──────────────────────┬──────────────────────────────────────┤
//! │      Simulator       │        Hardware Drivers (UHD)        │
//! └──────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! Calls are synchronous and block the calling thread for up to the
//! per-call timeout; there is no internal threading and no locking around
//! a handle's state. Drive each handle from one call site at a time;
//! distinct handles are independent.
//!
//! ## Example
//!
//! ```rust
//! use iqflow_hal::simulator::SimRadio;
//! use iqflow_hal::stream::RxStreamHandle;
//!
//! # fn main() -> iqflow_hal::device::SdrResult<()> {
//! let mut radio = SimRadio::single_channel();
//! let mut rx = RxStreamHandle::open(&mut radio)?;
//!
//! let mut samples = vec![0.0f32; 2 * 1024];
//! let ticks = rx.receive(&mut samples, 1024, 1)?;
//! assert_eq!(ticks, 0);
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod rt;
pub mod simulator;
pub mod stream;
pub mod uhd;

pub use device::{
    BurstStatus, RadioDevice, RxBurst, RxBurstStream, SampleFormat, SdrError, SdrResult,
    StreamDirection, TxBurst, TxBurstStream,
};
pub use rt::elevate_thread_priority;
pub use simulator::{SimBurst, SimConfig, SimRadio, SimTxAccept};
pub use stream::{RxStreamHandle, TxStreamHandle, RECV_TIMEOUT, SEND_TIMEOUT};
