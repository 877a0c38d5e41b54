//! # iqflow-core
//!
//! Sample-domain leaf types for the iqflow SDR streaming data-plane:
//!
//! - **types**: complex I/Q samples with the 32-bit float wire contract
//! - **timing**: device timestamps for receive bursts
//! - **interleave**: conversions between the hardware's per-channel buffer
//!   regions and the caller's flat real/imaginary layout
//! - **buffer**: grow-only reusable sample storage for stream handles
//!
//! The device contract and the blocking receive/transmit loops live one
//! layer up in `iqflow-hal`.

pub mod buffer;
pub mod interleave;
pub mod timing;
pub mod types;

pub use buffer::SampleBuffer;
pub use timing::{TimeSpec, TICKS_PER_SECOND};
pub use types::{IQBuffer, IQSample};
