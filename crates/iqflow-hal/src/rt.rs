//! Realtime scheduling for streaming threads
//!
//! Streaming loops run on whichever thread calls them, and a thread that
//! gets preempted mid-burst shows up as receive overflows. Applications
//! that care should call [`elevate_thread_priority`] once on each thread
//! that will drive performance-sensitive handles, before creating them.
//! This is an explicit opt-in, not a side effect of device construction.

#[cfg(unix)]
use tracing::info;

use crate::device::{SdrError, SdrResult};

/// Move the calling thread to round-robin realtime scheduling at mid-range
/// priority.
///
/// Requires the usual OS privileges for realtime scheduling (on Linux,
/// `CAP_SYS_NICE` or an appropriate rtprio rlimit). Failure leaves the
/// thread's scheduling untouched; streaming still works, with weaker
/// latency guarantees.
#[cfg(unix)]
pub fn elevate_thread_priority() -> SdrResult<()> {
    let max = unsafe { libc::sched_get_priority_max(libc::SCHED_RR) };
    let min = unsafe { libc::sched_get_priority_min(libc::SCHED_RR) };
    if max < 0 || min < 0 {
        return Err(SdrError::HardwareError(
            "scheduler exposes no realtime priority range".to_string(),
        ));
    }

    // sched_param carries platform-private padding on some systems; zero it
    // rather than naming fields.
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    param.sched_priority = min + (max - min) / 2;
    let ret = unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_RR, &param) };
    if ret != 0 {
        return Err(SdrError::HardwareError(format!(
            "failed to elevate thread priority (errno {})",
            ret
        )));
    }

    info!(
        "thread scheduling elevated to SCHED_RR priority {}",
        param.sched_priority
    );
    Ok(())
}

/// No realtime scheduling support on this platform; returns an error so
/// callers can decide whether to proceed.
#[cfg(not(unix))]
pub fn elevate_thread_priority() -> SdrResult<()> {
    Err(SdrError::HardwareError(
        "realtime scheduling not supported on this platform".to_string(),
    ))
}
