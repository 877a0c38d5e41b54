//! Reusable grow-only sample storage for stream handles
//!
//! Streaming runs on a real-time path, so per-call allocation is amortized
//! away: each stream handle owns one [`SampleBuffer`] whose capacity grows
//! monotonically to the largest request ever seen and never shrinks. While
//! capacity is sufficient the same storage is handed back verbatim, keeping
//! sample addresses stable across calls.

use std::collections::TryReserveError;

use crate::types::IQSample;

/// Contiguous, reusable storage for complex samples.
///
/// Created empty; the first `ensure_capacity` call performs the initial
/// allocation. Growth discards prior contents (the old storage is released
/// before the new storage is allocated); anything short of growth reuses the
/// buffer as-is, so unwritten regions carry whatever a previous call left
/// there. Callers must not assume zero-initialization.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    storage: Vec<IQSample>,
    allocations: u64,
}

impl SampleBuffer {
    /// Create an empty buffer. No storage is allocated until first use.
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            allocations: 0,
        }
    }

    /// Hand back storage holding at least `samples_needed` samples.
    ///
    /// Grows to exactly `samples_needed` when current capacity is
    /// insufficient, releasing the old storage first. Allocation failure is
    /// surfaced to the caller; the buffer is left empty in that case.
    pub fn ensure_capacity(
        &mut self,
        samples_needed: usize,
    ) -> Result<&mut [IQSample], TryReserveError> {
        if self.storage.len() < samples_needed {
            self.storage = Vec::new();
            let mut fresh: Vec<IQSample> = Vec::new();
            fresh.try_reserve_exact(samples_needed)?;
            fresh.resize(samples_needed, IQSample::new(0.0, 0.0));
            self.storage = fresh;
            self.allocations += 1;
        }
        Ok(&mut self.storage[..])
    }

    /// Current capacity in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// True until the first allocation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Number of allocations performed over this buffer's lifetime.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }
}
