//! Channel layout conversions between device and caller conventions
//!
//! Radio hardware fills (or drains) one region per channel inside a single
//! shared sample buffer: channel *i* occupies samples
//! `[i * num_samples, (i + 1) * num_samples)`. The caller-facing layout is a
//! flat sequence of `f32` values where each channel's region is expanded to
//! real/imaginary pairs:
//!
//! ```text
//! device buffer (IQSample):   [ch0 s0, ch0 s1, .. | ch1 s0, ch1 s1, ..]
//! caller layout (f32):        [ch0 re0, ch0 im0, ch0 re1, ch0 im1, .. |
//!                              ch1 re0, ch1 im0, ..]
//! ```
//!
//! For channel `c`, sample `i`, the flat position `c*2*num_samples + 2*i`
//! holds the real part and `+1` the imaginary part.
//!
//! The per-channel regions are handed out as disjoint mutable slices rather
//! than raw pointers into the shared buffer, which preserves the hardware's
//! memory-layout contract without aliasing.

use crate::types::IQSample;

/// Split `buffer` into one mutable view per channel.
///
/// Channel `i`'s view starts at offset `i * num_samples` in the shared
/// buffer. Used both for filling (receive) and draining (transmit).
///
/// # Panics
/// Panics if `buffer` holds fewer than `num_samples * num_channels` samples.
pub fn channel_views(
    buffer: &mut [IQSample],
    num_samples: usize,
    num_channels: usize,
) -> Vec<&mut [IQSample]> {
    channel_views_from(buffer, num_samples, num_channels, 0)
}

/// Like [`channel_views`], but each channel's view begins `start` samples
/// into its region. Receive loops use this to advance every channel's write
/// cursor by the number of samples a burst actually delivered.
///
/// # Panics
/// Panics if `buffer` is too short or `start > num_samples`.
pub fn channel_views_from(
    buffer: &mut [IQSample],
    num_samples: usize,
    num_channels: usize,
    start: usize,
) -> Vec<&mut [IQSample]> {
    assert!(buffer.len() >= num_samples * num_channels);
    assert!(start <= num_samples);
    buffer[..num_samples * num_channels]
        .chunks_exact_mut(num_samples)
        .map(|chan| &mut chan[start..])
        .collect()
}

/// Expand per-channel complex samples into the caller's flat `f32` layout.
///
/// Receive-side finalization: for channel `c`, sample `i`, writes the real
/// part to `dst[c*2*num_samples + 2*i]` and the imaginary part one past it.
///
/// # Panics
/// Panics if `buffer` is shorter than `num_samples * num_channels` samples
/// or `dst` is shorter than `2 * num_samples * num_channels` values.
pub fn flatten_out(buffer: &[IQSample], dst: &mut [f32], num_samples: usize, num_channels: usize) {
    assert!(buffer.len() >= num_samples * num_channels);
    assert!(dst.len() >= 2 * num_samples * num_channels);
    for chan in 0..num_channels {
        let src = &buffer[chan * num_samples..(chan + 1) * num_samples];
        let out = &mut dst[chan * 2 * num_samples..(chan + 1) * 2 * num_samples];
        for (i, sample) in src.iter().enumerate() {
            out[2 * i] = sample.re;
            out[2 * i + 1] = sample.im;
        }
    }
}

/// Pack the caller's flat `f32` layout into complex samples.
///
/// Transmit-side preparation, single channel only: positions `2*i`/`2*i+1`
/// of `src` become the real/imaginary parts of sample `i`.
///
/// # Panics
/// Panics if `src` is shorter than `2 * num_samples` values or `buffer` is
/// shorter than `num_samples` samples.
pub fn flatten_in(src: &[f32], buffer: &mut [IQSample], num_samples: usize) {
    assert!(src.len() >= 2 * num_samples);
    assert!(buffer.len() >= num_samples);
    for (i, sample) in buffer[..num_samples].iter_mut().enumerate() {
        *sample = IQSample::new(src[2 * i], src[2 * i + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_views_are_disjoint_regions() {
        let mut buf = vec![IQSample::new(0.0, 0.0); 8];
        let views = channel_views(&mut buf, 4, 2);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].len(), 4);
        assert_eq!(views[1].len(), 4);
    }

    #[test]
    fn test_channel_views_from_advances_cursor() {
        let mut buf = vec![IQSample::new(0.0, 0.0); 8];
        let mut views = channel_views_from(&mut buf, 4, 2, 3);
        assert_eq!(views[0].len(), 1);
        views[0][0] = IQSample::new(7.0, 0.0);
        views[1][0] = IQSample::new(9.0, 0.0);
        // Writes landed at sample 3 of each channel region.
        assert_eq!(buf[3].re, 7.0);
        assert_eq!(buf[4 + 3].re, 9.0);
    }

    #[test]
    fn test_flatten_out_layout() {
        // 2 channels, 2 samples each.
        let buf = vec![
            IQSample::new(1.0, 2.0),
            IQSample::new(3.0, 4.0),
            IQSample::new(5.0, 6.0),
            IQSample::new(7.0, 8.0),
        ];
        let mut flat = vec![0.0f32; 8];
        flatten_out(&buf, &mut flat, 2, 2);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_flatten_in_single_channel() {
        let flat = [0.5f32, -0.5, 1.5, -1.5];
        let mut buf = vec![IQSample::new(0.0, 0.0); 2];
        flatten_in(&flat, &mut buf, 2);
        assert_eq!(buf[0], IQSample::new(0.5, -0.5));
        assert_eq!(buf[1], IQSample::new(1.5, -1.5));
    }

    #[test]
    fn test_flatten_roundtrip() {
        let flat: Vec<f32> = (0..10).map(|x| x as f32).collect();
        let mut buf = vec![IQSample::new(0.0, 0.0); 5];
        flatten_in(&flat, &mut buf, 5);
        let mut out = vec![0.0f32; 10];
        flatten_out(&buf, &mut out, 5, 1);
        assert_eq!(flat, out);
    }
}
