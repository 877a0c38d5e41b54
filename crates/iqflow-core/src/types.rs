//! Core sample types for the streaming data-plane
//!
//! Radio hardware and this library exchange complex baseband samples, where
//! each sample is one (I, Q) pair:
//!
//! - **I (In-phase)**: the real component, aligned with the reference carrier
//! - **Q (Quadrature)**: the imaginary component, 90° out of phase
//!
//! ```text
//!            Q (Imaginary)
//!            ^
//!            |     * (I=0.7, Q=0.7)
//!            |    /
//!            |   / magnitude = 1.0
//!            |  /  phase = 45°
//!            | /
//!   ---------+---------> I (Real)
//!            |
//! ```
//!
//! The wire contract with the hardware is IEEE-754 single precision: 4-byte
//! real, 4-byte imaginary (the `fc32` format in UHD terms). Everything in
//! this workspace therefore uses `Complex32`, not `Complex64`.

use num_complex::Complex32;

/// A single I/Q sample point, 32-bit float per component.
pub type IQSample = Complex32;

/// A buffer of I/Q samples.
pub type IQBuffer = Vec<IQSample>;

/// Size in bytes of one sample component on the wire.
pub const COMPONENT_BYTES: usize = 4;

/// Returns true when the native representation of an [`IQSample`] matches
/// the hardware wire contract (two 4-byte IEEE-754 floats).
///
/// Streaming entry points check this before touching the device; a platform
/// with a differing float width must fail fast rather than corrupt data.
#[inline]
pub fn sample_layout_is_wire_compatible() -> bool {
    std::mem::size_of::<f32>() == COMPONENT_BYTES
        && std::mem::size_of::<IQSample>() == 2 * COMPONENT_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_two_packed_floats() {
        assert!(sample_layout_is_wire_compatible());
    }

    #[test]
    fn test_sample_arithmetic() {
        let a = IQSample::new(1.0, 2.0);
        let b = IQSample::new(0.5, -1.0);
        let sum = a + b;
        assert_eq!(sum.re, 1.5);
        assert_eq!(sum.im, 1.0);
    }
}
