//! UHD (USRP) device support
//!
//! Hardware support for Ettus Research USRP devices via the USRP Hardware
//! Driver (UHD) library. The library is probed at runtime with dynamic
//! loading, so the same binary works on machines with or without a UHD
//! installation; actual streaming additionally requires building with the
//! `uhd` feature, which carries the FFI surface.
//!
//! Devices are addressed by UHD argument strings:
//!
//! ```rust,ignore
//! use iqflow_hal::uhd::UhdRadio;
//!
//! // B210 by type, N210 by address
//! let radio = UhdRadio::from_args("type=b210")?;
//! let radio = UhdRadio::from_args("addr=192.168.10.2")?;
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use crate::device::{
    RadioDevice, RxBurstStream, SampleFormat, SdrError, SdrResult, StreamDirection, TxBurstStream,
};

/// Library names to try on different platforms.
#[cfg(target_os = "linux")]
const LIB_NAMES: &[&str] = &["libuhd.so.4", "libuhd.so"];

#[cfg(target_os = "macos")]
const LIB_NAMES: &[&str] = &["libuhd.dylib", "libuhd.4.dylib"];

#[cfg(target_os = "windows")]
const LIB_NAMES: &[&str] = &["uhd.dll", "libuhd.dll"];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const LIB_NAMES: &[&str] = &[];

static UHD_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// True when a UHD library is present on this system.
pub fn library_available() -> bool {
    *UHD_AVAILABLE.get_or_init(|| {
        for name in LIB_NAMES {
            if unsafe { libloading::Library::new(name) }.is_ok() {
                info!("found UHD library: {}", name);
                return true;
            }
        }
        debug!("UHD library not found");
        false
    })
}

/// FFI surface to libuhd.
///
/// Carries the C layouts the streaming calls exchange with the library.
#[cfg(feature = "uhd")]
pub mod ffi {
    use std::ffi::{c_char, c_double, c_int};

    /// UHD error codes.
    pub const UHD_ERROR_NONE: c_int = 0;

    /// Stream arguments for `uhd_usrp_get_rx_stream` / `get_tx_stream`.
    #[repr(C)]
    pub struct UhdStreamArgs {
        pub cpu_format: *const c_char,
        pub otw_format: *const c_char,
        pub args: *const c_char,
        pub channel_list: *const usize,
        pub n_channels: c_int,
    }

    /// RX metadata returned with every receive burst.
    #[repr(C)]
    pub struct UhdRxMetadata {
        pub has_time_spec: bool,
        pub time_spec_full_secs: i64,
        pub time_spec_frac_secs: c_double,
        pub more_fragments: bool,
        pub fragment_offset: usize,
        pub start_of_burst: bool,
        pub end_of_burst: bool,
        pub error_code: c_int,
        pub out_of_sequence: bool,
    }
}

/// Per-model channel capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UhdChannelCaps {
    /// Number of receive channels
    pub rx_channels: usize,
    /// Number of transmit channels
    pub tx_channels: usize,
}

/// Channel capabilities by device type.
pub fn capabilities_for_type(device_type: &str) -> UhdChannelCaps {
    match device_type.to_lowercase().as_str() {
        "b200" | "b200mini" | "b205mini" => UhdChannelCaps {
            rx_channels: 1,
            tx_channels: 1,
        },
        "b210" | "n200" | "n210" | "x300" | "x310" => UhdChannelCaps {
            rx_channels: 2,
            tx_channels: 2,
        },
        "n310" | "n320" | "n321" => UhdChannelCaps {
            rx_channels: 4,
            tx_channels: 4,
        },
        _ => UhdChannelCaps {
            rx_channels: 1,
            tx_channels: 1,
        },
    }
}

/// Parse device arguments from a UHD connection string
/// (`"type=b210,serial=ABC123"`).
fn parse_args(args: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for part in args.split(',') {
        if let Some(pos) = part.find('=') {
            let key = part[..pos].trim().to_string();
            let value = part[pos + 1..].trim().to_string();
            result.insert(key, value);
        }
    }
    result
}

/// A USRP device.
pub struct UhdRadio {
    name: String,
    caps: UhdChannelCaps,
    args: String,
    device_time: f64,
}

impl UhdRadio {
    /// Open a USRP described by a UHD argument string.
    ///
    /// Fails with [`SdrError::DeviceNotFound`] when no UHD library is
    /// installed on this system.
    pub fn from_args(args: &str) -> SdrResult<Self> {
        if !library_available() {
            return Err(SdrError::DeviceNotFound(
                "no UHD library installed; install libuhd".to_string(),
            ));
        }

        let parsed = parse_args(args);
        let device_type = parsed
            .get("type")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        let caps = capabilities_for_type(&device_type);

        info!("opening UHD device: {}", args);

        Ok(Self {
            name: format!("USRP {} ({})", device_type.to_uppercase(), args),
            caps,
            args: args.to_string(),
            device_time: 0.0,
        })
    }

    /// The UHD argument string this device was opened with.
    pub fn args(&self) -> &str {
        &self.args
    }

    /// Last clock value written with [`RadioDevice::set_time_now`].
    pub fn device_time(&self) -> f64 {
        self.device_time
    }

    fn streaming_unavailable(&self) -> SdrError {
        if cfg!(feature = "uhd") {
            SdrError::HardwareError(format!(
                "UHD streaming bindings incomplete for {}",
                self.name
            ))
        } else {
            SdrError::HardwareError(
                "UHD streaming requires building with the `uhd` feature".to_string(),
            )
        }
    }
}

impl RadioDevice for UhdRadio {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_count(&self, direction: StreamDirection) -> usize {
        match direction {
            StreamDirection::Rx => self.caps.rx_channels,
            StreamDirection::Tx => self.caps.tx_channels,
        }
    }

    fn create_rx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn RxBurstStream>> {
        if format != SampleFormat::ComplexFloat32 {
            return Err(SdrError::ConfigError(
                "UHD streams use the fc32 CPU format".to_string(),
            ));
        }
        if channels.iter().any(|&c| c >= self.caps.rx_channels) {
            return Err(SdrError::ConfigError(format!(
                "invalid rx channel binding {:?}, device has {} channels",
                channels, self.caps.rx_channels
            )));
        }
        Err(self.streaming_unavailable())
    }

    fn create_tx_stream(
        &mut self,
        channels: &[usize],
        format: SampleFormat,
    ) -> SdrResult<Box<dyn TxBurstStream>> {
        if format != SampleFormat::ComplexFloat32 {
            return Err(SdrError::ConfigError(
                "UHD streams use the fc32 CPU format".to_string(),
            ));
        }
        if channels.iter().any(|&c| c >= self.caps.tx_channels) {
            return Err(SdrError::ConfigError(format!(
                "invalid tx channel binding {:?}, device has {} channels",
                channels, self.caps.tx_channels
            )));
        }
        Err(self.streaming_unavailable())
    }

    fn set_time_now(&mut self, seconds: f64) -> SdrResult<()> {
        if seconds < 0.0 {
            return Err(SdrError::ConfigError(
                "device time must be non-negative".to_string(),
            ));
        }
        warn!("UHD clock write not forwarded to hardware (bindings incomplete)");
        self.device_time = seconds;
        Ok(())
    }
}
