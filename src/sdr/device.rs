//! SDR driver contract (spec.md §6) abstracted behind a trait so the Reader
//! is unit-testable without hardware. Mirrors the shape of the operations
//! SoapySDR exposes: enumerate/open/configure/stream/read/teardown.

use crate::error::{CaptureError, Result};

pub const SAMPLE_RATE_HZ: f64 = 130_000_000.0;
pub const READ_TIMEOUT_US: i64 = 50_000;

/// Outcome of one `read_stream` call.
pub enum ReadOutcome {
    /// Exactly the requested number of samples were delivered.
    Full([i16; crate::ring_buffer::FFT_SIZE]),
    /// Short read, timeout, or driver-signaled overflow.
    Short,
}

/// Abstracts the SoapySDR operations spec.md §6 names, so the Reader loop
/// can run against a synthetic device in tests and against real hardware
/// behind the `hardware` feature.
pub trait SdrDevice: Send {
    /// Blocks up to `READ_TIMEOUT_US` for one `FFT_SIZE`-sample block.
    fn read_stream(&mut self) -> ReadOutcome;
    fn deactivate_stream(&mut self);
    fn close_stream(&mut self);
}

/// Opens and activates the first enumerated SDR device at the fixed sample
/// rate, returning a ready-to-read stream handle.
#[cfg(feature = "hardware")]
pub fn open_default() -> Result<impl SdrDevice> {
    hardware::SoapyDevice::open()
}

#[cfg(not(feature = "hardware"))]
pub fn open_default() -> Result<NullSdr> {
    Err(CaptureError::SdrInit(
        "built without the `hardware` feature; no SDR device present".to_string(),
    ))
}

/// Always reports a short read. Used to exercise the "Reader disabled"
/// scenario (spec.md §8 scenario 1) without ever producing data.
#[derive(Default)]
pub struct NullSdr;

impl SdrDevice for NullSdr {
    fn read_stream(&mut self) -> ReadOutcome {
        ReadOutcome::Short
    }
    fn deactivate_stream(&mut self) {}
    fn close_stream(&mut self) {}
}

/// Deterministic source for tests: replays a fixed block forever.
pub struct SyntheticSdr {
    block: [i16; crate::ring_buffer::FFT_SIZE],
}

impl SyntheticSdr {
    pub fn new(block: [i16; crate::ring_buffer::FFT_SIZE]) -> Self {
        Self { block }
    }
}

impl SdrDevice for SyntheticSdr {
    fn read_stream(&mut self) -> ReadOutcome {
        ReadOutcome::Full(self.block)
    }
    fn deactivate_stream(&mut self) {}
    fn close_stream(&mut self) {}
}

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::ring_buffer::FFT_SIZE;

    pub struct SoapyDevice {
        stream: soapysdr::RxStream<i16>,
        scratch: Vec<i16>,
    }

    impl SoapyDevice {
        pub fn open() -> Result<Self> {
            soapysdr::configure_logging();

            let devices = soapysdr::enumerate("")
                .map_err(|e| CaptureError::SdrInit(e.to_string()))?;
            if devices.is_empty() {
                return Err(CaptureError::SdrInit("no SDR device present".to_string()));
            }

            let dev = soapysdr::Device::new(devices[0].clone())
                .map_err(|e| CaptureError::SdrInit(e.to_string()))?;
            dev.set_sample_rate(soapysdr::Direction::Rx, 0, SAMPLE_RATE_HZ)
                .map_err(|e| CaptureError::SdrInit(e.to_string()))?;

            let mut stream = dev
                .rx_stream::<i16>(&[0])
                .map_err(|e| CaptureError::SdrInit(e.to_string()))?;
            stream
                .activate(None)
                .map_err(|e| CaptureError::SdrInit(e.to_string()))?;

            Ok(Self {
                stream,
                scratch: vec![0i16; FFT_SIZE],
            })
        }
    }

    impl SdrDevice for SoapyDevice {
        fn read_stream(&mut self) -> ReadOutcome {
            let mut bufs = [self.scratch.as_mut_slice()];
            match self.stream.read(&mut bufs, READ_TIMEOUT_US as _) {
                Ok(n) if n == FFT_SIZE => {
                    let mut block = [0i16; FFT_SIZE];
                    block.copy_from_slice(&self.scratch);
                    ReadOutcome::Full(block)
                }
                _ => ReadOutcome::Short,
            }
        }

        fn deactivate_stream(&mut self) {
            let _ = self.stream.deactivate(None);
        }

        fn close_stream(&mut self) {}
    }
}
