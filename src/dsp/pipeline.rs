//! Per-tick DSP chain: drain, DC-remove, window, FFT, integrate, flip,
//! amplitude-shape, clip, log, quantize (spec.md §4.3 steps 2-13).
//!
//! FFT grounding mirrors `qbz-audio`'s
//! `analysis::spectral_ribbon::SpectralAnalyzer`: a single `FftPlanner`
//! built once, reusable scratch buffers, `Complex32::norm()` for magnitude.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::dsp::scale::{self, TransformMode};
use crate::dsp::window;
use crate::ring_buffer::{RingBuffer, FFT_SIZE};

pub const HALF: usize = FFT_SIZE / 2;
pub type SpectrumRow = [u8; HALF];

pub struct DspPipeline {
    mode: TransformMode,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_scratch: Vec<Complex32>,
    magnitudes: Vec<f32>,
    integrated: Vec<f32>,
    /// Set once the first degraded-integration tick of a capture is seen,
    /// so the warning fires exactly once per capture (spec.md §4.3 step 3).
    warned_degraded: bool,
}

impl DspPipeline {
    pub fn new(mode: TransformMode) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            mode,
            window: window::hann(FFT_SIZE),
            fft: planner.plan_fft_forward(FFT_SIZE),
            fft_scratch: vec![Complex32::default(); FFT_SIZE],
            magnitudes: vec![0.0; HALF],
            integrated: vec![0.0; HALF],
            warned_degraded: false,
        }
    }

    /// Call once per new capture so the degraded-integration warning can
    /// fire again for it.
    pub fn reset_capture_state(&mut self) {
        self.warned_degraded = false;
    }

    /// Drains up to `n_integration` blocks from `ring` and produces one
    /// quantized spectrum row.
    pub fn process_tick(&mut self, ring: &RingBuffer, n_integration: usize) -> SpectrumRow {
        let mut frame = Vec::with_capacity(n_integration);
        for _ in 0..n_integration {
            if let Some(block) = ring.pop_newest() {
                frame.push(block);
            }
        }

        if frame.len() < n_integration && !self.warned_degraded {
            log::warn!(
                "not enough resources to perform the {n_integration} FFT integration; \
                 performing a {}-FFT integration instead",
                frame.len()
            );
            self.warned_degraded = true;
        }

        if frame.is_empty() {
            return [0u8; HALF];
        }

        self.integrated.fill(0.0);
        for block in &frame {
            self.accumulate_one_fft(block);
        }
        let k = frame.len() as f32;
        for v in self.integrated.iter_mut() {
            *v /= k;
        }

        let mut row = [0u8; HALF];
        for (i, magnitude) in self.integrated.iter().rev().enumerate() {
            row[i] = scale::magnitude_to_digit(*magnitude, self.mode);
        }
        row
    }

    /// DC removal, windowing, FFT, positive-half magnitude for one block;
    /// accumulates into `self.integrated` (pre-average, pre-flip).
    fn accumulate_one_fft(&mut self, block: &crate::ring_buffer::SampleBlock) {
        let sum: i64 = block.iter().map(|&s| s as i64).sum();
        let mean = (sum as f64 / block.len() as f64).round() as i16;

        for (i, &sample) in block.iter().enumerate() {
            let dc_removed = sample.wrapping_sub(mean) as f32;
            self.fft_scratch[i] = Complex32::new(dc_removed * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_scratch);

        for (i, bin) in self.fft_scratch.iter().take(HALF).enumerate() {
            self.magnitudes[i] = bin.norm();
            self.integrated[i] += self.magnitudes[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn pipeline() -> DspPipeline {
        DspPipeline::new(TransformMode::Linear)
    }

    #[test]
    fn empty_ring_for_entire_capture_emits_zero_row() {
        let ring = RingBuffer::new(25_000);
        let mut dsp = pipeline();
        let row = dsp.process_tick(&ring, 4);
        assert!(row.iter().all(|&v| v == 0));
    }

    #[test]
    fn constant_dc_input_quantizes_to_all_zeros() {
        let ring = RingBuffer::new(25_000);
        ring.append(&[1000i16; FFT_SIZE]);
        let mut dsp = pipeline();
        let row = dsp.process_tick(&ring, 1);
        assert!(row.iter().all(|&v| v == 0));
    }

    #[test]
    fn single_tone_peak_lands_at_flipped_bin() {
        let ring = RingBuffer::new(25_000);
        let bin = 20usize;
        // Amplitude kept well clear of the upper-clip threshold's tie zone:
        // 10000 saturates three adjacent post-quantization bins to 255 and
        // makes "the" peak ambiguous, so 1000 is used instead, which still
        // clips the center bin to 255 while both Hann sidelobes stay at 253.
        let block: crate::ring_buffer::SampleBlock = std::array::from_fn(|k| {
            (1000.0 * (2.0 * PI * bin as f32 * k as f32 / FFT_SIZE as f32).cos()) as i16
        });
        for _ in 0..4 {
            ring.append(&block);
        }

        let mut dsp = pipeline();
        let row = dsp.process_tick(&ring, 4);

        let expected_index = HALF - 1 - bin;
        let peak_index = row
            .iter()
            .enumerate()
            .max_by_key(|&(_, &v)| v)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_index, expected_index);
    }

    #[test]
    fn partial_integration_warns_once_then_uses_available_blocks() {
        let ring = RingBuffer::new(25_000);
        ring.append(&[500i16; FFT_SIZE]);
        let mut dsp = pipeline();
        // n_integration=4 but only 1 block is available.
        let row = dsp.process_tick(&ring, 4);
        assert!(dsp.warned_degraded);
        assert!(row.iter().all(|&v| v == 0));
    }
}
