//! Amplitude-shaping transforms approximating the legacy CALLISTO
//! spectrometer response (spec.md §4.3 step 10), plus the clip/log/quantize
//! steps that follow it (steps 11-13).

const CLIP_MIN: f64 = 1.0;
const CLIP_MAX: f64 = 6_958_564_947.100_452;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransformMode {
    /// `y = 89958.629068 * x`
    Linear,
    /// `y = 566_080_346 * (exp(7.32e-5 * x) - 1)`
    Exponential,
    /// `y = 192_944_935 * (exp(1.15e-4 * x) - 1)`
    ExponentialLow,
}

impl TransformMode {
    pub fn from_index(mode: u8) -> Self {
        match mode {
            0 => TransformMode::Linear,
            1 => TransformMode::Exponential,
            2 => TransformMode::ExponentialLow,
            other => panic!("invalid data transform mode {other}, expected 0, 1 or 2"),
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            TransformMode::Linear => 89_958.629_068 * x,
            TransformMode::Exponential => 566_080_346.0 * ((7.32e-5 * x).exp() - 1.0),
            TransformMode::ExponentialLow => 192_944_935.0 * ((1.15e-4 * x).exp() - 1.0),
        }
    }
}

/// Runs steps 10-13 of the DSP pipeline on one integrated magnitude value,
/// producing a CALLISTO digit in `[0, 255]`.
pub fn magnitude_to_digit(magnitude: f32, mode: TransformMode) -> u8 {
    let shaped = mode.apply(magnitude as f64);
    let clipped = shaped.clamp(CLIP_MIN, CLIP_MAX);
    let db = 10.0 * clipped.log10();
    let digits = (db * 255.0 * 25.4 / 2500.0).round();
    digits.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_0_at_zero_clips_to_zero_digits() {
        assert_eq!(magnitude_to_digit(0.0, TransformMode::Linear), 0);
    }

    #[test]
    fn mode_0_near_saturation_point_yields_digits_near_255() {
        // x such that 89958.629068 * x == CLIP_MAX
        let x = (CLIP_MAX / 89_958.629_068) as f32;
        let digits = magnitude_to_digit(x, TransformMode::Linear);
        assert!(digits >= 250, "expected near-saturation digits, got {digits}");
    }

    #[test]
    fn output_is_always_in_range() {
        for mode in [
            TransformMode::Linear,
            TransformMode::Exponential,
            TransformMode::ExponentialLow,
        ] {
            for raw in [-1000.0f32, 0.0, 1.0, 1e3, 1e6, 1e9, 1e12] {
                let d = magnitude_to_digit(raw, mode);
                assert!((0..=255).contains(&(d as i32)));
            }
        }
    }

    proptest::proptest! {
        #[test]
        fn digit_is_always_in_0_255(raw in -1e12f32..1e12f32, mode_idx in 0u8..3) {
            let mode = TransformMode::from_index(mode_idx);
            let d = magnitude_to_digit(raw, mode);
            proptest::prop_assert!((0..=255).contains(&(d as i32)));
        }
    }
}
