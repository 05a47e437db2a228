//! Hann window, same closed form used by `qbz-audio`'s
//! `SpectralAnalyzer::rebuild_window`.

use std::f32::consts::PI;

pub fn hann(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|n| 0.5 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_with_zero_endpoints_and_unit_peak() {
        let w = hann(512);
        assert!(w[0].abs() < 1e-6);
        assert!((w[w.len() - 1]).abs() < 1e-6);

        let mid = w.len() / 2;
        assert!((w[mid] - 1.0).abs() < 1e-3);

        for i in 0..w.len() {
            let mirrored = w.len() - 1 - i;
            assert!((w[i] - w[mirrored]).abs() < 1e-6);
        }
    }
}
