//! Sample conversion and output gain.

/// Map unsigned 8-bit time-domain samples (128 = silence) onto `[-1.0, 1.0)`.
pub fn to_float_samples(data: &[u8]) -> Vec<f32> {
    data.iter().map(|&s| s as f32 / 128.0 - 1.0).collect()
}

/// Output volume in percent, clamped to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: u8 = 100;

    pub fn new(percent: u8) -> Self {
        Self(percent.min(Self::MAX))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn gain(self) -> f32 {
        self.0 as f32 / 100.0
    }

    pub fn apply(self, samples: &mut [f32]) {
        let gain = self.gain();
        for sample in samples {
            *sample *= gain;
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_maps_to_zero() {
        assert_eq!(to_float_samples(&[128, 128]), vec![0.0, 0.0]);
    }

    #[test]
    fn extremes() {
        assert_eq!(to_float_samples(&[0, 255]), vec![-1.0, 255.0 / 128.0 - 1.0]);
        assert_eq!(to_float_samples(&[192]), vec![0.5]);
    }

    #[test]
    fn empty_frame() {
        assert!(to_float_samples(&[]).is_empty());
    }

    #[test]
    fn volume_clamps() {
        assert_eq!(Volume::new(150).percent(), 100);
        assert_eq!(Volume::new(0).gain(), 0.0);
        assert_eq!(Volume::default().percent(), 80);
    }

    #[test]
    fn volume_scales_samples() {
        let mut samples = vec![0.5, -1.0, 0.0];
        Volume::new(50).apply(&mut samples);
        assert_eq!(samples, vec![0.25, -0.5, 0.0]);
    }
}
