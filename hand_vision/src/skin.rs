//! Skin-color model — HSV bounds plus recalibration from a sampled region.
//!
//! Hue follows the OpenCV convention (degrees halved, range 0–180) so the
//! documented thresholds stay comparable to the usual skin-detection
//! literature.  Saturation and value are 0–255.

use image::RgbImage;

// ════════════════════════════════════════════════════════════════════════════
// Channel ranges and calibration slack
// ════════════════════════════════════════════════════════════════════════════

/// Upper end of the (halved-degrees) hue channel.
pub const HUE_MAX: u8 = 180;

/// Default in-range bounds, tuned for generic skin tones under indoor light.
/// Usable without calibration.
pub const DEFAULT_LOWER: [u8; 3] = [0, 20, 70];
pub const DEFAULT_UPPER: [u8; 3] = [20, 255, 255];

// Half-widths applied around the sampled mean.
const HUE_SLACK: f64 = 30.0;
const SAT_SLACK: f64 = 40.0;
const VAL_SLACK: f64 = 40.0;

// ════════════════════════════════════════════════════════════════════════════
// SkinColorModel
// ════════════════════════════════════════════════════════════════════════════

/// Lower/upper HSV bounds selecting "skin" pixels, plus a calibrated flag.
///
/// Mutated only by [`calibrate`](SkinColorModel::calibrate); read every
/// frame by the segmenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkinColorModel {
    pub lower:      [u8; 3],
    pub upper:      [u8; 3],
    pub calibrated: bool,
}

impl Default for SkinColorModel {
    fn default() -> Self {
        SkinColorModel {
            lower:      DEFAULT_LOWER,
            upper:      DEFAULT_UPPER,
            calibrated: false,
        }
    }
}

impl SkinColorModel {
    /// Recalibrate from a sample region (typically the frame center while
    /// the user holds a hand inside the guide box).
    ///
    /// Computes the per-channel HSV mean over the sample, then widens by a
    /// fixed slack: hue clamps to [0, 180], saturation and value upper
    /// bounds pin to 255.  Whatever pixels are given are trusted — garbage
    /// in, garbage out.
    pub fn calibrate(&mut self, sample: &RgbImage) {
        let n = (sample.width() as u64 * sample.height() as u64) as f64;
        if n == 0.0 {
            log::warn!("calibration sample is empty; keeping current bounds");
            return;
        }

        let mut sum  = [0.0f64; 3];
        let mut sumq = [0.0f64; 3];
        for px in sample.pixels() {
            let (h, s, v) = rgb_to_hsv(px.0[0], px.0[1], px.0[2]);
            for (i, c) in [h, s, v].into_iter().enumerate() {
                let c = c as f64;
                sum[i]  += c;
                sumq[i] += c * c;
            }
        }

        let mean = [sum[0] / n, sum[1] / n, sum[2] / n];
        let std: Vec<f64> = (0..3)
            .map(|i| (sumq[i] / n - mean[i] * mean[i]).max(0.0).sqrt())
            .collect();

        self.lower = [
            (mean[0] - HUE_SLACK).max(0.0) as u8,
            (mean[1] - SAT_SLACK).max(0.0) as u8,
            (mean[2] - VAL_SLACK).max(0.0) as u8,
        ];
        self.upper = [
            (mean[0] + HUE_SLACK).min(HUE_MAX as f64) as u8,
            255,
            255,
        ];
        self.calibrated = true;

        log::info!("calibrated skin color: lower={:?} upper={:?}", self.lower, self.upper);
        log::debug!(
            "sample stats: mean=({:.1}, {:.1}, {:.1}) std=({:.1}, {:.1}, {:.1})",
            mean[0], mean[1], mean[2], std[0], std[1], std[2]
        );
    }

    /// True if the HSV triple falls inside the current bounds, componentwise.
    pub fn contains(&self, hsv: (u8, u8, u8)) -> bool {
        let (h, s, v) = hsv;
        h >= self.lower[0] && h <= self.upper[0]
            && s >= self.lower[1] && s <= self.upper[1]
            && v >= self.lower[2] && v <= self.upper[2]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RGB → HSV (OpenCV hue convention)
// ════════════════════════════════════════════════════════════════════════════

/// Convert an 8-bit RGB triple to HSV with H ∈ [0, 180], S,V ∈ [0, 255].
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta * 255.0 / max };

    let h_deg = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        60.0 * (bf - rf) / delta + 120.0
    } else {
        60.0 * (rf - gf) / delta + 240.0
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    ((h_deg / 2.0).round().min(180.0) as u8, s.round() as u8, v.round() as u8)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
