//! Fist / open-hand discrimination from convexity defects.
//!
//! An open hand with spread fingers puts several deep, acute "valleys"
//! between its hull and its boundary; a closed fist puts at most one.
//! The valley count threshold is a heuristic, not a provable geometric
//! boundary.

use imageproc::point::Point;
use serde::Deserialize;

use crate::geometry::{convex_hull_indices, convexity_defects, distance};

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Named thresholds for the valley test, overridable from the config file.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A defect counts as a finger valley only when its opening angle at
    /// the deepest point is at most this many degrees.
    pub max_valley_angle_deg: f64,
    /// ...and its depth exceeds this many pixels.
    pub min_valley_depth_px:  f64,
    /// At most this many valleys still classifies as a fist.
    pub max_fist_valleys:     usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            max_valley_angle_deg: 90.0,
            min_valley_depth_px:  30.0,
            max_fist_valleys:     1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandShape / Detection
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of classifying one contour.
///
/// `Degenerate` distinguishes "not-fist because the geometry was unusable"
/// from "not-fist because the hand is open" — both collapse to `false`
/// through [`is_fist`](HandShape::is_fist), but the status line and logs
/// can tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandShape {
    /// Closed hand: at most `max_fist_valleys` qualifying defects.
    Fist { valleys: usize },
    /// Open hand: more qualifying defects than a fist produces.
    Open { valleys: usize },
    /// Hull had too few vertices for defect analysis.
    Degenerate,
}

impl HandShape {
    pub fn is_fist(&self) -> bool {
        matches!(self, HandShape::Fist { .. })
    }
}

/// Classification result plus the geometry that produced it, kept for the
/// debug overlay.  Rendering happens elsewhere and never feeds back into
/// classification.
#[derive(Clone, Debug)]
pub struct Detection {
    pub shape:   HandShape,
    pub contour: Vec<Point<i32>>,
    pub hull:    Vec<Point<i32>>,
}

// ════════════════════════════════════════════════════════════════════════════
// FistClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct FistClassifier {
    pub config: ClassifierConfig,
}

impl FistClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        FistClassifier { config }
    }

    /// Classify one hand contour.
    ///
    /// Never panics: degenerate hulls and zero-length triangle sides are
    /// reported as [`HandShape::Degenerate`] or skipped, matching the
    /// "caught and treated as not-fist" contract.
    pub fn classify(&self, contour: Vec<Point<i32>>) -> Detection {
        let hull_idx = convex_hull_indices(&contour);
        let hull: Vec<Point<i32>> = hull_idx.iter().map(|&i| contour[i]).collect();

        if hull_idx.len() <= 3 {
            return Detection { shape: HandShape::Degenerate, contour, hull };
        }

        let valleys = convexity_defects(&contour, &hull_idx)
            .iter()
            .filter(|d| self.is_finger_valley(contour[d.start], contour[d.end], contour[d.far]))
            .count();

        let shape = if valleys <= self.config.max_fist_valleys {
            HandShape::Fist { valleys }
        } else {
            HandShape::Open { valleys }
        };
        Detection { shape, contour, hull }
    }

    /// Angle/depth test on the (start, end, far) triangle of one defect.
    fn is_finger_valley(&self, start: Point<i32>, end: Point<i32>, far: Point<i32>) -> bool {
        let a = distance(start, end);
        let b = distance(start, far);
        let c = distance(end, far);
        if a == 0.0 || b == 0.0 || c == 0.0 {
            return false;
        }

        // Heron for the triangle area, law of cosines for the opening
        // angle at the deepest point.
        let s = (a + b + c) / 2.0;
        let area = (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt();
        let angle = ((b * b + c * c - a * a) / (2.0 * b * c))
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        let depth = 2.0 * area / a;

        angle <= self.config.max_valley_angle_deg && depth > self.config.min_valley_depth_px
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    /// Regular polygon approximating a closed fist's near-circular outline.
    fn circle_contour(cx: f64, cy: f64, r: f64, sides: usize) -> Vec<Point<i32>> {
        (0..sides)
            .map(|i| {
                let t = i as f64 / sides as f64 * std::f64::consts::TAU;
                p((cx + r * t.cos()).round() as i32, (cy + r * t.sin()).round() as i32)
            })
            .collect()
    }

    /// Star with `spikes` finger-like protrusions: outer tips at radius
    /// `outer`, deep valleys at radius `inner`.
    fn star_contour(cx: f64, cy: f64, outer: f64, inner: f64, spikes: usize) -> Vec<Point<i32>> {
        (0..spikes * 2)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let t = i as f64 / (spikes * 2) as f64 * std::f64::consts::TAU;
                p((cx + r * t.cos()).round() as i32, (cy + r * t.sin()).round() as i32)
            })
            .collect()
    }

    #[test]
    fn too_few_hull_points_is_degenerate() {
        let c = FistClassifier::default();
        let det = c.classify(vec![p(0, 0), p(50, 0), p(25, 40)]);
        assert_eq!(det.shape, HandShape::Degenerate);
        assert!(!det.shape.is_fist());
    }

    #[test]
    fn repeated_point_contour_is_degenerate() {
        let c = FistClassifier::default();
        let det = c.classify(vec![p(7, 7); 20]);
        assert_eq!(det.shape, HandShape::Degenerate);
    }

    #[test]
    fn near_circular_contour_is_fist() {
        let c = FistClassifier::default();
        let det = c.classify(circle_contour(250.0, 250.0, 150.0, 36));
        match det.shape {
            HandShape::Fist { valleys } => assert!(valleys <= 1, "valleys = {}", valleys),
            other => panic!("expected fist, got {:?}", other),
        }
    }

    #[test]
    fn open_hand_star_is_not_fist() {
        // Five finger-like protrusions with deep valleys between them.
        let c = FistClassifier::default();
        let det = c.classify(star_contour(250.0, 250.0, 200.0, 30.0, 5));
        match det.shape {
            HandShape::Open { valleys } => assert!(valleys > 1, "valleys = {}", valleys),
            other => panic!("expected open hand, got {:?}", other),
        }
    }

    #[test]
    fn shallow_lumps_do_not_count_as_valleys() {
        // Lumpy near-circle: radial noise well under the depth threshold.
        let pts: Vec<Point<i32>> = (0..36)
            .map(|i| {
                let t = i as f64 / 36.0 * std::f64::consts::TAU;
                let r = 150.0 + (i % 3) as f64 * 4.0;
                p((250.0 + r * t.cos()).round() as i32, (250.0 + r * t.sin()).round() as i32)
            })
            .collect();
        let det = FistClassifier::default().classify(pts);
        assert!(det.shape.is_fist(), "got {:?}", det.shape);
    }

    #[test]
    fn detection_keeps_contour_and_hull_for_overlay() {
        let contour = star_contour(250.0, 250.0, 200.0, 30.0, 5);
        let det = FistClassifier::default().classify(contour.clone());
        assert_eq!(det.contour, contour);
        assert_eq!(det.hull.len(), 5, "hull should be the five tips");
    }

    #[test]
    fn valley_threshold_is_overridable() {
        // With an absurd depth threshold nothing qualifies and the star
        // collapses to a fist.
        let cfg = ClassifierConfig { min_valley_depth_px: 10_000.0, ..Default::default() };
        let det = FistClassifier::new(cfg).classify(star_contour(250.0, 250.0, 200.0, 30.0, 5));
        assert!(det.shape.is_fist());
    }
}
