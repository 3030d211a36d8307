//! Hand segmentation: HSV in-range mask → morphological cleanup → largest
//! sufficiently-large contour.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use serde::Deserialize;

use crate::geometry::polygon_area;
use crate::skin::{rgb_to_hsv, SkinColorModel};

// ════════════════════════════════════════════════════════════════════════════
// SegmenterConfig
// ════════════════════════════════════════════════════════════════════════════

/// Named segmentation parameters, overridable from the config file.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Contours enclosing less area than this are noise blobs or a hand
    /// too far from the camera; no hand is reported.
    pub min_area_px:   f64,
    /// L∞ dilation radius; radius 2 equals two passes of a 3×3 element,
    /// closing small gaps in the mask.
    pub dilate_radius: u8,
    /// Gaussian sigma applied to soften mask edges before tracing.
    pub blur_sigma:    f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            min_area_px:   3000.0,
            dilate_radius: 2,
            blur_sigma:    1.5,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSegmenter
// ════════════════════════════════════════════════════════════════════════════

/// Pure function of (frame, skin model) → hand contour.  Holds nothing but
/// its thresholds.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandSegmenter {
    pub config: SegmenterConfig,
}

impl HandSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        HandSegmenter { config }
    }

    /// Binary skin mask for one frame: in-range pixels white, dilated to
    /// fill pinholes, blurred and re-thresholded to soften jagged edges.
    pub fn skin_mask(&self, frame: &RgbImage, model: &SkinColorModel) -> GrayImage {
        let mask = GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
            let px = frame.get_pixel(x, y);
            let inside = model.contains(rgb_to_hsv(px.0[0], px.0[1], px.0[2]));
            Luma([if inside { 255u8 } else { 0 }])
        });

        let mask = dilate(&mask, Norm::LInf, self.config.dilate_radius);
        let blurred = gaussian_blur_f32(&mask, self.config.blur_sigma);

        // The tracer treats any non-zero pixel as foreground, so the gray
        // halo the blur leaves must be cut back to a clean boundary.
        GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
            Luma([if blurred.get_pixel(x, y).0[0] >= 128 { 255u8 } else { 0 }])
        })
    }

    /// The contour (outer or hole border) with the largest enclosed area,
    /// if that area clears `min_area_px`.  `None` means no hand this frame.
    pub fn largest_hand_contour(
        &self,
        frame: &RgbImage,
        model: &SkinColorModel,
    ) -> Option<Vec<Point<i32>>> {
        let mask = self.skin_mask(frame, model);

        find_contours::<i32>(&mask)
            .into_iter()
            .map(|c| (polygon_area(&c.points), c.points))
            .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .filter(|(area, _)| *area > self.config.min_area_px)
            .map(|(_, points)| points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const SKIN: Rgb<u8> = Rgb([205, 150, 120]);

    /// Black frame with one filled skin-colored square.
    fn frame_with_square(x0: u32, y0: u32, side: u32) -> RgbImage {
        let mut frame = RgbImage::new(640, 480);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                frame.put_pixel(x, y, SKIN);
            }
        }
        frame
    }

    #[test]
    fn mask_selects_skin_and_rejects_background() {
        let frame = frame_with_square(200, 200, 100);
        let mask = HandSegmenter::default().skin_mask(&frame, &SkinColorModel::default());
        assert_eq!(mask.get_pixel(250, 250).0[0], 255);
        assert_eq!(mask.get_pixel(20, 20).0[0], 0);
    }

    #[test]
    fn large_blob_yields_a_contour() {
        let frame = frame_with_square(200, 200, 100);
        let contour = HandSegmenter::default()
            .largest_hand_contour(&frame, &SkinColorModel::default())
            .expect("a 100x100 blob is well above the area threshold");
        assert!(polygon_area(&contour) > 3000.0);
    }

    #[test]
    fn undersized_blob_reports_no_hand() {
        // 20x20 = 400 px², far below the 3000 px² floor even after dilation.
        let frame = frame_with_square(300, 300, 20);
        let found = HandSegmenter::default()
            .largest_hand_contour(&frame, &SkinColorModel::default());
        assert!(found.is_none());
    }

    #[test]
    fn empty_frame_reports_no_hand() {
        let frame = RgbImage::new(640, 480);
        let found = HandSegmenter::default()
            .largest_hand_contour(&frame, &SkinColorModel::default());
        assert!(found.is_none());
    }

    #[test]
    fn largest_of_two_blobs_wins() {
        let mut frame = frame_with_square(50, 50, 80);     // smaller
        for y in 300..440 {
            for x in 300..440 {
                frame.put_pixel(x, y, SKIN);               // larger, 140x140
            }
        }
        let contour = HandSegmenter::default()
            .largest_hand_contour(&frame, &SkinColorModel::default())
            .expect("both blobs clear the threshold");
        // Every contour point must belong to the larger blob's neighborhood.
        assert!(contour.iter().all(|p| p.x >= 290 && p.y >= 290));
    }

    #[test]
    fn min_area_is_overridable() {
        let frame = frame_with_square(300, 300, 20);
        let cfg = SegmenterConfig { min_area_px: 100.0, ..Default::default() };
        let found = HandSegmenter::new(cfg)
            .largest_hand_contour(&frame, &SkinColorModel::default());
        assert!(found.is_some());
    }
}
