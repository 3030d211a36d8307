//! # hand_vision
//!
//! Classical computer-vision pipeline that finds a hand in a webcam frame
//! and decides whether it is a closed fist.
//!
//! ## Pipeline
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | [`SkinColorModel`] | calibration sample | HSV in-range bounds |
//! | [`HandSegmenter`] | RGB frame + model | largest skin contour (or none) |
//! | [`FistClassifier`] | contour | [`HandShape`] + hull for overlay |
//!
//! Everything is a pure function of its inputs — no camera, no window, no
//! globals.  The capture/UI loop lives in the `gesture_sender` crate.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hand_vision::{SkinColorModel, HandSegmenter, FistClassifier};
//!
//! let model      = SkinColorModel::default();
//! let segmenter  = HandSegmenter::default();
//! let classifier = FistClassifier::default();
//!
//! # let frame = image::RgbImage::new(640, 480);
//! let is_fist = segmenter
//!     .largest_hand_contour(&frame, &model)
//!     .map(|contour| classifier.classify(contour).shape.is_fist())
//!     .unwrap_or(false);
//! ```

pub mod skin;
pub mod segment;
pub mod geometry;
pub mod classify;

pub use skin::SkinColorModel;
pub use segment::{HandSegmenter, SegmenterConfig};
pub use classify::{FistClassifier, ClassifierConfig, Detection, HandShape};
