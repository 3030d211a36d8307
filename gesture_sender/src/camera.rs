//! Webcam capture behind a [`FrameSource`] trait.
//!
//! The trait exists so the frame loop and its tests never need real
//! hardware — tests feed synthetic `RgbImage`s straight into the pipeline.

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum CameraError {
    /// Startup failure — the only fatal error in the application.
    #[error("failed to open camera {index}: {reason}")]
    Open { index: u32, reason: String },
    /// Transient per-frame failure; the loop logs, pauses and retries.
    #[error("frame read failed: {0}")]
    Read(String),
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver RGB frames to the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<RgbImage, CameraError>;
    fn resolution(&self) -> (u32, u32);
}

// ════════════════════════════════════════════════════════════════════════════
// CameraSource — the default system video device
// ════════════════════════════════════════════════════════════════════════════

/// Default-device capture via `nokhwa`.  Frames are mirrored horizontally
/// before they leave this module, so both processing and display see the
/// selfie view the user expects.
pub struct CameraSource {
    camera: Camera,
    width:  u32,
    height: u32,
}

impl CameraSource {
    pub fn open(index: u32) -> Result<Self, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::Open { index, reason: e.to_string() })?;
        camera
            .open_stream()
            .map_err(|e| CameraError::Open { index, reason: e.to_string() })?;

        let res = camera.resolution();
        log::info!("camera {} open at {}x{}", index, res.width(), res.height());

        Ok(CameraSource {
            width:  res.width(),
            height: res.height(),
            camera,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<RgbImage, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Read(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Read(e.to_string()))?;
        let (w, h) = (decoded.width(), decoded.height());
        let frame = RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| CameraError::Read("decoded frame has a short buffer".into()))?;
        Ok(image::imageops::flip_horizontal(&frame))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
