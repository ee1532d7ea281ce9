//! Landmark data returned by the external vision models, and the provider
//! seam through which the service obtains it.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::VisionResult;
use super::frame::Frame;

/// A normalized landmark (coordinates in 0..1 relative to the frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Integer pixel position (truncated) in a `width` x `height` frame.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i64, i64) {
        (
            (self.x * f64::from(width)) as i64,
            (self.y * f64::from(height)) as i64,
        )
    }
}

/// Face bounding box in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeBoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub width: f64,
    pub height: f64,
}

/// Face bounding box in integer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelBoundingBox {
    pub xmin: i64,
    pub ymin: i64,
    pub width: i64,
    pub height: i64,
}

impl RelativeBoundingBox {
    /// Convert to pixel coordinates, truncating each component.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelBoundingBox {
        let (w, h) = (f64::from(width), f64::from(height));
        PixelBoundingBox {
            xmin: (self.xmin * w) as i64,
            ymin: (self.ymin * h) as i64,
            width: (self.width * w) as i64,
            height: (self.height * h) as i64,
        }
    }
}

/// Best face found by the face detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Detector confidence (0-1)
    pub score: f64,
    pub bbox: RelativeBoundingBox,
}

/// Everything the vision models report for one frame.
///
/// Each sub-detector may independently find nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameLandmarks {
    #[serde(default)]
    pub face: Option<FaceDetection>,
    /// Face mesh of the first detected face (468-point topology)
    #[serde(default)]
    pub face_mesh: Option<Vec<Landmark>>,
    /// Body pose landmarks (33-point topology)
    #[serde(default)]
    pub pose: Option<Vec<Landmark>>,
}

impl FrameLandmarks {
    /// Landmarks with no detections at all.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Source of landmark detections.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one instance serves every request.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    /// Run the face detector, face mesh and pose models on a frame.
    async fn detect(&self, frame: &Frame) -> VisionResult<FrameLandmarks>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Provider that never finds anything; every lit frame classifies as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLandmarkProvider;

#[async_trait]
impl LandmarkProvider for NullLandmarkProvider {
    async fn detect(&self, _frame: &Frame) -> VisionResult<FrameLandmarks> {
        Ok(FrameLandmarks::empty())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Provider returning a preset detection, replaceable at runtime.
#[derive(Debug, Default)]
pub struct FixedLandmarkProvider {
    landmarks: RwLock<FrameLandmarks>,
}

impl FixedLandmarkProvider {
    pub fn new(landmarks: FrameLandmarks) -> Self {
        Self {
            landmarks: RwLock::new(landmarks),
        }
    }

    /// Replace the detection returned for subsequent frames.
    pub fn set(&self, landmarks: FrameLandmarks) {
        *self.landmarks.write() = landmarks;
    }
}

#[async_trait]
impl LandmarkProvider for FixedLandmarkProvider {
    async fn detect(&self, _frame: &Frame) -> VisionResult<FrameLandmarks> {
        Ok(self.landmarks.read().clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
