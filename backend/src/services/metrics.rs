//! Frame metrics extraction.
//!
//! Turns one frame plus its landmark detections into the five numbers the
//! classifier works with: brightness, contrast, face presence (0-100), eye
//! openness (0-100) and head looking score (0-1). A sub-detector that found
//! nothing yields a zero score instead of an error.

use log::debug;

use crate::models::{EpochMillis, Measurement};
use crate::vision::{FaceDetection, Frame, FrameLandmarks, Landmark};

/// Normalized distance from the image center beyond which presence decays.
const CENTER_RADIUS_THRESHOLD: f64 = 0.7;
/// Face-box area fraction below which presence decays.
const MIN_FACE_AREA_FRACTION: f64 = 0.05;
/// Face-box width/height ratio below which presence decays.
const MIN_FACE_ASPECT_RATIO: f64 = 0.7;
/// Relative difference between the two eyes that indicates a sideways gaze.
const EYE_ASYMMETRY_THRESHOLD: f64 = 0.4;
const EYE_ASYMMETRY_PENALTY: f64 = 0.7;

/// Eye contour ranges in the 468-point face mesh.
const LEFT_EYE_CONTOUR: std::ops::Range<usize> = 362..374;
const RIGHT_EYE_CONTOUR: std::ops::Range<usize> = 33..46;
/// Offsets into an eye contour: horizontal corners and vertical lids.
const EYE_HORIZONTAL: (usize, usize) = (0, 3);
const EYE_VERTICAL: (usize, usize) = (1, 5);

const NOSE_TIP: usize = 4;
const LEFT_CHEEK: usize = 234;
const RIGHT_CHEEK: usize = 454;
const FOREHEAD: usize = 10;
const CHIN: usize = 152;

const GEOMETRY_EPSILON: f64 = 1e-6;

/// Per-frame metrics before they are stamped into a [`Measurement`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameMetrics {
    pub brightness: f64,
    pub contrast: f64,
    pub face_presence: f64,
    pub eye_openness: f64,
    pub looking_score: f64,
}

impl FrameMetrics {
    pub fn into_measurement(self, timestamp: EpochMillis) -> Measurement {
        Measurement {
            brightness: self.brightness,
            contrast: self.contrast,
            face_presence: self.face_presence,
            eye_openness: self.eye_openness,
            looking_score: self.looking_score,
            timestamp,
        }
    }
}

/// Head rotation estimated from 2D landmark geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadOrientation {
    /// Horizontal offset of the face center from the image center, in [-1, 1]
    pub yaw: f64,
    /// Nose position within the forehead-chin span, recentered to [-1, 1]
    pub pitch: f64,
    /// Angle of the cheek-to-cheek line, in degrees
    pub roll: f64,
}

/// Mean luminance and histogram stdev of a frame.
pub fn lighting(frame: &Frame) -> (f64, f64) {
    let histogram = frame.histogram();
    (histogram.mean(), histogram.std_dev())
}

/// Extract every metric for one frame.
pub fn extract(frame: &Frame, landmarks: &FrameLandmarks) -> FrameMetrics {
    let (brightness, contrast) = lighting(frame);
    let (width, height) = (frame.width(), frame.height());
    let mesh = landmarks.face_mesh.as_deref();

    FrameMetrics {
        brightness,
        contrast,
        face_presence: face_presence_score(landmarks.face.as_ref(), width, height),
        eye_openness: eye_openness_score(mesh, width, height),
        looking_score: looking_score_for(mesh, width, height),
    }
}

/// Face presence (0-100): detector confidence attenuated by off-center
/// position, small face area and a narrow face box.
pub fn face_presence_score(face: Option<&FaceDetection>, width: u32, height: u32) -> f64 {
    let Some(face) = face else {
        return 0.0;
    };
    let bbox = face.bbox.to_pixels(width, height);
    let (w, h) = (f64::from(width), f64::from(height));

    let face_x = bbox.xmin as f64 + bbox.width as f64 / 2.0;
    let face_y = bbox.ymin as f64 + bbox.height as f64 / 2.0;
    let rel_x = (face_x - w / 2.0) / (w / 2.0);
    let rel_y = (face_y - h / 2.0) / (h / 2.0);
    let center_distance = (rel_x * rel_x + rel_y * rel_y).sqrt();

    let size_ratio = (bbox.width * bbox.height) as f64 / (w * h);
    let aspect_ratio = bbox.width as f64 / bbox.height.max(1) as f64;

    debug!(
        "face position ({:.2}, {:.2}), distance from center {:.2}, size ratio {:.3}, aspect ratio {:.2}",
        rel_x, rel_y, center_distance, size_ratio, aspect_ratio
    );

    let mut adjusted = face.score;
    if center_distance > CENTER_RADIUS_THRESHOLD {
        adjusted *= unit(1.0 - (center_distance - CENTER_RADIUS_THRESHOLD) / (1.0 - CENTER_RADIUS_THRESHOLD));
    }
    if size_ratio < MIN_FACE_AREA_FRACTION {
        adjusted *= unit(size_ratio / MIN_FACE_AREA_FRACTION);
    }
    if aspect_ratio < MIN_FACE_ASPECT_RATIO {
        adjusted *= unit(aspect_ratio / MIN_FACE_ASPECT_RATIO);
    }

    adjusted * 100.0
}

/// Eye aspect ratio (lid distance over corner distance) for one eye contour.
///
/// `None` when the mesh does not cover the contour.
pub fn eye_aspect_ratio(
    mesh: &[Landmark],
    contour: std::ops::Range<usize>,
    width: u32,
    height: u32,
) -> Option<f64> {
    let contour = mesh.get(contour)?;
    let point = |offset: usize| contour.get(offset).map(|lm| lm.to_pixel(width, height));

    let horizontal = pixel_distance(point(EYE_HORIZONTAL.0)?, point(EYE_HORIZONTAL.1)?);
    let vertical = pixel_distance(point(EYE_VERTICAL.0)?, point(EYE_VERTICAL.1)?);

    Some(vertical / (horizontal + GEOMETRY_EPSILON))
}

/// Map an averaged eye aspect ratio onto the 0-100 openness scale.
pub fn openness_from_ear(ear: f64) -> f64 {
    let score = if ear < 0.1 {
        ear * 50.0
    } else if ear < 0.2 {
        5.0 + (ear - 0.1) * 100.0
    } else if ear < 0.3 {
        15.0 + (ear - 0.2) * 150.0
    } else {
        30.0 + (ear - 0.3) * 200.0
    };
    score.clamp(0.0, 100.0)
}

/// Eye openness (0-100) from both eyes of the face mesh.
pub fn eye_openness_score(mesh: Option<&[Landmark]>, width: u32, height: u32) -> f64 {
    let Some(mesh) = mesh else {
        return 0.0;
    };
    let (Some(left), Some(right)) = (
        eye_aspect_ratio(mesh, LEFT_EYE_CONTOUR, width, height),
        eye_aspect_ratio(mesh, RIGHT_EYE_CONTOUR, width, height),
    ) else {
        return 0.0;
    };

    let difference_ratio = (left - right).abs() / left.max(right).max(0.01);
    let average = (left + right) / 2.0;
    let mut score = openness_from_ear(average);

    debug!(
        "left EAR {:.3}, right EAR {:.3}, avg {:.3}, difference ratio {:.3}, openness {:.1}",
        left, right, average, difference_ratio, score
    );

    if difference_ratio > EYE_ASYMMETRY_THRESHOLD {
        debug!("asymmetric eyes, likely looking to the side");
        score = (score * EYE_ASYMMETRY_PENALTY).max(0.0);
    }
    score
}

/// Estimate yaw/pitch/roll from nose, cheeks, forehead and chin.
///
/// `None` when the mesh does not contain those points.
pub fn head_orientation(mesh: &[Landmark], width: u32, height: u32) -> Option<HeadOrientation> {
    let px = |index: usize| mesh.get(index).map(|lm| lm.to_pixel(width, height));
    let nose = px(NOSE_TIP)?;
    let left_cheek = px(LEFT_CHEEK)?;
    let right_cheek = px(RIGHT_CHEEK)?;
    let forehead = px(FOREHEAD)?;
    let chin = px(CHIN)?;

    let half_width = f64::from(width) / 2.0;
    let face_center_x = (left_cheek.0 + right_cheek.0) as f64 / 2.0;
    let yaw = (face_center_x - half_width) / half_width;

    let roll = ((right_cheek.1 - left_cheek.1) as f64)
        .atan2((right_cheek.0 - left_cheek.0) as f64)
        .to_degrees();

    let face_height = pixel_distance(forehead, chin);
    let nose_ratio = (nose.1 - forehead.1) as f64 / (face_height + GEOMETRY_EPSILON);
    let pitch = (nose_ratio - 0.5) * 2.0;

    Some(HeadOrientation { yaw, pitch, roll })
}

/// Combine head rotation into a 0-1 "looking at the screen" score.
pub fn looking_score(orientation: HeadOrientation) -> f64 {
    let yaw_factor = (1.0 - (orientation.yaw.abs() * 2.5).powi(2)).max(0.0);
    let pitch_factor = (1.0 - (orientation.pitch.abs() * 2.0).powi(2)).max(0.0);
    let roll_factor = (1.0 - orientation.roll.abs() / 90.0).max(0.0);

    0.6 * yaw_factor + 0.3 * pitch_factor + 0.1 * roll_factor
}

/// Looking score for a frame, 0 when no face mesh was found.
pub fn looking_score_for(mesh: Option<&[Landmark]>, width: u32, height: u32) -> f64 {
    let Some(orientation) = mesh.and_then(|mesh| head_orientation(mesh, width, height)) else {
        return 0.0;
    };
    let score = looking_score(orientation);
    debug!(
        "head yaw {:.2}, pitch {:.2}, roll {:.2}, looking score {:.2}",
        orientation.yaw, orientation.pitch, orientation.roll, score
    );
    score
}

fn pixel_distance(a: (i64, i64), b: (i64, i64)) -> f64 {
    ((a.0 - b.0) as f64).hypot((a.1 - b.1) as f64)
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
