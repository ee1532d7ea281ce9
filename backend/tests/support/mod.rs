//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Mutex;

use attention_rust::models::EpochMillis;
use attention_rust::vision::{FaceDetection, Frame, FrameLandmarks, Landmark, RelativeBoundingBox};
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Uniform gray image of the given brightness.
pub fn gray_image(brightness: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(WIDTH, HEIGHT, Luma([brightness])))
}

pub fn frame(brightness: u8) -> Frame {
    Frame::from_image(&gray_image(brightness)).unwrap()
}

/// PNG of a uniform gray image, base64 encoded.
pub fn png_base64(brightness: u8) -> String {
    let mut bytes = Vec::new();
    gray_image(brightness)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Same as [`png_base64`] with a browser-style data-URI header.
pub fn png_data_uri(brightness: u8) -> String {
    format!("data:image/png;base64,{}", png_base64(brightness))
}

/// Centered, frontal face whose eye lids are `lid_gap` (relative height) apart.
pub fn face_landmarks(lid_gap: f64) -> FrameLandmarks {
    let mut mesh = vec![Landmark::new(0.5, 0.5); 468];
    for base in [362, 33] {
        mesh[base] = Landmark::new(0.375, 0.5);
        mesh[base + 3] = Landmark::new(0.625, 0.5);
        mesh[base + 1] = Landmark::new(0.5, 0.5 - lid_gap / 2.0);
        mesh[base + 5] = Landmark::new(0.5, 0.5 + lid_gap / 2.0);
    }
    mesh[234] = Landmark::new(0.3, 0.5);
    mesh[454] = Landmark::new(0.7, 0.5);
    mesh[10] = Landmark::new(0.5, 0.25);
    mesh[152] = Landmark::new(0.5, 0.75);

    FrameLandmarks {
        face: Some(FaceDetection {
            score: 0.9,
            bbox: RelativeBoundingBox {
                xmin: 0.25,
                ymin: 0.25,
                width: 0.5,
                height: 0.5,
            },
        }),
        face_mesh: Some(mesh),
        pose: None,
    }
}

/// Open eyes looking straight at the camera.
pub fn attentive_face() -> FrameLandmarks {
    face_landmarks(56.0 / HEIGHT as f64)
}

/// Face present, eyes shut.
pub fn closed_eyes() -> FrameLandmarks {
    face_landmarks(0.0)
}

/// Face present, head turned far to the side.
pub fn turned_away() -> FrameLandmarks {
    let mut landmarks = attentive_face();
    if let Some(mesh) = landmarks.face_mesh.as_mut() {
        mesh[234] = Landmark::new(0.6, 0.5);
        mesh[454] = Landmark::new(0.95, 0.5);
    }
    landmarks
}

pub fn at(ms: i64) -> EpochMillis {
    EpochMillis::new(1_700_000_000_000 + ms)
}
