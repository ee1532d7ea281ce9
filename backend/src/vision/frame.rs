//! Decoding of uploaded webcam frames and luminance statistics.

use base64::Engine;
use image::{DynamicImage, GrayImage, Luma, RgbImage};

use super::error::{VisionError, VisionResult};

/// Marker separating a data-URI header from its payload.
const DATA_URI_MARKER: &str = "base64,";

/// ITU-R BT.601 luma weights in 16.16 fixed point (sum is 65536).
const LUMA_R: u32 = 19_595;
const LUMA_G: u32 = 38_470;
const LUMA_B: u32 = 7_471;

/// One decoded webcam frame.
#[derive(Debug, Clone)]
pub struct Frame {
    bytes: Vec<u8>,
    luma: GrayImage,
    width: u32,
    height: u32,
}

impl Frame {
    /// Decode a base64 image, optionally prefixed with a data-URI header
    /// (`data:image/jpeg;base64,...`).
    pub fn from_base64(payload: &str) -> VisionResult<Self> {
        let encoded = match payload.find(DATA_URI_MARKER) {
            Some(idx) => &payload[idx + DATA_URI_MARKER.len()..],
            None => payload,
        };
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Self::from_bytes(bytes)
    }

    /// Decode an encoded image (format is sniffed from the bytes).
    pub fn from_bytes(bytes: Vec<u8>) -> VisionResult<Self> {
        let image = image::load_from_memory(&bytes)?;
        Self::with_image(bytes, &image)
    }

    /// Build a frame from an already decoded image.
    pub fn from_image(image: &DynamicImage) -> VisionResult<Self> {
        Self::with_image(Vec::new(), image)
    }

    fn with_image(bytes: Vec<u8>, image: &DynamicImage) -> VisionResult<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(VisionError::EmptyImage { width, height });
        }
        Ok(Self {
            bytes,
            luma: bt601_luma(&image.to_rgb8()),
            width,
            height,
        })
    }

    /// Original encoded bytes (empty when built from a decoded image).
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn luma(&self) -> &GrayImage {
        &self.luma
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luminance histogram of the frame.
    pub fn histogram(&self) -> LumaHistogram {
        LumaHistogram::from_luma(&self.luma)
    }
}

/// Grayscale conversion with BT.601 weights, rounded to nearest.
#[allow(clippy::cast_possible_truncation)]
fn bt601_luma(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted =
            u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B + 0x8000;
        Luma([(weighted >> 16) as u8])
    })
}

/// 256-bin histogram of grayscale values.
#[derive(Debug, Clone)]
pub struct LumaHistogram {
    bins: [u64; 256],
    total: u64,
}

impl LumaHistogram {
    #[must_use]
    pub fn from_luma(image: &GrayImage) -> Self {
        let mut bins = [0u64; 256];
        for pixel in image.pixels() {
            bins[usize::from(pixel.0[0])] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Mean luminance (brightness), 0 for an empty histogram.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64) * count)
            .sum();
        sum as f64 / self.total as f64
    }

    /// Population standard deviation over the histogram (contrast).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let diff = i as f64 - mean;
                diff * diff * count as f64
            })
            .sum::<f64>()
            / self.total as f64;
        variance.sqrt()
    }
}
