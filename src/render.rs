//! Image decoding boundary for page bytes.
//!
//! Pages are handed to the `image` crate either whole, to render them, or
//! chunk by chunk through a [`DimensionProbe`], which reports the image size
//! as soon as enough of the header has arrived.

use std::io::Cursor;
use std::ops::ControlFlow;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::Result;

/// Clockwise page rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees clockwise.
    Quarter,
    /// 180 degrees.
    Half,
    /// 270 degrees clockwise.
    ThreeQuarter,
}

impl Rotation {
    /// Converts a rotation in degrees, normalised to 0..360.
    ///
    /// Returns `None` unless the angle is a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Quarter),
            180 => Some(Rotation::Half),
            270 => Some(Rotation::ThreeQuarter),
            _ => None,
        }
    }

    /// The rotation in degrees.
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Whether width and height trade places.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }

    /// Applies the rotation to a `(width, height)` pair.
    pub fn apply_to_size(&self, (width, height): (u32, u32)) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Target of a page render.
///
/// `width` and `height` are the size of the unrotated page; the returned
/// image has them swapped for quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// Target width before rotation, in pixels.
    pub width: u32,
    /// Target height before rotation, in pixels.
    pub height: u32,
    /// Rotation applied after scaling.
    pub rotation: Rotation,
}

impl RenderRequest {
    /// A request for the given size without rotation.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::None,
        }
    }

    /// Sets the rotation.
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Scales `(width, height)` by `scale`, rounding to nearest and never below 1.
pub fn scale_size((width, height): (u32, u32), scale: f64) -> (u32, u32) {
    let scaled = |v: u32| ((v as f64 * scale + 0.5) as u32).max(1);
    (scaled(width), scaled(height))
}

/// Incremental size detector fed with successive chunks of an image file.
///
/// Chunks are appended to what was seen so far. The header parse is retried
/// only once the buffer has doubled since the last attempt, so a page whose
/// size never resolves costs a logarithmic number of parses. The probe
/// breaks as soon as a parse succeeds.
#[derive(Debug, Default)]
pub struct DimensionProbe {
    seen: Vec<u8>,
    next_attempt: usize,
    attempts: usize,
}

impl DimensionProbe {
    /// Creates an empty probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk. Breaks with `(width, height)` once they are known.
    pub fn feed(&mut self, chunk: &[u8]) -> ControlFlow<(u32, u32)> {
        self.seen.extend_from_slice(chunk);
        if self.seen.is_empty() || self.seen.len() < self.next_attempt {
            return ControlFlow::Continue(());
        }

        self.next_attempt = self.seen.len().saturating_mul(2);
        match self.try_dimensions() {
            Ok(size) => ControlFlow::Break(size),
            Err(_) => ControlFlow::Continue(()),
        }
    }

    /// Makes a final attempt once the whole entry has been fed.
    ///
    /// # Errors
    ///
    /// Returns the decoder's complaint if the data holds no readable image.
    pub fn finish(mut self) -> Result<(u32, u32)> {
        self.try_dimensions()
    }

    /// Bytes fed so far.
    pub fn bytes_seen(&self) -> usize {
        self.seen.len()
    }

    /// Header parses attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    fn try_dimensions(&mut self) -> Result<(u32, u32)> {
        self.attempts += 1;
        let reader = ImageReader::new(Cursor::new(self.seen.as_slice())).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }
}

/// Decodes page bytes.
pub fn decode_page(data: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(data)?)
}

/// Scales `image` to the requested size, then rotates it.
pub fn transform(image: DynamicImage, request: &RenderRequest) -> DynamicImage {
    let width = request.width.max(1);
    let height = request.height.max(1);

    let image = if (image.width(), image.height()) == (width, height) {
        image
    } else {
        image.resize_exact(width, height, FilterType::Triangle)
    };

    match request.rotation {
        Rotation::None => image,
        Rotation::Quarter => image.rotate90(),
        Rotation::Half => image.rotate180(),
        Rotation::ThreeQuarter => image.rotate270(),
    }
}
