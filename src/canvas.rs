// ============================================================================
// CANVAS: the 3-channel pixel grid every operation consumes and produces
// ============================================================================
//
// An `Image` owns its pixel buffer outright. Transforms never mutate an input
// image; they build a fresh buffer, so an image stored under one name in the
// session cache stays frozen when a derived version is written elsewhere.
// ============================================================================

use image::RgbImage;

use crate::error::{EditError, Result};

/// One pixel: red, green, blue.
pub type Pixel = [u8; 3];

/// A colour channel, indexed red = 0, green = 1, blue = 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub fn all() -> [Channel; 3] {
        [Channel::Red, Channel::Green, Channel::Blue]
    }

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

/// Rectangular grid of `height` rows by `width` columns, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Image {
    /// A black image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height],
        }
    }

    /// Wrap a row-major pixel buffer. Returns `None` if the length does not
    /// equal `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image from explicit rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<Pixel>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut pixels = Vec::with_capacity(width * height);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(EditError::RaggedGrid {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
            pixels.extend_from_slice(cells);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at row `row`, column `col`. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Pixel {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        self.pixels[row * self.width + col]
    }

    /// Bounds-checked pixel access with signed coordinates, used by neighbourhood filters.
    #[inline]
    pub fn get_checked(&self, row: isize, col: isize) -> Option<Pixel> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        Some(self.pixels[row as usize * self.width + col as usize])
    }

    pub fn put(&mut self, row: usize, col: usize, pixel: Pixel) {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        self.pixels[row * self.width + col] = pixel;
    }

    /// Row-major view of every pixel.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Iterate rows as slices of `width` pixels.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        // chunks() rejects a zero chunk size
        self.pixels.chunks(self.width.max(1)).take(self.height)
    }

    /// Build a new image of the same size, computing each output row from
    /// the row index and a mutable slice of the fresh buffer.
    pub fn map_rows<F>(&self, mut fill: F) -> Image
    where
        F: FnMut(usize, &mut [Pixel]),
    {
        let mut out = Image::new(self.width, self.height);
        if self.width == 0 {
            return out;
        }
        for (row, cells) in out.pixels.chunks_mut(self.width).enumerate() {
            fill(row, cells);
        }
        out
    }

    /// Build a new image by transforming every pixel independently.
    pub fn map_pixels<F>(&self, transform: F) -> Image
    where
        F: Fn(Pixel) -> Pixel,
    {
        Image {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&p| transform(p)).collect(),
        }
    }

    /// Convert to an `image` crate buffer for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            raw.extend_from_slice(p);
        }
        RgbImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbImage::new(self.width as u32, self.height as u32))
    }

    /// Copy out of an `image` crate buffer.
    pub fn from_rgb_image(src: &RgbImage) -> Self {
        let pixels = src.pixels().map(|p| p.0).collect();
        Self {
            width: src.width() as usize,
            height: src.height() as usize,
            pixels,
        }
    }
}

/// Round-free clamp into the channel range, truncating toward zero.
#[inline]
pub fn clamp_truncate(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}
