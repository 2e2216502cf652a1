// ============================================================================
// ADJUSTMENT OPERATIONS: per-pixel colour adjustments
// ============================================================================
//
// Each operation reads a pixel's (r, g, b) and writes a new pixel into a
// freshly allocated image. Neighbouring pixels are never consulted here; see
// `filters` for neighbourhood operations.
// ============================================================================

use crate::canvas::{Channel, Image, Pixel, clamp_truncate};

/// Scalar reduction used to turn a colour pixel into a grey one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreyscaleKind {
    /// max(R, G, B)
    Value,
    /// BT.709 weighted sum, rounded.
    Luma,
    /// floor((R + G + B) / 3)
    Intensity,
}

impl GreyscaleKind {
    pub fn label(&self) -> &'static str {
        match self {
            GreyscaleKind::Value => "value",
            GreyscaleKind::Luma => "luma",
            GreyscaleKind::Intensity => "intensity",
        }
    }

    /// Reduce one pixel to its grey level.
    pub fn reduce(&self, [r, g, b]: Pixel) -> u8 {
        match self {
            GreyscaleKind::Value => r.max(g).max(b),
            GreyscaleKind::Luma => {
                let lum = 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64;
                lum.round().clamp(0.0, 255.0) as u8
            }
            GreyscaleKind::Intensity => ((r as u16 + g as u16 + b as u16) / 3) as u8,
        }
    }
}

/// Sepia tone weights, one row per output channel.
pub const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

// ============================================================================
// INSTANT OPERATIONS
// ============================================================================

/// Add `delta` to every channel, clamping to [0, 255].
pub fn brighten(src: &Image, delta: i32) -> Image {
    src.map_pixels(|px| px.map(|v| (v as i32).saturating_add(delta).clamp(0, 255) as u8))
}

/// Keep one channel and zero the other two.
pub fn isolate_channel(src: &Image, channel: Channel) -> Image {
    let keep = channel.index();
    src.map_pixels(|px| {
        let mut out = [0u8; 3];
        out[keep] = px[keep];
        out
    })
}

/// Collapse every pixel to a single grey level stored in all three channels.
pub fn greyscale(src: &Image, kind: GreyscaleKind) -> Image {
    src.map_pixels(|px| {
        let v = kind.reduce(px);
        [v, v, v]
    })
}

/// Multiply each pixel by a 3×3 colour matrix. Results are clamped to
/// [0, 255] and truncated toward zero.
pub fn apply_color_matrix(src: &Image, matrix: &[[f64; 3]; 3]) -> Image {
    src.map_pixels(|[r, g, b]| {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        matrix.map(|[wr, wg, wb]| clamp_truncate(wr * r + wg * g + wb * b))
    })
}

/// Apply the fixed sepia tone matrix.
pub fn sepia(src: &Image) -> Image {
    apply_color_matrix(src, &SEPIA)
}
