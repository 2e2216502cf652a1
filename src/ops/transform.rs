// ============================================================================
// TRANSFORM OPERATIONS: mirror an image along an axis
// ============================================================================

use crate::canvas::Image;

/// Mirror axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Mirror left↔right (column j swaps with column W-1-j).
    Horizontal,
    /// Mirror top↔bottom (row i swaps with row H-1-i).
    Vertical,
}

impl Axis {
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// Flip an image along `axis`. Only positions change, never values.
pub fn flip(src: &Image, axis: Axis) -> Image {
    let w = src.width();
    let h = src.height();
    src.map_rows(|row, out| match axis {
        Axis::Horizontal => {
            for (col, px) in out.iter_mut().enumerate() {
                *px = src.get(row, w - 1 - col);
            }
        }
        Axis::Vertical => {
            for (col, px) in out.iter_mut().enumerate() {
                *px = src.get(h - 1 - row, col);
            }
        }
    })
}
