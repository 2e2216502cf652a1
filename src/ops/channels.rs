// ============================================================================
// CHANNEL OPERATIONS: split an image into channels and combine them back
// ============================================================================

use crate::canvas::{Channel, Image};
use crate::error::{EditError, Result};
use crate::ops::adjustments::isolate_channel;

/// Split into three single-channel images in red, green, blue order.
pub fn split(src: &Image) -> [Image; 3] {
    Channel::all().map(|channel| isolate_channel(src, channel))
}

/// Combine three named images into one.
///
/// The result starts as a copy of the first image; its green channel is then
/// overwritten from the second image and its blue channel from the third.
/// All three must share the first image's dimensions.
pub fn combine(sources: [(&str, &Image); 3]) -> Result<Image> {
    let (base_name, base) = sources[0];
    for (name, img) in &sources[1..] {
        if img.dimensions() != base.dimensions() {
            return Err(EditError::DimensionMismatch {
                name: name.to_string(),
                reference: base_name.to_string(),
                expected_w: base.width(),
                expected_h: base.height(),
                actual_w: img.width(),
                actual_h: img.height(),
            });
        }
    }

    let mut out = base.clone();
    for (c, (_, img)) in sources.iter().enumerate().skip(1) {
        let w = out.width();
        for row in 0..out.height() {
            for col in 0..w {
                let mut px = out.get(row, col);
                px[c] = img.get(row, col)[c];
                out.put(row, col, px);
            }
        }
    }
    Ok(out)
}
