// ============================================================================
// TRANSFORM CATALOG
// ============================================================================
//
// Pure functions from images to images. Every function allocates a new
// output buffer; inputs are only ever borrowed.

pub mod adjustments;
pub mod channels;
pub mod filters;
pub mod transform;

pub use adjustments::{GreyscaleKind, apply_color_matrix, brighten, greyscale, isolate_channel, sepia};
pub use channels::{combine, split};
pub use filters::{Filter, Kernel, convolve};
pub use transform::{Axis, flip};
