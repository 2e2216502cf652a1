#![allow(dead_code)]

use imgfe::Image;

/// 3 rows × 4 columns reference image.
pub fn fixture() -> Image {
    Image::from_rows(&[
        vec![[145, 203, 132], [248, 69, 80], [20, 53, 27], [211, 12, 90]],
        vec![[120, 231, 151], [201, 88, 232], [164, 55, 151], [60, 180, 255]],
        vec![[164, 157, 13], [136, 37, 71], [3, 235, 160], [99, 0, 42]],
    ])
    .expect("fixture rows are rectangular")
}

/// Deterministic pseudo-random image (xorshift), for property-style checks.
pub fn noise(width: usize, height: usize, seed: u64) -> Image {
    let mut state = seed.max(1);
    let mut img = Image::new(width, height);
    for row in 0..height {
        for col in 0..width {
            let mut px = [0u8; 3];
            for v in &mut px {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                *v = (state >> 24) as u8;
            }
            img.put(row, col, px);
        }
    }
    img
}

/// A spread of shapes, including degenerate single-row/column images.
pub fn sample_images() -> Vec<Image> {
    vec![
        fixture(),
        noise(1, 1, 3),
        noise(1, 7, 5),
        noise(6, 1, 7),
        noise(9, 5, 11),
        noise(16, 16, 13),
    ]
}
