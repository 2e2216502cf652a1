// ============================================================================
// IMAGE FILTERS: kernel convolution (blur, sharpen)
// ============================================================================

use crate::canvas::{Image, clamp_truncate};
use crate::error::{EditError, Result};

/// A square convolution kernel with an odd side length, row-major weights.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    pub fn new(size: usize, weights: Vec<f64>) -> Result<Self> {
        if size % 2 == 0 {
            return Err(EditError::InvalidKernel(format!("side {size} is not odd")));
        }
        if weights.len() != size * size {
            return Err(EditError::InvalidKernel(format!(
                "{} weights for a {size}x{size} kernel",
                weights.len()
            )));
        }
        Ok(Self { size, weights })
    }

    /// 1×1 kernel `[[1.0]]`.
    pub fn identity() -> Self {
        Self {
            size: 1,
            weights: vec![1.0],
        }
    }

    /// 3×3 Gaussian-like blur.
    pub fn blur() -> Self {
        Self {
            size: 3,
            weights: vec![0.0625, 0.125, 0.0625, 0.125, 0.25, 0.125, 0.0625, 0.125, 0.0625],
        }
    }

    /// 5×5 sharpen: centre 1, inner ring 1/4, outer ring -1/8.
    pub fn sharpen() -> Self {
        let mut weights = vec![-0.125; 25];
        for row in 1..4 {
            for col in 1..4 {
                weights[row * 5 + col] = 0.25;
            }
        }
        weights[12] = 1.0;
        Self { size: 5, weights }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the kernel's centre to its edge.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }
}

/// Built-in neighbourhood filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Blur,
    Sharpen,
}

impl Filter {
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
        }
    }

    pub fn kernel(&self) -> Kernel {
        match self {
            Filter::Blur => Kernel::blur(),
            Filter::Sharpen => Kernel::sharpen(),
        }
    }
}

/// Convolve every channel of `src` with `kernel`.
///
/// Kernel taps that fall outside the image contribute nothing and the
/// remaining weights are not renormalised. Sums are clamped to [0, 255] and
/// truncated toward zero.
pub fn convolve(src: &Image, kernel: &Kernel) -> Image {
    let r = kernel.radius() as isize;
    src.map_rows(|row, out| {
        for (col, px) in out.iter_mut().enumerate() {
            let mut acc = [0.0f64; 3];
            for dy in -r..=r {
                for dx in -r..=r {
                    let Some(sample) = src.get_checked(row as isize + dy, col as isize + dx) else {
                        continue;
                    };
                    let w = kernel.weight((dy + r) as usize, (dx + r) as usize);
                    for c in 0..3 {
                        acc[c] += sample[c] as f64 * w;
                    }
                }
            }
            *px = acc.map(clamp_truncate);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_rejects_even_or_short() {
        assert!(Kernel::new(2, vec![0.25; 4]).is_err());
        assert!(Kernel::new(3, vec![1.0; 8]).is_err());
        assert!(Kernel::new(3, vec![0.0; 9]).is_ok());
    }

    #[test]
    fn sharpen_kernel_layout() {
        let k = Kernel::sharpen();
        assert_eq!(k.weight(2, 2), 1.0);
        assert_eq!(k.weight(1, 3), 0.25);
        assert_eq!(k.weight(0, 4), -0.125);
        assert_eq!(k.weight(4, 2), -0.125);
        let total: f64 = k.weights.iter().sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn blur_of_single_pixel_keeps_only_centre_weight() {
        let img = Image::from_rows(&[vec![[200, 100, 8]]]).unwrap();
        // only the 1/4 centre tap lands inside the image
        assert_eq!(convolve(&img, &Kernel::blur()).get(0, 0), [50, 25, 2]);
    }

    #[test]
    fn negative_sums_clamp_to_zero() {
        let mut img = Image::new(3, 3);
        for row in 0..3 {
            for col in 0..3 {
                img.put(row, col, [255, 255, 255]);
            }
        }
        img.put(1, 1, [0, 0, 0]);
        let k = Kernel::new(3, vec![-1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, -1.0]).unwrap();
        assert_eq!(convolve(&img, &k).get(1, 1), [0, 0, 0]);
    }
}
