//! Gaussian blur over RGB images.

use image::{imageops, RgbImage};

/// Blur `input` with a Gaussian kernel.
///
/// `sigma <= 0` derives the standard deviation from the kernel size the
/// way the usual image primitives do, so callers can specify the blur by
/// kernel width alone.
pub fn gaussian_blur(input: &RgbImage, kernel_size: u32, sigma: f64) -> RgbImage {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    imageops::blur(input, sigma as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_uniform_image_is_unchanged() {
        let input = RgbImage::from_pixel(16, 16, Rgb([120, 60, 200]));
        let output = gaussian_blur(&input, 5, 1.5);

        assert_eq!(output.dimensions(), (16, 16));
        for pixel in output.pixels() {
            for (got, expected) in pixel.0.iter().zip([120u8, 60, 200]) {
                assert!(
                    got.abs_diff(expected) <= 1,
                    "uniform input must stay uniform, got {:?}",
                    pixel
                );
            }
        }
    }

    #[test]
    fn test_impulse_spreads_to_neighbours() {
        let mut input = RgbImage::from_pixel(9, 9, Rgb([0, 0, 0]));
        input.put_pixel(4, 4, Rgb([255, 255, 255]));

        let output = gaussian_blur(&input, 5, 1.0);

        let center = output.get_pixel(4, 4).0[0];
        let neighbour = output.get_pixel(4, 5).0[0];
        assert!(center < 255, "impulse energy must spread");
        assert!(neighbour > 0, "neighbours must pick up energy");
        assert!(center >= neighbour, "kernel peak stays at the centre");
    }

    #[test]
    fn test_sigma_zero_falls_back_to_kernel_derivation() {
        let input = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        // Must not panic or produce an un-blurred copy path.
        let output = gaussian_blur(&input, 5, 0.0);
        assert_eq!(output.dimensions(), (8, 8));
    }
}
