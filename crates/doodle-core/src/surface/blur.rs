//! Separable gaussian blur over a premultiplied pixmap.

use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Largest sigma the blur accepts; wider requests are clamped.
pub(crate) const MAX_SIGMA: f32 = 64.0;

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=radius * 2)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        for k in &mut kernel {
            *k /= sum;
        }
    }
    kernel
}

/// One convolution pass along rows (`horizontal`) or columns, clamping at the edges.
fn convolve(
    src: &[[f32; 4]],
    width: usize,
    height: usize,
    kernel: &[f32],
    horizontal: bool,
) -> Vec<[f32; 4]> {
    let radius = (kernel.len() / 2) as isize;
    let mut dst = vec![[0.0; 4]; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut accum = [0.0; 4];
            for (i, weight) in kernel.iter().enumerate() {
                let offset = i as isize - radius;
                let (sx, sy) = if horizontal {
                    ((x as isize + offset).clamp(0, width as isize - 1) as usize, y)
                } else {
                    (x, (y as isize + offset).clamp(0, height as isize - 1) as usize)
                };
                let sample = src[sy * width + sx];
                for c in 0..4 {
                    accum[c] += sample[c] * weight;
                }
            }
            dst[y * width + x] = accum;
        }
    }
    dst
}

/// Blur the pixmap in place. Non-positive or non-finite sigmas are a no-op.
pub(crate) fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    if !sigma.is_finite() || sigma <= 0.0 {
        return;
    }
    let kernel = gaussian_kernel(sigma.min(MAX_SIGMA));
    if kernel.len() < 3 {
        return;
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let src: Vec<[f32; 4]> = pixmap
        .pixels()
        .iter()
        .map(|p| {
            [
                p.red() as f32,
                p.green() as f32,
                p.blue() as f32,
                p.alpha() as f32,
            ]
        })
        .collect();

    let rows = convolve(&src, width, height, &kernel, true);
    let blurred = convolve(&rows, width, height, &kernel, false);

    for (px, v) in pixmap.pixels_mut().iter_mut().zip(blurred.iter()) {
        let a = v[3].round().clamp(0.0, 255.0);
        // Premultiplied channels may not exceed alpha.
        let channel = |c: f32| c.round().clamp(0.0, a) as u8;
        *px = PremultipliedColorU8::from_rgba(channel(v[0]), channel(v[1]), channel(v[2]), a as u8)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
}
