//! Convolution-based filters.
//!
//! Kernels are applied in `f32` and rounded once at the end, so a uniform
//! image passes through every normalised kernel unchanged. Borders reflect
//! about the edge pixel without repeating it (`dcb|abcd|cba`).

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use imageproc::map::{blue_channel, green_channel, map_colors2, red_channel};

/// Sigma implied by a kernel size when none is given explicitly
pub fn sigma_for_kernel(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian kernel of odd `size`
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = sigma_for_kernel(size);
    let center = (size as f32 - 1.0) / 2.0;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Map a possibly out-of-range coordinate back inside `0..len`
fn reflect(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    // Kernels wider than the image need more than one bounce
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Convolve rows with `h_kernel` then columns with `v_kernel`
///
/// Either kernel may be `[1.0]` to skip that direction.
fn convolve<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    h_kernel: &[f32],
    v_kernel: &[f32],
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    let (w, h) = (width as usize, height as usize);
    let channels = P::CHANNEL_COUNT as usize;
    let src = img.as_raw();

    let h_radius = (h_kernel.len() / 2) as isize;
    let mut horizontal = vec![0f32; src.len()];
    for y in 0..h {
        let row = y * w * channels;
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, weight) in h_kernel.iter().enumerate() {
                    let sx = reflect(x as isize + k as isize - h_radius, w);
                    acc += weight * src[row + sx * channels + c] as f32;
                }
                horizontal[row + x * channels + c] = acc;
            }
        }
    }

    let v_radius = (v_kernel.len() / 2) as isize;
    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, weight) in v_kernel.iter().enumerate() {
                    let sy = reflect(y as isize + k as isize - v_radius, h);
                    acc += weight * horizontal[(sy * w + x) * channels + c];
                }
                out[(y * w + x) * channels + c] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    // The buffer length is exactly width * height * channels
    ImageBuffer::from_raw(width, height, out).unwrap_or_else(|| ImageBuffer::new(width, height))
}

/// Isotropic Gaussian smoothing of all channels at once
pub fn gaussian_blur(img: &RgbImage, kernel_size: usize) -> RgbImage {
    let kernel = gaussian_kernel(kernel_size);
    convolve(img, &kernel, &kernel)
}

/// Gaussian smoothing of a single-channel image
pub fn gaussian_blur_gray(img: &GrayImage, kernel_size: usize) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size);
    convolve(img, &kernel, &kernel)
}

/// Split into R, G, B planes
pub fn split_channels(img: &RgbImage) -> [GrayImage; 3] {
    [red_channel(img), green_channel(img), blue_channel(img)]
}

/// Recombine three planes of equal size into an RGB image
pub fn merge_channels(planes: &[GrayImage; 3]) -> RgbImage {
    let [r, g, b] = planes;
    let red_green = map_colors2(r, g, |r: Luma<u8>, g: Luma<u8>| Rgb([r[0], g[0], 0]));
    map_colors2(&red_green, b, |rg: Rgb<u8>, b: Luma<u8>| Rgb([rg[0], rg[1], b[0]]))
}

/// Gaussian smoothing applied to each channel plane separately
pub fn channel_blur(img: &RgbImage, kernel_size: usize) -> RgbImage {
    let planes = split_channels(img).map(|plane| gaussian_blur_gray(&plane, kernel_size));
    merge_channels(&planes)
}

/// Motion blur along the x axis with a box kernel of odd `kernel_size`
pub fn directional_blur(img: &RgbImage, kernel_size: usize) -> RgbImage {
    let kernel = vec![1.0 / kernel_size as f32; kernel_size];
    convolve(img, &kernel, &[1.0])
}

/// Blend `img` with a centre crop of itself scaled by `factor`
///
/// `weight` is the share of the original; the zoomed copy gets the rest.
pub fn zoom_blur(img: &RgbImage, factor: f32, weight: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let zw = ((w as f32 * factor).round() as u32).max(w);
    let zh = ((h as f32 * factor).round() as u32).max(h);
    let zoomed = imageops::resize(img, zw, zh, FilterType::Triangle);
    let crop_x = (zw - w) / 2;
    let crop_y = (zh - h) / 2;
    let cropped = imageops::crop_imm(&zoomed, crop_x, crop_y, w, h).to_image();

    let mut out = img.clone();
    for (dst, zp) in out.pixels_mut().zip(cropped.pixels()) {
        for c in 0..3 {
            let v = weight * dst[c] as f32 + (1.0 - weight) * zp[c] as f32;
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
