use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::{
    as_blue_channel, as_green_channel, as_red_channel, blue_channel, green_channel, map_colors,
    red_channel,
};

/// Guards the subtractive-colour division when K approaches 1
const CMY_EPSILON: f32 = 1e-5;

/// Keep the red channel and zero the other two
pub fn isolate_red(img: &RgbImage) -> RgbImage {
    as_red_channel(&red_channel(img))
}

/// Keep the green channel and zero the other two
pub fn isolate_green(img: &RgbImage) -> RgbImage {
    as_green_channel(&green_channel(img))
}

/// Keep the blue channel and zero the other two
pub fn isolate_blue(img: &RgbImage) -> RgbImage {
    as_blue_channel(&blue_channel(img))
}

/// Normalised (C, M, Y, K) components of one pixel
fn cmyk(p: Rgb<u8>) -> (f32, f32, f32, f32) {
    let r = p[0] as f32 / 255.0;
    let g = p[1] as f32 / 255.0;
    let b = p[2] as f32 / 255.0;
    let k = 1.0 - r.max(g).max(b);
    let denom = 1.0 - k + CMY_EPSILON;
    let c = (1.0 - r - k) / denom;
    let m = (1.0 - g - k) / denom;
    let y = (1.0 - b - k) / denom;
    (c, m, y, k)
}

fn to_u8(v: f32) -> u8 {
    (255.0 * v).clamp(0.0, 255.0) as u8
}

/// Render the cyan, magenta and yellow views of an image
///
/// Each view drives the two channels it does not own to the K complement.
pub fn subtractive_views(img: &RgbImage) -> (RgbImage, RgbImage, RgbImage) {
    let cyan = map_colors(img, |p: Rgb<u8>| {
        let (c, _, _, k) = cmyk(p);
        Rgb([to_u8(1.0 - k), to_u8(1.0 - k), to_u8(1.0 - c)])
    });
    let magenta = map_colors(img, |p: Rgb<u8>| {
        let (_, m, _, k) = cmyk(p);
        Rgb([to_u8(1.0 - k), to_u8(1.0 - m), to_u8(1.0 - k)])
    });
    let yellow = map_colors(img, |p: Rgb<u8>| {
        let (_, _, y, k) = cmyk(p);
        Rgb([to_u8(1.0 - y), to_u8(1.0 - k), to_u8(1.0 - k)])
    });
    (cyan, magenta, yellow)
}

/// Convert one pixel to 8-bit HSV (H in [0, 180), S and V in [0, 255])
///
/// The triple is laid out as (V, S, H), so H ends up in the blue channel.
pub fn rgb_to_hsv(p: Rgb<u8>) -> Rgb<u8> {
    let (r, g, b) = (p[0] as f32, p[1] as f32, p[2] as f32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees folds back to 0 after halving
    let h = ((h / 2.0).round() as u32 % 180) as u8;
    Rgb([v as u8, s.round().min(255.0) as u8, h])
}

/// Remap an RGB image into HSV, stored in the same 3-channel buffer as (V, S, H)
pub fn to_hsv(img: &RgbImage) -> RgbImage {
    map_colors(img, rgb_to_hsv)
}

/// BT.601 luma of one pixel
pub fn luma(p: Rgb<u8>) -> u8 {
    let y = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert image to grayscale
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    map_colors(img, |p: Rgb<u8>| Luma([luma(p)]))
}

/// Binary threshold: values strictly above `threshold` become 255, the rest 0
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    map_colors(gray, |p: Luma<u8>| {
        Luma([if p[0] > threshold { 255 } else { 0 }])
    })
}
