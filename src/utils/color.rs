//! Colour helpers shared by the validator, the edge detectors and the finder
use crate::models::Color;

/// True when every channel of `a` is within `tolerance` of `b`
#[inline]
pub fn matches(a: Color, b: Color, tolerance: u8) -> bool {
    let t = tolerance as i32;
    (a.red as i32 - b.red as i32).abs() <= t
        && (a.green as i32 - b.green as i32).abs() <= t
        && (a.blue as i32 - b.blue as i32).abs() <= t
}

/// True when `color` matches at least one of `palette`
#[inline]
pub fn matches_any(color: Color, palette: &[Color], tolerance: u8) -> bool {
    palette.iter().any(|&p| matches(color, p, tolerance))
}

/// Per-channel absolute differences
#[inline]
pub fn channel_differences(a: Color, b: Color) -> [i32; 3] {
    [
        (a.red as i32 - b.red as i32).abs(),
        (a.green as i32 - b.green as i32).abs(),
        (a.blue as i32 - b.blue as i32).abs(),
    ]
}

/// Sum of the per-channel absolute differences, 0..=765
#[inline]
pub fn channel_difference(a: Color, b: Color) -> i32 {
    channel_differences(a, b).iter().sum()
}

/// Integer mean of the three channels
#[inline]
pub fn mean_brightness(c: Color) -> u8 {
    ((c.red as u16 + c.green as u16 + c.blue as u16) / 3) as u8
}

/// Brightest channel
#[inline]
pub fn max_brightness(c: Color) -> u8 {
    c.red.max(c.green).max(c.blue)
}
