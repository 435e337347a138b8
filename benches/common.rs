use strip_reader::{Color, PixelImage};

/// Strip-like frame: dark background, three green fiducials, a gray anchor
/// and some pixel noise so the detectors have real work to do.
pub fn synthetic_strip(width: usize, height: usize) -> PixelImage {
    let block = (width / 100).max(4);
    let fiducials = [
        (width * 3 / 20, height / 5),
        (width * 17 / 20, height / 5),
        (width / 2, height * 4 / 5),
    ];
    let anchor = (width * 39 / 200, height * 66 / 100);

    PixelImage::from_fn(width, height, |x, y| {
        let inside = |(cx, cy): (usize, usize)| x.abs_diff(cx) <= block && y.abs_diff(cy) <= block;
        if fiducials.iter().any(|&c| inside(c)) {
            Color::new(151, 255, 0)
        } else if inside(anchor) {
            Color::new(180, 180, 180)
        } else {
            let jitter = ((x * 31 + y * 17) % 7) as u8;
            Color::new(40 + jitter, 40 + jitter, 120 + jitter)
        }
    })
}
