/*
 * Color Module
 *
 * RGB colors as they appear in the configuration file, plus the
 * lightening used to derive a flock's trail color from its body color.
 */

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

// Lighten a color by moving every channel up by the same amount.
// The amount is the smallest headroom among the channels scaled by `scale`,
// so a scale of 1.0 pushes the brightest channel to exactly 255.
pub fn lighten(color: Rgb8, scale: f64) -> Rgb8 {
    let gap = color
        .channels()
        .iter()
        .map(|&c| 255 - c)
        .min()
        .unwrap_or(0);
    let additional = f64::from(gap) * scale;

    let shift = |c: u8| -> u8 { (f64::from(c) + additional).trunc().clamp(0.0, 255.0) as u8 };
    Rgb8::new(shift(color.r), shift(color.g), shift(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_uses_smallest_headroom() {
        // Headroom is (155, 55, 235); the shared shift is 55 * 0.5 = 27.5.
        let lighter = lighten(Rgb8::new(100, 200, 20), 0.5);
        assert_eq!(lighter, Rgb8::new(127, 227, 47));
    }

    #[test]
    fn lighten_full_scale_saturates_brightest_channel() {
        let lighter = lighten(Rgb8::new(10, 240, 30), 1.0);
        assert_eq!(lighter, Rgb8::new(25, 255, 45));
    }

    #[test]
    fn lighten_zero_scale_is_identity() {
        let color = Rgb8::new(12, 34, 56);
        assert_eq!(lighten(color, 0.0), color);
    }

    #[test]
    fn deserializes_from_array() {
        #[derive(Deserialize)]
        struct Holder {
            color: Rgb8,
        }
        let holder: Holder = toml::from_str("color = [1, 2, 3]").unwrap();
        assert_eq!(holder.color, Rgb8::new(1, 2, 3));
    }
}
