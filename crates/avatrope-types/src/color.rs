use serde::{Deserialize, Serialize};

/// Saturation shared by every generator palette.
pub const PASTEL_SATURATION: f64 = 0.41;
/// Lightness shared by every generator palette.
pub const PASTEL_LIGHTNESS: f64 = 0.69;

/// HSL color with hue in degrees and saturation/lightness in `[0, 1]`.
///
/// Hues outside `[0, 360)` are wrapped on construction, negative values
/// included, so callers may hand over raw phase arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue: normalize_hue(hue),
            saturation: saturation.clamp(0.0, 1.0),
            lightness: lightness.clamp(0.0, 1.0),
        }
    }

    pub fn pastel(hue: f64) -> Self {
        Self::new(hue, PASTEL_SATURATION, PASTEL_LIGHTNESS)
    }

    pub fn to_rgb(self) -> [u8; 3] {
        let chroma = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let sector = self.hue / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = self.lightness - chroma / 2.0;
        [channel(r + m), channel(g + m), channel(b + m)]
    }
}

pub fn normalize_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Linear interpolation between two RGB colors, `t` in `[0, 1]`.
pub fn lerp_rgb(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| channel((a as f64 + (b as f64 - a as f64) * t) / 255.0);
    [mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])]
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
