//! Minimal raster surface for generator output.

use std::convert::Infallible;

use avatrope_types::frame::Frame;
use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb888,
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use image::{ImageBuffer, Rgba, RgbaImage};
use profont::PROFONT_24_POINT;

use avatrope_types::color::lerp_rgb;

use crate::render_error;

/// ProFont 24pt doubled lands close to 72pt lettering on a 200px tile.
const TEXT_SCALE: u32 = 2;
/// Extra horizontal pixels painted per glyph dot for a bold weight.
const BOLD_SPREAD: u32 = 1;
/// Distance between the north label and the top edge, in glyph units.
const NORTH_MARGIN: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    North,
    South,
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn solid(width: u32, height: u32, color: [u8; 3]) -> Self {
        let [r, g, b] = color;
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    /// Left-to-right linear gradient covering the whole surface.
    pub fn horizontal_gradient(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> Self {
        let span = width.saturating_sub(1).max(1) as f64;
        let image = RgbaImage::from_fn(width, height, |x, _| {
            let [r, g, b] = lerp_rgb(left, right, x as f64 / span);
            Rgba([r, g, b, 255])
        });
        Self { image }
    }

    /// Draws bold white text centred horizontally against one edge.
    pub fn annotate(&mut self, text: &str, gravity: Gravity) {
        let mut target = ScaledTarget {
            image: &mut self.image,
            scale: TEXT_SCALE,
            spread: BOLD_SPREAD,
        };
        let size = target.size();
        let center = size.width as i32 / 2;
        let (anchor, baseline) = match gravity {
            Gravity::North => (Point::new(center, NORTH_MARGIN), Baseline::Top),
            Gravity::South => (Point::new(center, size.height as i32 - 1), Baseline::Bottom),
        };
        let character_style = MonoTextStyle::new(&PROFONT_24_POINT, Rgb888::WHITE);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(baseline)
            .build();
        Text::with_text_style(text, anchor, character_style, text_style)
            .draw(&mut target)
            .ok();
    }

    pub fn into_frame(self, rendered_at: i64) -> Frame {
        let (width, height) = self.image.dimensions();
        Frame::from_rgba(width, height, self.image.into_raw(), rendered_at)
    }
}

/// Rebuilds an owned image buffer from a frame's raw pixels.
pub fn frame_to_image(frame: &Frame) -> avatrope_types::Result<RgbaImage> {
    ImageBuffer::<Rgba<u8>, _>::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            render_error(format!(
                "frame buffer does not match {}x{}",
                frame.width, frame.height
            ))
        })
}

/// Draw target that paints every glyph dot as a block of image pixels.
struct ScaledTarget<'a> {
    image: &'a mut RgbaImage,
    scale: u32,
    spread: u32,
}

impl OriginDimensions for ScaledTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.image.width() / self.scale, self.image.height() / self.scale)
    }
}

impl DrawTarget for ScaledTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let x0 = point.x as u32 * self.scale;
            let y0 = point.y as u32 * self.scale;
            let rgba = Rgba([color.r(), color.g(), color.b(), 255]);
            for y in y0..(y0 + self.scale).min(height) {
                for x in x0..(x0 + self.scale + self.spread).min(width) {
                    self.image.put_pixel(x, y, rgba);
                }
            }
        }
        Ok(())
    }
}
