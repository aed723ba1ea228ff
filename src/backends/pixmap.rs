//! Pure-Rust raster backend over an RGBA pixel buffer. Glyphs are drawn with
//! `imageproc`/`ab_glyph` from fonts the caller registers; there is no system
//! font discovery.

use std::collections::HashMap;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::warn;

use crate::api::{
    CanvasDrawImage, CanvasFillStyle, CanvasImageSource, CanvasRectangles, CanvasText, TextAlign,
    TextBaseline, TextMetrics,
};
use crate::backends::{parse_color, parse_font};
use crate::error::{PlacardError, Result};
use crate::surface::{Extent, Surface};

/// Caller-populated font registry. The first registered face becomes the
/// default; unknown families silently fall back to it, matching what a
/// browser canvas does with fonts it cannot resolve.
#[derive(Default)]
pub struct FontStore {
    faces: HashMap<String, FontVec>,
    default_family: Option<String>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers raw TTF/OTF bytes under a family name.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let family = family.into();
        let face = FontVec::try_from_vec(bytes).map_err(PlacardError::backend)?;
        if self.default_family.is_none() {
            self.default_family = Some(family.clone());
        }
        self.faces.insert(family, face);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    fn resolve(&self, family: &str) -> Option<&FontVec> {
        if let Some(face) = self.faces.get(family) {
            return Some(face);
        }
        let default = self.default_family.as_deref()?;
        warn!("unknown font family {:?}, falling back to {:?}", family, default);
        self.faces.get(default)
    }
}

#[derive(Clone, Debug)]
struct PixmapState {
    fill_style: String,
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for PixmapState {
    fn default() -> Self {
        Self {
            fill_style: "#000".to_string(),
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

pub struct PixmapCanvas {
    pixels: RgbaImage,
    fonts: FontStore,
    state: PixmapState,
}

impl PixmapCanvas {
    pub fn new(width: u32, height: u32, fonts: FontStore) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            fonts,
            state: PixmapState::default(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn no_fonts() -> PlacardError {
        PlacardError::Backend(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no fonts registered in the FontStore",
        )))
    }

    /// Top-left drawing position for text anchored at (x, y) with the
    /// current alignment and baseline.
    fn anchor_text(&self, x: f64, y: f64, text_w: f64, text_h: f64) -> (f64, f64) {
        let tx = x - match self.state.text_align {
            TextAlign::Left | TextAlign::Start => 0.0,
            TextAlign::Center => text_w / 2.0,
            TextAlign::Right | TextAlign::End => text_w,
        };
        let ty = y - match self.state.text_baseline {
            TextBaseline::Top => 0.0,
            TextBaseline::Hanging => text_h * 0.2,
            TextBaseline::Middle => text_h * 0.5,
            TextBaseline::Alphabetic => text_h * 0.8,
            TextBaseline::Ideographic => text_h * 0.9,
            TextBaseline::Bottom => text_h,
        };
        (tx, ty)
    }
}

impl CanvasFillStyle for PixmapCanvas {
    fn set_fill_style(&mut self, color: String) -> Result<()> {
        self.state.fill_style = color;
        Ok(())
    }

    fn fill_style(&self) -> Result<String> {
        Ok(self.state.fill_style.clone())
    }
}

impl CanvasText for PixmapCanvas {
    fn set_font(&mut self, value: String) -> Result<()> {
        self.state.font = value;
        Ok(())
    }

    fn font(&self) -> Result<String> {
        Ok(self.state.font.clone())
    }

    fn set_text_align(&mut self, value: TextAlign) -> Result<()> {
        self.state.text_align = value;
        Ok(())
    }

    fn text_align(&self) -> Result<TextAlign> {
        Ok(self.state.text_align)
    }

    fn set_text_baseline(&mut self, value: TextBaseline) -> Result<()> {
        self.state.text_baseline = value;
        Ok(())
    }

    fn text_baseline(&self) -> Result<TextBaseline> {
        Ok(self.state.text_baseline)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        let (size, family) = parse_font(&self.state.font);
        let face = self.fonts.resolve(family).ok_or_else(Self::no_fonts)?;
        let scale = PxScale::from(size as f32);

        let (text_w, text_h) = text_size(scale, face, text);
        let (tx, ty) = self.anchor_text(x, y, text_w as f64, text_h as f64);
        let color = Rgba(parse_color(&self.state.fill_style));

        draw_text_mut(
            &mut self.pixels,
            color,
            tx.round() as i32,
            ty.round() as i32,
            scale,
            face,
            text,
        );
        Ok(())
    }

    fn measure_text(&self, text: &str) -> Result<TextMetrics> {
        let (size, family) = parse_font(&self.state.font);
        let face = self.fonts.resolve(family).ok_or_else(Self::no_fonts)?;
        let (text_w, _) = text_size(PxScale::from(size as f32), face, text);
        Ok(TextMetrics {
            width: text_w as f64,
        })
    }
}

impl CanvasRectangles for PixmapCanvas {
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let (width, height) = self.pixels.dimensions();
        let x0 = x.max(0.0) as u32;
        let y0 = y.max(0.0) as u32;
        let x1 = ((x + w).max(0.0) as u32).min(width);
        let y1 = ((y + h).max(0.0) as u32).min(height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let rect = Rect::at(x as i32, y as i32).of_size(w as u32, h as u32);
        let color = Rgba(parse_color(&self.state.fill_style));
        draw_filled_rect_mut(&mut self.pixels, rect, color);
        Ok(())
    }
}

impl CanvasDrawImage for PixmapCanvas {
    fn draw_image(&mut self, image: &dyn CanvasImageSource, dx: f64, dy: f64) -> Result<()> {
        let data = image.data_rgba().ok_or_else(|| {
            PlacardError::Backend(Box::new(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "image source lacks RGBA",
            )))
        })?;
        let src = RgbaImage::from_raw(image.width(), image.height(), data.to_vec())
            .ok_or_else(|| {
                PlacardError::Backend(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "image source pixel buffer is short",
                )))
            })?;
        imageops::overlay(&mut self.pixels, &src, dx as i64, dy as i64);
        Ok(())
    }
}

/// A [`Surface`] over an in-memory RGBA pixel buffer. Starts at 0x0; resizing
/// replaces the buffer with a transparent one at the new dimensions.
pub struct PixmapSurface {
    canvas: PixmapCanvas,
}

impl PixmapSurface {
    pub fn new(fonts: FontStore) -> Self {
        Self {
            canvas: PixmapCanvas::new(0, 0, fonts),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas.pixels
    }
}

impl Surface for PixmapSurface {
    type Context = PixmapCanvas;

    fn extent(&self) -> Extent {
        let (width, height) = self.canvas.pixels.dimensions();
        Extent::new(width, height)
    }

    fn resize(&mut self, extent: Extent) -> Result<()> {
        self.canvas.pixels = RgbaImage::new(extent.width, extent.height);
        Ok(())
    }

    fn context(&mut self) -> Result<&mut PixmapCanvas> {
        Ok(&mut self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImageData;

    #[test]
    fn draw_image_copies_pixels() {
        let mut c = PixmapCanvas::new(4, 4, FontStore::new());
        let mut img = ImageData::new(2, 2);
        for px in img.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[255, 0, 0, 255]);
        }
        c.draw_image(&img, 1.0, 1.0).unwrap();

        assert_eq!(c.pixels().get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(c.pixels().get_pixel(2, 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(c.pixels().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(c.pixels().get_pixel(3, 3), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn fill_and_clear_rect() {
        let mut c = PixmapCanvas::new(4, 4, FontStore::new());
        c.set_fill_style("#00ff00".into()).unwrap();
        c.fill_rect(0.0, 0.0, 4.0, 4.0).unwrap();
        assert_eq!(c.pixels().get_pixel(3, 3), &Rgba([0, 255, 0, 255]));

        c.clear_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert_eq!(c.pixels().get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
        assert_eq!(c.pixels().get_pixel(3, 3), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn clear_rect_clamps_to_bounds() {
        let mut c = PixmapCanvas::new(2, 2, FontStore::new());
        c.clear_rect(-5.0, -5.0, 100.0, 100.0).unwrap();
    }

    #[test]
    fn text_without_fonts_is_a_backend_error() {
        let mut c = PixmapCanvas::new(4, 4, FontStore::new());
        c.set_font("10px serif".into()).unwrap();
        let err = c.fill_text("hi", 0.0, 0.0).unwrap_err();
        assert!(matches!(err, PlacardError::Backend(_)));
    }

    #[test]
    fn surface_resize_replaces_the_buffer() {
        let mut s = PixmapSurface::new(FontStore::new());
        assert_eq!(s.extent(), Extent::new(0, 0));
        s.resize(Extent::new(6, 3)).unwrap();
        assert_eq!(s.extent(), Extent::new(6, 3));
        assert!(s.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
