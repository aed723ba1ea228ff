//! Cairo backend behind the optional `cairo` feature. Text rendering uses
//! Cairo's toy text API, which resolves font families through the platform
//! and quietly substitutes a default face for families it does not know.

use cairo::{Context, Format, ImageSurface};

use crate::api::{
    CanvasDrawImage, CanvasFillStyle, CanvasImageSource, CanvasRectangles, CanvasText, ImageData,
    TextAlign, TextBaseline, TextMetrics,
};
use crate::backends::{parse_color, parse_font};
use crate::error::{PlacardError, Result};
use crate::surface::{Extent, Surface};

/// Adapter that translates the drawing traits into Cairo operations.
pub struct CairoCanvas {
    ctx: Context,
    fill_style: String,
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl CairoCanvas {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            fill_style: "#000000".into(),
            font: "16px Sans".into(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }

    fn apply_fill(&self) {
        let [r, g, b, a] = parse_color(&self.fill_style);
        self.ctx.set_source_rgba(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        );
    }

    fn apply_font(&self) {
        let (size, family) = parse_font(&self.font);
        self.ctx
            .select_font_face(family, cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        self.ctx.set_font_size(size);
    }

    fn image_surface_from_rgba(&self, image: &dyn CanvasImageSource) -> Result<ImageSurface> {
        let width = image.width();
        let height = image.height();
        let data = image.data_rgba().ok_or_else(|| {
            PlacardError::Backend(Box::new(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "image source lacks RGBA",
            )))
        })?;

        let mut surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
        {
            let stride = surface.stride() as usize;
            let mut dest = surface.data().map_err(PlacardError::backend)?;
            for y in 0..height as usize {
                for x in 0..width as usize {
                    let src = (y * width as usize + x) * 4;
                    let [r, g, b, a] = [data[src], data[src + 1], data[src + 2], data[src + 3]];
                    // Cairo wants premultiplied BGRA in native endianness.
                    let pm = |c: u8| ((c as u32 * a as u32) / 255) as u8;
                    let px = u32::from_le_bytes([pm(b), pm(g), pm(r), a]);
                    let dst = y * stride + x * 4;
                    dest[dst..dst + 4].copy_from_slice(&px.to_ne_bytes());
                }
            }
        }
        Ok(surface)
    }

    fn adjust_text_position(&self, text: &str, x: f64, y: f64) -> Result<(f64, f64)> {
        let extents = self.ctx.text_extents(text)?;
        let mut tx = x;
        let mut ty = y;

        tx -= match self.text_align {
            TextAlign::Left | TextAlign::Start => 0.0,
            TextAlign::Center => extents.width() / 2.0,
            TextAlign::Right | TextAlign::End => extents.width(),
        };

        ty += match self.text_baseline {
            TextBaseline::Top => extents.height(),
            TextBaseline::Hanging => extents.height() * 0.8,
            TextBaseline::Middle => extents.height() * 0.5,
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Ideographic => extents.height() * 0.1,
            TextBaseline::Bottom => -extents.y_bearing(),
        };

        Ok((tx, ty))
    }
}

impl CanvasFillStyle for CairoCanvas {
    fn set_fill_style(&mut self, color: String) -> Result<()> {
        self.fill_style = color;
        Ok(())
    }

    fn fill_style(&self) -> Result<String> {
        Ok(self.fill_style.clone())
    }
}

impl CanvasText for CairoCanvas {
    fn set_font(&mut self, value: String) -> Result<()> {
        self.font = value;
        Ok(())
    }

    fn font(&self) -> Result<String> {
        Ok(self.font.clone())
    }

    fn set_text_align(&mut self, value: TextAlign) -> Result<()> {
        self.text_align = value;
        Ok(())
    }

    fn text_align(&self) -> Result<TextAlign> {
        Ok(self.text_align)
    }

    fn set_text_baseline(&mut self, value: TextBaseline) -> Result<()> {
        self.text_baseline = value;
        Ok(())
    }

    fn text_baseline(&self) -> Result<TextBaseline> {
        Ok(self.text_baseline)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.apply_font();
        self.apply_fill();
        let (tx, ty) = self.adjust_text_position(text, x, y)?;
        self.ctx.move_to(tx, ty);
        self.ctx.show_text(text)?;
        Ok(())
    }

    fn measure_text(&self, text: &str) -> Result<TextMetrics> {
        self.apply_font();
        let extents = self.ctx.text_extents(text)?;
        Ok(TextMetrics {
            width: extents.width(),
        })
    }
}

impl CanvasRectangles for CairoCanvas {
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        self.ctx.save()?;
        self.ctx.rectangle(x, y, w, h);
        self.ctx.set_operator(cairo::Operator::Clear);
        self.ctx.fill()?;
        self.ctx.restore()?;
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        self.ctx.rectangle(x, y, w, h);
        self.apply_fill();
        self.ctx.fill()?;
        Ok(())
    }
}

impl CanvasDrawImage for CairoCanvas {
    fn draw_image(&mut self, image: &dyn CanvasImageSource, dx: f64, dy: f64) -> Result<()> {
        let surface = self.image_surface_from_rgba(image)?;
        self.ctx.save()?;
        self.ctx.set_source_surface(&surface, dx, dy)?;
        self.ctx
            .rectangle(dx, dy, image.width() as f64, image.height() as f64);
        self.ctx.clip();
        self.ctx.paint()?;
        self.ctx.restore()?;
        Ok(())
    }
}

/// A [`Surface`] backed by a Cairo image surface. Resizing allocates a fresh
/// ARGB32 surface at the new dimensions.
pub struct CairoSurface {
    extent: Extent,
    surface: Option<ImageSurface>,
    canvas: Option<CairoCanvas>,
}

impl CairoSurface {
    pub fn new() -> Self {
        Self {
            extent: Extent::new(0, 0),
            surface: None,
            canvas: None,
        }
    }

    /// Reads the rendered pixels back as straight-alpha RGBA. Drops the
    /// current drawing context, since Cairo only exposes pixel data through
    /// an exclusive reference; the next `context()` call makes a new one
    /// over the same surface.
    pub fn image_data(&mut self) -> Result<ImageData> {
        self.canvas = None;
        let Some(surface) = self.surface.as_mut() else {
            return Err(PlacardError::ContextUnavailable);
        };
        surface.flush();
        let width = self.extent.width;
        let height = self.extent.height;
        let stride = surface.stride() as usize;
        let data = surface.data().map_err(PlacardError::backend)?;

        let mut out = vec![0u8; (width as usize) * (height as usize) * 4];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let src = y * stride + x * 4;
                let px =
                    u32::from_ne_bytes([data[src], data[src + 1], data[src + 2], data[src + 3]]);
                let [b, g, r, a] = px.to_le_bytes();
                // Undo premultiplication.
                let un = |c: u8| {
                    if a == 0 {
                        0
                    } else {
                        ((c as u32 * 255) / a as u32).min(255) as u8
                    }
                };
                let dst = (y * width as usize + x) * 4;
                out[dst..dst + 4].copy_from_slice(&[un(r), un(g), un(b), a]);
            }
        }
        Ok(ImageData {
            width,
            height,
            data: out,
        })
    }
}

impl Default for CairoSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for CairoSurface {
    type Context = CairoCanvas;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn resize(&mut self, extent: Extent) -> Result<()> {
        self.extent = extent;
        self.surface = None;
        self.canvas = None;
        Ok(())
    }

    fn context(&mut self) -> Result<&mut CairoCanvas> {
        if self.surface.is_none() {
            let surface = ImageSurface::create(
                Format::ARgb32,
                self.extent.width as i32,
                self.extent.height as i32,
            )
            .map_err(|_| PlacardError::ContextUnavailable)?;
            self.surface = Some(surface);
        }
        if self.canvas.is_none() {
            let surface = self.surface.as_ref().expect("surface created above");
            let ctx = Context::new(surface).map_err(|_| PlacardError::ContextUnavailable)?;
            self.canvas = Some(CairoCanvas::new(ctx));
        }
        Ok(self.canvas.as_mut().expect("canvas created above"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_image_round_trips_opaque_pixels() {
        let mut s = CairoSurface::new();
        s.resize(Extent::new(2, 2)).unwrap();

        let mut img = ImageData::new(2, 2);
        for px in img.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[200, 100, 50, 255]);
        }
        s.context().unwrap().draw_image(&img, 0.0, 0.0).unwrap();

        let back = s.image_data().unwrap();
        assert_eq!(&back.data[0..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn clear_rect_erases_pixels() {
        let mut s = CairoSurface::new();
        s.resize(Extent::new(2, 1)).unwrap();
        {
            let ctx = s.context().unwrap();
            ctx.set_fill_style("#ffffff".into()).unwrap();
            ctx.fill_rect(0.0, 0.0, 2.0, 1.0).unwrap();
            ctx.clear_rect(0.0, 0.0, 1.0, 1.0).unwrap();
        }
        let back = s.image_data().unwrap();
        assert_eq!(back.data[3], 0);
        assert_eq!(back.data[7], 255);
    }
}
