//! The drawing vocabulary the overlay renderer speaks. The traits mirror the
//! relevant slices of the HTML Canvas 2D context surface; any backend that
//! implements them can be painted on.

use crate::error::Result;

/// An owned block of straight-alpha RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    /// A fully transparent pixel block of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
}

/// Horizontal anchoring of painted text. Mirrors textAlign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
    Start,
    End,
}

/// Vertical anchoring of painted text. Mirrors textBaseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

pub trait CanvasImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Returns a view over straight-alpha RGBA pixels.
    /// Length must be width * height * 4.
    fn data_rgba(&self) -> Option<&[u8]>;
}

impl CanvasImageSource for ImageData {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn data_rgba(&self) -> Option<&[u8]> {
        Some(self.data.as_slice())
    }
}

pub trait CanvasFillStyle {
    /// Sets the CSS color used for fills. Mirrors fillStyle.
    fn set_fill_style(&mut self, color: String) -> Result<()>;
    /// Returns the current fill color. Mirrors fillStyle.
    fn fill_style(&self) -> Result<String>;
}

pub trait CanvasText {
    /// Sets the font string used for text rendering, e.g. "12.5px serif". Mirrors font.
    fn set_font(&mut self, value: String) -> Result<()>;
    /// Returns the current font string. Mirrors font.
    fn font(&self) -> Result<String>;

    /// Sets horizontal text alignment relative to the anchor point. Mirrors textAlign.
    fn set_text_align(&mut self, value: TextAlign) -> Result<()>;
    /// Returns the current text alignment. Mirrors textAlign.
    fn text_align(&self) -> Result<TextAlign>;

    /// Sets the baseline alignment for text. Mirrors textBaseline.
    fn set_text_baseline(&mut self, value: TextBaseline) -> Result<()>;
    /// Returns the current text baseline. Mirrors textBaseline.
    fn text_baseline(&self) -> Result<TextBaseline>;

    /// Fills the given text at (x, y) using the current styles. Mirrors fillText().
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()>;
    /// Measures the advance width of the given text using current font settings. Mirrors measureText().
    fn measure_text(&self, text: &str) -> Result<TextMetrics>;
}

pub trait CanvasRectangles {
    /// Clears the specified rectangle to full transparency. Mirrors clearRect().
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()>;
    /// Fills the specified rectangle using the current fill style. Mirrors fillRect().
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()>;
}

pub trait CanvasDrawImage {
    /// Draws the full source image with its intrinsic size at (dx, dy). Mirrors drawImage(image, dx, dy).
    fn draw_image(&mut self, image: &dyn CanvasImageSource, dx: f64, dy: f64) -> Result<()>;
}

/// Everything the overlay painter needs from a drawing context.
pub trait RenderContext: CanvasFillStyle + CanvasText + CanvasRectangles + CanvasDrawImage {}

impl<T> RenderContext for T where
    T: CanvasFillStyle + CanvasText + CanvasRectangles + CanvasDrawImage
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_data_new_is_transparent() {
        let img = ImageData::new(3, 2);
        assert_eq!(img.data.len(), 24);
        assert!(img.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn from_rgba_rejects_short_buffers() {
        assert!(ImageData::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(ImageData::from_rgba(2, 2, vec![0; 16]).is_some());
    }
}
