//! SVG backend using a streaming XML writer. Images are embedded as PNG data
//! URIs; labels become `<text>` elements, so the exported overlay stays
//! editable in any vector tool.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use png::{ColorType, Encoder as PngEncoder};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::api::{
    CanvasDrawImage, CanvasFillStyle, CanvasImageSource, CanvasRectangles, CanvasText, TextAlign,
    TextBaseline, TextMetrics,
};
use crate::backends::parse_font;
use crate::error::{PlacardError, Result};
use crate::surface::{Extent, Surface};

#[derive(Clone, Debug)]
struct SvgState {
    fill_style: String,
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for SvgState {
    fn default() -> Self {
        Self {
            fill_style: "#000".to_string(),
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Minimal SVG canvas wrapper around `quick_xml::Writer`.
pub struct SvgCanvas<W: Write> {
    writer: Writer<W>,
    open_root: bool,
    state: SvgState,
}

impl<W: Write> SvgCanvas<W> {
    /// Create a new SVG canvas that writes into the provided sink, emitting
    /// the root `<svg>`. Width/height are expressed in CSS pixels; a matching
    /// `viewBox` is set.
    pub fn new(inner: W, width: f64, height: f64) -> Result<Self> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let width_attr = width.to_string();
        let height_attr = height.to_string();
        let view_box_attr = format!("0 0 {} {}", width, height);

        let mut start = BytesStart::new("svg");
        start.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        start.push_attribute(("version", "1.1"));
        start.push_attribute(("width", width_attr.as_str()));
        start.push_attribute(("height", height_attr.as_str()));
        start.push_attribute(("viewBox", view_box_attr.as_str()));
        writer.write_event(Event::Start(start))?;

        Ok(Self {
            writer,
            open_root: true,
            state: SvgState::default(),
        })
    }

    /// Finish the document, closing the root element and returning the inner writer.
    pub fn finish(mut self) -> Result<W> {
        if self.open_root {
            self.writer.write_event(Event::End(BytesEnd::new("svg")))?;
            self.open_root = false;
        }
        Ok(self.writer.into_inner())
    }

    fn not_supported(op: &'static str) -> PlacardError {
        PlacardError::Backend(Box::new(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("SVG backend does not implement {op}"),
        )))
    }

    fn encode_image_as_data_uri(&self, image: &dyn CanvasImageSource) -> Result<String> {
        let width = image.width();
        let height = image.height();
        let data = image
            .data_rgba()
            .ok_or_else(|| Self::not_supported("image source lacks RGBA"))?;

        let mut png_bytes = Vec::new();
        let mut encoder = PngEncoder::new(&mut png_bytes, width, height);
        encoder.set_color(ColorType::Rgba);
        let mut writer = encoder.write_header().map_err(PlacardError::backend)?;
        writer
            .write_image_data(data)
            .map_err(PlacardError::backend)?;
        writer.finish().map_err(PlacardError::backend)?;

        let encoded = BASE64_STANDARD.encode(png_bytes);
        Ok(format!("data:image/png;base64,{}", encoded))
    }
}

fn map_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left | TextAlign::Start => "start",
        TextAlign::Center => "middle",
        TextAlign::Right | TextAlign::End => "end",
    }
}

fn map_baseline(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Top => "text-before-edge",
        TextBaseline::Hanging => "hanging",
        TextBaseline::Middle => "central",
        TextBaseline::Alphabetic => "alphabetic",
        TextBaseline::Ideographic => "ideographic",
        TextBaseline::Bottom => "text-after-edge",
    }
}

impl<W: Write> CanvasFillStyle for SvgCanvas<W> {
    fn set_fill_style(&mut self, color: String) -> Result<()> {
        self.state.fill_style = color;
        Ok(())
    }

    fn fill_style(&self) -> Result<String> {
        Ok(self.state.fill_style.clone())
    }
}

impl<W: Write> CanvasText for SvgCanvas<W> {
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
        let x_attr = x.to_string();
        let y_attr = y.to_string();
        let size_attr = size.to_string();

        let mut elem = BytesStart::new("text");
        elem.push_attribute(("x", x_attr.as_str()));
        elem.push_attribute(("y", y_attr.as_str()));
        elem.push_attribute(("font-size", size_attr.as_str()));
        elem.push_attribute(("font-family", family));
        elem.push_attribute(("fill", self.state.fill_style.as_str()));
        elem.push_attribute(("text-anchor", map_anchor(self.state.text_align)));
        elem.push_attribute((
            "dominant-baseline",
            map_baseline(self.state.text_baseline),
        ));
        self.writer.write_event(Event::Start(elem))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new("text")))?;
        Ok(())
    }

    fn measure_text(&self, text: &str) -> Result<TextMetrics> {
        // Without font metrics, estimate from the glyph count and size.
        let (size, _) = parse_font(&self.state.font);
        Ok(TextMetrics {
            width: text.chars().count() as f64 * size * 0.6,
        })
    }
}

impl<W: Write> CanvasRectangles for SvgCanvas<W> {
    fn clear_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) -> Result<()> {
        // A fresh SVG document is already blank and elements cannot be
        // erased after the fact, so there is nothing to emit.
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let x_attr = x.to_string();
        let y_attr = y.to_string();
        let w_attr = w.to_string();
        let h_attr = h.to_string();

        let mut elem = BytesStart::new("rect");
        elem.push_attribute(("x", x_attr.as_str()));
        elem.push_attribute(("y", y_attr.as_str()));
        elem.push_attribute(("width", w_attr.as_str()));
        elem.push_attribute(("height", h_attr.as_str()));
        elem.push_attribute(("fill", self.state.fill_style.as_str()));
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }
}

impl<W: Write> CanvasDrawImage for SvgCanvas<W> {
    fn draw_image(&mut self, image: &dyn CanvasImageSource, dx: f64, dy: f64) -> Result<()> {
        let href = self.encode_image_as_data_uri(image)?;
        let x_attr = dx.to_string();
        let y_attr = dy.to_string();
        let w_attr = image.width().to_string();
        let h_attr = image.height().to_string();

        let mut elem = BytesStart::new("image");
        elem.push_attribute(("x", x_attr.as_str()));
        elem.push_attribute(("y", y_attr.as_str()));
        elem.push_attribute(("width", w_attr.as_str()));
        elem.push_attribute(("height", h_attr.as_str()));
        elem.push_attribute(("href", href.as_str()));
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }
}

/// A [`Surface`] that produces an SVG document in memory. Resizing discards
/// the document written so far and starts a fresh one at the new dimensions.
pub struct SvgSurface {
    extent: Extent,
    canvas: Option<SvgCanvas<Vec<u8>>>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            extent: Extent::new(0, 0),
            canvas: None,
        }
    }

    /// Closes the document and returns its bytes. Fails when nothing has
    /// been drawn yet.
    pub fn finish(self) -> Result<Vec<u8>> {
        match self.canvas {
            Some(canvas) => canvas.finish(),
            None => Err(PlacardError::ContextUnavailable),
        }
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for SvgSurface {
    type Context = SvgCanvas<Vec<u8>>;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn resize(&mut self, extent: Extent) -> Result<()> {
        self.extent = extent;
        self.canvas = None;
        Ok(())
    }

    fn context(&mut self) -> Result<&mut SvgCanvas<Vec<u8>>> {
        if self.canvas.is_none() {
            let canvas = SvgCanvas::new(
                Vec::new(),
                self.extent.width as f64,
                self.extent.height as f64,
            )?;
            self.canvas = Some(canvas);
        }
        Ok(self.canvas.as_mut().expect("canvas created above"))
    }
}
