//! A context that records draw commands instead of producing pixels. Each
//! recorded op carries a snapshot of the style state it was issued under,
//! which is what the crate's own tests assert against.

use crate::api::{
    CanvasDrawImage, CanvasFillStyle, CanvasImageSource, CanvasRectangles, CanvasText, TextAlign,
    TextBaseline, TextMetrics,
};
use crate::error::{PlacardError, Result};
use crate::surface::{Extent, Surface};

/// Style state captured at the moment a draw op was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub fill_style: String,
    pub font: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ClearRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        state: Snapshot,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        state: Snapshot,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        state: Snapshot,
    },
    DrawImage {
        source_width: u32,
        source_height: u32,
        dx: f64,
        dy: f64,
        state: Snapshot,
    },
}

#[derive(Clone, Debug)]
struct RecorderState {
    fill_style: String,
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            fill_style: "#000".to_string(),
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    state: RecorderState,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: RecorderState::default(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            fill_style: self.state.fill_style.clone(),
            font: self.state.font.clone(),
            text_align: self.state.text_align,
            text_baseline: self.state.text_baseline,
        }
    }

    fn record_op(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasFillStyle for RecordingCanvas {
    fn set_fill_style(&mut self, color: String) -> Result<()> {
        self.state.fill_style = color;
        Ok(())
    }

    fn fill_style(&self) -> Result<String> {
        Ok(self.state.fill_style.clone())
    }
}

impl CanvasText for RecordingCanvas {
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
        let op = DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            state: self.snapshot(),
        };
        self.record_op(op);
        Ok(())
    }

    fn measure_text(&self, text: &str) -> Result<TextMetrics> {
        Ok(TextMetrics {
            width: text.len() as f64,
        })
    }
}

impl CanvasRectangles for RecordingCanvas {
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let op = DrawOp::ClearRect {
            x,
            y,
            w,
            h,
            state: self.snapshot(),
        };
        self.record_op(op);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let op = DrawOp::FillRect {
            x,
            y,
            w,
            h,
            state: self.snapshot(),
        };
        self.record_op(op);
        Ok(())
    }
}

impl CanvasDrawImage for RecordingCanvas {
    fn draw_image(&mut self, image: &dyn CanvasImageSource, dx: f64, dy: f64) -> Result<()> {
        let op = DrawOp::DrawImage {
            source_width: image.width(),
            source_height: image.height(),
            dx,
            dy,
            state: self.snapshot(),
        };
        self.record_op(op);
        Ok(())
    }
}

/// A [`Surface`] wrapper over [`RecordingCanvas`]. Starts at 0x0.
pub struct RecordingSurface {
    canvas: RecordingCanvas,
    extent: Extent,
    context_available: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            canvas: RecordingCanvas::new(),
            extent: Extent::new(0, 0),
            context_available: true,
        }
    }

    /// A surface whose context acquisition always fails, for exercising the
    /// synchronous failure path.
    pub fn detached() -> Self {
        Self {
            context_available: false,
            ..Self::new()
        }
    }

    pub fn canvas(&self) -> &RecordingCanvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> RecordingCanvas {
        self.canvas
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    type Context = RecordingCanvas;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn resize(&mut self, extent: Extent) -> Result<()> {
        self.extent = extent;
        Ok(())
    }

    fn context(&mut self) -> Result<&mut RecordingCanvas> {
        if !self.context_available {
            return Err(PlacardError::ContextUnavailable);
        }
        Ok(&mut self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImageData;

    fn assert_almost_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn records_fill_rect() {
        let mut c = RecordingCanvas::new();
        c.set_fill_style("#f00".into()).unwrap();
        c.fill_rect(1.0, 2.0, 3.0, 4.0).unwrap();
        let ops = c.ops();
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            DrawOp::FillRect { x, y, w, h, state } => {
                assert_almost_eq(*x, 1.0);
                assert_almost_eq(*y, 2.0);
                assert_almost_eq(*w, 3.0);
                assert_almost_eq(*h, 4.0);
                assert_eq!(state.fill_style, "#f00");
            }
            _ => panic!("unexpected op"),
        }
    }

    #[test]
    fn fill_text_snapshots_current_styles() {
        let mut c = RecordingCanvas::new();
        c.set_font("20px serif".into()).unwrap();
        c.set_text_align(TextAlign::Center).unwrap();
        c.set_text_baseline(TextBaseline::Middle).unwrap();
        c.fill_text("hi", 5.0, 6.0).unwrap();

        // Later style changes must not leak into the recorded op.
        c.set_font("9px serif".into()).unwrap();

        match &c.ops()[0] {
            DrawOp::FillText { text, x, y, state } => {
                assert_eq!(text, "hi");
                assert_almost_eq(*x, 5.0);
                assert_almost_eq(*y, 6.0);
                assert_eq!(state.font, "20px serif");
                assert_eq!(state.text_align, TextAlign::Center);
                assert_eq!(state.text_baseline, TextBaseline::Middle);
            }
            _ => panic!("unexpected op"),
        }
    }

    #[test]
    fn records_draw_image_dimensions() {
        let mut c = RecordingCanvas::new();
        let img = ImageData::new(7, 9);
        c.draw_image(&img, 0.0, 0.0).unwrap();
        match &c.ops()[0] {
            DrawOp::DrawImage {
                source_width,
                source_height,
                ..
            } => {
                assert_eq!((*source_width, *source_height), (7, 9));
            }
            _ => panic!("unexpected op"),
        }
    }

    #[test]
    fn detached_surface_has_no_context() {
        let mut s = RecordingSurface::detached();
        assert!(matches!(
            s.context(),
            Err(PlacardError::ContextUnavailable)
        ));
    }
}
