//! The overlay renderer: paint a loaded image onto a surface, then a main
//! label at the center and a sub-label above or below it, with font sizes
//! derived from the surface width.

use log::debug;

use crate::api::{CanvasImageSource, ImageData, RenderContext, TextAlign, TextBaseline};
use crate::error::Result;
use crate::loader;
use crate::surface::{Extent, Surface};

/// Main label font size is surface width divided by this.
const MAIN_FONT_DIVISOR: f64 = 4.0;
/// Sub label font size is surface width divided by this, independent of the
/// main label's size.
const SUB_FONT_DIVISOR: f64 = 32.0;

/// One line of styled text. Alignment and baseline are optional and resolve
/// to `Center`/`Middle` before drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub content: String,
    pub font_family: String,
    pub font_color: String,
    pub text_align: Option<TextAlign>,
    pub text_baseline: Option<TextBaseline>,
}

impl Text {
    pub fn new(
        content: impl Into<String>,
        font_family: impl Into<String>,
        font_color: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            font_family: font_family.into(),
            font_color: font_color.into(),
            text_align: None,
            text_baseline: None,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.text_baseline = Some(baseline);
        self
    }

    /// Fills in the default alignment and baseline, yielding the effective
    /// styling the painter will use.
    pub fn resolve(&self) -> ResolvedText {
        ResolvedText {
            content: self.content.clone(),
            font_family: self.font_family.clone(),
            font_color: self.font_color.clone(),
            text_align: self.text_align.unwrap_or(TextAlign::Center),
            text_baseline: self.text_baseline.unwrap_or(TextBaseline::Middle),
        }
    }
}

/// A [`Text`] with all optional styling made explicit.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedText {
    pub content: String,
    pub font_family: String,
    pub font_color: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
}

/// Where the sub label sits relative to the main label's vertical extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubTextPosition {
    Top,
    Bottom,
}

/// Caller-supplied overlay configuration; read-only during rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawTextOptions {
    pub text: Text,
    pub sub_text: Text,
    pub sub_text_position: SubTextPosition,
}

impl DrawTextOptions {
    /// Resolves both labels' optional styling up front, so the painter only
    /// ever sees a fully explicit configuration.
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            text: self.text.resolve(),
            sub_text: self.sub_text.resolve(),
            sub_text_position: self.sub_text_position,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    pub text: ResolvedText,
    pub sub_text: ResolvedText,
    pub sub_text_position: SubTextPosition,
}

fn apply_text_style<C: RenderContext>(ctx: &mut C, text: &ResolvedText, font_size: f64) -> Result<()> {
    ctx.set_font(format!("{}px {}", font_size, text.font_family))?;
    ctx.set_fill_style(text.font_color.clone())?;
    ctx.set_text_align(text.text_align)?;
    ctx.set_text_baseline(text.text_baseline)?;
    Ok(())
}

/// Paints the image and both labels onto an already-sized context.
///
/// The context is assumed to span exactly `image`'s dimensions; callers that
/// hold a [`Surface`] should go through [`draw_image_with_text`] instead,
/// which resizes first.
pub fn paint<C: RenderContext>(ctx: &mut C, image: &ImageData, opts: &DrawTextOptions) -> Result<()> {
    let opts = opts.resolve();
    let width = image.width() as f64;
    let height = image.height() as f64;

    ctx.clear_rect(0.0, 0.0, width, height)?;
    ctx.draw_image(image, 0.0, 0.0)?;

    let main_size = width / MAIN_FONT_DIVISOR;
    let x = width / 2.0;
    let y = height / 2.0;

    apply_text_style(ctx, &opts.text, main_size)?;
    ctx.fill_text(&opts.text.content, x, y)?;

    // The sub label keeps the horizontal center and moves off the main
    // label's center by half the main font size.
    let sub_y = match opts.sub_text_position {
        SubTextPosition::Top => y - main_size / 2.0,
        SubTextPosition::Bottom => y + main_size / 2.0,
    };
    let sub_size = width / SUB_FONT_DIVISOR;

    apply_text_style(ctx, &opts.sub_text, sub_size)?;
    ctx.fill_text(&opts.sub_text.content, x, sub_y)?;

    Ok(())
}

/// Resizes `surface` to the image's dimensions, discarding prior content,
/// then paints the image and both labels. Returns the final extent.
pub fn draw_image_with_text<S: Surface>(
    surface: &mut S,
    image: &ImageData,
    opts: &DrawTextOptions,
) -> Result<Extent> {
    let extent = Extent::new(image.width(), image.height());
    surface.resize(extent)?;
    paint(surface.context()?, image, opts)?;
    debug!("painted overlay at {}x{}", extent.width, extent.height);
    Ok(extent)
}

/// The full operation: load the image named by `src`, resize the surface to
/// its dimensions and paint the overlay.
///
/// The context is probed before any load is issued, so a surface that cannot
/// produce one fails immediately. A load that fails leaves the surface
/// completely untouched and reports why, instead of silently doing nothing;
/// integrators that want the old fire-and-forget behavior can drop the error.
pub async fn render<S: Surface>(
    surface: &mut S,
    src: &str,
    opts: &DrawTextOptions,
) -> Result<Extent> {
    surface.context()?;
    let image = loader::load_image(src).await?;
    draw_image_with_text(surface, &image, opts)
}

/// Detached variant of [`render`] for callers that want to kick off the load
/// and keep going. Takes ownership of the surface for the task's lifetime and
/// hands it back with the final extent when awaited.
///
/// Must be called from within a tokio runtime.
pub fn spawn_render<S>(
    mut surface: S,
    src: String,
    opts: DrawTextOptions,
) -> tokio::task::JoinHandle<Result<(S, Extent)>>
where
    S: Surface + Send + 'static,
{
    tokio::spawn(async move {
        let extent = render(&mut surface, &src, &opts).await?;
        Ok((surface, extent))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::{DrawOp, RecordingSurface};
    use crate::error::PlacardError;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn opts(position: SubTextPosition) -> DrawTextOptions {
        DrawTextOptions {
            text: Text::new("SALE", "serif", "#ff0000"),
            sub_text: Text::new("50% OFF", "serif", "#ffffff"),
            sub_text_position: position,
        }
    }

    fn checker(width: u32, height: u32) -> ImageData {
        let mut img = ImageData::new(width, height);
        for px in img.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[128, 128, 128, 255]);
        }
        img
    }

    fn png_data_uri(width: u32, height: u32) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba([9, 9, 9, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            BASE64_STANDARD.encode(out.into_inner())
        )
    }

    #[test]
    fn resolve_fills_center_and_middle() {
        let resolved = Text::new("A", "serif", "#000").resolve();
        assert_eq!(resolved.text_align, TextAlign::Center);
        assert_eq!(resolved.text_baseline, TextBaseline::Middle);

        let explicit = Text::new("A", "serif", "#000")
            .with_align(TextAlign::Left)
            .with_baseline(TextBaseline::Top)
            .resolve();
        assert_eq!(explicit.text_align, TextAlign::Left);
        assert_eq!(explicit.text_baseline, TextBaseline::Top);
    }

    #[test]
    fn surface_matches_image_dimensions() {
        let mut surface = RecordingSurface::new();
        let extent =
            draw_image_with_text(&mut surface, &checker(400, 200), &opts(SubTextPosition::Bottom))
                .unwrap();
        assert_eq!(extent, Extent::new(400, 200));
        assert_eq!(surface.extent(), Extent::new(400, 200));
    }

    #[test]
    fn paints_image_then_main_then_sub() {
        let mut surface = RecordingSurface::new();
        draw_image_with_text(&mut surface, &checker(400, 200), &opts(SubTextPosition::Bottom))
            .unwrap();

        let ops = surface.canvas().ops();
        assert_eq!(ops.len(), 4);
        match &ops[0] {
            DrawOp::ClearRect { x, y, w, h, .. } => {
                assert_eq!((*x, *y, *w, *h), (0.0, 0.0, 400.0, 200.0));
            }
            other => panic!("unexpected op: {:?}", other),
        }
        match &ops[1] {
            DrawOp::DrawImage {
                source_width,
                source_height,
                dx,
                dy,
                ..
            } => {
                assert_eq!((*source_width, *source_height), (400, 200));
                assert_eq!((*dx, *dy), (0.0, 0.0));
            }
            other => panic!("unexpected op: {:?}", other),
        }

        match &ops[2] {
            DrawOp::FillText { text, x, y, state } => {
                assert_eq!(text, "SALE");
                assert_eq!((*x, *y), (200.0, 100.0));
                assert_eq!(state.font, "100px serif");
                assert_eq!(state.fill_style, "#ff0000");
                assert_eq!(state.text_align, TextAlign::Center);
                assert_eq!(state.text_baseline, TextBaseline::Middle);
            }
            other => panic!("unexpected op: {:?}", other),
        }

        match &ops[3] {
            DrawOp::FillText { text, x, y, state } => {
                assert_eq!(text, "50% OFF");
                assert_eq!((*x, *y), (200.0, 150.0));
                assert_eq!(state.font, "12.5px serif");
                assert_eq!(state.fill_style, "#ffffff");
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn top_position_moves_sub_text_up() {
        let mut surface = RecordingSurface::new();
        draw_image_with_text(&mut surface, &checker(400, 200), &opts(SubTextPosition::Top))
            .unwrap();

        match surface.canvas().ops().last().unwrap() {
            DrawOp::FillText { y, .. } => assert_eq!(*y, 50.0),
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn sub_font_ratio_is_independent_of_main() {
        let mut surface = RecordingSurface::new();
        draw_image_with_text(&mut surface, &checker(64, 64), &opts(SubTextPosition::Bottom))
            .unwrap();

        match surface.canvas().ops().last().unwrap() {
            DrawOp::FillText { state, .. } => assert_eq!(state.font, "2px serif"),
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[tokio::test]
    async fn renders_from_data_uri() {
        let mut surface = RecordingSurface::new();
        let extent = render(&mut surface, &png_data_uri(8, 6), &opts(SubTextPosition::Bottom))
            .await
            .unwrap();
        assert_eq!(extent, Extent::new(8, 6));
        assert_eq!(surface.canvas().ops().len(), 4);
    }

    #[tokio::test]
    async fn detached_surface_fails_before_any_load() {
        let mut surface = RecordingSurface::detached();
        let err = render(&mut surface, "/never/read.png", &opts(SubTextPosition::Top))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacardError::ContextUnavailable));
        assert_eq!(surface.extent(), Extent::new(0, 0));
    }

    #[tokio::test]
    async fn failed_load_leaves_surface_untouched() {
        let mut surface = RecordingSurface::new();
        surface.resize(Extent::new(11, 7)).unwrap();
        let err = render(&mut surface, "/no/such/file.png", &opts(SubTextPosition::Bottom))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacardError::Load(_)));
        assert_eq!(surface.extent(), Extent::new(11, 7));
        assert!(surface.canvas().ops().is_empty());
    }

    #[tokio::test]
    async fn spawn_render_hands_the_surface_back() {
        let surface = RecordingSurface::new();
        let handle = spawn_render(surface, png_data_uri(10, 4), opts(SubTextPosition::Bottom));
        let (surface, extent) = handle.await.unwrap().unwrap();
        assert_eq!(extent, Extent::new(10, 4));
        assert_eq!(surface.extent(), Extent::new(10, 4));
    }
}
