//! Overlay a main label and a sub-label on top of an image.
//!
//! The renderer loads an image (data URI, file path or URL), resizes a
//! [`Surface`] to the image's pixel dimensions, paints the image and then two
//! lines of text: the main label centered on the surface at a font size of
//! width/4, and the sub-label above or below it at width/32. Drawing goes
//! through Canvas-2D-style traits, so the same routine targets the raster,
//! SVG and recording backends alike.
//!
//! ```no_run
//! use placard::{DrawTextOptions, SubTextPosition, Text};
//! use placard::backends::pixmap::{FontStore, PixmapSurface};
//!
//! # async fn run() -> placard::Result<()> {
//! let mut fonts = FontStore::new();
//! fonts.register("serif", std::fs::read("DejaVuSerif.ttf")?)?;
//!
//! let mut surface = PixmapSurface::new(fonts);
//! let opts = DrawTextOptions {
//!     text: Text::new("SALE", "serif", "#ff0000"),
//!     sub_text: Text::new("50% OFF", "serif", "#ffffff"),
//!     sub_text_position: SubTextPosition::Bottom,
//! };
//! let extent = placard::render(&mut surface, "poster.png", &opts).await?;
//! surface.image().save("out.png").expect("save");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backends;
pub mod error;
pub mod loader;
pub mod overlay;
pub mod surface;

pub use api::{ImageData, RenderContext, TextAlign, TextBaseline, TextMetrics};
pub use error::{PlacardError, Result};
pub use loader::{decode_image, load_image};
pub use overlay::{
    DrawTextOptions, ResolvedOptions, ResolvedText, SubTextPosition, Text, draw_image_with_text,
    paint, render, spawn_render,
};
pub use surface::{Extent, Surface};
