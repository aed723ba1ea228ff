//! The externally owned raster target an overlay is painted onto.

use crate::api::RenderContext;
use crate::error::Result;

/// Pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A mutable 2D raster target. The overlay renderer resizes it to the loaded
/// image's dimensions and overwrites its whole pixel buffer; ownership stays
/// with the caller.
pub trait Surface {
    type Context: RenderContext;

    /// Current pixel dimensions.
    fn extent(&self) -> Extent;

    /// Resizes the surface, discarding any prior content.
    fn resize(&mut self, extent: Extent) -> Result<()>;

    /// Acquires the 2D drawing context, or fails with
    /// [`PlacardError::ContextUnavailable`](crate::PlacardError::ContextUnavailable)
    /// when the surface cannot produce one.
    fn context(&mut self) -> Result<&mut Self::Context>;
}
