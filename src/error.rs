pub type Result<T> = std::result::Result<T, PlacardError>;

#[derive(Debug)]
pub enum PlacardError {
    /// The surface could not produce a 2D drawing context.
    ContextUnavailable,
    /// The image source string could not be interpreted (bad data URI,
    /// unsupported scheme, non-UTF-8 path and so on).
    Source(String),
    /// The image could not be fetched or decoded.
    Load(Box<dyn std::error::Error + Send + Sync>),
    /// A drawing backend failed while painting.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl PlacardError {
    pub fn load(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        PlacardError::Load(Box::new(err))
    }

    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        PlacardError::Backend(Box::new(err))
    }
}

impl std::fmt::Display for PlacardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacardError::ContextUnavailable => write!(f, "2D drawing context is not available"),
            PlacardError::Source(src) => write!(f, "unusable image source: {}", src),
            PlacardError::Load(_) => write!(f, "image failed to load"),
            PlacardError::Backend(_) => write!(f, "drawing backend error"),
        }
    }
}

impl std::error::Error for PlacardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacardError::ContextUnavailable | PlacardError::Source(_) => None,
            PlacardError::Load(err) => Some(err.as_ref()),
            PlacardError::Backend(err) => Some(err.as_ref()),
        }
    }
}

impl From<std::io::Error> for PlacardError {
    fn from(err: std::io::Error) -> Self {
        PlacardError::Backend(Box::new(err))
    }
}

impl From<image::ImageError> for PlacardError {
    fn from(err: image::ImageError) -> Self {
        PlacardError::Load(Box::new(err))
    }
}

#[cfg(feature = "cairo")]
impl From<cairo::Error> for PlacardError {
    fn from(err: cairo::Error) -> Self {
        PlacardError::Backend(Box::new(err))
    }
}
