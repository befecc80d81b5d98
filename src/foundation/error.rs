/// Convenience result type used across vsthumb.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Top-level error taxonomy used by the composition engine.
#[derive(thiserror::Error, Debug)]
pub enum ThumbError {
    /// Malformed or missing configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// A character, color or sprite file that matched no candidate under any fallback rule.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// Text could not be sized or placed.
    #[error("layout error: {0}")]
    Layout(String),

    /// Raster or glyph painting failures.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbError {
    /// Build a [`ThumbError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ThumbError::AssetNotFound`] value.
    pub fn asset_not_found(msg: impl Into<String>) -> Self {
        Self::AssetNotFound(msg.into())
    }

    /// Build a [`ThumbError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`ThumbError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ThumbError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
